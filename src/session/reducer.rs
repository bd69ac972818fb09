//! The single transition function behind every session change.
//!
//! `transition` works on copies of the session and profile and only hands
//! them back on success, so a rejected command leaves nothing half-applied.

use tracing::{debug, info};

use super::command::{Command, Effect, Sound};
use super::state::{
    GameMode, RoundOutcome, RoundSummary, SessionState, TimerToken, RUSH_DURATION_SECS,
    RUSH_WARNING_SECS,
};
use crate::catalog::{Difficulty, WordCatalog};
use crate::daily;
use crate::error::{GameError, Result};
use crate::profile::{Profile, ProfileKey, Theme};
use crate::rng::RandomSource;
use crate::round::{GuessOutcome, LossReason, Round, RoundStatus, TickOutcome};

/// Read-only catalog plus the random source for word and hint picks
pub struct Env<'a> {
    pub catalog: &'a WordCatalog,
    pub rng: &'a mut dyn RandomSource,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: SessionState,
    pub profile: Profile,
    pub effects: Vec<Effect>,
}

pub fn transition(
    state: &SessionState,
    profile: &Profile,
    command: Command,
    env: &mut Env<'_>,
) -> Result<Transition> {
    let mut reducer = Reducer {
        state: state.clone(),
        profile: profile.clone(),
        effects: Vec::new(),
        dirty: Vec::new(),
    };
    reducer.apply(command, env)?;
    Ok(reducer.finish())
}

struct Reducer {
    state: SessionState,
    profile: Profile,
    effects: Vec<Effect>,
    dirty: Vec<ProfileKey>,
}

impl Reducer {
    fn apply(&mut self, command: Command, env: &mut Env<'_>) -> Result<()> {
        match command {
            Command::StartClassic {
                category,
                difficulty,
            } => self.start_classic(category, difficulty, true, env),
            Command::ContinueClassic {
                category,
                difficulty,
            } => {
                let reset = self.state.mode != GameMode::Classic;
                self.start_classic(category, difficulty, reset, env)
            }
            Command::StartDailyChallenge { today } => self.start_daily(today, env),
            Command::StartTimedRush => {
                self.start_rush(env);
                Ok(())
            }
            Command::SubmitGuess(letter) => self.submit_guess(letter, env),
            Command::ConsumeHint => self.consume_hint(env),
            Command::Tick(token) => {
                self.tick(token, env);
                Ok(())
            }
            Command::EndRound(outcome) => self.end_round(outcome, env),
            Command::RevealWord => self.end_round(RoundOutcome::Lost(LossReason::GaveUp), env),
            Command::QuitRound => {
                self.quit_round();
                Ok(())
            }
            Command::ToggleMute => {
                self.set_muted(!self.profile.is_muted);
                Ok(())
            }
            Command::SetMuted(muted) => {
                self.set_muted(muted);
                Ok(())
            }
            Command::SetVolume(volume) => {
                self.set_volume(volume);
                Ok(())
            }
            Command::SetTheme(theme) => {
                self.set_theme(theme);
                Ok(())
            }
            Command::ResetStats => {
                self.profile.stats = Default::default();
                self.touch(ProfileKey::Stats);
                self.emit(Effect::Render);
                Ok(())
            }
        }
    }

    fn finish(mut self) -> Transition {
        if !self.dirty.is_empty() {
            self.effects.insert(0, Effect::Persist(self.dirty));
        }
        Transition {
            state: self.state,
            profile: self.profile,
            effects: self.effects,
        }
    }

    fn emit(&mut self, effect: Effect) {
        if effect == Effect::Render && self.effects.contains(&Effect::Render) {
            return;
        }
        self.effects.push(effect);
    }

    fn touch(&mut self, key: ProfileKey) {
        if !self.dirty.contains(&key) {
            self.dirty.push(key);
        }
    }

    fn start_classic(
        &mut self,
        category: String,
        difficulty: Difficulty,
        reset_score: bool,
        env: &mut Env<'_>,
    ) -> Result<()> {
        let words = env.catalog.words_for(&category)?;
        let word = words[env.rng.pick_index(words.len())].clone();
        let profile = env.catalog.difficulty_profile(difficulty);

        if reset_score {
            self.state.current_score = 0;
        }
        self.reset_mode(GameMode::Classic);
        self.state.category = Some(category.clone());
        self.state.difficulty = Some(difficulty);

        info!(%category, %difficulty, "classic round started");
        self.begin_round(Round::with_profile(word, &profile));
        Ok(())
    }

    fn start_daily(&mut self, today: chrono::NaiveDate, env: &mut Env<'_>) -> Result<()> {
        if !daily::is_eligible(&self.profile, today) {
            return Err(GameError::AlreadyPlayedToday(today));
        }
        let word = env.catalog.daily_word_for(today).to_string();
        let profile = env.catalog.difficulty_profile(Difficulty::Hard);

        self.reset_mode(GameMode::DailyChallenge);
        self.state.difficulty = Some(Difficulty::Hard);
        self.state.daily_date = Some(today);

        info!(%today, "daily challenge started");
        self.begin_round(Round::with_profile(word, &profile));
        Ok(())
    }

    fn start_rush(&mut self, env: &mut Env<'_>) {
        self.reset_mode(GameMode::TimedRush);
        self.state.current_score = 0;
        self.state.timed_rush_streak = 0;
        self.state.new_high_score = false;
        self.state.difficulty = Some(Difficulty::Medium);
        self.state.rush_remaining_secs = Some(RUSH_DURATION_SECS);

        let token = self.state.next_timer();
        self.emit(Effect::StartTimer(token));

        info!(secs = RUSH_DURATION_SECS, "timed rush started");
        self.load_rush_word(env);
    }

    fn reset_mode(&mut self, mode: GameMode) {
        self.state.mode = mode;
        self.state.category = None;
        self.state.difficulty = None;
        self.state.rush_remaining_secs = None;
        self.state.daily_date = None;
        self.state.last_summary = None;
    }

    /// Installs a classic or daily round and arms its clock.
    fn begin_round(&mut self, round: Round) {
        self.state.new_high_score = false;
        let token = self.state.next_timer();
        if round.remaining_secs().is_some() {
            self.emit(Effect::StartTimer(token));
        } else {
            self.emit(Effect::CancelTimer);
        }
        self.state.active_round = Some(round);
        self.emit(Effect::Render);
    }

    /// Rush words have no clock of their own; the master clock keeps running.
    fn load_rush_word(&mut self, env: &mut Env<'_>) {
        let words = env.catalog.all_words();
        let word = words[env.rng.pick_index(words.len())];
        let medium = env.catalog.difficulty_profile(Difficulty::Medium);

        debug!(len = word.len(), "next rush word");
        self.state.active_round = Some(Round::new(word, None, medium.hints_enabled));
        self.emit(Effect::Render);
    }

    fn live_round(&mut self) -> Result<&mut Round> {
        self.state.active_round.as_mut().ok_or(GameError::NoActiveRound)
    }

    fn submit_guess(&mut self, letter: char, env: &mut Env<'_>) -> Result<()> {
        let outcome = self.live_round()?.submit_guess(letter);
        match outcome {
            GuessOutcome::Correct => self.emit(Effect::PlaySound(Sound::Correct)),
            GuessOutcome::Incorrect => self.emit(Effect::PlaySound(Sound::Incorrect)),
            GuessOutcome::Repeated | GuessOutcome::Invalid | GuessOutcome::Finished => {
                debug!(%letter, ?outcome, "guess ignored");
                return Ok(());
            }
        }
        self.emit(Effect::Render);
        self.settle(env);
        Ok(())
    }

    fn consume_hint(&mut self, env: &mut Env<'_>) -> Result<()> {
        let round = self
            .state
            .active_round
            .as_mut()
            .ok_or(GameError::NoActiveRound)?;
        match round.consume_hint(&mut *env.rng) {
            Some(letter) => {
                debug!(%letter, "hint used");
                self.emit(Effect::PlaySound(Sound::Correct));
                self.emit(Effect::Render);
                self.settle(env);
            }
            None => debug!("hint unavailable"),
        }
        Ok(())
    }

    fn tick(&mut self, token: TimerToken, env: &mut Env<'_>) {
        if token != self.state.timer_token() {
            debug!(?token, current = ?self.state.timer_token(), "stale tick ignored");
            return;
        }

        if self.state.mode == GameMode::TimedRush {
            // master clock first: its expiry ends the session whatever the word is doing
            let Some(secs) = self.state.rush_remaining_secs else {
                return;
            };
            if secs == 0 {
                return;
            }
            let left = secs - 1;
            self.state.rush_remaining_secs = Some(left);
            if left == 0 {
                self.expire_rush();
                return;
            }
            if left <= RUSH_WARNING_SECS {
                self.emit(Effect::PlaySound(Sound::Tick));
            }
            self.emit(Effect::Render);
            return;
        }

        let Some(round) = self.state.active_round.as_mut() else {
            return;
        };
        match round.tick() {
            TickOutcome::Running(_) => self.emit(Effect::Render),
            TickOutcome::Expired => {
                self.emit(Effect::Render);
                self.settle(env);
            }
            TickOutcome::Untimed | TickOutcome::Finished => {}
        }
    }

    fn end_round(&mut self, outcome: RoundOutcome, env: &mut Env<'_>) -> Result<()> {
        let round = self.live_round()?;
        match outcome {
            RoundOutcome::Lost(reason) => {
                if !round.forfeit(reason) {
                    debug!("round already over");
                    return Ok(());
                }
            }
            RoundOutcome::Won => {
                if round.is_finished() {
                    debug!("round already over");
                } else {
                    debug!("a win can't be forced; ignoring");
                }
                return Ok(());
            }
        }
        self.emit(Effect::Render);
        self.settle(env);
        Ok(())
    }

    fn quit_round(&mut self) {
        if self.state.active_round.is_none() && self.state.rush_remaining_secs.is_none() {
            return;
        }
        info!(mode = %self.state.mode, "round abandoned");
        self.state.active_round = None;
        self.state.rush_remaining_secs = None;
        self.state.daily_date = None;
        self.state.next_timer();
        self.emit(Effect::CancelTimer);
        self.emit(Effect::Render);
    }

    /// Runs end-of-round bookkeeping if the active round just resolved.
    fn settle(&mut self, env: &mut Env<'_>) {
        let Some(round) = self.state.active_round.as_ref() else {
            return;
        };
        let outcome = match round.status() {
            RoundStatus::InProgress => return,
            RoundStatus::Won => RoundOutcome::Won,
            RoundStatus::Lost(reason) => RoundOutcome::Lost(reason),
        };
        let word = round.target_word().to_string();
        info!(mode = %self.state.mode, ?outcome, "round over");

        self.record_played(outcome);

        if self.state.mode == GameMode::TimedRush {
            self.settle_rush_word(outcome, env);
            return;
        }

        if self.state.mode == GameMode::DailyChallenge {
            self.record_daily(outcome);
        }

        if outcome.is_win() {
            self.add_point();
            self.emit(Effect::PlaySound(Sound::Win));
        } else {
            self.state.current_score = 0;
            self.emit(Effect::PlaySound(Sound::Lose));
        }

        self.state.next_timer();
        self.emit(Effect::CancelTimer);
        self.publish_summary(word, outcome, false);
    }

    /// Per-word results never end a rush; only the master clock does.
    fn settle_rush_word(&mut self, outcome: RoundOutcome, env: &mut Env<'_>) {
        if outcome.is_win() {
            self.state.timed_rush_streak += 1;
            self.add_point();
            self.emit(Effect::PlaySound(Sound::Win));
        } else {
            self.state.timed_rush_streak = 0;
            self.emit(Effect::PlaySound(Sound::Incorrect));
        }
        self.load_rush_word(env);
    }

    fn expire_rush(&mut self) {
        info!(score = self.state.current_score, "timed rush over");
        let Some(round) = self.state.active_round.as_mut() else {
            self.finish_rush(String::new(), RoundOutcome::Lost(LossReason::TimeExpired));
            return;
        };
        let word = round.target_word().to_string();
        let interrupted = round.forfeit(LossReason::TimeExpired);
        let outcome = match round.status() {
            RoundStatus::Won => RoundOutcome::Won,
            RoundStatus::Lost(reason) => RoundOutcome::Lost(reason),
            RoundStatus::InProgress => RoundOutcome::Lost(LossReason::TimeExpired),
        };
        if interrupted {
            self.record_played(outcome);
        }
        self.emit(Effect::PlaySound(Sound::Lose));
        self.finish_rush(word, outcome);
    }

    fn finish_rush(&mut self, word: String, outcome: RoundOutcome) {
        self.state.rush_remaining_secs = Some(0);
        self.state.next_timer();
        self.emit(Effect::CancelTimer);
        self.publish_summary(word, outcome, true);
    }

    fn record_played(&mut self, outcome: RoundOutcome) {
        self.profile.stats.played += 1;
        if outcome.is_win() {
            self.profile.stats.wins += 1;
        }
        self.touch(ProfileKey::Stats);
    }

    fn record_daily(&mut self, outcome: RoundOutcome) {
        let Some(date) = self.state.daily_date else {
            return;
        };
        self.profile.daily.last_played = Some(date);
        self.touch(ProfileKey::DailyLastPlayed);

        if outcome.is_win() {
            let streak = daily::next_streak(
                self.profile.daily_streak,
                self.profile.daily.last_win,
                date,
            );
            self.profile.daily_streak = streak;
            self.profile.daily.last_win = Some(date);
            self.touch(ProfileKey::DailyLastWin);
            if streak > self.profile.best_streak {
                self.profile.best_streak = streak;
                self.touch(ProfileKey::BestStreak);
            }
        } else {
            self.profile.daily_streak = 0;
        }
        self.touch(ProfileKey::DailyStreak);
    }

    fn add_point(&mut self) {
        self.state.current_score += 1;
        if self.state.current_score > self.profile.high_score {
            self.profile.high_score = self.state.current_score;
            self.state.new_high_score = true;
            self.touch(ProfileKey::HighScore);
        }
    }

    fn publish_summary(&mut self, word: String, outcome: RoundOutcome, rush_expired: bool) {
        let summary = RoundSummary {
            mode: self.state.mode,
            word,
            outcome,
            rush_expired,
            score: self.state.current_score,
            high_score: self.profile.high_score,
            new_high_score: self.state.new_high_score,
            daily_streak: self.profile.daily_streak,
        };
        self.state.last_summary = Some(summary.clone());
        self.emit(Effect::Render);
        self.emit(Effect::RoundOver(summary));
    }

    fn set_muted(&mut self, muted: bool) {
        self.profile.is_muted = muted;
        self.touch(ProfileKey::Muted);
        self.emit(Effect::Render);
    }

    fn set_volume(&mut self, volume: f32) {
        if !volume.is_finite() {
            debug!(volume, "ignoring non-finite volume");
            return;
        }
        self.profile.volume = volume.clamp(0.0, 1.0);
        self.touch(ProfileKey::Volume);
        // turning the volume up unmutes
        if self.profile.volume > 0.0 && self.profile.is_muted {
            self.profile.is_muted = false;
            self.touch(ProfileKey::Muted);
        }
        self.emit(Effect::Render);
    }

    fn set_theme(&mut self, theme: Theme) {
        self.profile.theme = theme;
        self.touch(ProfileKey::Theme);
        self.emit(Effect::Render);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{DailyRecord, GameStats};
    use crate::rng::ScriptedRandom;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    // indexes into the builtin catalog
    const EGYPT: usize = 5;
    const RUSH_EGYPT: usize = 19;
    const RUSH_CANADA: usize = 17;

    struct Harness {
        catalog: WordCatalog,
        rng: ScriptedRandom,
        state: SessionState,
        profile: Profile,
    }

    impl Harness {
        fn new(picks: impl IntoIterator<Item = usize>) -> Self {
            Self {
                catalog: WordCatalog::builtin(),
                rng: ScriptedRandom::new(picks),
                state: SessionState::new(),
                profile: Profile::default(),
            }
        }

        fn send(&mut self, command: Command) -> Result<Vec<Effect>> {
            let mut env = Env {
                catalog: &self.catalog,
                rng: &mut self.rng,
            };
            let t = transition(&self.state, &self.profile, command, &mut env)?;
            self.state = t.state;
            self.profile = t.profile;
            Ok(t.effects)
        }

        fn guess_all(&mut self, letters: &str) -> Vec<Effect> {
            letters
                .chars()
                .flat_map(|c| self.send(Command::SubmitGuess(c)).unwrap())
                .collect()
        }

        fn start_egypt(&mut self, difficulty: Difficulty) {
            self.send(Command::StartClassic {
                category: "countries".into(),
                difficulty,
            })
            .unwrap();
            assert_eq!(self.word(), "egypt");
        }

        fn word(&self) -> &str {
            self.state.round().unwrap().target_word()
        }

        fn tick(&mut self) -> Vec<Effect> {
            let token = self.state.timer_token();
            self.send(Command::Tick(token)).unwrap()
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn summary(effects: &[Effect]) -> Option<&RoundSummary> {
        effects.iter().find_map(|e| match e {
            Effect::RoundOver(s) => Some(s),
            _ => None,
        })
    }

    fn persisted(effects: &[Effect]) -> Vec<ProfileKey> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Persist(keys) => Some(keys.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    #[test]
    fn test_start_classic() {
        let mut h = Harness::new([EGYPT]);
        let effects = h
            .send(Command::StartClassic {
                category: "countries".into(),
                difficulty: Difficulty::Medium,
            })
            .unwrap();

        assert_eq!(h.state.mode, GameMode::Classic);
        assert_eq!(h.word(), "egypt");
        assert_eq!(h.state.round().unwrap().remaining_secs(), Some(90));
        assert_eq!(h.state.difficulty, Some(Difficulty::Medium));
        assert_eq!(effects, vec![Effect::StartTimer(TimerToken(1)), Effect::Render]);
    }

    #[test]
    fn test_unknown_category_changes_nothing() {
        let mut h = Harness::new([EGYPT]);
        h.start_egypt(Difficulty::Easy);
        let before = h.state.clone();

        let err = h
            .send(Command::StartClassic {
                category: "dinosaurs".into(),
                difficulty: Difficulty::Easy,
            })
            .unwrap_err();
        assert_eq!(err, GameError::InvalidCategory("dinosaurs".into()));
        assert_eq!(h.state, before);
    }

    #[test]
    fn test_guess_without_round() {
        let mut h = Harness::new([]);
        assert_eq!(
            h.send(Command::SubmitGuess('a')),
            Err(GameError::NoActiveRound)
        );
        assert_eq!(h.send(Command::ConsumeHint), Err(GameError::NoActiveRound));
        assert_eq!(h.send(Command::RevealWord), Err(GameError::NoActiveRound));
    }

    #[test]
    fn test_classic_win_scores_and_persists() {
        let mut h = Harness::new([EGYPT]);
        h.start_egypt(Difficulty::Easy);

        let effects = h.guess_all("egypt");
        assert!(effects.contains(&Effect::PlaySound(Sound::Win)));
        assert!(effects.contains(&Effect::CancelTimer));
        assert_eq!(h.state.current_score, 1);
        assert_eq!(h.profile.high_score, 1);
        assert_eq!(h.profile.stats, GameStats { played: 1, wins: 1 });
        assert!(persisted(&effects).contains(&ProfileKey::HighScore));
        assert!(persisted(&effects).contains(&ProfileKey::Stats));

        let summary = summary(&effects).unwrap();
        assert_eq!(summary.outcome, RoundOutcome::Won);
        assert_eq!(summary.word, "egypt");
        assert!(summary.new_high_score);
    }

    #[test]
    fn test_loss_resets_score_but_keeps_high_score() {
        let mut h = Harness::new([EGYPT, EGYPT]);
        h.start_egypt(Difficulty::Easy);
        h.guess_all("egypt");

        h.send(Command::ContinueClassic {
            category: "countries".into(),
            difficulty: Difficulty::Easy,
        })
        .unwrap();
        assert_eq!(h.state.current_score, 1);

        let effects = h.guess_all("abcdfh");
        let summary = summary(&effects).unwrap();
        assert_eq!(summary.outcome, RoundOutcome::Lost(LossReason::OutOfGuesses));
        assert!(effects.contains(&Effect::PlaySound(Sound::Lose)));
        assert_eq!(h.state.current_score, 0);
        assert_eq!(h.profile.high_score, 1);
        assert_eq!(h.profile.stats, GameStats { played: 2, wins: 1 });
    }

    #[test]
    fn test_high_score_flag_belongs_to_the_winning_round() {
        let mut h = Harness::new([EGYPT, EGYPT, EGYPT]);
        h.start_egypt(Difficulty::Easy);
        assert!(summary(&h.guess_all("egypt")).unwrap().new_high_score);

        h.send(Command::ContinueClassic {
            category: "countries".into(),
            difficulty: Difficulty::Easy,
        })
        .unwrap();
        assert!(!h.state.new_high_score);
        let lost = h.guess_all("abcdfh");
        let lost = summary(&lost).unwrap();
        assert_eq!(lost.outcome, RoundOutcome::Lost(LossReason::OutOfGuesses));
        assert!(!lost.new_high_score);

        // matching the high score again is not a new one
        h.start_egypt(Difficulty::Easy);
        let won = h.guess_all("egypt");
        let won = summary(&won).unwrap();
        assert_eq!(won.high_score, 1);
        assert!(!won.new_high_score);
    }

    #[test]
    fn test_daily_after_classic_win_has_no_high_score_flag() {
        let mut h = Harness::new([EGYPT]);
        h.start_egypt(Difficulty::Easy);
        h.guess_all("egypt");

        h.send(Command::StartDailyChallenge {
            today: date(2024, 1, 2),
        })
        .unwrap();
        assert_eq!(h.word(), "dichotomy");
        let effects = h.guess_all("zqxwvkj");
        let summary = summary(&effects).unwrap();
        assert_matches!(summary.outcome, RoundOutcome::Lost(_));
        assert!(!summary.new_high_score);
    }

    #[test]
    fn test_animals_easy_round_through_catalog() {
        let mut h = Harness::new([0]);
        h.send(Command::StartClassic {
            category: "animals".into(),
            difficulty: Difficulty::Easy,
        })
        .unwrap();

        let round = h.state.round().unwrap();
        assert_eq!(round.target_word(), "elephant");
        assert_eq!(round.remaining_secs(), Some(120));
        assert!(round.hint_available());

        for letter in ['e', 'l', 'p', 'h', 'a', 'n'] {
            let effects = h.send(Command::SubmitGuess(letter)).unwrap();
            assert!(summary(&effects).is_none(), "won early after {letter}");
        }
        let effects = h.send(Command::SubmitGuess('t')).unwrap();
        let summary = summary(&effects).unwrap();
        assert_eq!(summary.outcome, RoundOutcome::Won);
        assert_eq!(summary.word, "elephant");
        assert_eq!(summary.score, 1);
        assert!(summary.new_high_score);
    }

    #[test]
    fn test_guesses_after_resolution_are_ignored() {
        let mut h = Harness::new([EGYPT]);
        h.start_egypt(Difficulty::Easy);
        h.guess_all("egypt");
        let before = (h.state.clone(), h.profile.clone());

        assert_eq!(h.send(Command::SubmitGuess('z')).unwrap(), vec![]);
        assert_eq!(h.send(Command::RevealWord).unwrap(), vec![]);
        assert_eq!(h.tick(), vec![]);
        assert_eq!((h.state.clone(), h.profile.clone()), before);
    }

    #[test]
    fn test_repeated_guess_is_noop() {
        let mut h = Harness::new([EGYPT]);
        h.start_egypt(Difficulty::Easy);
        h.guess_all("z");
        let before = h.state.clone();

        assert_eq!(h.send(Command::SubmitGuess('z')).unwrap(), vec![]);
        assert_eq!(h.state, before);
        assert_eq!(h.state.round().unwrap().wrong_guess_count(), 1);
    }

    #[test]
    fn test_classic_clock_runs_out() {
        let mut h = Harness::new([EGYPT]);
        h.start_egypt(Difficulty::Hard);

        for _ in 0..59 {
            assert!(summary(&h.tick()).is_none());
        }
        let effects = h.tick();
        let summary = summary(&effects).unwrap();
        assert_eq!(summary.outcome, RoundOutcome::Lost(LossReason::TimeExpired));
        assert_eq!(summary.headline(), "Time's up! ⏰");
        assert_eq!(h.profile.stats, GameStats { played: 1, wins: 0 });

        // the next tick is for a dead timer
        assert_eq!(h.tick(), vec![]);
    }

    #[test]
    fn test_stale_tick_is_ignored() {
        let mut h = Harness::new([EGYPT, EGYPT]);
        h.start_egypt(Difficulty::Easy);
        let old = h.state.timer_token();
        h.send(Command::ContinueClassic {
            category: "countries".into(),
            difficulty: Difficulty::Easy,
        })
        .unwrap();
        let before = h.state.clone();

        assert_eq!(h.send(Command::Tick(old)).unwrap(), vec![]);
        assert_eq!(h.state, before);
        assert_eq!(h.state.round().unwrap().remaining_secs(), Some(120));
    }

    #[test]
    fn test_win_on_last_second_beats_clock() {
        let mut h = Harness::new([EGYPT]);
        h.start_egypt(Difficulty::Hard);
        for _ in 0..59 {
            h.tick();
        }
        let token = h.state.timer_token();
        h.guess_all("egypt");

        assert_eq!(h.send(Command::Tick(token)).unwrap(), vec![]);
        assert_eq!(h.state.round().unwrap().status(), RoundStatus::Won);
        assert_eq!(h.profile.stats, GameStats { played: 1, wins: 1 });
    }

    #[test]
    fn test_hint() {
        let mut h = Harness::new([EGYPT, 0]);
        h.start_egypt(Difficulty::Medium);

        let effects = h.send(Command::ConsumeHint).unwrap();
        assert!(effects.contains(&Effect::Render));
        // sorted hidden letters: e g p t y
        assert_eq!(h.state.round().unwrap().guessed_correct().len(), 1);
        assert!(h.state.round().unwrap().guessed_correct().contains(&'e'));

        assert_eq!(h.send(Command::ConsumeHint).unwrap(), vec![]);
    }

    #[test]
    fn test_no_hint_on_hard() {
        let mut h = Harness::new([EGYPT]);
        h.start_egypt(Difficulty::Hard);
        let before = h.state.clone();

        assert_eq!(h.send(Command::ConsumeHint).unwrap(), vec![]);
        assert_eq!(h.state, before);
    }

    #[test]
    fn test_reveal_word_is_a_loss() {
        let mut h = Harness::new([EGYPT]);
        h.start_egypt(Difficulty::Easy);

        let effects = h.send(Command::RevealWord).unwrap();
        let summary = summary(&effects).unwrap();
        assert_eq!(summary.outcome, RoundOutcome::Lost(LossReason::GaveUp));
        assert_eq!(summary.headline(), "You gave up! The word was...");
        assert_eq!(h.profile.stats, GameStats { played: 1, wins: 0 });
    }

    #[test]
    fn test_forced_win_is_ignored() {
        let mut h = Harness::new([EGYPT]);
        h.start_egypt(Difficulty::Easy);
        let before = h.state.clone();

        assert_eq!(h.send(Command::EndRound(RoundOutcome::Won)).unwrap(), vec![]);
        assert_eq!(h.state, before);

        h.send(Command::EndRound(RoundOutcome::Lost(LossReason::TimeExpired)))
            .unwrap();
        assert_eq!(
            h.state.round().unwrap().status(),
            RoundStatus::Lost(LossReason::TimeExpired)
        );
    }

    #[test]
    fn test_quit_records_nothing() {
        let mut h = Harness::new([EGYPT]);
        h.start_egypt(Difficulty::Easy);
        h.guess_all("ab");

        let effects = h.send(Command::QuitRound).unwrap();
        assert_eq!(effects, vec![Effect::CancelTimer, Effect::Render]);
        assert!(h.state.round().is_none());
        assert_eq!(h.profile, Profile::default());
    }

    #[test]
    fn test_daily_win_starts_streak() {
        let today = date(2024, 1, 2);
        let mut h = Harness::new([]);

        h.send(Command::StartDailyChallenge { today }).unwrap();
        assert_eq!(h.state.mode, GameMode::DailyChallenge);
        assert_eq!(h.word(), "dichotomy");
        assert_eq!(h.state.round().unwrap().remaining_secs(), Some(60));
        assert!(!h.state.round().unwrap().hint_available());

        let effects = h.guess_all("dichotmy");
        assert!(summary(&effects).unwrap().outcome.is_win());
        assert_eq!(h.profile.daily_streak, 1);
        assert_eq!(h.profile.best_streak, 1);
        assert_eq!(
            h.profile.daily,
            DailyRecord {
                last_played: Some(today),
                last_win: Some(today),
            }
        );
        let keys = persisted(&effects);
        for key in [
            ProfileKey::DailyLastPlayed,
            ProfileKey::DailyLastWin,
            ProfileKey::DailyStreak,
            ProfileKey::BestStreak,
        ] {
            assert!(keys.contains(&key), "{key} not persisted");
        }

        assert_matches!(
            h.send(Command::StartDailyChallenge { today }),
            Err(GameError::AlreadyPlayedToday(d)) if d == today
        );
    }

    #[test]
    fn test_daily_streak_continues_from_yesterday() {
        let today = date(2024, 1, 2);
        let mut h = Harness::new([]);
        h.profile.daily_streak = 3;
        h.profile.best_streak = 5;
        h.profile.daily.last_win = Some(date(2024, 1, 1));
        h.profile.daily.last_played = Some(date(2024, 1, 1));

        h.send(Command::StartDailyChallenge { today }).unwrap();
        h.guess_all("dichotmy");
        assert_eq!(h.profile.daily_streak, 4);
        assert_eq!(h.profile.best_streak, 5);
    }

    #[test]
    fn test_daily_loss_breaks_streak() {
        let today = date(2024, 1, 2);
        let mut h = Harness::new([]);
        h.profile.daily_streak = 3;
        h.profile.daily.last_win = Some(date(2024, 1, 1));

        h.send(Command::StartDailyChallenge { today }).unwrap();
        h.send(Command::RevealWord).unwrap();
        assert_eq!(h.profile.daily_streak, 0);
        assert_eq!(h.profile.daily.last_played, Some(today));
        assert_eq!(h.profile.daily.last_win, Some(date(2024, 1, 1)));
    }

    #[test]
    fn test_rush_words_roll_over() {
        let mut h = Harness::new([RUSH_EGYPT, RUSH_CANADA, RUSH_EGYPT]);

        let effects = h.send(Command::StartTimedRush).unwrap();
        assert_eq!(h.state.mode, GameMode::TimedRush);
        assert_eq!(h.state.rush_remaining_secs, Some(RUSH_DURATION_SECS));
        assert!(effects.contains(&Effect::StartTimer(h.state.timer_token())));
        assert_eq!(h.word(), "egypt");
        assert_eq!(h.state.round().unwrap().remaining_secs(), None);
        let token = h.state.timer_token();

        let effects = h.guess_all("egypt");
        assert!(summary(&effects).is_none());
        assert_eq!(h.state.current_score, 1);
        assert_eq!(h.state.timed_rush_streak, 1);
        assert_eq!(h.word(), "canada");
        // the master clock keeps running across words
        assert_eq!(h.state.timer_token(), token);

        h.send(Command::RevealWord).unwrap();
        assert_eq!(h.state.current_score, 1);
        assert_eq!(h.state.timed_rush_streak, 0);
        assert_eq!(h.word(), "egypt");
        assert_eq!(h.profile.stats, GameStats { played: 2, wins: 1 });
    }

    #[test]
    fn test_rush_master_clock_ends_session() {
        let mut h = Harness::new([RUSH_EGYPT]);
        h.send(Command::StartTimedRush).unwrap();
        h.guess_all("eg");

        let mut warnings = 0;
        for _ in 0..RUSH_DURATION_SECS - 1 {
            let effects = h.tick();
            assert!(summary(&effects).is_none());
            warnings += effects
                .iter()
                .filter(|e| **e == Effect::PlaySound(Sound::Tick))
                .count();
        }
        assert_eq!(warnings as u32, RUSH_WARNING_SECS);
        assert_eq!(h.state.rush_remaining_secs, Some(1));

        let token = h.state.timer_token();
        let effects = h.tick();
        let summary = summary(&effects).unwrap();
        assert!(summary.rush_expired);
        assert_eq!(summary.headline(), "Time's up! ⏰");
        assert!(effects.contains(&Effect::CancelTimer));
        assert_eq!(h.state.rush_remaining_secs, Some(0));
        assert_eq!(
            h.state.round().unwrap().status(),
            RoundStatus::Lost(LossReason::TimeExpired)
        );
        assert_eq!(h.profile.stats, GameStats { played: 1, wins: 0 });

        assert_eq!(h.send(Command::Tick(token)).unwrap(), vec![]);

        // finishing the word after the clock ran out neither scores nor loads another
        let before = (h.state.clone(), h.profile.clone());
        assert_eq!(h.guess_all("ypt"), vec![]);
        assert_eq!(h.send(Command::ConsumeHint).unwrap(), vec![]);
        assert_eq!((h.state.clone(), h.profile.clone()), before);
        assert_eq!(h.state.round().unwrap().target_word(), "egypt");
    }

    #[test]
    fn test_continue_after_rush_resets_score() {
        let mut h = Harness::new([RUSH_EGYPT, 0, EGYPT]);
        h.send(Command::StartTimedRush).unwrap();
        h.guess_all("egypt");
        assert_eq!(h.state.current_score, 1);

        h.send(Command::ContinueClassic {
            category: "countries".into(),
            difficulty: Difficulty::Easy,
        })
        .unwrap();
        assert_eq!(h.state.mode, GameMode::Classic);
        assert_eq!(h.state.current_score, 0);
        assert_eq!(h.state.rush_remaining_secs, None);
    }

    #[test]
    fn test_settings() {
        let mut h = Harness::new([]);

        let effects = h.send(Command::ToggleMute).unwrap();
        assert!(h.profile.is_muted);
        assert_eq!(persisted(&effects), vec![ProfileKey::Muted]);
        h.send(Command::SetMuted(true)).unwrap();
        assert!(h.profile.is_muted);

        h.send(Command::SetVolume(0.25)).unwrap();
        assert_eq!(h.profile.volume, 0.25);
        assert!(!h.profile.is_muted);

        h.send(Command::SetVolume(4.0)).unwrap();
        assert_eq!(h.profile.volume, 1.0);

        h.send(Command::SetTheme(Theme::Light)).unwrap();
        assert_eq!(h.profile.theme, Theme::Light);

        h.profile.stats = GameStats { played: 9, wins: 4 };
        let effects = h.send(Command::ResetStats).unwrap();
        assert_eq!(h.profile.stats, GameStats::default());
        assert_eq!(persisted(&effects), vec![ProfileKey::Stats]);
    }
}
