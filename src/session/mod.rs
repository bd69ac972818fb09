//! Session controller: owns the running game and the player profile, routes
//! every change through [`transition`] and writes back what it touched.

mod command;
mod reducer;
mod state;

pub use command::{Command, Effect, Sound};
pub use reducer::{transition, Env, Transition};
pub use state::{
    GameMode, RoundOutcome, RoundSummary, SessionState, TimerToken, RUSH_DURATION_SECS,
    RUSH_WARNING_SECS,
};

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::catalog::{Difficulty, WordCatalog};
use crate::daily;
use crate::error::{GameError, Result};
use crate::profile::{Profile, ProfileStore, Theme};
use crate::rng::{RandomSource, ThreadRandom};
use crate::round::{LossReason, Round};

pub struct GameSession<S: ProfileStore, R: RandomSource = ThreadRandom> {
    catalog: WordCatalog,
    store: S,
    rng: R,
    state: SessionState,
    profile: Profile,
}

impl<S: ProfileStore, R: RandomSource> GameSession<S, R> {
    pub fn new(catalog: WordCatalog, store: S, rng: R) -> Self {
        let profile = Profile::load(&store);
        debug!(high_score = profile.high_score, "profile loaded");
        Self {
            catalog,
            store,
            rng,
            state: SessionState::new(),
            profile,
        }
    }

    /// Applies one command. On success the new state is committed, touched
    /// profile keys are written, and the remaining effects are returned for
    /// the caller to run. On error nothing changes.
    pub fn dispatch(&mut self, command: Command) -> Result<Vec<Effect>> {
        let mut env = Env {
            catalog: &self.catalog,
            rng: &mut self.rng,
        };
        let Transition {
            state,
            profile,
            effects,
        } = match transition(&self.state, &self.profile, command, &mut env) {
            Ok(t) => t,
            Err(e) => {
                match &e {
                    GameError::NoActiveRound => debug!("{e}"),
                    _ => info!("{e}"),
                }
                return Err(e);
            }
        };
        self.state = state;
        self.profile = profile;

        Ok(effects
            .into_iter()
            .filter(|effect| match effect {
                Effect::Persist(keys) => {
                    self.profile.save(&mut self.store, keys);
                    false
                }
                _ => true,
            })
            .collect())
    }

    pub fn start_classic(&mut self, category: &str, difficulty: Difficulty) -> Result<Vec<Effect>> {
        self.dispatch(Command::StartClassic {
            category: category.to_string(),
            difficulty,
        })
    }

    pub fn continue_classic(
        &mut self,
        category: &str,
        difficulty: Difficulty,
    ) -> Result<Vec<Effect>> {
        self.dispatch(Command::ContinueClassic {
            category: category.to_string(),
            difficulty,
        })
    }

    pub fn start_daily_challenge(&mut self, today: NaiveDate) -> Result<Vec<Effect>> {
        self.dispatch(Command::StartDailyChallenge { today })
    }

    pub fn start_timed_rush(&mut self) -> Result<Vec<Effect>> {
        self.dispatch(Command::StartTimedRush)
    }

    pub fn submit_guess(&mut self, letter: char) -> Result<Vec<Effect>> {
        self.dispatch(Command::SubmitGuess(letter))
    }

    pub fn consume_hint(&mut self) -> Result<Vec<Effect>> {
        self.dispatch(Command::ConsumeHint)
    }

    pub fn tick(&mut self, token: TimerToken) -> Result<Vec<Effect>> {
        self.dispatch(Command::Tick(token))
    }

    pub fn reveal_word(&mut self) -> Result<Vec<Effect>> {
        self.dispatch(Command::RevealWord)
    }

    pub fn forfeit(&mut self, reason: LossReason) -> Result<Vec<Effect>> {
        self.dispatch(Command::EndRound(RoundOutcome::Lost(reason)))
    }

    pub fn quit_round(&mut self) -> Result<Vec<Effect>> {
        self.dispatch(Command::QuitRound)
    }

    pub fn toggle_mute(&mut self) -> Result<Vec<Effect>> {
        self.dispatch(Command::ToggleMute)
    }

    pub fn set_muted(&mut self, muted: bool) -> Result<Vec<Effect>> {
        self.dispatch(Command::SetMuted(muted))
    }

    pub fn set_volume(&mut self, volume: f32) -> Result<Vec<Effect>> {
        self.dispatch(Command::SetVolume(volume))
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<Vec<Effect>> {
        self.dispatch(Command::SetTheme(theme))
    }

    pub fn reset_stats(&mut self) -> Result<Vec<Effect>> {
        self.dispatch(Command::ResetStats)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn catalog(&self) -> &WordCatalog {
        &self.catalog
    }

    pub fn round(&self) -> Option<&Round> {
        self.state.round()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn daily_available(&self, today: NaiveDate) -> bool {
        daily::is_eligible(&self.profile, today)
    }
}

/// Message posted when sharing a high score.
pub fn share_text(high_score: u32) -> String {
    format!("I set a new high score of {high_score} in Hangman! Can you beat it?")
}
