use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use crate::catalog::DifficultyProfile;
use crate::rng::RandomSource;

/// Number of figure stages; reaching it loses the round.
pub const MAX_STAGES: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossReason {
    OutOfGuesses,
    TimeExpired,
    GaveUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundStatus {
    InProgress,
    Won,
    Lost(LossReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    Correct,
    Incorrect,
    /// Letter was already tried this round; nothing changed
    Repeated,
    /// Not a letter
    Invalid,
    /// Round is already won or lost
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running(u32),
    Expired,
    Untimed,
    Finished,
}

/// How a keyboard key should be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Unused,
    Correct,
    Wrong,
}

/// One guess-the-word episode
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    target_word: String,
    letters: BTreeSet<char>,
    guessed_correct: HashSet<char>,
    guessed_wrong: HashSet<char>,
    wrong_guess_count: u8,
    remaining_secs: Option<u32>,
    hints_enabled: bool,
    hint_used: bool,
    status: RoundStatus,
}

impl Round {
    /// `clock` is the per-round budget in seconds, `None` for untimed rounds.
    pub fn new(target_word: impl Into<String>, clock: Option<u32>, hints_enabled: bool) -> Self {
        let target_word = target_word.into().to_lowercase();
        let letters = target_word.chars().collect();
        Self {
            target_word,
            letters,
            guessed_correct: HashSet::new(),
            guessed_wrong: HashSet::new(),
            wrong_guess_count: 0,
            remaining_secs: clock,
            hints_enabled,
            hint_used: false,
            status: RoundStatus::InProgress,
        }
    }

    pub fn with_profile(target_word: impl Into<String>, profile: &DifficultyProfile) -> Self {
        Self::new(target_word, profile.clock(), profile.hints_enabled)
    }

    pub fn target_word(&self) -> &str {
        &self.target_word
    }

    pub fn status(&self) -> RoundStatus {
        self.status
    }

    pub fn is_won(&self) -> bool {
        self.status == RoundStatus::Won
    }

    pub fn is_lost(&self) -> bool {
        matches!(self.status, RoundStatus::Lost(_))
    }

    pub fn is_finished(&self) -> bool {
        self.status != RoundStatus::InProgress
    }

    pub fn wrong_guess_count(&self) -> u8 {
        self.wrong_guess_count
    }

    pub fn remaining_secs(&self) -> Option<u32> {
        self.remaining_secs
    }

    pub fn hint_available(&self) -> bool {
        self.hints_enabled && !self.hint_used && !self.is_finished()
    }

    pub fn guessed_correct(&self) -> &HashSet<char> {
        &self.guessed_correct
    }

    pub fn submit_guess(&mut self, letter: char) -> GuessOutcome {
        if self.is_finished() {
            return GuessOutcome::Finished;
        }
        if !letter.is_ascii_alphabetic() {
            return GuessOutcome::Invalid;
        }
        let letter = letter.to_ascii_lowercase();

        if self.guessed_correct.contains(&letter) || self.guessed_wrong.contains(&letter) {
            return GuessOutcome::Repeated;
        }

        if self.letters.contains(&letter) {
            self.reveal(letter);
            GuessOutcome::Correct
        } else {
            self.guessed_wrong.insert(letter);
            self.wrong_guess_count += 1;
            if self.wrong_guess_count >= MAX_STAGES {
                self.status = RoundStatus::Lost(LossReason::OutOfGuesses);
            }
            GuessOutcome::Incorrect
        }
    }

    /// Reveals one unguessed letter, chosen uniformly. Returns the letter,
    /// or `None` when no hint is available.
    pub fn consume_hint(&mut self, rng: &mut dyn RandomSource) -> Option<char> {
        if !self.hint_available() {
            return None;
        }

        let hidden = self.hidden_letters();
        if hidden.is_empty() {
            return None;
        }

        let letter = hidden[rng.pick_index(hidden.len())];
        self.hint_used = true;
        self.reveal(letter);
        Some(letter)
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.is_finished() {
            return TickOutcome::Finished;
        }
        match self.remaining_secs {
            None => TickOutcome::Untimed,
            Some(secs) => {
                let left = secs.saturating_sub(1);
                self.remaining_secs = Some(left);
                if left == 0 {
                    self.status = RoundStatus::Lost(LossReason::TimeExpired);
                    TickOutcome::Expired
                } else {
                    TickOutcome::Running(left)
                }
            }
        }
    }

    /// Ends the round as a loss. Returns false if it was already over.
    pub fn forfeit(&mut self, reason: LossReason) -> bool {
        if self.is_finished() {
            return false;
        }
        self.status = RoundStatus::Lost(reason);
        true
    }

    pub fn give_up(&mut self) -> bool {
        self.forfeit(LossReason::GaveUp)
    }

    /// Distinct letters not yet revealed, in alphabetical order.
    pub fn hidden_letters(&self) -> Vec<char> {
        self.letters
            .iter()
            .filter(|c| !self.guessed_correct.contains(c))
            .copied()
            .collect_vec()
    }

    /// Word with `None` in place of unrevealed letters.
    pub fn masked_word(&self) -> Vec<Option<char>> {
        self.target_word
            .chars()
            .map(|c| self.guessed_correct.contains(&c).then_some(c))
            .collect()
    }

    pub fn key_state(&self, letter: char) -> KeyState {
        let letter = letter.to_ascii_lowercase();
        if self.guessed_correct.contains(&letter) {
            KeyState::Correct
        } else if self.guessed_wrong.contains(&letter) {
            KeyState::Wrong
        } else {
            KeyState::Unused
        }
    }

    fn reveal(&mut self, letter: char) {
        self.guessed_correct.insert(letter);
        if self.guessed_correct.len() == self.letters.len() {
            self.status = RoundStatus::Won;
        }
    }
}
