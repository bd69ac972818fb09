use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::Difficulty;
use crate::round::{LossReason, Round};

/// Length of a timed-rush session
pub const RUSH_DURATION_SECS: u32 = 180;

/// Rush seconds at or below which the ticking sound plays
pub const RUSH_WARNING_SECS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum GameMode {
    #[default]
    Classic,
    DailyChallenge,
    TimedRush,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    Won,
    Lost(LossReason),
}

impl RoundOutcome {
    pub fn is_win(&self) -> bool {
        matches!(self, RoundOutcome::Won)
    }
}

/// Ties a countdown to the round or session it was armed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(pub u64);

/// What the outcome screen needs once a classic/daily round or a rush
/// session is over.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSummary {
    pub mode: GameMode,
    pub word: String,
    pub outcome: RoundOutcome,
    /// Set when a rush session ended on its master clock
    pub rush_expired: bool,
    pub score: u32,
    pub high_score: u32,
    pub new_high_score: bool,
    pub daily_streak: u32,
}

impl RoundSummary {
    pub fn headline(&self) -> &'static str {
        if self.rush_expired {
            return "Time's up! ⏰";
        }
        match self.outcome {
            RoundOutcome::Won => "Congratulations! You won! 😃",
            RoundOutcome::Lost(LossReason::TimeExpired) => "Time's up! ⏰",
            RoundOutcome::Lost(LossReason::GaveUp) => "You gave up! The word was...",
            RoundOutcome::Lost(LossReason::OutOfGuesses) => "You lost. 😕",
        }
    }
}

/// Everything that lives for one app run. Owned by `GameSession`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub mode: GameMode,
    pub active_round: Option<Round>,
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub current_score: u32,
    pub timed_rush_streak: u32,
    pub rush_remaining_secs: Option<u32>,
    /// Date the running daily round counts for
    pub daily_date: Option<NaiveDate>,
    pub timer_generation: u64,
    /// High score was beaten since the session started
    pub new_high_score: bool,
    pub last_summary: Option<RoundSummary>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn round(&self) -> Option<&Round> {
        self.active_round.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.active_round.as_ref().is_some_and(|r| !r.is_finished())
    }

    pub fn timer_token(&self) -> TimerToken {
        TimerToken(self.timer_generation)
    }

    /// Invalidates every token handed out so far.
    pub(crate) fn next_timer(&mut self) -> TimerToken {
        self.timer_generation += 1;
        self.timer_token()
    }
}
