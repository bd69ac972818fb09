use chrono::NaiveDate;

use super::state::{RoundOutcome, RoundSummary, TimerToken};
use crate::catalog::Difficulty;
use crate::profile::{ProfileKey, Theme};

/// Every way the outside world can change a session
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// New classic session: score back to zero
    StartClassic {
        category: String,
        difficulty: Difficulty,
    },
    /// Next classic round, keeping the running score
    ContinueClassic {
        category: String,
        difficulty: Difficulty,
    },
    StartDailyChallenge {
        today: NaiveDate,
    },
    StartTimedRush,
    SubmitGuess(char),
    ConsumeHint,
    /// One second elapsed on the countdown armed with this token
    Tick(TimerToken),
    /// Force the active round to a result. Only losses can be forced.
    EndRound(RoundOutcome),
    /// Give up and show the word; counts as a loss
    RevealWord,
    /// Leave the round without recording anything
    QuitRound,
    ToggleMute,
    SetMuted(bool),
    SetVolume(f32),
    SetTheme(Theme),
    ResetStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    Correct,
    Incorrect,
    Win,
    Lose,
    Tick,
}

/// Side effects requested by a transition, run by the caller
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Persist(Vec<ProfileKey>),
    Render,
    PlaySound(Sound),
    /// (Re)arm the one-second countdown; replaces any armed timer
    StartTimer(TimerToken),
    CancelTimer,
    /// Show the outcome screen and look up the word's definition
    RoundOver(RoundSummary),
}
