use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by the catalog and the session controller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("unknown category `{0}`")]
    InvalidCategory(String),
    #[error("unknown difficulty `{0}`")]
    InvalidDifficulty(String),
    #[error("invalid word catalog: {0}")]
    InvalidCatalog(String),
    #[error("the daily challenge for {0} has already been played")]
    AlreadyPlayedToday(NaiveDate),
    #[error("no round in progress")]
    NoActiveRound,
}

pub type Result<T> = std::result::Result<T, GameError>;
