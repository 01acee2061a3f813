use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::scoring::{ScoringError, ScoringMode};

#[derive(Debug, Error)]
pub enum SeasonError {
    #[error("unknown event '{0}'")]
    UnknownEvent(String),

    #[error("event '{0}' already exists")]
    DuplicateEvent(String),

    #[error("predictions for '{event}' closed at {closes_at}")]
    EventClosed {
        event: String,
        closes_at: DateTime<Utc>,
    },

    #[error("predictions for '{event}' stay open until {closes_at}")]
    EventOpen {
        event: String,
        closes_at: DateTime<Utc>,
    },

    #[error("event '{0}' already has a result")]
    ResultRecorded(String),

    #[error("invalid prediction: {}", .0.join("; "))]
    InvalidPrediction(Vec<String>),

    #[error("invalid result: {}", .0.join("; "))]
    InvalidResult(Vec<String>),

    #[error("event '{0}' has no result yet")]
    AwaitingResult(String),

    #[error("scoring mode is locked at {0} once predictions have been scored")]
    ModeLocked(ScoringMode),

    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

pub type Result<T> = std::result::Result<T, SeasonError>;
