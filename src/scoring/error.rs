use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScoringError {
    #[error("event results are incomplete for {0} scoring")]
    IncompleteResult(super::ScoringMode),

    #[error("unknown scoring mode '{0}' (expected legacy_top3 or full_grid_diff)")]
    UnknownMode(String),
}
