pub mod config;
pub mod engine;
pub mod error;
pub mod leaderboard;
pub mod normalize;
pub mod types;
pub mod validation;

pub use config::*;
pub use engine::{calculate_score, missing_prediction_points, ScoreResult, WORST_COST};
pub use error::ScoringError;
pub use leaderboard::{calculate_leaderboard, event_leaderboard, LeaderboardRow};
pub use types::{DriverId, EventId, EventResult, PredictionInput, ScoredPrediction, UserId};
pub use validation::{validate_event_results, validate_prediction, validate_scoring};
