//! Reconciles stored result/prediction shapes with the season's scoring mode.
//!
//! Every fallback between the podium-only and full-grid shapes happens here,
//! once, so the scoring algorithms only ever see the shape they expect.

use super::config::ScoringMode;
use super::error::ScoringError;
use super::types::{DriverId, EventResult, PredictionInput};

/// Result reduced to what one scoring mode consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedResult {
    Podium([DriverId; 3]),
    Grid(Vec<DriverId>),
}

/// Prediction reduced to what one scoring mode consumes.
///
/// Grid slots are optional so an empty podium slot keeps the positions of
/// the drivers after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedPrediction {
    Podium([Option<DriverId>; 3]),
    Grid(Vec<Option<DriverId>>),
}

pub fn normalize_result(
    result: &EventResult,
    mode: ScoringMode,
) -> Result<NormalizedResult, ScoringError> {
    let incomplete = || ScoringError::IncompleteResult(mode);

    match (mode, result) {
        (
            _,
            EventResult::LegacyTop3 {
                first: Some(first),
                second: Some(second),
                third: Some(third),
            },
        ) => {
            let podium = [first.clone(), second.clone(), third.clone()];
            Ok(match mode {
                ScoringMode::LegacyTop3 => NormalizedResult::Podium(podium),
                ScoringMode::FullGridDiff => NormalizedResult::Grid(podium.to_vec()),
            })
        }
        (_, EventResult::LegacyTop3 { .. }) => Err(incomplete()),
        (ScoringMode::LegacyTop3, EventResult::FullGrid { order }) => match order.as_slice() {
            [first, second, third, ..] => Ok(NormalizedResult::Podium([
                first.clone(),
                second.clone(),
                third.clone(),
            ])),
            _ => Err(incomplete()),
        },
        (ScoringMode::FullGridDiff, EventResult::FullGrid { order }) => {
            if order.is_empty() {
                Err(incomplete())
            } else {
                Ok(NormalizedResult::Grid(order.clone()))
            }
        }
    }
}

/// Never fails: a sparse prediction simply scores less.
pub fn normalize_prediction(prediction: &PredictionInput, mode: ScoringMode) -> NormalizedPrediction {
    match (mode, prediction) {
        (ScoringMode::LegacyTop3, PredictionInput::LegacyTop3 { first, second, third }) => {
            NormalizedPrediction::Podium([first.clone(), second.clone(), third.clone()])
        }
        (ScoringMode::LegacyTop3, PredictionInput::FullGrid { order }) => {
            let mut slots = order.iter().take(3).cloned().map(Some);
            NormalizedPrediction::Podium([
                slots.next().flatten(),
                slots.next().flatten(),
                slots.next().flatten(),
            ])
        }
        (ScoringMode::FullGridDiff, PredictionInput::FullGrid { order }) => {
            NormalizedPrediction::Grid(order.iter().cloned().map(Some).collect())
        }
        (ScoringMode::FullGridDiff, PredictionInput::LegacyTop3 { first, second, third }) => {
            NormalizedPrediction::Grid(vec![first.clone(), second.clone(), third.clone()])
        }
    }
}
