use std::collections::{HashMap, HashSet};

use super::config::{EventType, ScoringMode, Weights};
use super::error::ScoringError;
use super::normalize::{normalize_prediction, normalize_result, NormalizedPrediction, NormalizedResult};
use super::types::{DriverId, EventResult, PredictionInput};

/// Cost of a full-grid prediction that shares no driver with the result.
///
/// Also the value recorded for a user who submitted nothing, so an absent
/// prediction and a maximally wrong one rank the same.
pub const WORST_COST: i64 = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    pub label: String,       // e.g. "P1", "VER"
    pub description: String, // e.g. "exact match", "predicted 3rd, finished 5th"
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub mode: ScoringMode,
    pub event_type: EventType,
    pub contributions: Vec<Contribution>,
    /// Set when the total was replaced by [`WORST_COST`] or capped at it.
    pub capped: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    pub points: i64,
    pub breakdown: ScoreBreakdown,
}

/// Score one prediction against an event's result.
///
/// `event_type` only picks the weight table; `mode` picks the algorithm.
/// Fails when the result is not complete enough for `mode`; a sparse or
/// empty prediction is never an error.
pub fn calculate_score(
    prediction: &PredictionInput,
    result: &EventResult,
    event_type: EventType,
    mode: ScoringMode,
    weights: &Weights,
) -> Result<ScoreResult, ScoringError> {
    let actual = normalize_result(result, mode)?;
    let predicted = normalize_prediction(prediction, mode);

    let mut breakdown = ScoreBreakdown {
        mode,
        event_type,
        contributions: Vec::new(),
        capped: false,
    };

    let points = match (actual, predicted) {
        (NormalizedResult::Podium(actual), NormalizedPrediction::Podium(predicted)) => {
            score_podium(&predicted, &actual, event_type, weights, &mut breakdown)
        }
        (NormalizedResult::Grid(actual), NormalizedPrediction::Grid(predicted)) => {
            score_grid(&predicted, &actual, event_type, weights, &mut breakdown)
        }
        // normalize_* always agree on the shape for a given mode
        _ => unreachable!("normalized shapes disagree for {}", mode),
    };

    Ok(ScoreResult { points, breakdown })
}

/// Points recorded for a user who has no prediction for a scored event.
pub fn missing_prediction_points(mode: ScoringMode) -> i64 {
    match mode {
        ScoringMode::LegacyTop3 => 0,
        ScoringMode::FullGridDiff => WORST_COST,
    }
}

const SLOT_LABELS: [&str; 3] = ["P1", "P2", "P3"];

fn score_podium(
    predicted: &[Option<DriverId>; 3],
    actual: &[DriverId; 3],
    event_type: EventType,
    weights: &Weights,
    breakdown: &mut ScoreBreakdown,
) -> i64 {
    let table = weights.for_event(event_type);
    let mut total = 0;

    for (slot, pick) in predicted.iter().enumerate() {
        let (points, description) = match pick {
            None => (0, "no pick".to_string()),
            Some(driver) if *driver == actual[slot] => {
                (table.exact[slot], format!("{} exact match", driver))
            }
            Some(driver) => match actual.iter().position(|d| d == driver) {
                Some(finished) => (
                    table.near_miss,
                    format!("{} on podium in {}", driver, SLOT_LABELS[finished]),
                ),
                None => (0, format!("{} off the podium", driver)),
            },
        };

        total += points;
        breakdown.contributions.push(Contribution {
            label: SLOT_LABELS[slot].to_string(),
            description,
            points,
        });
    }

    total.max(0)
}

fn score_grid(
    predicted: &[Option<DriverId>],
    actual: &[DriverId],
    event_type: EventType,
    weights: &Weights,
    breakdown: &mut ScoreBreakdown,
) -> i64 {
    let actual_rank: HashMap<&str, usize> = actual
        .iter()
        .enumerate()
        .map(|(i, d)| (d.as_str(), i))
        .rev() // first occurrence wins on duplicates
        .collect();
    let penalty = weights
        .missing_driver_penalty
        .unwrap_or(actual.len() as i64);

    // Repeated drivers are dropped before ranks are assigned; empty slots keep theirs
    let mut seen = HashSet::new();
    let predicted: Vec<Option<&DriverId>> = predicted
        .iter()
        .map(Option::as_ref)
        .filter(|slot| slot.map_or(true, |d| seen.insert(d.as_str())))
        .collect();

    let mut overlap = 0usize;
    let mut total = 0i64;

    for (predicted_rank, driver) in predicted
        .iter()
        .enumerate()
        .filter_map(|(rank, slot)| slot.map(|d| (rank, d)))
    {
        let (cost, description) = match actual_rank.get(driver.as_str()) {
            Some(&actual_rank) => {
                overlap += 1;
                (
                    predicted_rank.abs_diff(actual_rank) as i64,
                    format!(
                        "predicted P{}, finished P{}",
                        predicted_rank + 1,
                        actual_rank + 1
                    ),
                )
            }
            None => (
                penalty,
                format!("predicted P{}, not classified", predicted_rank + 1),
            ),
        };

        total = total.saturating_add(cost);
        breakdown.contributions.push(Contribution {
            label: driver.to_string(),
            description,
            points: cost,
        });
    }

    if overlap == 0 {
        breakdown.capped = true;
        return WORST_COST;
    }

    let multiplier = weights.for_event(event_type).cost_multiplier;
    let total = total.saturating_mul(multiplier);
    if total > WORST_COST {
        breakdown.capped = true;
        WORST_COST
    } else {
        total
    }
}
