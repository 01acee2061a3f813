use std::collections::HashSet;

use super::config::{EventWeights, ScoringConfig, ScoringMode};
use super::types::{DriverId, EventResult, PredictionInput};

/// Check whether a result is complete enough to score under `mode`.
///
/// Podium scoring needs all three placements. Full-grid scoring needs a
/// non-empty order, or a complete podium for events recorded before full
/// orders were collected.
pub fn validate_event_results(result: &EventResult, mode: ScoringMode) -> bool {
    match (mode, result) {
        (_, EventResult::LegacyTop3 { first, second, third }) => {
            first.is_some() && second.is_some() && third.is_some()
        }
        (ScoringMode::LegacyTop3, EventResult::FullGrid { order }) => order.len() >= 3,
        (ScoringMode::FullGridDiff, EventResult::FullGrid { order }) => !order.is_empty(),
    }
}

/// Drivers named more than once, in order of their second appearance.
pub fn duplicate_drivers<'a, I>(drivers: I) -> Vec<&'a DriverId>
where
    I: IntoIterator<Item = &'a DriverId>,
{
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for driver in drivers {
        if !seen.insert(driver) && !duplicates.contains(&driver) {
            duplicates.push(driver);
        }
    }
    duplicates
}

/// Validate a prediction before it is stored.
/// Returns all validation errors at once (not just the first).
pub fn validate_prediction(prediction: &PredictionInput, roster: &[DriverId]) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    let drivers = prediction.drivers();

    if drivers.is_empty() {
        errors.push("prediction names no drivers".to_string());
    }

    for driver in duplicate_drivers(drivers.iter().copied()) {
        errors.push(format!("driver '{}' is predicted more than once", driver));
    }

    for driver in unknown_drivers(&drivers, roster) {
        errors.push(format!("driver '{}' is not on the season roster", driver));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a result before it is stored. Completeness is not checked here;
/// partial results may be recorded and completed later.
pub fn validate_result_entries(result: &EventResult, roster: &[DriverId]) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    let drivers = result.drivers();

    for driver in duplicate_drivers(drivers.iter().copied()) {
        errors.push(format!("driver '{}' is classified more than once", driver));
    }

    for driver in unknown_drivers(&drivers, roster) {
        errors.push(format!("driver '{}' is not on the season roster", driver));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// An empty roster accepts every driver
fn unknown_drivers<'a>(drivers: &[&'a DriverId], roster: &[DriverId]) -> Vec<&'a DriverId> {
    if roster.is_empty() {
        return Vec::new();
    }
    drivers
        .iter()
        .filter(|d| !roster.contains(**d))
        .copied()
        .collect()
}

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    validate_event_weights("scoring.weights.race", &config.weights.race, &mut errors);
    validate_event_weights("scoring.weights.sprint", &config.weights.sprint, &mut errors);

    if let Some(penalty) = config.weights.missing_driver_penalty {
        if penalty < 1 {
            errors.push("scoring.weights.missing_driver_penalty: must be at least 1".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_event_weights(path: &str, weights: &EventWeights, errors: &mut Vec<String>) {
    if weights.exact.iter().any(|p| *p < 0) {
        errors.push(format!("{}.exact: points must be non-negative", path));
    } else if weights.exact.windows(2).any(|w| w[0] < w[1]) {
        errors.push(format!(
            "{}.exact: points must not increase from P1 to P3 (got {:?})",
            path, weights.exact
        ));
    }

    if weights.near_miss < 0 {
        errors.push(format!("{}.near_miss: must be non-negative", path));
    } else if weights.exact.iter().any(|p| *p <= weights.near_miss) {
        errors.push(format!(
            "{}.near_miss: must be smaller than every exact match award",
            path
        ));
    }

    if weights.cost_multiplier < 1 {
        errors.push(format!("{}.cost_multiplier: must be at least 1", path));
    }
}
