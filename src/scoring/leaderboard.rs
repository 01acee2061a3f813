use std::collections::HashMap;

use serde::Serialize;

use super::config::{ScoringMode, TieBreak};
use super::types::{ScoredPrediction, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardRow {
    /// 1-based; equal totals still get consecutive ranks.
    pub rank: usize,
    pub user_id: UserId,
    pub total: i64,
    /// Number of scored predictions that make up `total`.
    pub scored_events: usize,
}

/// Rank users by the sum of their scored predictions.
///
/// Unscored predictions are left out of the sum, and a user with no scored
/// prediction at all is left off the board rather than shown with zero.
/// Totals sort descending for podium scoring and ascending for full-grid
/// scoring.
pub fn calculate_leaderboard(
    predictions: &[ScoredPrediction],
    mode: ScoringMode,
    tie_break: TieBreak,
) -> Vec<LeaderboardRow> {
    // user -> (first appearance, total, scored count)
    let mut totals: HashMap<&str, (usize, i64, usize)> = HashMap::new();

    for (position, prediction) in predictions.iter().enumerate() {
        let entry = totals
            .entry(prediction.user_id.as_str())
            .or_insert((position, 0, 0));
        if let Some(points) = prediction.points {
            entry.1 = entry.1.saturating_add(points);
            entry.2 += 1;
        }
    }

    let mut rows: Vec<(&str, usize, i64, usize)> = totals
        .into_iter()
        .filter(|(_, (_, _, count))| *count > 0)
        .map(|(user, (first_seen, total, count))| (user, first_seen, total, count))
        .collect();

    rows.sort_by(|a, b| {
        let by_total = if mode.higher_is_better() {
            b.2.cmp(&a.2)
        } else {
            a.2.cmp(&b.2)
        };
        let by_tie_break = match tie_break {
            TieBreak::Insertion => a.1.cmp(&b.1),
            TieBreak::UserId => a.0.cmp(b.0),
        };
        by_total.then(by_tie_break)
    });

    rows.into_iter()
        .enumerate()
        .map(|(idx, (user, _, total, scored_events))| LeaderboardRow {
            rank: idx + 1,
            user_id: user.to_string(),
            total,
            scored_events,
        })
        .collect()
}

/// Leaderboard for a single event.
pub fn event_leaderboard(
    predictions: &[ScoredPrediction],
    event_id: &str,
    mode: ScoringMode,
    tie_break: TieBreak,
) -> Vec<LeaderboardRow> {
    let for_event: Vec<ScoredPrediction> = predictions
        .iter()
        .filter(|p| p.event_id == event_id)
        .cloned()
        .collect();
    calculate_leaderboard(&for_event, mode, tie_break)
}
