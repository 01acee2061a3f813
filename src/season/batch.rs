use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::error::{Result, SeasonError};
use super::types::Season;
use crate::scoring::{
    calculate_score, validate_event_results, PredictionInput, ScoredPrediction, ScoringError,
    Weights,
};

/// Outcome of scoring one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreSummary {
    pub event_id: String,
    /// Predictions that received points.
    pub scored: usize,
    /// Of those, how many already had points that were overwritten.
    pub rescored: usize,
    /// Known users charged for having no prediction.
    pub absent: usize,
}

impl Season {
    /// Score every prediction of one event.
    ///
    /// Points are computed for the whole event first and only written if all
    /// of them succeed, so the season never holds a half-scored event.
    /// Refused while the event still takes predictions. Rescoring overwrites
    /// earlier points. Every known user with no prediction gets an empty
    /// one, which scores the same as predicting nothing at all.
    pub fn score_event(
        &mut self,
        event_id: &str,
        weights: &Weights,
        now: DateTime<Utc>,
    ) -> Result<ScoreSummary> {
        let event = self.event(event_id)?;
        if event.is_open(now) {
            return Err(SeasonError::EventOpen {
                event: event.id.clone(),
                closes_at: event.closes_at,
            });
        }
        let result = event
            .result
            .as_ref()
            .ok_or_else(|| SeasonError::AwaitingResult(event_id.to_string()))?;

        if !validate_event_results(result, self.mode) {
            return Err(ScoringError::IncompleteResult(self.mode).into());
        }

        let absent: Vec<ScoredPrediction> = self
            .known_users()
            .into_iter()
            .filter(|user| self.prediction(user, event_id).is_none())
            .map(|user| {
                ScoredPrediction::new(
                    user,
                    event_id,
                    PredictionInput::FullGrid { order: Vec::new() },
                    now,
                )
            })
            .collect();

        let mut staged = Vec::new();
        for (idx, prediction) in self.predictions.iter().enumerate() {
            if prediction.event_id != event_id {
                continue;
            }
            let scored = calculate_score(
                &prediction.prediction,
                result,
                event.event_type,
                self.mode,
                weights,
            )?;
            debug!(
                event = event_id,
                user = %prediction.user_id,
                points = scored.points,
                "scored prediction"
            );
            staged.push((idx, scored.points));
        }

        let mut absent_points = Vec::with_capacity(absent.len());
        for placeholder in &absent {
            let scored = calculate_score(
                &placeholder.prediction,
                result,
                event.event_type,
                self.mode,
                weights,
            )?;
            absent_points.push(scored.points);
        }

        // Nothing below can fail
        let mut summary = ScoreSummary {
            event_id: event_id.to_string(),
            scored: 0,
            rescored: 0,
            absent: absent.len(),
        };

        for (idx, points) in staged {
            if self.predictions[idx].points.replace(points).is_some() {
                summary.rescored += 1;
            }
            summary.scored += 1;
        }

        for (mut placeholder, points) in absent.into_iter().zip(absent_points) {
            placeholder.points = Some(points);
            self.predictions.push(placeholder);
            summary.scored += 1;
        }

        info!(
            event = event_id,
            scored = summary.scored,
            rescored = summary.rescored,
            absent = summary.absent,
            "event scored"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{
        calculate_leaderboard, EventResult, EventType, ScoringMode, TieBreak, WORST_COST,
    };
    use crate::season::types::tests::sample_season;
    use crate::season::Event;
    use chrono::Duration;

    fn season_with_predictions(mode: ScoringMode) -> Season {
        let mut season = sample_season(mode);
        let before_close = season.event("bahrain").unwrap().closes_at - Duration::hours(1);
        season
            .submit_prediction("alice", "bahrain", PredictionInput::podium("VER", "NOR", "LEC"), before_close)
            .unwrap();
        season
            .submit_prediction(
                "bob",
                "bahrain",
                PredictionInput::full_grid(["LEC", "NOR", "VER", "PIA"]),
                before_close,
            )
            .unwrap();
        season
    }

    #[test]
    fn test_score_event_requires_result() {
        let mut season = season_with_predictions(ScoringMode::LegacyTop3);
        let err = season
            .score_event("bahrain", &Weights::default(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, SeasonError::AwaitingResult(_)));
    }

    #[test]
    fn test_incomplete_result_leaves_points_untouched() {
        let mut season = season_with_predictions(ScoringMode::LegacyTop3);
        season
            .record_result(
                "bahrain",
                EventResult::LegacyTop3 {
                    first: Some("VER".to_string()),
                    second: None,
                    third: None,
                },
            )
            .unwrap();

        let err = season
            .score_event("bahrain", &Weights::default(), Utc::now())
            .unwrap_err();
        assert!(matches!(
            err,
            SeasonError::Scoring(ScoringError::IncompleteResult(ScoringMode::LegacyTop3))
        ));
        assert!(season.predictions.iter().all(|p| p.points.is_none()));
    }

    #[test]
    fn test_score_event_legacy() {
        let mut season = season_with_predictions(ScoringMode::LegacyTop3);
        season
            .record_result("bahrain", EventResult::podium("VER", "NOR", "LEC"))
            .unwrap();

        let summary = season
            .score_event("bahrain", &Weights::default(), Utc::now())
            .unwrap();
        assert_eq!(summary.scored, 2);
        assert_eq!(summary.rescored, 0);

        assert_eq!(season.prediction("alice", "bahrain").unwrap().points, Some(58));
        // LEC/VER swapped (near misses), NOR exact
        assert_eq!(season.prediction("bob", "bahrain").unwrap().points, Some(5 + 18 + 5));
    }

    #[test]
    fn test_rescoring_overwrites() {
        let mut season = season_with_predictions(ScoringMode::FullGridDiff);
        season
            .record_result("bahrain", EventResult::full_grid(["VER", "NOR", "LEC", "PIA"]))
            .unwrap();

        season.score_event("bahrain", &Weights::default(), Utc::now()).unwrap();
        let first: Vec<Option<i64>> = season.predictions.iter().map(|p| p.points).collect();

        let summary = season
            .score_event("bahrain", &Weights::default(), Utc::now())
            .unwrap();
        let second: Vec<Option<i64>> = season.predictions.iter().map(|p| p.points).collect();

        assert_eq!(first, second);
        assert_eq!(summary.rescored, 2);
        assert_eq!(season.prediction("alice", "bahrain").unwrap().points, Some(0));
        assert_eq!(season.prediction("bob", "bahrain").unwrap().points, Some(4));
    }

    #[test]
    fn test_corrected_result_recomputes_from_scratch() {
        let mut season = season_with_predictions(ScoringMode::LegacyTop3);
        season
            .record_result("bahrain", EventResult::podium("HAM", "PIA", "LEC"))
            .unwrap();
        season.score_event("bahrain", &Weights::default(), Utc::now()).unwrap();
        assert_eq!(season.prediction("alice", "bahrain").unwrap().points, Some(15));

        season
            .record_result("bahrain", EventResult::podium("VER", "NOR", "LEC"))
            .unwrap();
        season.score_event("bahrain", &Weights::default(), Utc::now()).unwrap();
        assert_eq!(season.prediction("alice", "bahrain").unwrap().points, Some(58));
    }

    #[test]
    fn test_absent_players_charged_worst_cost() {
        let mut season = season_with_predictions(ScoringMode::FullGridDiff);
        season.players = vec!["alice".to_string(), "bob".to_string(), "carol".to_string()];
        season
            .record_result("bahrain", EventResult::full_grid(["VER", "NOR", "LEC", "PIA"]))
            .unwrap();

        let summary = season
            .score_event("bahrain", &Weights::default(), Utc::now())
            .unwrap();
        assert_eq!(summary.absent, 1);
        assert_eq!(summary.scored, 3);
        assert_eq!(season.prediction("carol", "bahrain").unwrap().points, Some(WORST_COST));

        // Rescoring reuses the placeholder instead of adding another
        let summary = season
            .score_event("bahrain", &Weights::default(), Utc::now())
            .unwrap();
        assert_eq!(summary.absent, 0);
        assert_eq!(season.predictions_for("bahrain").count(), 3);

        let rows = calculate_leaderboard(&season.predictions, season.mode, TieBreak::Insertion);
        assert_eq!(rows.last().unwrap().user_id, "carol");
    }

    #[test]
    fn test_open_event_refused() {
        let mut season = sample_season(ScoringMode::LegacyTop3);
        let now = Utc::now();
        season
            .submit_prediction("alice", "jeddah", PredictionInput::podium("VER", "NOR", "LEC"), now)
            .unwrap();
        season
            .record_result("jeddah", EventResult::podium("VER", "NOR", "LEC"))
            .unwrap();

        let err = season
            .score_event("jeddah", &Weights::default(), now)
            .unwrap_err();
        assert!(matches!(err, SeasonError::EventOpen { ref event, .. } if event == "jeddah"));
        assert!(season.predictions.iter().all(|p| p.points.is_none()));
    }

    #[test]
    fn test_skipping_an_event_costs_more_than_predicting() {
        let mut season = sample_season(ScoringMode::FullGridDiff);
        season
            .add_event(Event {
                id: "melbourne".to_string(),
                name: "Australian Grand Prix".to_string(),
                event_type: EventType::Race,
                closes_at: Utc::now() - Duration::days(3),
                result: None,
            })
            .unwrap();

        let bahrain_open = season.event("bahrain").unwrap().closes_at - Duration::hours(1);
        let melbourne_open = season.event("melbourne").unwrap().closes_at - Duration::hours(1);
        for user in ["alice", "bob"] {
            season
                .submit_prediction(user, "bahrain", PredictionInput::full_grid(["VER", "NOR", "LEC"]), bahrain_open)
                .unwrap();
        }
        // Only bob predicts melbourne, and not quite right
        season
            .submit_prediction("bob", "melbourne", PredictionInput::full_grid(["NOR", "VER", "LEC"]), melbourne_open)
            .unwrap();

        for event in ["bahrain", "melbourne"] {
            season
                .record_result(event, EventResult::full_grid(["VER", "NOR", "LEC"]))
                .unwrap();
            season.score_event(event, &Weights::default(), Utc::now()).unwrap();
        }

        assert_eq!(season.prediction("alice", "melbourne").unwrap().points, Some(WORST_COST));

        let rows = calculate_leaderboard(&season.predictions, season.mode, TieBreak::Insertion);
        let totals: Vec<(&str, i64, usize)> = rows
            .iter()
            .map(|r| (r.user_id.as_str(), r.total, r.scored_events))
            .collect();
        assert_eq!(totals, vec![("bob", 2, 2), ("alice", WORST_COST, 2)]);
    }
}
