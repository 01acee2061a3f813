use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{Result, SeasonError};
use crate::scoring::validation::validate_result_entries;
use crate::scoring::{
    validate_event_results, validate_prediction, DriverId, EventId, EventResult, EventType,
    PredictionInput, ScoredPrediction, ScoringMode, UserId,
};

pub const SEASON_VERSION: u32 = 1;

/// Where an event is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    /// Still accepting predictions.
    Open,
    /// Closed, no result recorded.
    AwaitingResult,
    /// A result is recorded but cannot be scored under the season's mode.
    Incomplete,
    /// Scorable, with at least one prediction lacking points.
    Unscored,
    /// Every prediction has points.
    Scored,
}

impl EventStatus {
    pub fn label(self) -> &'static str {
        match self {
            EventStatus::Open => "open",
            EventStatus::AwaitingResult => "awaiting results",
            EventStatus::Incomplete => "results incomplete",
            EventStatus::Unscored => "ready to score",
            EventStatus::Scored => "scored",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub event_type: EventType,
    /// Prediction deadline.
    pub closes_at: DateTime<Utc>,
    #[serde(default)]
    pub result: Option<EventResult>,
}

impl Event {
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        now < self.closes_at
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Season {
    pub version: u32,
    pub name: String,
    pub mode: ScoringMode,
    /// Eligible drivers. Empty means any driver identifier is accepted.
    #[serde(default)]
    pub drivers: Vec<DriverId>,
    /// Users expected to predict every event. Anyone missing from a scored
    /// event is charged as if they had predicted nothing.
    #[serde(default)]
    pub players: Vec<UserId>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub predictions: Vec<ScoredPrediction>,
}

impl Season {
    pub fn new(name: impl Into<String>, mode: ScoringMode) -> Self {
        Self {
            version: SEASON_VERSION,
            name: name.into(),
            mode,
            drivers: Vec::new(),
            players: Vec::new(),
            events: Vec::new(),
            predictions: Vec::new(),
        }
    }

    pub fn event(&self, event_id: &str) -> Result<&Event> {
        self.events
            .iter()
            .find(|e| e.id == event_id)
            .ok_or_else(|| SeasonError::UnknownEvent(event_id.to_string()))
    }

    fn event_mut(&mut self, event_id: &str) -> Result<&mut Event> {
        self.events
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or_else(|| SeasonError::UnknownEvent(event_id.to_string()))
    }

    pub fn event_status(&self, event_id: &str, now: DateTime<Utc>) -> Result<EventStatus> {
        let event = self.event(event_id)?;
        let status = match &event.result {
            // A result may be entered early, but the event stays open until closing time
            _ if event.is_open(now) => EventStatus::Open,
            None => EventStatus::AwaitingResult,
            Some(result) if !validate_event_results(result, self.mode) => EventStatus::Incomplete,
            Some(_) if self.predictions_for(event_id).all(|p| p.is_scored()) => EventStatus::Scored,
            Some(_) => EventStatus::Unscored,
        };
        Ok(status)
    }

    pub fn add_event(&mut self, event: Event) -> Result<()> {
        if self.events.iter().any(|e| e.id == event.id) {
            return Err(SeasonError::DuplicateEvent(event.id));
        }
        self.events.push(event);
        Ok(())
    }

    /// Change the scoring mode. Refused once any prediction carries points,
    /// since the two modes rank totals in opposite directions.
    pub fn set_mode(&mut self, mode: ScoringMode) -> Result<()> {
        if mode != self.mode && self.predictions.iter().any(|p| p.is_scored()) {
            return Err(SeasonError::ModeLocked(self.mode));
        }
        self.mode = mode;
        Ok(())
    }

    pub fn prediction(&self, user_id: &str, event_id: &str) -> Option<&ScoredPrediction> {
        self.predictions
            .iter()
            .find(|p| p.user_id == user_id && p.event_id == event_id)
    }

    pub fn predictions_for(&self, event_id: &str) -> impl Iterator<Item = &ScoredPrediction> {
        let event_id = event_id.to_string();
        self.predictions.iter().filter(move |p| p.event_id == event_id)
    }

    /// Store a user's prediction, replacing any earlier one for the event.
    ///
    /// Predictions are immutable once the event closes.
    pub fn submit_prediction(
        &mut self,
        user_id: &str,
        event_id: &str,
        prediction: PredictionInput,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let event = self.event(event_id)?;
        if !event.is_open(now) {
            return Err(SeasonError::EventClosed {
                event: event.id.clone(),
                closes_at: event.closes_at,
            });
        }

        validate_prediction(&prediction, &self.drivers).map_err(SeasonError::InvalidPrediction)?;

        self.upsert_prediction(ScoredPrediction::new(user_id, event_id, prediction, now));
        Ok(())
    }

    /// Record (or correct) an event's result. Any points already written for
    /// the event are cleared so they are recomputed from the new result.
    ///
    /// Returns the number of predictions whose points were cleared.
    pub fn record_result(&mut self, event_id: &str, result: EventResult) -> Result<usize> {
        validate_result_entries(&result, &self.drivers).map_err(SeasonError::InvalidResult)?;

        self.event_mut(event_id)?.result = Some(result);

        let mut cleared = 0;
        for prediction in self.predictions.iter_mut().filter(|p| p.event_id == event_id) {
            if prediction.points.take().is_some() {
                cleared += 1;
            }
        }
        Ok(cleared)
    }

    /// Every user known to the season: listed players first, then anyone else
    /// who has predicted, in order of first appearance.
    pub fn known_users(&self) -> Vec<UserId> {
        let mut users = self.players.clone();
        for prediction in &self.predictions {
            if !users.contains(&prediction.user_id) {
                users.push(prediction.user_id.clone());
            }
        }
        users
    }

    pub(crate) fn upsert_prediction(&mut self, prediction: ScoredPrediction) {
        let existing = self
            .predictions
            .iter()
            .position(|p| p.user_id == prediction.user_id && p.event_id == prediction.event_id);
        match existing {
            Some(idx) => self.predictions[idx] = prediction,
            None => self.predictions.push(prediction),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Duration;

    pub(crate) fn sample_season(mode: ScoringMode) -> Season {
        let mut season = Season::new("2025", mode);
        season.drivers = ["VER", "NOR", "LEC", "PIA", "HAM"]
            .iter()
            .map(|d| d.to_string())
            .collect();
        let now = Utc::now();
        season
            .add_event(Event {
                id: "bahrain".to_string(),
                name: "Bahrain Grand Prix".to_string(),
                event_type: EventType::Race,
                closes_at: now - Duration::days(7),
                result: None,
            })
            .unwrap();
        season
            .add_event(Event {
                id: "jeddah".to_string(),
                name: "Saudi Arabian Grand Prix".to_string(),
                event_type: EventType::Race,
                closes_at: now + Duration::days(7),
                result: None,
            })
            .unwrap();
        season
    }

    #[test]
    fn test_new_season_empty() {
        let season = Season::new("2025", ScoringMode::FullGridDiff);
        assert_eq!(season.version, SEASON_VERSION);
        assert!(season.events.is_empty());
        assert!(season.predictions.is_empty());
    }

    #[test]
    fn test_duplicate_event_rejected() {
        let mut season = sample_season(ScoringMode::LegacyTop3);
        let dup = season.events[0].clone();
        assert!(matches!(
            season.add_event(dup),
            Err(SeasonError::DuplicateEvent(ref id)) if id == "bahrain"
        ));
    }

    #[test]
    fn test_submit_before_closing() {
        let mut season = sample_season(ScoringMode::LegacyTop3);
        season
            .submit_prediction("alice", "jeddah", PredictionInput::podium("VER", "NOR", "LEC"), Utc::now())
            .unwrap();
        assert!(season.prediction("alice", "jeddah").is_some());
    }

    #[test]
    fn test_submit_after_closing_rejected() {
        let mut season = sample_season(ScoringMode::LegacyTop3);
        let err = season
            .submit_prediction("alice", "bahrain", PredictionInput::podium("VER", "NOR", "LEC"), Utc::now())
            .unwrap_err();
        assert!(matches!(err, SeasonError::EventClosed { .. }));
        assert!(season.predictions.is_empty());
    }

    #[test]
    fn test_submit_unknown_event() {
        let mut season = sample_season(ScoringMode::LegacyTop3);
        let err = season
            .submit_prediction("alice", "monaco", PredictionInput::podium("VER", "NOR", "LEC"), Utc::now())
            .unwrap_err();
        assert!(matches!(err, SeasonError::UnknownEvent(_)));
    }

    #[test]
    fn test_submit_invalid_prediction() {
        let mut season = sample_season(ScoringMode::LegacyTop3);
        let err = season
            .submit_prediction("alice", "jeddah", PredictionInput::podium("VER", "VER", "ALO"), Utc::now())
            .unwrap_err();
        match err {
            SeasonError::InvalidPrediction(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_resubmission_replaces() {
        let mut season = sample_season(ScoringMode::LegacyTop3);
        let now = Utc::now();
        season
            .submit_prediction("alice", "jeddah", PredictionInput::podium("VER", "NOR", "LEC"), now)
            .unwrap();
        season
            .submit_prediction("alice", "jeddah", PredictionInput::podium("LEC", "NOR", "VER"), now)
            .unwrap();
        assert_eq!(season.predictions.len(), 1);
        assert_eq!(
            season.predictions[0].prediction,
            PredictionInput::podium("LEC", "NOR", "VER")
        );
    }

    #[test]
    fn test_record_result_clears_points() {
        let mut season = sample_season(ScoringMode::LegacyTop3);
        let mut prediction = ScoredPrediction::new(
            "alice",
            "bahrain",
            PredictionInput::podium("VER", "NOR", "LEC"),
            Utc::now(),
        );
        prediction.points = Some(58);
        season.predictions.push(prediction);

        let cleared = season
            .record_result("bahrain", EventResult::podium("NOR", "VER", "LEC"))
            .unwrap();
        assert_eq!(cleared, 1);
        assert!(season.predictions[0].points.is_none());
        assert!(season.event("bahrain").unwrap().result.is_some());
    }

    #[test]
    fn test_record_invalid_result() {
        let mut season = sample_season(ScoringMode::FullGridDiff);
        let err = season
            .record_result("bahrain", EventResult::full_grid(["VER", "VER"]))
            .unwrap_err();
        assert!(matches!(err, SeasonError::InvalidResult(_)));
        assert!(season.event("bahrain").unwrap().result.is_none());
    }

    #[test]
    fn test_mode_locked_after_scoring() {
        let mut season = sample_season(ScoringMode::LegacyTop3);
        season.set_mode(ScoringMode::FullGridDiff).unwrap();
        assert_eq!(season.mode, ScoringMode::FullGridDiff);

        let mut prediction = ScoredPrediction::new(
            "alice",
            "bahrain",
            PredictionInput::podium("VER", "NOR", "LEC"),
            Utc::now(),
        );
        prediction.points = Some(3);
        season.predictions.push(prediction);

        assert!(matches!(
            season.set_mode(ScoringMode::LegacyTop3),
            Err(SeasonError::ModeLocked(ScoringMode::FullGridDiff))
        ));
        // Re-asserting the current mode is fine
        assert!(season.set_mode(ScoringMode::FullGridDiff).is_ok());
    }

    #[test]
    fn test_event_status_lifecycle() {
        let mut season = sample_season(ScoringMode::LegacyTop3);
        let now = Utc::now();
        assert_eq!(season.event_status("jeddah", now).unwrap(), EventStatus::Open);
        assert_eq!(season.event_status("bahrain", now).unwrap(), EventStatus::AwaitingResult);

        let before_close = season.event("bahrain").unwrap().closes_at - Duration::hours(1);
        season
            .submit_prediction("alice", "bahrain", PredictionInput::podium("VER", "NOR", "LEC"), before_close)
            .unwrap();

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
        assert_eq!(season.event_status("bahrain", now).unwrap(), EventStatus::Incomplete);

        season
            .record_result("bahrain", EventResult::podium("VER", "NOR", "LEC"))
            .unwrap();
        assert_eq!(season.event_status("bahrain", now).unwrap(), EventStatus::Unscored);

        season.predictions[0].points = Some(58);
        assert_eq!(season.event_status("bahrain", now).unwrap(), EventStatus::Scored);
    }

    #[test]
    fn test_known_users() {
        let mut season = sample_season(ScoringMode::LegacyTop3);
        season.players = vec!["carol".to_string()];
        let now = Utc::now();
        season
            .submit_prediction("bob", "jeddah", PredictionInput::podium("VER", "NOR", "LEC"), now)
            .unwrap();
        season
            .submit_prediction("carol", "jeddah", PredictionInput::podium("VER", "NOR", "LEC"), now)
            .unwrap();
        assert_eq!(season.known_users(), vec!["carol", "bob"]);
    }
}
