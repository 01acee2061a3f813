use serde::{Deserialize, Serialize};

pub type DriverId = String;
pub type UserId = String;
pub type EventId = String;

/// Actual classification of an event.
///
/// Events scored before full-grid predictions existed only carry the podium,
/// so either shape may turn up regardless of the season's mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventResult {
    LegacyTop3 {
        #[serde(default)]
        first: Option<DriverId>,
        #[serde(default)]
        second: Option<DriverId>,
        #[serde(default)]
        third: Option<DriverId>,
    },
    FullGrid { order: Vec<DriverId> },
}

impl EventResult {
    pub fn podium(first: &str, second: &str, third: &str) -> Self {
        EventResult::LegacyTop3 {
            first: Some(first.to_string()),
            second: Some(second.to_string()),
            third: Some(third.to_string()),
        }
    }

    pub fn full_grid<I, S>(order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<DriverId>,
    {
        EventResult::FullGrid {
            order: order.into_iter().map(Into::into).collect(),
        }
    }

    /// Every driver named in the result, in classification order.
    pub fn drivers(&self) -> Vec<&DriverId> {
        match self {
            EventResult::LegacyTop3 { first, second, third } => {
                [first, second, third].into_iter().flatten().collect()
            }
            EventResult::FullGrid { order } => order.iter().collect(),
        }
    }
}

/// One user's forecast for one event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PredictionInput {
    LegacyTop3 {
        #[serde(default)]
        first: Option<DriverId>,
        #[serde(default)]
        second: Option<DriverId>,
        #[serde(default)]
        third: Option<DriverId>,
    },
    FullGrid { order: Vec<DriverId> },
}

impl PredictionInput {
    pub fn podium(first: &str, second: &str, third: &str) -> Self {
        PredictionInput::LegacyTop3 {
            first: Some(first.to_string()),
            second: Some(second.to_string()),
            third: Some(third.to_string()),
        }
    }

    pub fn full_grid<I, S>(order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<DriverId>,
    {
        PredictionInput::FullGrid {
            order: order.into_iter().map(Into::into).collect(),
        }
    }

    pub fn drivers(&self) -> Vec<&DriverId> {
        match self {
            PredictionInput::LegacyTop3 { first, second, third } => {
                [first, second, third].into_iter().flatten().collect()
            }
            PredictionInput::FullGrid { order } => order.iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.drivers().is_empty()
    }
}

/// A prediction together with its owner, its event and (once scored) its points.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredPrediction {
    pub user_id: UserId,
    pub event_id: EventId,
    pub prediction: PredictionInput,
    #[serde(default)]
    pub points: Option<i64>,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    /// Copied forward from an earlier event rather than submitted by the user.
    #[serde(default)]
    pub autofilled: bool,
}

impl ScoredPrediction {
    pub fn new(
        user_id: impl Into<UserId>,
        event_id: impl Into<EventId>,
        prediction: PredictionInput,
        submitted_at: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            event_id: event_id.into(),
            prediction,
            points: None,
            submitted_at,
            autofilled: false,
        }
    }

    pub fn is_scored(&self) -> bool {
        self.points.is_some()
    }
}
