use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ScoringError;

/// How a season turns predictions into points.
///
/// The two modes have opposite polarity: `LegacyTop3` awards points (higher is
/// better) while `FullGridDiff` charges a displacement cost (lower is better).
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum ScoringMode {
    #[serde(rename = "legacy_top3", alias = "LEGACY_TOP3")]
    LegacyTop3,
    #[serde(rename = "full_grid_diff", alias = "FULL_GRID_DIFF")]
    FullGridDiff,
}

impl ScoringMode {
    /// Whether a higher total ranks first on the leaderboard.
    pub fn higher_is_better(self) -> bool {
        matches!(self, ScoringMode::LegacyTop3)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScoringMode::LegacyTop3 => "legacy_top3",
            ScoringMode::FullGridDiff => "full_grid_diff",
        }
    }
}

impl fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ScoringMode {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "legacy_top3" => Ok(ScoringMode::LegacyTop3),
            "full_grid_diff" => Ok(ScoringMode::FullGridDiff),
            _ => Err(ScoringError::UnknownMode(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    #[serde(alias = "RACE")]
    Race,
    #[serde(alias = "SPRINT")]
    Sprint,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Race => f.pad("race"),
            EventType::Sprint => f.pad("sprint"),
        }
    }
}

/// Ordering among users whose leaderboard totals are equal.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Keep the order in which each user first appears, scored or not.
    #[default]
    Insertion,
    /// Ascending user identifier.
    UserId,
}

/// Point weights for one event type.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EventWeights {
    /// Points for an exact match in first, second and third place.
    pub exact: [i64; 3],

    /// Points for a predicted podium driver who finished on the podium in a
    /// different slot.
    pub near_miss: i64,

    /// Factor applied to the full-grid displacement cost (default: 1).
    #[serde(default = "default_cost_multiplier")]
    pub cost_multiplier: i64,
}

fn default_cost_multiplier() -> i64 {
    1
}

impl EventWeights {
    pub fn race() -> Self {
        Self {
            exact: [25, 18, 15],
            near_miss: 5,
            cost_multiplier: 1,
        }
    }

    pub fn sprint() -> Self {
        Self {
            exact: [8, 7, 6],
            near_miss: 2,
            cost_multiplier: 1,
        }
    }

    /// Highest score a single legacy prediction can earn.
    pub fn max_podium_points(&self) -> i64 {
        self.exact.iter().sum()
    }
}

/// Weight tables keyed by event type, plus the knobs shared by both modes.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Weights {
    #[serde(default = "EventWeights::race")]
    pub race: EventWeights,

    #[serde(default = "EventWeights::sprint")]
    pub sprint: EventWeights,

    /// Cost of a predicted driver missing from the actual classification.
    /// Defaults to the length of the actual order.
    #[serde(default)]
    pub missing_driver_penalty: Option<i64>,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            race: EventWeights::race(),
            sprint: EventWeights::sprint(),
            missing_driver_penalty: None,
        }
    }
}

impl Weights {
    pub fn for_event(&self, event_type: EventType) -> &EventWeights {
        match event_type {
            EventType::Race => &self.race,
            EventType::Sprint => &self.sprint,
        }
    }
}

/// Scoring section of the config file.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   mode: full_grid_diff
///   tie_break: insertion
///   weights:
///     race: { exact: [25, 18, 15], near_miss: 5 }
///     sprint: { exact: [8, 7, 6], near_miss: 2 }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Scoring mode for new seasons. Existing seasons keep their own.
    pub mode: ScoringMode,

    #[serde(default)]
    pub tie_break: TieBreak,

    #[serde(default)]
    pub weights: Weights,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            mode: ScoringMode::LegacyTop3,
            tie_break: TieBreak::Insertion,
            weights: Weights::default(),
        }
    }
}
