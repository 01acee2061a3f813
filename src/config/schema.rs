use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::scoring::ScoringConfig;

#[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Season store location (defaults to ~/.config/paddock/season.json).
    /// A leading `~/` is expanded to the home directory.
    #[serde(default)]
    pub season_file: Option<PathBuf>,

    #[serde(default)]
    pub scoring: Option<ScoringConfig>,
}
