mod autofill;
pub mod batch;
pub mod error;
pub mod storage;
pub mod types;

pub use batch::ScoreSummary;
pub use error::SeasonError;
pub use storage::{get_season_path, load_season, save_season};
pub use types::{Event, EventStatus, Season, SEASON_VERSION};
