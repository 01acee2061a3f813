use super::types::{Season, SEASON_VERSION};
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Get the default season file path (~/.config/paddock/season.json)
pub fn get_season_path() -> PathBuf {
    crate::config::get_config_dir().join("season.json")
}

/// Load a season from a JSON file
///
/// Unlike the config file, a missing season file is an error: seasons are
/// created explicitly with `paddock season new`.
pub fn load_season(path: &Path) -> Result<Season> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open season file at {}", path.display()))?;

    let season: Season = serde_json::from_reader(file)
        .with_context(|| format!("Failed to parse season file at {}", path.display()))?;

    if season.version != SEASON_VERSION {
        anyhow::bail!("Unsupported season file version: {}", season.version);
    }

    Ok(season)
}

/// Save a season to a JSON file atomically
///
/// The file is replaced in one step, so a batch of score updates is either
/// fully on disk or not at all.
pub fn save_season(path: &Path, season: &Season) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, season).context("Failed to serialize season")?;

    file.commit().context("Failed to save season")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{EventResult, PredictionInput, ScoringMode, Weights};
    use crate::season::types::tests::sample_season;
    use chrono::{Duration, Utc};
    use std::env;

    #[test]
    fn test_load_missing_file_is_error() {
        let temp_path = env::temp_dir().join("paddock_test_missing_season.json");
        let _ = fs::remove_file(&temp_path);

        let err = load_season(&temp_path).unwrap_err();
        assert!(err.to_string().contains("Failed to open season file"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_path = env::temp_dir().join("paddock_test_season_roundtrip.json");
        let _ = fs::remove_file(&temp_path);

        let mut season = sample_season(ScoringMode::FullGridDiff);
        let before_close = season.event("bahrain").unwrap().closes_at - Duration::hours(1);
        season
            .submit_prediction(
                "alice",
                "bahrain",
                PredictionInput::full_grid(["NOR", "VER", "LEC"]),
                before_close,
            )
            .unwrap();
        season
            .record_result("bahrain", EventResult::full_grid(["VER", "NOR", "LEC"]))
            .unwrap();
        season.score_event("bahrain", &Weights::default(), Utc::now()).unwrap();

        save_season(&temp_path, &season).unwrap();
        let loaded = load_season(&temp_path).unwrap();

        assert_eq!(loaded, season);
        assert_eq!(loaded.prediction("alice", "bahrain").unwrap().points, Some(2));

        let _ = fs::remove_file(&temp_path);
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let temp_path = env::temp_dir().join("paddock_test_season_version.json");
        let _ = fs::remove_file(&temp_path);

        let mut season = sample_season(ScoringMode::LegacyTop3);
        season.version = 7;
        save_season(&temp_path, &season).unwrap();

        let err = load_season(&temp_path).unwrap_err();
        assert!(err.to_string().contains("Unsupported season file version: 7"));

        let _ = fs::remove_file(&temp_path);
    }

    #[test]
    fn test_unknown_mode_in_file_rejected() {
        let temp_path = env::temp_dir().join("paddock_test_season_mode.json");
        fs::write(
            &temp_path,
            r#"{"version":1,"name":"2025","mode":"closest_guess","events":[]}"#,
        )
        .unwrap();

        assert!(load_season(&temp_path).is_err());

        let _ = fs::remove_file(&temp_path);
    }
}
