use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{get_config_path, Config};
use crate::scoring::{
    validate_scoring, EventWeights, ScoringConfig, ScoringMode, TieBreak, Weights,
};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Parse "25, 18, 15" into exact-match points for P1..P3.
pub(crate) fn parse_exact_points(s: &str) -> Result<[i64; 3], String> {
    let values: Vec<i64> = s
        .split(',')
        .map(|v| v.trim().parse::<i64>().map_err(|e| format!("'{}': {}", v.trim(), e)))
        .collect::<Result<_, _>>()?;
    <[i64; 3]>::try_from(values).map_err(|v| format!("expected 3 values, got {}", v.len()))
}

fn format_exact_points(points: &[i64; 3]) -> String {
    points
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn prompt_event_weights(label: &str, defaults: &EventWeights) -> Result<EventWeights> {
    let exact = loop {
        let input = prompt_with_default(
            &format!("{} exact-match points for P1, P2, P3", label),
            &format_exact_points(&defaults.exact),
        )?;
        match parse_exact_points(&input) {
            Ok(points) => break points,
            Err(e) => println!("  Invalid: {}. Try again.", e),
        }
    };

    let near_miss = loop {
        let input = prompt_with_default(
            &format!("{} points for a podium driver in the wrong slot", label),
            &defaults.near_miss.to_string(),
        )?;
        match input.parse::<i64>() {
            Ok(v) if v >= 0 => break v,
            _ => println!("  Invalid: must be a non-negative whole number. Try again."),
        }
    };

    Ok(EventWeights {
        exact,
        near_miss,
        cost_multiplier: defaults.cost_multiplier,
    })
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    println!("Paddock Configuration Wizard");
    println!("============================");
    println!();

    // 1. Scoring mode
    println!("Scoring modes:");
    println!("  legacy_top3     -- points for each podium slot guessed (higher wins)");
    println!("  full_grid_diff  -- cost for every place a driver is misplaced (lower wins)");
    let mode = loop {
        let input = prompt_with_default("Scoring mode", ScoringMode::LegacyTop3.as_str())?;
        match input.parse::<ScoringMode>() {
            Ok(mode) => break mode,
            Err(e) => println!("  Invalid: {}. Try again.", e),
        }
    };

    // 2. Weights
    println!();
    let defaults = Weights::default();
    let weights = if mode == ScoringMode::LegacyTop3
        && prompt_yes_no("Customise podium points? (n accepts defaults)", false)?
    {
        loop {
            let weights = Weights {
                race: prompt_event_weights("Race", &defaults.race)?,
                sprint: prompt_event_weights("Sprint", &defaults.sprint)?,
                missing_driver_penalty: None,
            };
            let candidate = ScoringConfig {
                mode,
                tie_break: TieBreak::Insertion,
                weights,
            };
            match validate_scoring(&candidate) {
                Ok(()) => break candidate.weights,
                Err(errors) => {
                    for error in errors {
                        println!("  Invalid: {}", error);
                    }
                    println!("  Let's try that again.");
                }
            }
        }
    } else {
        defaults
    };

    // 3. Tie-break
    println!();
    let tie_break = if prompt_yes_no("Break leaderboard ties by user id? (n keeps entry order)", false)? {
        TieBreak::UserId
    } else {
        TieBreak::Insertion
    };

    // 4. Config path
    let default_config_path = default_path.unwrap_or_else(get_config_path);
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    // Check if file already exists
    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    // 5. Write config
    let config = Config {
        season_file: None,
        scoring: Some(ScoringConfig {
            mode,
            tie_break,
            weights,
        }),
    };

    let yaml = serde_saphyr::to_string(&config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    // Create parent directories
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    std::fs::write(&config_path, &yaml)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Run `paddock season new <name>` to start a season.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exact_points() {
        assert_eq!(parse_exact_points("25, 18, 15"), Ok([25, 18, 15]));
        assert_eq!(parse_exact_points("8,7,6"), Ok([8, 7, 6]));
    }

    #[test]
    fn test_parse_exact_points_wrong_count() {
        let err = parse_exact_points("25, 18").unwrap_err();
        assert!(err.contains("expected 3 values, got 2"));
    }

    #[test]
    fn test_parse_exact_points_not_a_number() {
        let err = parse_exact_points("25, x, 15").unwrap_err();
        assert!(err.contains("'x'"));
    }

    #[test]
    fn test_format_exact_points() {
        assert_eq!(format_exact_points(&[25, 18, 15]), "25, 18, 15");
    }
}
