use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use paddock::config::{expand_home, load_config, Config};
use paddock::scoring::{
    calculate_leaderboard, calculate_score, event_leaderboard, validate_event_results,
    validate_scoring, EventResult, EventType, PredictionInput, ScoringConfig, ScoringError,
    ScoringMode,
};
use paddock::season::{get_season_path, load_season, save_season, Event, Season, SeasonError};

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_CONFIG: i32 = 4;
const EXIT_DATA: i32 = 5;
const EXIT_SCORING_REFUSED: i32 = 6;

/// Placeholder for an unset podium slot on the command line
const EMPTY_SLOT: &str = "-";

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kind {
    Race,
    Sprint,
}

impl From<Kind> for EventType {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Race => EventType::Race,
            Kind::Sprint => EventType::Sprint,
        }
    }
}

/// Shape of a prediction or result given on the command line
#[derive(ValueEnum, Clone, Copy, Debug)]
enum Shape {
    /// Up to three drivers for P1..P3, "-" leaves a slot empty
    Podium,
    /// The full finishing order, winner first
    Grid,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Table,
    Tsv,
}

#[derive(Subcommand, Debug)]
enum SeasonCommands {
    /// Start a new season file
    New {
        name: String,
        /// Scoring mode (defaults to the configured one)
        #[arg(long)]
        mode: Option<ScoringMode>,
        /// Eligible driver, repeatable (none accepts any driver)
        #[arg(long = "driver")]
        drivers: Vec<String>,
        /// Player expected to predict every event, repeatable
        #[arg(long = "player")]
        players: Vec<String>,
        /// Overwrite an existing season file
        #[arg(long)]
        force: bool,
    },
    /// Change the season's scoring mode (refused once anything is scored)
    Mode { mode: ScoringMode },
}

#[derive(Subcommand, Debug)]
enum EventCommands {
    /// Add an event to the season
    Add {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "type", value_enum, default_value_t = Kind::Race)]
        kind: Kind,
        /// Prediction deadline (RFC 3339, e.g. 2025-03-16T04:00:00Z)
        #[arg(long)]
        closes_at: DateTime<Utc>,
    },
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a config file interactively
    Init,
    /// Manage the season file
    #[command(subcommand)]
    Season(SeasonCommands),
    /// Manage events
    #[command(subcommand)]
    Event(EventCommands),
    /// List events and their status
    Events,
    /// Submit (or replace) a prediction before the event closes
    Submit {
        #[arg(long)]
        user: String,
        #[arg(long)]
        event: String,
        /// Defaults to the season's mode
        #[arg(long, value_enum)]
        shape: Option<Shape>,
        #[arg(required = true)]
        drivers: Vec<String>,
    },
    /// Record or correct an event's result
    Result {
        event: String,
        #[arg(long, value_enum)]
        shape: Option<Shape>,
        #[arg(required = true)]
        drivers: Vec<String>,
    },
    /// Check whether an event's result can be scored
    Validate { event: String },
    /// Score every prediction of an event
    Score { event: String },
    /// Copy players' latest predictions into an event they missed
    Autofill {
        event: String,
        /// Only fill these users (defaults to every known user)
        #[arg(long = "user")]
        users: Vec<String>,
    },
    /// Show the season (or one event's) leaderboard
    Leaderboard {
        #[arg(long)]
        event: Option<String>,
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },
}

#[derive(Parser, Debug)]
#[command(name = "paddock")]
#[command(about = "Score fantasy F1 predictions and rank the players", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging and score breakdowns
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/paddock/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Path to season file (overrides season_file from config)
    #[arg(short, long, global = true)]
    season: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Everything a command needs besides its own arguments
struct Session {
    season_path: PathBuf,
    scoring: ScoringConfig,
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config_path = cli.config.map(PathBuf::from);

    if let Commands::Init = cli.command {
        if let Err(e) = paddock::config::init::run_init_wizard(config_path) {
            eprintln!("Init failed: {:#}", e);
            std::process::exit(EXIT_FAILURE);
        }
        std::process::exit(EXIT_SUCCESS);
    }

    // Load config
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate scoring config at startup
    let scoring = config.scoring.clone().unwrap_or_default();
    if let Err(errors) = validate_scoring(&scoring) {
        eprintln!("Scoring config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let ctx = Session {
        season_path: resolve_season_path(cli.season.map(PathBuf::from), &config),
        scoring,
        verbose: cli.verbose,
    };
    info!("Using season file {}", ctx.season_path.display());

    if let Err(e) = run(cli.command, &ctx) {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }

    std::process::exit(EXIT_SUCCESS);
}

fn resolve_season_path(flag: Option<PathBuf>, config: &Config) -> PathBuf {
    flag.or_else(|| config.season_file.clone())
        .map(|p| expand_home(&p))
        .unwrap_or_else(get_season_path)
}

/// Map a failed command to its exit code
fn exit_code(err: &anyhow::Error) -> i32 {
    let scoring = err.downcast_ref::<ScoringError>().or_else(|| {
        match err.downcast_ref::<SeasonError>() {
            Some(SeasonError::Scoring(e)) => Some(e),
            _ => None,
        }
    });
    match scoring {
        Some(ScoringError::IncompleteResult(_)) => EXIT_SCORING_REFUSED,
        Some(ScoringError::UnknownMode(_)) => EXIT_CONFIG,
        None => EXIT_DATA,
    }
}

fn run(command: Commands, ctx: &Session) -> Result<()> {
    let now = Utc::now();

    match command {
        // Handled before the config is loaded
        Commands::Init => Ok(()),
        Commands::Season(SeasonCommands::New {
            name,
            mode,
            drivers,
            players,
            force,
        }) => {
            if ctx.season_path.exists() && !force {
                bail!(
                    "Season file already exists at {} (use --force to replace it)",
                    ctx.season_path.display()
                );
            }
            let mut season = Season::new(name, mode.unwrap_or(ctx.scoring.mode));
            season.drivers = drivers;
            season.players = players;
            save_season(&ctx.season_path, &season)?;
            println!(
                "Created season '{}' ({}) at {}",
                season.name,
                season.mode,
                ctx.season_path.display()
            );
            Ok(())
        }
        Commands::Season(SeasonCommands::Mode { mode }) => {
            let mut season = open_season(ctx)?;
            season.set_mode(mode)?;
            save_season(&ctx.season_path, &season)?;
            println!("Season '{}' now scores with {}", season.name, mode);
            Ok(())
        }
        Commands::Event(EventCommands::Add {
            id,
            name,
            kind,
            closes_at,
        }) => {
            let mut season = open_season(ctx)?;
            season.add_event(Event {
                name: name.unwrap_or_else(|| id.clone()),
                id: id.clone(),
                event_type: kind.into(),
                closes_at,
                result: None,
            })?;
            save_season(&ctx.season_path, &season)?;
            println!("Added event '{}' closing at {}", id, closes_at);
            Ok(())
        }
        Commands::Events => {
            let season = open_season(ctx)?;
            let use_colors = paddock::output::should_use_colors();
            println!("{}", paddock::output::format_event_list(&season, now, use_colors));
            Ok(())
        }
        Commands::Submit {
            user,
            event,
            shape,
            drivers,
        } => {
            let mut season = open_season(ctx)?;
            let prediction = match shape.unwrap_or_else(|| default_shape(season.mode)) {
                Shape::Podium => {
                    let [first, second, third] = podium_slots(drivers)?;
                    PredictionInput::LegacyTop3 {
                        first,
                        second,
                        third,
                    }
                }
                Shape::Grid => PredictionInput::full_grid(drivers),
            };
            season.submit_prediction(&user, &event, prediction, now)?;
            save_season(&ctx.season_path, &season)?;
            println!("Saved {}'s prediction for '{}'", user, event);
            Ok(())
        }
        Commands::Result {
            event,
            shape,
            drivers,
        } => {
            let mut season = open_season(ctx)?;
            let result = match shape.unwrap_or_else(|| default_shape(season.mode)) {
                Shape::Podium => {
                    let [first, second, third] = podium_slots(drivers)?;
                    EventResult::LegacyTop3 {
                        first,
                        second,
                        third,
                    }
                }
                Shape::Grid => EventResult::full_grid(drivers),
            };
            let complete = validate_event_results(&result, season.mode);
            let cleared = season.record_result(&event, result)?;
            save_season(&ctx.season_path, &season)?;

            println!("Recorded result for '{}'", event);
            if cleared > 0 {
                println!("Cleared points of {} predictions; run `paddock score {}`", cleared, event);
            }
            if !complete {
                warn!("Result for '{}' cannot be scored under {} yet", event, season.mode);
            }
            Ok(())
        }
        Commands::Validate { event } => {
            let season = open_season(ctx)?;
            let result = season
                .event(&event)?
                .result
                .as_ref()
                .ok_or_else(|| SeasonError::AwaitingResult(event.clone()))?;
            if !validate_event_results(result, season.mode) {
                return Err(ScoringError::IncompleteResult(season.mode).into());
            }
            println!("Result for '{}' is complete under {}", event, season.mode);
            Ok(())
        }
        Commands::Score { event } => {
            let mut season = open_season(ctx)?;
            let summary = season.score_event(&event, &ctx.scoring.weights, now)?;
            save_season(&ctx.season_path, &season)?;

            println!(
                "Scored {} predictions for '{}' ({} rescored, {} absent)",
                summary.scored, summary.event_id, summary.rescored, summary.absent
            );
            if ctx.verbose {
                print_breakdowns(&season, &event, ctx)?;
            }
            Ok(())
        }
        Commands::Autofill { event, users } => {
            let mut season = open_season(ctx)?;
            let users = if users.is_empty() {
                season.known_users()
            } else {
                users
            };
            let filled = season.autofill_event(&event, &users, now)?;
            if filled.is_empty() {
                println!("Nothing to fill for '{}'", event);
                return Ok(());
            }
            save_season(&ctx.season_path, &season)?;
            println!("Filled '{}' for: {}", event, filled.join(", "));
            Ok(())
        }
        Commands::Leaderboard { event, format } => {
            let season = open_season(ctx)?;
            let rows = match &event {
                Some(event_id) => {
                    season.event(event_id)?;
                    event_leaderboard(
                        &season.predictions,
                        event_id,
                        season.mode,
                        ctx.scoring.tie_break,
                    )
                }
                None => calculate_leaderboard(&season.predictions, season.mode, ctx.scoring.tie_break),
            };

            match format {
                Format::Table => {
                    let use_colors = paddock::output::should_use_colors();
                    if ctx.verbose {
                        eprintln!("{}", paddock::output::format_mode_hint(season.mode));
                    }
                    println!("{}", paddock::output::format_leaderboard_table(&rows, use_colors));
                }
                Format::Tsv => {
                    let output = paddock::output::format_leaderboard_tsv(&rows);
                    if !output.is_empty() {
                        println!("{}", output);
                    }
                }
            }
            Ok(())
        }
    }
}

fn open_season(ctx: &Session) -> Result<Season> {
    let season = load_season(&ctx.season_path)?;
    if season.mode != ctx.scoring.mode {
        info!(
            "Season '{}' scores with {} (config says {})",
            season.name, season.mode, ctx.scoring.mode
        );
    }
    Ok(season)
}

fn default_shape(mode: ScoringMode) -> Shape {
    match mode {
        ScoringMode::LegacyTop3 => Shape::Podium,
        ScoringMode::FullGridDiff => Shape::Grid,
    }
}

/// Turn up to three command-line drivers into podium slots
fn podium_slots(drivers: Vec<String>) -> Result<[Option<String>; 3]> {
    if drivers.len() > 3 {
        bail!("A podium takes at most 3 drivers, got {}", drivers.len());
    }
    let mut slots: [Option<String>; 3] = Default::default();
    for (slot, driver) in slots.iter_mut().zip(drivers) {
        if driver != EMPTY_SLOT {
            *slot = Some(driver);
        }
    }
    Ok(slots)
}

/// Print how each prediction of an event was scored
fn print_breakdowns(season: &Season, event_id: &str, ctx: &Session) -> Result<()> {
    let event = season.event(event_id)?;
    let result = event
        .result
        .as_ref()
        .with_context(|| format!("Event '{}' has no result", event_id))?;
    let use_colors = paddock::output::should_use_colors();

    for prediction in season.predictions_for(event_id) {
        let scored = calculate_score(
            &prediction.prediction,
            result,
            event.event_type,
            season.mode,
            &ctx.scoring.weights,
        )?;
        println!();
        println!(
            "{}",
            paddock::output::format_breakdown(&prediction.user_id, &scored, use_colors)
        );
    }
    Ok(())
}
