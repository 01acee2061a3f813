use std::io::IsTerminal;
use chrono::{DateTime, Duration, Utc};
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::scoring::engine::ScoreResult;
use crate::scoring::{LeaderboardRow, ScoringMode};
use crate::season::{EventStatus, Season};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a user name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Header line describing how the totals are read
pub fn format_mode_hint(mode: ScoringMode) -> String {
    match mode {
        ScoringMode::LegacyTop3 => "podium points (higher is better)".to_string(),
        ScoringMode::FullGridDiff => "grid displacement (lower is better)".to_string(),
    }
}

/// Format leaderboard rows as a table with columns: Rank, Points, User, Events
/// No headers
/// Rank column: 3 chars (fits "99."), right-aligned
/// Points column is right-aligned, 7 chars wide
pub fn format_leaderboard_table(rows: &[LeaderboardRow], use_colors: bool) -> String {
    if rows.is_empty() {
        return "No scored predictions yet.".to_string();
    }

    let term_width = get_terminal_width();

    let rank_width = 3;
    let points_width = 7;
    let separator = "  ";

    rows.iter()
        .map(|row| {
            let rank_str = format!("{:>2}.", row.rank);
            let points_padded = format!("{:>width$}", row.total, width = points_width);
            let events_str = format!(
                "({} event{})",
                row.scored_events,
                if row.scored_events == 1 { "" } else { "s" }
            );

            let fixed_width = rank_width + 1 + points_width + separator.len() * 2 + events_str.len();
            let user = match term_width {
                Some(width) if width > fixed_width + 10 => {
                    truncate_name(&row.user_id, width - fixed_width)
                }
                // Very narrow terminal
                Some(_) => truncate_name(&row.user_id, 20),
                None => row.user_id.clone(),
            };

            if use_colors {
                let rank_colored = match row.rank {
                    1 => rank_str.yellow().bold().to_string(),
                    _ => rank_str.dimmed().to_string(),
                };
                format!(
                    "{} {}{}{}{}{}",
                    rank_colored,
                    points_padded.bold(),
                    separator,
                    user.cyan(),
                    separator,
                    events_str.dimmed()
                )
            } else {
                format!(
                    "{} {}{}{}{}{}",
                    rank_str, points_padded, separator, user, separator, events_str
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format leaderboard rows as tab-separated values for scripting
/// Columns: rank, total, user, scored events (no headers, no colors)
pub fn format_leaderboard_tsv(rows: &[LeaderboardRow]) -> String {
    rows.iter()
        .map(|row| {
            format!(
                "{}\t{}\t{}\t{}",
                row.rank, row.total, row.user_id, row.scored_events
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format how one prediction was scored (for verbose mode)
pub fn format_breakdown(user_id: &str, result: &ScoreResult, use_colors: bool) -> String {
    let mut lines = Vec::with_capacity(result.breakdown.contributions.len() + 1);

    let capped = if result.breakdown.capped { " (capped)" } else { "" };
    let header = format!(
        "{}: {} {} points{}",
        user_id, result.points, result.breakdown.event_type, capped
    );
    lines.push(if use_colors {
        header.bold().to_string()
    } else {
        header
    });

    for contribution in &result.breakdown.contributions {
        lines.push(format!(
            "  {:<4} {:>4}  {}",
            contribution.label, contribution.points, contribution.description
        ));
    }

    lines.join("\n")
}

/// Format a duration into a compact string
/// "2h" for hours, "3d" for days, "1w" for weeks
pub fn format_duration(duration: Duration) -> String {
    let hours = duration.num_hours();
    let days = duration.num_days();
    let weeks = days / 7;

    if weeks >= 1 {
        format!("{}w", weeks)
    } else if days >= 1 {
        format!("{}d", days)
    } else if hours >= 1 {
        format!("{}h", hours)
    } else {
        let minutes = duration.num_minutes();
        if minutes >= 1 {
            format!("{}m", minutes)
        } else {
            "now".to_string()
        }
    }
}

/// One line per event: id, type, status, and time left while open
pub fn format_event_list(season: &Season, now: DateTime<Utc>, use_colors: bool) -> String {
    if season.events.is_empty() {
        return "No events in this season.".to_string();
    }

    season
        .events
        .iter()
        .map(|event| {
            let status = season
                .event_status(&event.id, now)
                .unwrap_or(EventStatus::AwaitingResult);
            let status_str = match status {
                EventStatus::Open => {
                    format!("open, closes in {}", format_duration(event.closes_at - now))
                }
                other => other.label().to_string(),
            };
            let predictions = season.predictions_for(&event.id).count();

            if use_colors {
                let status_colored = match status {
                    EventStatus::Open => status_str.green().to_string(),
                    EventStatus::Scored => status_str.dimmed().to_string(),
                    EventStatus::Incomplete => status_str.red().to_string(),
                    _ => status_str.yellow().to_string(),
                };
                format!(
                    "{:<12} {:<6}  {}  {} predictions  {}",
                    event.id.bold(),
                    event.event_type,
                    status_colored,
                    predictions,
                    event.name.dimmed()
                )
            } else {
                format!(
                    "{:<12} {:<6}  {}  {} predictions  {}",
                    event.id, event.event_type, status_str, predictions, event.name
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
