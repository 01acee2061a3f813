pub mod formatter;

pub use formatter::{
    format_breakdown, format_duration, format_event_list, format_leaderboard_table,
    format_leaderboard_tsv, format_mode_hint, should_use_colors,
};
