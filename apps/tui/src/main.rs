//! MeetingPrep TUI — interactive meeting form and brief viewer.
//!
//! Collects the meeting details, runs the briefing pipeline, and renders
//! the executive brief, built with `ratatui` + `crossterm`.

mod app;
mod screens;
mod widgets;

use std::sync::Mutex;

use color_eyre::eyre::Result;

fn main() -> Result<()> {
    color_eyre::install()?;
    let _ = dotenvy::dotenv();
    init_file_logging();
    app::run()
}

/// Log to `~/.meetingprep/tui.log`; stdout belongs to the terminal UI.
fn init_file_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let Ok(dir) = meetingprep_shared::config_dir() else {
        return;
    };
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("tui.log"))
    else {
        return;
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("meetingprep=info"));

    fmt()
        .with_env_filter(env_filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
}
