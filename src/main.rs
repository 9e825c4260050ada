//! Binary entry point: resolve the data directory, start file logging, open
//! the library and drive the admin screen until the parent quits.
use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use toddler_music::{run_app, App, Config, MusicBox};

fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_logging(&config)?;

    let music_box = MusicBox::open(&config.db_path()).context("failed to open song library")?;
    let mut app = App::new(music_box, config.backup_dir())?;
    let result = run_app(&mut app);

    app.into_music_box()
        .close()
        .context("failed to close song library")?;
    info!("admin session finished");
    result
}

/// Log to a file in the data directory; the terminal belongs to the UI.
fn init_logging(config: &Config) -> anyhow::Result<()> {
    fs::create_dir_all(config.data_dir()).context("failed to create data directory")?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_path())
        .context("failed to open log file")?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .init();
    Ok(())
}
