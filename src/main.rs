#![windows_subsystem = "windows"]

use anyhow::Result;
use bdb_wallet::{config::Config, gui};

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    // GUI loads user settings on startup and rebuilds the config from them
    let config = Config::default();
    gui::launch(config)?;

    Ok(())
}
