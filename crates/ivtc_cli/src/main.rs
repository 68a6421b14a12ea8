//! ivtc - batch driver for inverse-telecine projects.

mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use ivtc_core::config::ConfigManager;
use ivtc_core::logging;

use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigManager::new(&cli.config);
    config
        .load_or_create()
        .with_context(|| format!("Failed to load settings from {}", cli.config.display()))?;
    let settings = config.settings().clone();

    // Keeps the file writer flushing until exit.
    let _log_guard = if settings.logging.log_to_file {
        Some(
            logging::init_tracing_with_file(settings.logging.level, &config.logs_folder())
                .context("Failed to set up the log file")?,
        )
    } else {
        logging::init_tracing(settings.logging.level);
        None
    };
    debug!("ivtc {} using {}", ivtc_core::version(), cli.config.display());

    match &cli.command {
        Command::Info { project } => commands::info(project),
        Command::Guess(args) => commands::guess(&settings, args),
        Command::Script { project, output } => {
            commands::script(&settings, project, output.as_deref())
        }
        Command::Timecodes { project, output } => commands::timecodes(project, output.as_deref()),
    }
}
