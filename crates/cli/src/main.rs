mod cli;
mod commands;
mod terminal;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use gradevis_core::config::{load_dotenv, Config};
use gradevis_store::MemoryStore;

use crate::cli::CliArgs;
use crate::commands::Outcome;
use crate::terminal::Terminal;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let terminal = Terminal::new();
    if let Err(e) = run(&terminal) {
        let _ = terminal.print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(terminal: &Terminal) -> Result<()> {
    load_dotenv();
    let args = CliArgs::parse();

    let mut config = Config::from_env();
    if let Some(path) = &args.store {
        config.store.path = path.clone();
    }
    let path = config.store.path.clone();
    debug!(path = %path.display(), profile = config.profile_label(), "using snapshot");

    let mut store = MemoryStore::load(&path)
        .with_context(|| format!("failed to load snapshot {}", path.display()))?;

    match commands::run(args, &config, &mut store, terminal)? {
        Outcome::Modified => store
            .save(&path)
            .with_context(|| format!("failed to save snapshot {}", path.display()))?,
        Outcome::ReadOnly => {}
    }
    Ok(())
}
