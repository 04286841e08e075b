//! Runs the periodic visibility task on an interval.
//!
//! Each tick loads the gradebook snapshot, runs the parent-hiding sweep and
//! every due schedule rule, then writes the snapshot back.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use gradevis_core::config::{load_dotenv, Config};
use gradevis_core::SystemClock;
use gradevis_rules::{TickReport, VisibilityTask};
use gradevis_store::{MemoryStore, TracingCache};

// ── CLI ─────────────────────────────────────────────────────────────

/// Periodic worker applying scheduled gradebook visibility rules.
#[derive(Parser, Debug)]
#[command(name = "visibility-worker", version, about)]
struct Cli {
    /// Gradebook snapshot file (overrides STORE_PATH).
    #[arg(long)]
    store: Option<PathBuf>,

    /// Seconds between ticks (overrides WORKER_INTERVAL_SECS).
    #[arg(long)]
    interval: Option<u64>,

    /// Run a single tick and exit.
    #[arg(long)]
    once: bool,
}

// ── Tick ────────────────────────────────────────────────────────────

fn run_tick(task: &VisibilityTask, path: &Path) -> anyhow::Result<TickReport> {
    let mut store = MemoryStore::load(path)
        .with_context(|| format!("loading snapshot {}", path.display()))?;
    let report = task.tick(&mut store)?;
    store
        .save(path)
        .with_context(|| format!("saving snapshot {}", path.display()))?;
    Ok(report)
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    load_dotenv();
    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(path) = cli.store {
        config.store.path = path;
    }
    if let Some(secs) = cli.interval {
        config.worker.interval_secs = secs.max(1);
    }
    config.log_summary();

    let task = Arc::new(
        VisibilityTask::new(Arc::new(SystemClock), Arc::new(TracingCache))
            .with_lookback(config.worker.lookback()),
    );
    let path = Arc::new(config.store.path.clone());

    let mut ticker = tokio::time::interval(Duration::from_secs(config.worker.interval_secs));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    info!("visibility-worker starting");
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let task = task.clone();
                let path = path.clone();
                let outcome = tokio::task::spawn_blocking(move || run_tick(&task, &path)).await;
                match outcome {
                    Ok(Ok(report)) => info!(
                        executed = report.run.executed.len(),
                        failed = report.run.failed.len(),
                        synced = report.run.categories_synced,
                        swept = report.sweep.as_ref().map_or(0, |s| s.scanned),
                        "tick complete"
                    ),
                    Ok(Err(e)) => error!(error = %format!("{e:#}"), "tick failed"),
                    Err(e) => error!(error = %e, "tick panicked"),
                }
                if cli.once {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested");
                break;
            }
        }
    }
    info!("visibility-worker exited cleanly");
    Ok(())
}
