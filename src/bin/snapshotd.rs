//! Snapshot daemon
//!
//! Runs the scheduled snapshot service against Yahoo Finance for the
//! symbols given as arguments:
//!
//! ```text
//! snapshotd SPY QQQ
//! ```
//!
//! Configuration comes from the environment (RISK_FREE_RATE,
//! DIVIDEND_YIELD, MIN_STRIKE_PCT, MAX_STRIKE_PCT,
//! SNAPSHOT_INTERVAL_MINUTES, MIN_DAYS_TO_EXPIRATION). The daemon runs
//! until ENTER is pressed.

use std::io::Read;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use vol_snapshot::prelude::*;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let symbols: Vec<String> = std::env::args().skip(1).collect();
    if symbols.is_empty() {
        eprintln!("usage: snapshotd SYMBOL [SYMBOL ...]");
        return ExitCode::FAILURE;
    }

    match run(&symbols) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "snapshot daemon failed to start");
            ExitCode::FAILURE
        }
    }
}

fn run(symbols: &[String]) -> VolResult<()> {
    let config = ServiceConfig::from_env();
    info!(?config, "starting volatility snapshot daemon");

    let store = Arc::new(MemoryStore::new());
    for symbol in symbols {
        store.add_instrument(symbol)?;
    }

    let feed = Arc::new(YahooFeed::new()?);
    let runner = Arc::new(SnapshotRunner::new(
        feed,
        Arc::clone(&store) as Arc<dyn SnapshotStore>,
        config.clone(),
    ));

    let mut scheduler = SnapshotScheduler::start(runner, config.snapshot_interval)?;
    info!(symbols = symbols.len(), "scheduler running; press ENTER to stop");

    // Block until the operator presses ENTER
    let _ = std::io::stdin().read(&mut [0u8])?;

    scheduler.stop()?;

    for symbol in symbols {
        if let Some((earliest, latest)) = store.time_range(symbol)? {
            info!(symbol = %symbol, %earliest, %latest, "snapshots collected");
        }
    }

    Ok(())
}
