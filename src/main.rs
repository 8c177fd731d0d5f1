//! Distributed circuit-breaker coordinator.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌────────────────────────────────────────────────────┐
//!                     │                BREAKER COORDINATOR                  │
//!                     │                                                     │
//!   POST /execute     │  ┌────────┐    ┌──────────────┐    ┌────────────┐   │
//!   ──────────────────┼─▶│  http  │───▶│ orchestrator │───▶│   invoke   │───┼──▶ target
//!                     │  │ server │    │ state machine│    │  registry  │   │
//!                     │  └────────┘    └──────┬───────┘    └────────────┘   │
//!                     │                       │                             │
//!                     │             ┌─────────┴─────────┐                   │
//!                     │             ▼                   ▼                   │
//!                     │      ┌─────────────┐     ┌─────────────┐            │
//!                     │      │status reader│     │status writer│            │
//!                     │      └──────┬──────┘     └──────┬──────┘            │
//!                     │             └────────┬──────────┘                   │
//!                     │                      ▼                              │
//!                     │               ┌─────────────┐   ┌──────────────┐    │
//!                     │               │ status store│◀──│expiry sweeper│    │
//!                     │               └─────────────┘   └──────────────┘    │
//!                     │                                                     │
//!                     │  config (+ hot reload) · observability · lifecycle  │
//!                     └────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use clap::Parser;
use tokio::net::TcpListener;

use breaker_coordinator::clock::{Clock, SystemClock};
use breaker_coordinator::config::{resolve_config, ConfigWatcher};
use breaker_coordinator::http::{AppState, HttpServer};
use breaker_coordinator::invoke::Registry;
use breaker_coordinator::lifecycle::{wait_for_signal, Shutdown};
use breaker_coordinator::observability::{logging, metrics};
use breaker_coordinator::store::{open_store, ExpirySweeper};

#[derive(Parser)]
#[command(name = "breaker-coordinator")]
#[command(about = "Distributed circuit-breaker coordinator", long_about = None)]
struct Args {
    /// Path to a TOML configuration file; watched for changes.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = resolve_config(args.config.as_deref())?;
    logging::init_logging(&config.observability)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "breaker-coordinator starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        store = ?config.store.backend,
        table = %config.store.table_name,
        circuit = %config.circuit.name,
        time_to_live = %config.circuit.time_to_live,
        max_attempts = config.retry.max_attempts,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let store = open_store(&config.store).await?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let registry = Registry::from_config(&config.targets, reqwest::Client::new())?;
    tracing::info!(targets = ?registry.names(), "Targets registered");

    let shutdown = Shutdown::new();

    let sweeper = ExpirySweeper::new(
        store.clone(),
        clock.clone(),
        Duration::from_secs(config.store.sweep_interval_secs),
    );
    let sweeper_task = tokio::spawn(sweeper.run(shutdown.subscribe()));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shared = Arc::new(ArcSwap::from_pointee(config));

    // Dropping the watcher stops reloads, so it lives until main returns.
    let _watcher = match &args.config {
        Some(path) => match ConfigWatcher::new(path, shared.clone()).run() {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                tracing::warn!(error = %e, "Config watcher unavailable, hot reload disabled");
                None
            }
        },
        None => None,
    };

    let state = AppState {
        config: shared,
        store,
        clock,
        invoker: Arc::new(registry),
        shutdown: shutdown.clone(),
    };

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        signal_shutdown.trigger();
    });

    HttpServer::new(state).run(listener, shutdown).await?;

    if let Err(e) = sweeper_task.await {
        tracing::warn!(error = %e, "Expiry sweeper ended abnormally");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
