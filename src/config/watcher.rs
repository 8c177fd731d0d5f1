//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::loader::{resolve_config, ConfigError};
use crate::config::schema::CoordinatorConfig;

/// The live configuration shared by every run.
pub type SharedConfig = Arc<ArcSwap<CoordinatorConfig>>;

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    shared: SharedConfig,
}

impl ConfigWatcher {
    pub fn new(path: &Path, shared: SharedConfig) -> Self {
        Self {
            path: path.to_path_buf(),
            shared,
        }
    }

    /// Reload the file and publish it if it is valid.
    pub fn reload(&self) -> Result<(), ConfigError> {
        let config = resolve_config(Some(&self.path))?;
        tracing::info!(
            circuit = %config.circuit.name,
            time_to_live = %config.circuit.time_to_live,
            max_attempts = config.retry.max_attempts,
            "Configuration reloaded"
        );
        self.shared.store(Arc::new(config));
        Ok(())
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned watcher must be kept alive for as long as reloads are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let path = self.path.clone();
        let this = self;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!("Config file change detected, reloading...");
                        if let Err(e) = this.reload() {
                            tracing::error!(error = %e, "Failed to reload config, keeping current configuration");
                        }
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Config watcher started");
        Ok(watcher)
    }
}
