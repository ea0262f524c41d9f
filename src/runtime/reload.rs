//! Configuration reload.
//!
//! # Responsibilities
//! - Load, validate and compile the config file into a new snapshot
//! - Install it with one store, or keep the current one on failure
//! - Serialize reloads coming from the watcher, signals and the admin API
//! - Remember the outcome of the last attempt for the admin API
//!
//! # Design Decisions
//! - Listener and observability settings are bound at startup; a reload that
//!   changes them is applied for everything else and logged as needing restart
//! - Bursts of triggers are coalesced into one reload

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::{load_config, ConfigError};
use crate::observability::metrics;
use crate::runtime::snapshot::Runtime;
use crate::runtime::store::RuntimeStore;

/// Quiet period used to coalesce bursts of triggers.
const DEBOUNCE: Duration = Duration::from_millis(250);

/// Why a reload was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadTrigger {
    FileChanged,
    Signal,
}

/// Outcome counters of reload attempts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReloadStatus {
    pub succeeded: u64,
    pub failed: u64,
    /// Unix seconds of the last successful reload.
    pub last_success_at: Option<u64>,
    /// Error of the last attempt, cleared by a success.
    pub last_error: Option<String>,
}

/// The single writer of a [`RuntimeStore`].
#[derive(Debug)]
pub struct Reloader {
    path: PathBuf,
    /// Command-line `--listen`, re-applied to every loaded file.
    listen_override: Option<String>,
    store: Arc<RuntimeStore>,
    status: Mutex<ReloadStatus>,
}

impl Reloader {
    pub fn new(path: &Path, store: Arc<RuntimeStore>) -> Self {
        Self {
            path: path.to_path_buf(),
            listen_override: None,
            store,
            status: Mutex::new(ReloadStatus::default()),
        }
    }

    pub fn with_listen_override(mut self, listen: Option<String>) -> Self {
        self.listen_override = listen;
        self
    }

    /// Re-read the config file and install it. Returns the new generation.
    ///
    /// Blocking; call from a blocking context.
    pub fn reload(&self) -> Result<u64, ConfigError> {
        // Held for the whole attempt so generations are handed out in order.
        let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.store.load();

        let next = load_config(&self.path).and_then(|mut config| {
            if let Some(listen) = &self.listen_override {
                config.server.listen_address = listen.clone();
            }
            Runtime::compile(&config, current.generation + 1)
        });

        match next {
            Ok(next) => {
                if next.server != current.server {
                    tracing::warn!("Server settings changed; they take effect after a restart");
                }
                let generation = next.generation;
                tracing::info!(
                    generation,
                    routes = next.router.len(),
                    mention_rules = next.mentions.len(),
                    channels = next.channels.len(),
                    "Configuration reloaded"
                );
                self.store.store(next);

                status.succeeded += 1;
                status.last_success_at = Some(unix_now());
                status.last_error = None;
                metrics::record_reload(true, generation);
                Ok(generation)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    generation = current.generation,
                    "Failed to reload config. Keeping current configuration."
                );
                status.failed += 1;
                status.last_error = Some(e.to_string());
                metrics::record_reload(false, current.generation);
                Err(e)
            }
        }
    }

    pub fn status(&self) -> ReloadStatus {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn store(&self) -> &Arc<RuntimeStore> {
        &self.store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Run reloads for incoming triggers until every sender is gone.
pub fn spawn_reload_loop(
    reloader: Arc<Reloader>,
    mut triggers: mpsc::UnboundedReceiver<ReloadTrigger>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(trigger) = triggers.recv().await {
            tokio::time::sleep(DEBOUNCE).await;
            while triggers.try_recv().is_ok() {}

            tracing::info!(?trigger, path = %reloader.path().display(), "Reloading configuration");
            let reloader = Arc::clone(&reloader);
            if let Err(e) = tokio::task::spawn_blocking(move || reloader.reload()).await {
                tracing::error!(error = %e, "Reload task panicked");
            }
        }
    })
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
