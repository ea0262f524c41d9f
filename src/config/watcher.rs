//! Configuration file watcher for hot reload.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::runtime::reload::ReloadTrigger;

/// A watcher that monitors the configuration file for changes.
///
/// It only signals; loading, validation and the swap happen in the reload
/// task, so a burst of editor events collapses into one reload there.
pub struct ConfigWatcher {
    path: PathBuf,
    trigger_tx: mpsc::UnboundedSender<ReloadTrigger>,
}

impl ConfigWatcher {
    pub fn new(path: &Path, trigger_tx: mpsc::UnboundedSender<ReloadTrigger>) -> Self {
        Self {
            path: path.to_path_buf(),
            trigger_tx,
        }
    }

    /// Start watching in notify's background thread.
    ///
    /// The parent directory is watched rather than the file itself so that
    /// editors which replace the file on save keep triggering reloads.
    /// The returned watcher must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name: Option<OsString> = self.path.file_name().map(|n| n.to_os_string());
        let tx = self.trigger_tx;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create()) {
                        return;
                    }
                    let ours = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if ours {
                        tracing::debug!(kind = ?event.kind, "Config file change detected");
                        let _ = tx.send(ReloadTrigger::FileChanged);
                    }
                }
                Err(e) => tracing::error!(error = %e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = %self.path.display(), "Config watcher started");
        Ok(watcher)
    }
}
