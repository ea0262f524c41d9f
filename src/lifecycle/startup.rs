//! Startup orchestration.

use std::net::{AddrParseError, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use metrics_exporter_prometheus::BuildError;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::config::watcher::ConfigWatcher;
use crate::config::{load_config, ConfigError};
use crate::dingtalk::{DingTalkClient, DingTalkError};
use crate::http::{AppState, HttpServer};
use crate::lifecycle::{signals, Shutdown};
use crate::observability::{logging, metrics};
use crate::runtime::reload::spawn_reload_loop;
use crate::runtime::{Reloader, Runtime, RuntimeStore};

/// Options from the command line.
#[derive(Debug, Clone)]
pub struct StartupOptions {
    pub config_path: PathBuf,
    /// Overrides `server.listen_address`.
    pub listen: Option<String>,
    /// Reload when the config file changes.
    pub watch: bool,
}

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid metrics address: {0}")]
    MetricsAddress(#[from] AddrParseError),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] BuildError),

    #[error("failed to watch config file: {0}")]
    Watch(#[from] notify::Error),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] DingTalkError),
}

/// Load and compile a config file without serving it.
pub fn check(path: &Path) -> Result<Runtime, ConfigError> {
    let config = load_config(path)?;
    Runtime::compile(&config, 1)
}

/// Start the service and run until a termination signal.
pub async fn run(options: StartupOptions) -> Result<(), StartupError> {
    let mut config = load_config(&options.config_path)?;
    if let Some(listen) = &options.listen {
        config.server.listen_address = listen.clone();
    }

    logging::init(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "dingtalk-hook starting");

    let runtime = Runtime::compile(&config, 1)?;
    tracing::info!(
        path = %options.config_path.display(),
        generation = runtime.generation,
        routes = runtime.router.len(),
        mention_rules = runtime.mentions.len(),
        channels = runtime.channels.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }
    metrics::record_generation(runtime.generation);

    let store = Arc::new(RuntimeStore::new(runtime));
    let reloader = Arc::new(
        Reloader::new(&options.config_path, Arc::clone(&store))
            .with_listen_override(options.listen.clone()),
    );

    let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();
    let _watcher = if options.watch {
        Some(ConfigWatcher::new(&options.config_path, trigger_tx.clone()).run()?)
    } else {
        None
    };
    signals::forward_sighup(trigger_tx)?;
    let reload_task = spawn_reload_loop(Arc::clone(&reloader), trigger_rx);

    let listener = TcpListener::bind(&config.server.listen_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        alert_path = %config.server.alert_path,
        admin = config.admin.enabled,
        "Listening for notifications"
    );

    let state = AppState {
        store,
        reloader: Some(reloader),
        client: DingTalkClient::new()?,
    };
    let server = HttpServer::new(state);

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            signals::terminate().await;
            shutdown.trigger();
        }
    });

    server.run(listener, server_shutdown).await?;
    reload_task.abort();

    tracing::info!("Shutdown complete");
    Ok(())
}
