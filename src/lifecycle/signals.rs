//! OS signal handling.
//!
//! # Responsibilities
//! - Resolve when SIGINT (Ctrl+C) or SIGTERM arrives
//! - Forward SIGHUP to the reload loop
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGHUP triggers config reload, not shutdown

use tokio::sync::mpsc;

use crate::runtime::ReloadTrigger;

/// Wait for a termination signal.
pub async fn terminate() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let term = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let term = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = term => {},
    }
    tracing::info!("Shutdown signal received");
}

/// Send a reload trigger for every SIGHUP.
#[cfg(unix)]
pub fn forward_sighup(tx: mpsc::UnboundedSender<ReloadTrigger>) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup())?;
    tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            tracing::info!("SIGHUP received");
            if tx.send(ReloadTrigger::Signal).is_err() {
                break;
            }
        }
    });
    Ok(())
}

#[cfg(not(unix))]
pub fn forward_sighup(_tx: mpsc::UnboundedSender<ReloadTrigger>) -> std::io::Result<()> {
    Ok(())
}
