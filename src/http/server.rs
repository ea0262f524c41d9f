//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the alert, health and admin handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Bind server to listener and stop on the shutdown signal

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin;
use crate::config::{AdminConfig, ServerConfig};
use crate::dingtalk::DingTalkClient;
use crate::http::alert::receive_alert;
use crate::runtime::{Reloader, RuntimeStore};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RuntimeStore>,
    /// Absent when the configuration did not come from a file.
    pub reloader: Option<Arc<Reloader>>,
    pub client: DingTalkClient,
}

/// HTTP server for incoming notifications.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Build the server from the listener and admin settings of the
    /// snapshot currently in the store.
    pub fn new(state: AppState) -> Self {
        let runtime = state.store.load();
        let router = Self::build_router(&runtime.server, &runtime.admin, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(server: &ServerConfig, admin: &AdminConfig, state: AppState) -> Router {
        let mut app = Router::new()
            .route(&server.alert_path, post(receive_alert))
            .route("/healthz", get(healthz));

        if admin.enabled {
            let prefix = admin.prefix.trim_end_matches('/');
            app = app.nest(prefix, admin::setup_admin_router(state.clone()));
        }

        let mut app = app.with_state(state).layer(DefaultBodyLimit::disable());
        if server.max_body_bytes > 0 {
            app = app.layer(RequestBodyLimitLayer::new(server.max_body_bytes));
        }
        if !server.request_timeout.is_zero() {
            app = app.layer(TimeoutLayer::new(server.request_timeout.get()));
        }

        app.layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The router, for serving it some other way (e.g. tests).
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Serve until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn healthz(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "generation": state.store.generation(),
    }))
}
