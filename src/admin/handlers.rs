use std::sync::Arc;
use std::time::UNIX_EPOCH;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::alert::WebhookMessage;
use crate::http::server::AppState;
use crate::routing::MentionSpec;
use crate::runtime::ReloadStatus;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub generation: u64,
    pub loaded_at: u64,
    pub routes: usize,
    pub mention_rules: usize,
    pub channels: usize,
    pub reload: Option<ReloadStatus>,
}

#[derive(Serialize)]
pub struct RouteView {
    pub name: String,
    pub channels: Vec<String>,
    pub catch_all: bool,
}

#[derive(Serialize)]
pub struct RoutesView {
    pub generation: u64,
    pub routes: Vec<RouteView>,
    pub mention_rules: Vec<String>,
    pub channels: Vec<String>,
}

#[derive(Serialize)]
pub struct MatchView {
    pub generation: u64,
    pub route: Option<String>,
    pub channels: Vec<String>,
    pub mention_rules: Vec<String>,
    pub mention: MentionSpec,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let runtime = state.store.load();
    let loaded_at = runtime
        .loaded_at
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        generation: runtime.generation,
        loaded_at,
        routes: runtime.router.len(),
        mention_rules: runtime.mentions.len(),
        channels: runtime.channels.len(),
        reload: state.reloader.as_ref().map(|r| r.status()),
    })
}

/// Reload from disk now. A failure keeps the current configuration.
pub async fn post_reload(State(state): State<AppState>) -> Response {
    let Some(reloader) = state.reloader.as_ref().map(Arc::clone) else {
        return (
            StatusCode::NOT_IMPLEMENTED,
            Json(json!({"status": "error", "error": "reload is not configured"})),
        )
            .into_response();
    };

    match tokio::task::spawn_blocking(move || reloader.reload()).await {
        Ok(Ok(generation)) => Json(json!({"status": "reloaded", "generation": generation}))
            .into_response(),
        Ok(Err(e)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "status": "error",
                "error": e.to_string(),
                "generation": state.store.generation(),
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Reload task panicked");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn get_routes(State(state): State<AppState>) -> Json<RoutesView> {
    let runtime = state.store.load();
    Json(RoutesView {
        generation: runtime.generation,
        routes: runtime
            .router
            .routes()
            .iter()
            .map(|r| RouteView {
                name: r.name.clone(),
                channels: r.channels.clone(),
                catch_all: r.when.is_catch_all(),
            })
            .collect(),
        mention_rules: runtime.mentions.rules().iter().map(|r| r.name.clone()).collect(),
        channels: runtime.channels.keys().cloned().collect(),
    })
}

/// Dry run: resolve a notification without delivering it.
pub async fn post_match(State(state): State<AppState>, body: Bytes) -> Response {
    let msg = match WebhookMessage::from_slice(&body) {
        Ok(msg) => msg,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"status": "error", "error": format!("invalid webhook payload: {e}")})),
            )
                .into_response();
        }
    };

    let runtime = state.store.load();
    let resolution = runtime.resolve(&msg);
    Json(MatchView {
        generation: runtime.generation,
        route: resolution.route.map(|r| r.name.clone()),
        channels: resolution.channels().to_vec(),
        mention_rules: resolution.mention_rules.iter().map(|n| n.to_string()).collect(),
        mention: resolution.mention.clone(),
    })
    .into_response()
}
