//! Admin API: status, reload, route listing and dry-run matching.

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

/// Admin routes, relative to the configured prefix.
pub fn setup_admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/status", get(get_status))
        .route("/reload", post(post_reload))
        .route("/routes", get(get_routes))
        .route("/match", post(post_match))
        .layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}
