//! Alertmanager to DingTalk notification router.
//!
//! Receives Alertmanager webhook notifications, picks the first matching
//! route, merges mention rules and relays a rendered message to every
//! DingTalk robot on that route. Configuration is compiled into an
//! immutable snapshot that is swapped atomically on reload.

// Core
pub mod alert;
pub mod config;
pub mod dingtalk;
pub mod routing;
pub mod runtime;

// Serving
pub mod admin;
pub mod http;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::HookConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use runtime::{Runtime, RuntimeStore};
