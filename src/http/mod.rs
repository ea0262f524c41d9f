//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace, timeout, body limit)
//!     → alert.rs (parse notification, load snapshot once, resolve, deliver)
//!     → JSON response with per-channel results
//! ```

pub mod alert;
pub mod server;

pub use alert::{AlertResponse, DeliveryResult};
pub use server::{AppState, HttpServer};
