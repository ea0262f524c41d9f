//! Inbound alert notifications.
//!
//! # Data Flow
//! ```text
//! Alertmanager POST body (JSON, webhook v4)
//!     → webhook.rs (deserialize into WebhookMessage)
//!     → routing (receiver / status / labels are matched)
//!     → dingtalk::render (alerts become the message body)
//! ```
//!
//! # Design Decisions
//! - Every field is optional on the wire; missing fields deserialize to defaults
//! - Label maps are ordered so rendered messages are stable

pub mod webhook;

pub use webhook::{Alert, WebhookMessage};
