//! DingTalk robot delivery.
//!
//! # Data Flow
//! ```text
//! WebhookMessage + resolved MentionSpec + Channel
//!     → render.rs (title and body text)
//!     → message.rs (robot payload JSON with the `at` block)
//!     → sign.rs (timestamp + HMAC signature query parameters)
//!     → client.rs (one POST per channel, errcode checked)
//! ```
//!
//! # Design Decisions
//! - One attempt per delivery; retrying is left to Alertmanager
//! - Per-channel timeout
//! - Mention identifiers are de-duplicated here, not in the routing layer

pub mod channel;
pub mod client;
pub mod message;
pub mod render;
pub mod sign;

pub use channel::Channel;
pub use client::{DingTalkClient, DingTalkError};
pub use message::{build_payload, At, Message};
