//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the hook.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::duration::Duration;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct HookConfig {
    /// HTTP listener settings. Only read at startup.
    pub server: ServerConfig,

    /// Admin API settings.
    pub admin: AdminConfig,

    /// Logging and metrics settings. Only read at startup.
    pub observability: ObservabilityConfig,

    /// Outbound robots, keyed by channel name.
    pub channels: BTreeMap<String, ChannelConfig>,

    /// Ordered routes; the first match wins.
    pub routes: Vec<RouteConfig>,

    /// Base mention applied to every delivery.
    pub mention: MentionConfig,

    /// Ordered mention rules; every match is merged in.
    pub mention_rules: Vec<MentionRuleConfig>,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8060").
    pub listen_address: String,

    /// Path Alertmanager posts to.
    pub alert_path: String,

    /// Total time allowed for one request, deliveries included. Zero
    /// disables the timeout.
    pub request_timeout: Duration,

    /// Maximum accepted request body. Zero disables the limit.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: "0.0.0.0:8060".to_string(),
            alert_path: "/alert".to_string(),
            request_timeout: Duration::from_secs(30),
            max_body_bytes: 4 * 1024 * 1024,
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AdminConfig {
    /// Mount the admin API. Only read at startup.
    pub enabled: bool,

    /// Path prefix of the admin API. Only read at startup.
    pub prefix: String,

    /// Bearer token. Re-read on every reload.
    pub token: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            prefix: "/admin".to_string(),
            token: String::new(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins if set.
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Prometheus endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// DingTalk message type.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Markdown,
    Text,
}

/// One outbound DingTalk robot.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ChannelConfig {
    /// Robot webhook URL, access token included.
    pub webhook: String,

    /// Signing secret; requests are signed when present.
    pub secret: Option<String>,

    pub msg_type: MessageType,

    /// Prepended to the message title.
    pub title_prefix: String,

    /// Delivery timeout. Zero waits indefinitely.
    pub timeout: Duration,

    /// Rendered bodies above this size are truncated. Zero disables
    /// truncation.
    pub max_body_bytes: usize,

    /// Merged after the resolved mention for deliveries to this channel.
    pub mention: MentionConfig,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            webhook: String::new(),
            secret: None,
            msg_type: MessageType::Markdown,
            title_prefix: String::new(),
            timeout: Duration::from_secs(5),
            max_body_bytes: 18_000,
            mention: MentionConfig::default(),
        }
    }
}

/// Raw match condition. Every list may be empty (match any).
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct WhenConfig {
    pub receiver: Vec<String>,
    pub status: Vec<String>,
    pub labels: BTreeMap<String, Vec<String>>,
}

/// Route configuration mapping notifications to channels.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub name: String,

    pub when: WhenConfig,

    /// Channel names to deliver to. Empty means "matched, deliver nothing".
    pub channels: Vec<String>,
}

/// Raw mention block.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct MentionConfig {
    pub at_all: bool,
    pub at_mobiles: Vec<String>,
    pub at_user_ids: Vec<String>,
}

/// Mention rule configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct MentionRuleConfig {
    pub name: String,
    pub when: WhenConfig,
    pub mention: MentionConfig,
}
