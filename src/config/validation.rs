//! Configuration validation.
//!
//! # Responsibilities
//! - Check referential integrity (routes reference declared channels)
//! - Check that addresses and webhook URLs parse
//! - Check admin wiring (prefix shape, token present)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: &HookConfig → Result<(), Vec<ValidationError>>
//! - Blank or duplicate entries inside `when` and mention blocks are not
//!   errors; rule compilation normalizes them away

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::HookConfig;

/// A single structural problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("server.alert_path must start with '/', got {0:?}")]
    InvalidAlertPath(String),

    #[error("admin.prefix must start with '/' and not be '/', got {0:?}")]
    InvalidAdminPrefix(String),

    #[error("admin.prefix {0:?} collides with server.alert_path")]
    AdminPrefixCollision(String),

    #[error("admin.token must be set when the admin API is enabled")]
    MissingAdminToken,

    #[error("channel names must not be blank")]
    BlankChannelName,

    #[error("channel {channel:?}: webhook is empty")]
    EmptyWebhook { channel: String },

    #[error("channel {channel:?}: invalid webhook URL: {reason}")]
    InvalidWebhook { channel: String, reason: String },

    #[error("route {route:?} references unknown channel {channel:?}")]
    UnknownChannel { route: String, channel: String },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &HookConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.listen_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "server.listen_address",
            value: config.server.listen_address.clone(),
        });
    }

    if !config.server.alert_path.starts_with('/') {
        errors.push(ValidationError::InvalidAlertPath(
            config.server.alert_path.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.admin.enabled {
        let prefix = config.admin.prefix.as_str();
        if !prefix.starts_with('/') || prefix.trim_end_matches('/').is_empty() {
            errors.push(ValidationError::InvalidAdminPrefix(prefix.to_string()));
        } else if path_within(&config.server.alert_path, prefix) {
            errors.push(ValidationError::AdminPrefixCollision(prefix.to_string()));
        }
        if config.admin.token.trim().is_empty() {
            errors.push(ValidationError::MissingAdminToken);
        }
    }

    for (name, channel) in &config.channels {
        if name.trim().is_empty() {
            errors.push(ValidationError::BlankChannelName);
            continue;
        }
        let webhook = channel.webhook.trim();
        if webhook.is_empty() {
            errors.push(ValidationError::EmptyWebhook {
                channel: name.clone(),
            });
            continue;
        }
        match Url::parse(webhook) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(ValidationError::InvalidWebhook {
                channel: name.clone(),
                reason: format!("unsupported scheme {:?}", url.scheme()),
            }),
            Err(e) => errors.push(ValidationError::InvalidWebhook {
                channel: name.clone(),
                reason: e.to_string(),
            }),
        }
    }

    for route in &config.routes {
        for channel in &route.channels {
            if !config.channels.contains_key(channel) {
                errors.push(ValidationError::UnknownChannel {
                    route: route.name.clone(),
                    channel: channel.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// True if `path` equals `prefix` or lies below it.
fn path_within(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}
