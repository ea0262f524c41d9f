//! Compiled outbound channels.

use std::time::Duration;

use url::Url;

use crate::config::{ChannelConfig, MessageType};
use crate::dingtalk::sign::signed_url;
use crate::routing::MentionSpec;

/// A DingTalk robot ready to receive deliveries.
#[derive(Debug, Clone)]
pub struct Channel {
    pub name: String,
    pub webhook: Url,
    pub secret: Option<String>,
    pub msg_type: MessageType,
    pub title_prefix: String,
    pub timeout: Duration,
    pub max_body_bytes: usize,
    /// Merged after the resolved mention for this channel only.
    pub mention: MentionSpec,
}

impl Channel {
    pub fn compile(name: &str, config: &ChannelConfig) -> Result<Self, url::ParseError> {
        let secret = config
            .secret
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self {
            name: name.to_string(),
            webhook: Url::parse(config.webhook.trim())?,
            secret,
            msg_type: config.msg_type,
            title_prefix: config.title_prefix.trim().to_string(),
            timeout: config.timeout.get(),
            max_body_bytes: config.max_body_bytes,
            mention: MentionSpec::from(&config.mention),
        })
    }

    /// URL for one delivery; signed when the channel has a secret.
    pub fn request_url(&self, timestamp_millis: i64) -> Url {
        match &self.secret {
            Some(secret) => signed_url(&self.webhook, secret, timestamp_millis),
            None => self.webhook.clone(),
        }
    }
}
