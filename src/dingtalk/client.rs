//! HTTP client for robot webhooks.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Deserialize;
use thiserror::Error;

use crate::dingtalk::channel::Channel;
use crate::dingtalk::message::{build_payload, Message};

/// Errors that can occur while delivering to a robot.
#[derive(Debug, Error)]
pub enum DingTalkError {
    /// Connection failure, timeout or unreadable response.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-2xx status.
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// The robot API rejected the message.
    #[error("robot API error {code}: {message}")]
    Api { code: i64, message: String },
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    errcode: i64,
    #[serde(default)]
    errmsg: String,
}

/// Shared robot client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct DingTalkClient {
    http: reqwest::Client,
}

impl DingTalkClient {
    pub fn new() -> Result<Self, DingTalkError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("dingtalk-hook/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }

    /// Deliver one message. Single attempt, bounded by the channel timeout
    /// unless it is zero.
    pub async fn send(&self, channel: &Channel, message: &Message) -> Result<(), DingTalkError> {
        let payload = build_payload(message);
        let url = channel.request_url(now_millis());

        let mut request = self.http.post(url).json(&payload);
        if !channel.timeout.is_zero() {
            request = request.timeout(channel.timeout);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DingTalkError::Status(status.as_u16()));
        }

        let body: ApiResponse = response.json().await?;
        if body.errcode != 0 {
            return Err(DingTalkError::Api {
                code: body.errcode,
                message: body.errmsg,
            });
        }
        Ok(())
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
