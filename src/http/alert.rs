//! Notification handler.

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};

use crate::alert::WebhookMessage;
use crate::dingtalk::render::render_message;
use crate::dingtalk::DingTalkClient;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::routing::MentionSpec;
use crate::runtime::Runtime;

/// Body returned to Alertmanager.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AlertResponse {
    /// `ok`, `no_route`, `partial_failure` or `error`.
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(default)]
    pub generation: u64,
    #[serde(default)]
    pub deliveries: Vec<DeliveryResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of one channel delivery.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct DeliveryResult {
    pub channel: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Route one notification and deliver it to every channel of the matched
/// route concurrently.
///
/// The snapshot is loaded exactly once; a reload finishing mid-request does
/// not affect it. Any failed delivery answers 502 so Alertmanager retries.
pub async fn receive_alert(State(state): State<AppState>, body: Bytes) -> Response {
    let msg = match WebhookMessage::from_slice(&body) {
        Ok(msg) => msg,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected malformed notification");
            let response = AlertResponse {
                status: "error".into(),
                route: None,
                generation: state.store.generation(),
                deliveries: Vec::new(),
                error: Some(format!("invalid webhook payload: {e}")),
            };
            return (StatusCode::BAD_REQUEST, Json(response)).into_response();
        }
    };

    let runtime = state.store.load();
    let resolution = runtime.resolve(&msg);

    let Some(route) = resolution.route else {
        tracing::debug!(
            receiver = %msg.receiver,
            status = %msg.status,
            generation = runtime.generation,
            "No route matched"
        );
        metrics::record_alert(None);
        return Json(AlertResponse {
            status: "no_route".into(),
            route: None,
            generation: runtime.generation,
            deliveries: Vec::new(),
            error: None,
        })
        .into_response();
    };

    metrics::record_alert(Some(&route.name));
    tracing::info!(
        route = %route.name,
        receiver = %msg.receiver,
        status = %msg.status,
        alerts = msg.alerts.len(),
        channels = ?route.channels,
        mention_rules = ?resolution.mention_rules,
        generation = runtime.generation,
        "Routing notification"
    );

    let deliveries = join_all(
        route
            .channels
            .iter()
            .map(|name| deliver(&state.client, &runtime, name, &msg, &resolution.mention)),
    )
    .await;

    let failed = deliveries.iter().any(|d| !d.ok);
    let (code, status) = if failed {
        (StatusCode::BAD_GATEWAY, "partial_failure")
    } else {
        (StatusCode::OK, "ok")
    };

    let response = AlertResponse {
        status: status.into(),
        route: Some(route.name.clone()),
        generation: runtime.generation,
        deliveries,
        error: None,
    };
    (code, Json(response)).into_response()
}

async fn deliver(
    client: &DingTalkClient,
    runtime: &Runtime,
    name: &str,
    msg: &WebhookMessage,
    mention: &MentionSpec,
) -> DeliveryResult {
    let Some(channel) = runtime.channel(name) else {
        tracing::error!(channel = %name, "Route references a channel missing from the snapshot");
        return DeliveryResult {
            channel: name.to_string(),
            ok: false,
            error: Some("unknown channel".into()),
        };
    };

    let mention = mention.merge(&channel.mention);
    let message = render_message(msg, channel, &mention);

    let started = Instant::now();
    let result = client.send(channel, &message).await;
    metrics::record_delivery(name, result.is_ok(), started);

    match result {
        Ok(()) => {
            tracing::debug!(channel = %name, elapsed_ms = started.elapsed().as_millis() as u64, "Delivered");
            DeliveryResult {
                channel: name.to_string(),
                ok: true,
                error: None,
            }
        }
        Err(e) => {
            tracing::error!(channel = %name, error = %e, "Delivery failed");
            DeliveryResult {
                channel: name.to_string(),
                ok: false,
                error: Some(e.to_string()),
            }
        }
    }
}
