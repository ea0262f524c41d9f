//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dingtalk_hook_alerts_total` (counter): notifications received, by route
//!   (`route="none"` when nothing matched)
//! - `dingtalk_hook_deliveries_total` (counter): deliveries by channel, outcome
//! - `dingtalk_hook_delivery_duration_seconds` (histogram): per channel
//! - `dingtalk_hook_reloads_total` (counter): reload attempts by outcome
//! - `dingtalk_hook_config_generation` (gauge): generation currently served

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_alert(route: Option<&str>) {
    let route = route.unwrap_or("none").to_string();
    counter!("dingtalk_hook_alerts_total", "route" => route).increment(1);
}

pub fn record_delivery(channel: &str, success: bool, started: Instant) {
    let outcome = if success { "success" } else { "failure" };
    counter!(
        "dingtalk_hook_deliveries_total",
        "channel" => channel.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!(
        "dingtalk_hook_delivery_duration_seconds",
        "channel" => channel.to_string()
    )
    .record(started.elapsed().as_secs_f64());
}

pub fn record_reload(success: bool, generation: u64) {
    let outcome = if success { "success" } else { "failure" };
    counter!("dingtalk_hook_reloads_total", "outcome" => outcome).increment(1);
    record_generation(generation);
}

pub fn record_generation(generation: u64) {
    gauge!("dingtalk_hook_config_generation").set(generation as f64);
}
