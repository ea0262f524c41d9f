//! Alertmanager webhook payload.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Label or annotation set.
pub type KeyValues = BTreeMap<String, String>;

/// A grouped notification as posted by Alertmanager.
///
/// This is the event the routing engine evaluates. Only `receiver`, `status`,
/// `common_labels` and `group_labels` take part in matching; the rest feeds
/// message rendering.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WebhookMessage {
    pub version: String,
    pub group_key: String,
    pub truncated_alerts: u64,
    pub status: String,
    pub receiver: String,
    pub group_labels: KeyValues,
    pub common_labels: KeyValues,
    pub common_annotations: KeyValues,
    #[serde(rename = "externalURL")]
    pub external_url: String,
    pub alerts: Vec<Alert>,
}

/// A single alert inside a notification group.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Alert {
    pub status: String,
    pub labels: KeyValues,
    pub annotations: KeyValues,
    pub starts_at: String,
    pub ends_at: String,
    #[serde(rename = "generatorURL")]
    pub generator_url: String,
    pub fingerprint: String,
}

impl WebhookMessage {
    /// Parse a webhook body.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// Alerts that are still firing.
    pub fn firing(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter().filter(|a| a.is_firing())
    }

    /// Alerts that have resolved.
    pub fn resolved(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter().filter(|a| !a.is_firing())
    }

    /// The group's `alertname`, looked up the same way label predicates are:
    /// common labels first, then group labels.
    pub fn alert_name(&self) -> Option<&str> {
        self.label("alertname")
    }

    /// Resolve a label from common labels, falling back to group labels.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.common_labels
            .get(key)
            .or_else(|| self.group_labels.get(key))
            .map(String::as_str)
    }
}

impl Alert {
    pub fn is_firing(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case("firing")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "version": "4",
        "groupKey": "{}:{alertname=\"HighLatency\"}",
        "truncatedAlerts": 0,
        "status": "firing",
        "receiver": "ops",
        "groupLabels": {"alertname": "HighLatency"},
        "commonLabels": {"alertname": "HighLatency", "severity": "critical"},
        "commonAnnotations": {"summary": "p99 above 2s"},
        "externalURL": "http://alertmanager:9093",
        "alerts": [
            {
                "status": "firing",
                "labels": {"alertname": "HighLatency", "instance": "api-1"},
                "annotations": {"summary": "p99 above 2s"},
                "startsAt": "2024-01-01T00:00:00Z",
                "endsAt": "0001-01-01T00:00:00Z",
                "generatorURL": "http://prometheus:9090/graph",
                "fingerprint": "abc123"
            },
            {
                "status": "resolved",
                "labels": {"alertname": "HighLatency", "instance": "api-2"}
            }
        ]
    }"#;

    #[test]
    fn test_parse_alertmanager_payload() {
        let msg = WebhookMessage::from_slice(SAMPLE.as_bytes()).unwrap();
        assert_eq!(msg.receiver, "ops");
        assert_eq!(msg.status, "firing");
        assert_eq!(msg.external_url, "http://alertmanager:9093");
        assert_eq!(msg.common_labels.get("severity").map(String::as_str), Some("critical"));
        assert_eq!(msg.alerts.len(), 2);
        assert_eq!(msg.alerts[0].generator_url, "http://prometheus:9090/graph");
        assert_eq!(msg.alerts[1].starts_at, "");
    }

    #[test]
    fn test_firing_and_resolved_partition() {
        let msg = WebhookMessage::from_slice(SAMPLE.as_bytes()).unwrap();
        assert_eq!(msg.firing().count(), 1);
        assert_eq!(msg.resolved().count(), 1);
        assert_eq!(msg.resolved().next().unwrap().labels["instance"], "api-2");
    }

    #[test]
    fn test_missing_fields_default() {
        let msg = WebhookMessage::from_slice(b"{}").unwrap();
        assert_eq!(msg, WebhookMessage::default());
    }

    #[test]
    fn test_label_prefers_common_labels() {
        let mut msg = WebhookMessage::default();
        msg.group_labels.insert("env".into(), "staging".into());
        assert_eq!(msg.label("env"), Some("staging"));

        msg.common_labels.insert("env".into(), "prod".into());
        assert_eq!(msg.label("env"), Some("prod"));
        assert_eq!(msg.label("missing"), None);
    }
}
