//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Query, State},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use dingtalk_hook::config::parse_config;
use dingtalk_hook::dingtalk::DingTalkClient;
use dingtalk_hook::http::AppState;
use dingtalk_hook::runtime::{Runtime, RuntimeStore};

/// One request received by the mock robot.
#[derive(Debug, Clone)]
pub struct Received {
    pub query: HashMap<String, String>,
    pub body: Value,
}

#[derive(Clone, Default)]
struct RobotState {
    received: Arc<Mutex<Vec<Received>>>,
    errcode: Arc<AtomicI64>,
}

/// A mock DingTalk robot that records every message it receives.
pub struct MockRobot {
    pub addr: SocketAddr,
    state: RobotState,
}

impl MockRobot {
    /// Start a robot on an ephemeral port.
    pub async fn start() -> Self {
        let state = RobotState::default();
        let app = Router::new()
            .route("/robot/send", post(robot_send))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    /// Webhook URL for a named robot token.
    pub fn webhook(&self, token: &str) -> String {
        format!("http://{}/robot/send?access_token={}", self.addr, token)
    }

    /// Make every following request fail with this API error code.
    pub fn fail_with(&self, errcode: i64) {
        self.state.errcode.store(errcode, Ordering::SeqCst);
    }

    pub fn received(&self) -> Vec<Received> {
        self.state.received.lock().unwrap().clone()
    }

    /// Messages addressed to one token.
    pub fn received_by(&self, token: &str) -> Vec<Received> {
        self.received()
            .into_iter()
            .filter(|r| r.query.get("access_token").map(String::as_str) == Some(token))
            .collect()
    }
}

async fn robot_send(
    State(state): State<RobotState>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.received.lock().unwrap().push(Received { query, body });
    let errcode = state.errcode.load(Ordering::SeqCst);
    if errcode == 0 {
        Json(json!({"errcode": 0, "errmsg": "ok"}))
    } else {
        Json(json!({"errcode": errcode, "errmsg": "robot rejected message"}))
    }
}

/// Compile a TOML config into a store-backed application state.
pub fn state_from_toml(text: &str) -> AppState {
    let config = parse_config(text).unwrap();
    let runtime = Runtime::compile(&config, 1).unwrap();
    AppState {
        store: Arc::new(RuntimeStore::new(runtime)),
        reloader: None,
        client: DingTalkClient::new().unwrap(),
    }
}

/// A firing Alertmanager notification.
pub fn firing(receiver: &str, severity: &str) -> Value {
    json!({
        "version": "4",
        "groupKey": "{}:{alertname=\"HighLatency\"}",
        "status": "firing",
        "receiver": receiver,
        "groupLabels": {"alertname": "HighLatency"},
        "commonLabels": {"alertname": "HighLatency", "severity": severity, "team": "infra"},
        "commonAnnotations": {"summary": "p99 latency above 2s"},
        "externalURL": "http://alertmanager:9093",
        "alerts": [{
            "status": "firing",
            "labels": {"alertname": "HighLatency", "severity": severity, "instance": "api-1"},
            "annotations": {"summary": "p99 latency above 2s"},
            "startsAt": "2024-01-01T00:00:00Z",
            "endsAt": "0001-01-01T00:00:00Z",
            "generatorURL": "http://prometheus:9090/graph",
            "fingerprint": "abc123"
        }]
    })
}
