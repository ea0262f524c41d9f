//! Render a notification group into robot message text.

use std::fmt::Write;

use crate::alert::{Alert, WebhookMessage};
use crate::config::MessageType;
use crate::dingtalk::channel::Channel;
use crate::dingtalk::message::{At, Message};
use crate::routing::MentionSpec;

const TRUNCATED_MARKER: &str = "\n\n...(truncated)";

/// Build the message for one channel.
pub fn render_message(msg: &WebhookMessage, channel: &Channel, mention: &MentionSpec) -> Message {
    let title = title(msg, &channel.title_prefix);
    let body = match channel.msg_type {
        MessageType::Markdown => body(msg, &title, Markup::Markdown),
        MessageType::Text => body(msg, &title, Markup::Plain),
    };

    Message {
        msg_type: channel.msg_type,
        title,
        text: truncate(body, channel.max_body_bytes),
        at: At::from(mention),
    }
}

/// `[FIRING:2] HighLatency`, with the channel prefix in front.
pub fn title(msg: &WebhookMessage, prefix: &str) -> String {
    let name = msg
        .alert_name()
        .filter(|n| !n.is_empty())
        .or(Some(msg.receiver.as_str()).filter(|r| !r.is_empty()))
        .unwrap_or("alert");

    let status = if msg.status.trim().eq_ignore_ascii_case("firing") {
        format!("[FIRING:{}]", msg.firing().count())
    } else if msg.status.trim().is_empty() {
        "[UNKNOWN]".to_string()
    } else {
        format!("[{}]", msg.status.trim().to_uppercase())
    };

    if prefix.is_empty() {
        format!("{status} {name}")
    } else {
        format!("{prefix} {status} {name}")
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Markup {
    Markdown,
    Plain,
}

impl Markup {
    fn strong(self, s: &str) -> String {
        match self {
            Markup::Markdown => format!("**{s}**"),
            Markup::Plain => s.to_string(),
        }
    }

    fn link(self, text: &str, url: &str) -> String {
        match self {
            Markup::Markdown => format!("[{text}]({url})"),
            Markup::Plain => format!("{text}: {url}"),
        }
    }
}

fn body(msg: &WebhookMessage, title: &str, markup: Markup) -> String {
    let mut out = String::new();
    match markup {
        Markup::Markdown => {
            let _ = writeln!(out, "#### {title}\n");
        }
        Markup::Plain => {
            let _ = writeln!(out, "{title}");
        }
    }
    if !msg.receiver.is_empty() {
        let _ = writeln!(out, "{}: {}\n", markup.strong("Receiver"), msg.receiver);
    }

    section(&mut out, "Firing", msg.firing(), markup);
    section(&mut out, "Resolved", msg.resolved(), markup);

    if msg.truncated_alerts > 0 {
        let _ = writeln!(out, "({} more alerts truncated by Alertmanager)\n", msg.truncated_alerts);
    }
    if !msg.external_url.is_empty() {
        let _ = writeln!(out, "{}", markup.link("Alertmanager", &msg.external_url));
    }

    out.trim_end().to_string()
}

fn section<'a>(out: &mut String, heading: &str, alerts: impl Iterator<Item = &'a Alert>, markup: Markup) {
    let mut alerts = alerts.peekable();
    if alerts.peek().is_none() {
        return;
    }
    let _ = writeln!(out, "{}\n", markup.strong(heading));

    for alert in alerts {
        let name = alert.labels.get("alertname").map(String::as_str).unwrap_or("alert");
        let labels = alert
            .labels
            .iter()
            .filter(|(k, _)| k.as_str() != "alertname")
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(out, "- {} {labels}", markup.strong(name));

        for (key, value) in &alert.annotations {
            let _ = writeln!(out, "  - {key}: {value}");
        }
        if !alert.starts_at.is_empty() {
            let _ = writeln!(out, "  - started: {}", alert.starts_at);
        }
        if !alert.is_firing() && !alert.ends_at.is_empty() {
            let _ = writeln!(out, "  - ended: {}", alert.ends_at);
        }
        if !alert.generator_url.is_empty() {
            let _ = writeln!(out, "  - {}", markup.link("source", &alert.generator_url));
        }
    }
    out.push('\n');
}

/// Cut `text` to at most `max_bytes` on a char boundary. Zero disables.
///
/// The marker is left out when the limit is too small to hold it.
fn truncate(mut text: String, max_bytes: usize) -> String {
    if max_bytes == 0 || text.len() <= max_bytes {
        return text;
    }
    let marker = if TRUNCATED_MARKER.len() <= max_bytes {
        TRUNCATED_MARKER
    } else {
        ""
    };
    let mut end = max_bytes - marker.len();
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
    text.push_str(marker);
    text
}
