//! Robot message payloads.

use serde_json::{json, Value};

use crate::config::MessageType;
use crate::routing::MentionSpec;

/// The `at` block of a robot message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct At {
    pub at_mobiles: Vec<String>,
    pub at_user_ids: Vec<String>,
    pub is_at_all: bool,
}

impl At {
    pub fn is_empty(&self) -> bool {
        !self.is_at_all && self.at_mobiles.is_empty() && self.at_user_ids.is_empty()
    }

    /// `@all @user @mobile`, in that order.
    fn trailer(&self) -> String {
        let all = self.is_at_all.then_some("all");
        all.into_iter()
            .chain(self.at_user_ids.iter().map(String::as_str))
            .chain(self.at_mobiles.iter().map(String::as_str))
            .map(|who| format!("@{who}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<&MentionSpec> for At {
    /// Repeated identifiers from merged rules collapse to their first
    /// occurrence.
    fn from(spec: &MentionSpec) -> Self {
        Self {
            at_mobiles: dedup(&spec.at_mobiles),
            at_user_ids: dedup(&spec.at_user_ids),
            is_at_all: spec.at_all,
        }
    }
}

fn dedup(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for v in values {
        if !out.contains(v) {
            out.push(v.clone());
        }
    }
    out
}

/// A message to one robot.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub msg_type: MessageType,
    pub title: String,
    pub text: String,
    pub at: At,
}

/// Robot API request body.
///
/// The mention trailer is appended to the text, since DingTalk only
/// highlights mentions that also appear in the content. The `at` object is
/// omitted when nobody is mentioned.
pub fn build_payload(message: &Message) -> Value {
    let text = if message.at.is_empty() {
        message.text.clone()
    } else {
        format!("{}\n\n{}", message.text, message.at.trailer())
    };

    let mut payload = match message.msg_type {
        MessageType::Markdown => json!({
            "msgtype": "markdown",
            "markdown": { "title": message.title, "text": text },
        }),
        MessageType::Text => json!({
            "msgtype": "text",
            "text": { "content": text },
        }),
    };

    if !message.at.is_empty() {
        payload["at"] = json!({
            "atMobiles": message.at.at_mobiles,
            "atUserIds": message.at.at_user_ids,
            "isAtAll": message.at.is_at_all,
        });
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_payload_with_at() {
        let payload = build_payload(&Message {
            msg_type: MessageType::Markdown,
            title: "t".into(),
            text: "hello".into(),
            at: At {
                at_mobiles: vec!["13800138000".into()],
                at_user_ids: vec!["user123".into()],
                is_at_all: true,
            },
        });

        assert_eq!(payload["msgtype"], "markdown");
        assert_eq!(payload["markdown"]["title"], "t");
        assert_eq!(payload["markdown"]["text"], "hello\n\n@all @user123 @13800138000");
        assert_eq!(payload["at"]["isAtAll"], true);
        assert_eq!(payload["at"]["atMobiles"], json!(["13800138000"]));
        assert_eq!(payload["at"]["atUserIds"], json!(["user123"]));
    }

    #[test]
    fn test_empty_at_omitted() {
        let payload = build_payload(&Message {
            msg_type: MessageType::Text,
            title: "ignored".into(),
            text: "hello".into(),
            at: At::default(),
        });
        assert_eq!(payload, json!({"msgtype": "text", "text": {"content": "hello"}}));
        assert!(payload.get("at").is_none());
    }

    #[test]
    fn test_text_payload_carries_mentions() {
        let payload = build_payload(&Message {
            msg_type: MessageType::Text,
            title: String::new(),
            text: "disk full".into(),
            at: At {
                at_mobiles: vec!["111".into()],
                ..Default::default()
            },
        });
        assert_eq!(payload["text"]["content"], "disk full\n\n@111");
        assert_eq!(payload["at"]["isAtAll"], false);
    }

    #[test]
    fn test_at_from_mention_dedups_keeping_order() {
        let spec = MentionSpec {
            at_all: false,
            at_mobiles: vec!["2".into(), "1".into(), "2".into(), "3".into(), "1".into()],
            at_user_ids: vec!["u".into(), "u".into()],
        };
        let at = At::from(&spec);
        assert_eq!(at.at_mobiles, ["2", "1", "3"]);
        assert_eq!(at.at_user_ids, ["u"]);
        assert!(!at.is_at_all);
    }
}
