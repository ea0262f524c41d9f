//! Robot request signing.
//!
//! DingTalk's "additional signature" mode: the string `"{timestamp}\n{secret}"`
//! is HMAC-SHA256'd with the secret as key and sent base64 encoded next to
//! the millisecond timestamp.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::Url;

type HmacSha256 = Hmac<Sha256>;

/// Signature for `timestamp_millis` under `secret`.
pub fn sign(timestamp_millis: i64, secret: &str) -> String {
    let string_to_sign = format!("{timestamp_millis}\n{secret}");
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(string_to_sign.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

/// `webhook` with its `timestamp` and `sign` query parameters set,
/// replacing any already present.
pub fn signed_url(webhook: &Url, secret: &str, timestamp_millis: i64) -> Url {
    let kept: Vec<(String, String)> = webhook
        .query_pairs()
        .filter(|(key, _)| key != "timestamp" && key != "sign")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut url = webhook.clone();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(&kept)
        .append_pair("timestamp", &timestamp_millis.to_string())
        .append_pair("sign", &sign(timestamp_millis, secret));
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_known_value() {
        assert_eq!(
            sign(1_700_000_000_000, "secret"),
            "OuzzJR5+xZ4/EYwqtNt6sMYZQMTa/HEGvc9miJe7XzY="
        );
    }

    #[test]
    fn test_signed_url_round_trip() {
        let webhook = Url::parse("https://oapi.dingtalk.com/robot/send?access_token=xxx").unwrap();
        let url = signed_url(&webhook, "secret", 1_700_000_000_000);

        let parsed = Url::parse(url.as_str()).unwrap();
        let query: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();
        assert_eq!(
            query,
            vec![
                ("access_token".to_string(), "xxx".to_string()),
                ("timestamp".to_string(), "1700000000000".to_string()),
                ("sign".to_string(), sign(1_700_000_000_000, "secret")),
            ]
        );
    }

    #[test]
    fn test_signed_url_replaces_existing_signature() {
        let webhook = Url::parse(
            "https://oapi.dingtalk.com/robot/send?timestamp=1&access_token=xxx&sign=stale",
        )
        .unwrap();
        let url = signed_url(&webhook, "secret", 1_700_000_000_000);

        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            query,
            vec![
                ("access_token".to_string(), "xxx".to_string()),
                ("timestamp".to_string(), "1700000000000".to_string()),
                ("sign".to_string(), sign(1_700_000_000_000, "secret")),
            ]
        );
    }
}
