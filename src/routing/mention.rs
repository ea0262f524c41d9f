//! Mention resolution.
//!
//! Unlike routes, every matching mention rule contributes. The result is
//! folded left to right starting from the base mention.

use serde::Serialize;

use crate::alert::WebhookMessage;
use crate::config::{MentionConfig, MentionRuleConfig};
use crate::routing::matcher::When;

/// Who to call out in an outgoing message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MentionSpec {
    pub at_all: bool,
    pub at_mobiles: Vec<String>,
    pub at_user_ids: Vec<String>,
}

impl MentionSpec {
    /// Fold `extra` into a copy of `self`.
    ///
    /// `at_all` is OR-ed. Identifier lists are appended in order and are not
    /// de-duplicated here.
    pub fn merge(&self, extra: &MentionSpec) -> MentionSpec {
        let mut out = self.clone();
        out.at_all |= extra.at_all;
        out.at_mobiles.extend(extra.at_mobiles.iter().cloned());
        out.at_user_ids.extend(extra.at_user_ids.iter().cloned());
        out
    }

    pub fn is_empty(&self) -> bool {
        !self.at_all && self.at_mobiles.is_empty() && self.at_user_ids.is_empty()
    }
}

impl From<&MentionConfig> for MentionSpec {
    fn from(config: &MentionConfig) -> Self {
        Self {
            at_all: config.at_all,
            at_mobiles: trimmed(&config.at_mobiles),
            at_user_ids: trimmed(&config.at_user_ids),
        }
    }
}

fn trimmed(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// A compiled mention rule.
#[derive(Debug, Clone)]
pub struct MentionRule {
    pub name: String,
    pub when: When,
    pub mention: MentionSpec,
}

impl MentionRule {
    pub fn compile(config: &MentionRuleConfig) -> Self {
        Self {
            name: config.name.clone(),
            when: When::compile(&config.when),
            mention: MentionSpec::from(&config.mention),
        }
    }
}

/// Ordered mention rule table.
#[derive(Debug, Clone, Default)]
pub struct MentionTable {
    rules: Vec<MentionRule>,
}

impl MentionTable {
    pub fn compile(configs: &[MentionRuleConfig]) -> Self {
        Self {
            rules: configs.iter().map(MentionRule::compile).collect(),
        }
    }

    /// Rules accepting the notification, in declaration order.
    pub fn matching<'a>(
        &'a self,
        msg: &'a WebhookMessage,
    ) -> impl Iterator<Item = &'a MentionRule> + 'a {
        self.rules.iter().filter(move |rule| rule.when.matches(msg))
    }

    pub fn resolve(&self, msg: &WebhookMessage, base: &MentionSpec) -> MentionSpec {
        resolve_mentions(&self.rules, msg, base)
    }

    pub fn rules(&self) -> &[MentionRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Merge the mention of every rule accepting the notification into `base`,
/// in declaration order.
pub fn resolve_mentions(
    rules: &[MentionRule],
    msg: &WebhookMessage,
    base: &MentionSpec,
) -> MentionSpec {
    rules
        .iter()
        .filter(|rule| rule.when.matches(msg))
        .fold(base.clone(), |acc, rule| acc.merge(&rule.mention))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WhenConfig;

    fn spec(at_all: bool, mobiles: &[&str], users: &[&str]) -> MentionSpec {
        MentionSpec {
            at_all,
            at_mobiles: mobiles.iter().map(|m| m.to_string()).collect(),
            at_user_ids: users.iter().map(|u| u.to_string()).collect(),
        }
    }

    fn rule(name: &str, when: WhenConfig, mention: MentionSpec) -> MentionRuleConfig {
        MentionRuleConfig {
            name: name.into(),
            when,
            mention: MentionConfig {
                at_all: mention.at_all,
                at_mobiles: mention.at_mobiles,
                at_user_ids: mention.at_user_ids,
            },
        }
    }

    fn firing(receiver: &str) -> WebhookMessage {
        WebhookMessage {
            receiver: receiver.into(),
            status: "firing".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_ors_flag_and_appends_lists() {
        let base = spec(false, &["100"], &["alice"]);
        let extra = spec(true, &["200", "100"], &["bob"]);

        let merged = base.merge(&extra);
        assert!(merged.at_all);
        assert_eq!(merged.at_mobiles, ["100", "200", "100"]);
        assert_eq!(merged.at_user_ids, ["alice", "bob"]);

        // inputs untouched
        assert_eq!(base, spec(false, &["100"], &["alice"]));
        assert_eq!(extra, spec(true, &["200", "100"], &["bob"]));

        let merged = merged.merge(&spec(false, &[], &[]));
        assert!(merged.at_all);
    }

    #[test]
    fn test_resolve_merges_all_matching_rules_in_order() {
        let table = MentionTable::compile(&[
            rule("mobiles", WhenConfig::default(), spec(false, &["111"], &[])),
            rule(
                "dev-only",
                WhenConfig {
                    receiver: vec!["dev".into()],
                    ..Default::default()
                },
                spec(false, &["999"], &[]),
            ),
            rule("everyone", WhenConfig::default(), spec(true, &["222"], &["carol"])),
        ]);

        let ops = firing("ops");
        let base = spec(false, &["000"], &[]);
        let merged = table.resolve(&ops, &base);
        assert!(merged.at_all);
        assert_eq!(merged.at_mobiles, ["000", "111", "222"]);
        assert_eq!(merged.at_user_ids, ["carol"]);

        let names: Vec<_> = table.matching(&ops).map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["mobiles", "everyone"]);
    }

    #[test]
    fn test_resolve_without_matches_returns_base() {
        let table = MentionTable::compile(&[rule(
            "resolved-only",
            WhenConfig {
                status: vec!["resolved".into()],
                ..Default::default()
            },
            spec(true, &[], &[]),
        )]);
        let base = spec(false, &["000"], &["ops-lead"]);
        assert_eq!(table.resolve(&firing("ops"), &base), base);
        assert_eq!(MentionTable::default().resolve(&firing("ops"), &base), base);
    }

    #[test]
    fn test_mention_config_drops_blank_identifiers() {
        let config = MentionConfig {
            at_all: false,
            at_mobiles: vec![" 138 ".into(), "".into()],
            at_user_ids: vec!["   ".into(), "u1".into()],
        };
        assert_eq!(MentionSpec::from(&config), spec(false, &["138"], &["u1"]));
        assert!(MentionSpec::default().is_empty());
    }
}
