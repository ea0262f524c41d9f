//! Predicate compilation and matching.
//!
//! # Responsibilities
//! - Compile a `WhenConfig` into normalized membership sets
//! - Match receiver (exact)
//! - Match status (case-insensitive)
//! - Match labels (common labels first, then group labels)
//! - Combine clauses with AND semantics
//!
//! # Design Decisions
//! - Empty clause = always matches (wildcard)
//! - Blank entries are dropped at compile time, never reported as errors
//! - A label key whose value list normalizes to nothing is dropped entirely
//! - No regex to guarantee predictable matching

use std::collections::{HashMap, HashSet};

use crate::alert::WebhookMessage;
use crate::config::WhenConfig;

/// A compiled match condition.
///
/// Invariant: every stored string is trimmed and non-empty, and every status
/// is lower case. [`When::compile`] is the only constructor, so `matches`
/// only normalizes the incoming status and never the stored sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct When {
    receivers: HashSet<String>,
    statuses: HashSet<String>,
    labels: HashMap<String, HashSet<String>>,
}

impl When {
    /// Compile a raw `when` block. Never fails.
    pub fn compile(config: &WhenConfig) -> Self {
        let receivers = normalized(&config.receiver, |v| v.to_string());
        let statuses = normalized(&config.status, str::to_lowercase);

        let labels = config
            .labels
            .iter()
            .filter_map(|(key, values)| {
                let key = key.trim();
                if key.is_empty() {
                    return None;
                }
                let set = normalized(values, |v| v.to_string());
                if set.is_empty() {
                    return None;
                }
                Some((key.to_string(), set))
            })
            .collect();

        Self {
            receivers,
            statuses,
            labels,
        }
    }

    /// Returns true if the notification satisfies every non-empty clause.
    pub fn matches(&self, msg: &WebhookMessage) -> bool {
        if !self.receivers.is_empty() && !self.receivers.contains(&msg.receiver) {
            return false;
        }

        if !self.statuses.is_empty() {
            let status = msg.status.trim().to_lowercase();
            if !self.statuses.contains(&status) {
                return false;
            }
        }

        self.labels.iter().all(|(key, allowed)| {
            msg.common_labels
                .get(key)
                .or_else(|| msg.group_labels.get(key))
                .is_some_and(|value| allowed.contains(value))
        })
    }

    /// True when no clause constrains anything.
    pub fn is_catch_all(&self) -> bool {
        self.receivers.is_empty() && self.statuses.is_empty() && self.labels.is_empty()
    }

    pub fn receivers(&self) -> &HashSet<String> {
        &self.receivers
    }

    pub fn statuses(&self) -> &HashSet<String> {
        &self.statuses
    }

    pub fn labels(&self) -> &HashMap<String, HashSet<String>> {
        &self.labels
    }
}

/// Trim, drop blanks, map, dedupe.
fn normalized(values: &[String], map: impl Fn(&str) -> String) -> HashSet<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(map)
        .collect()
}
