//! Immutable runtime snapshot.

use std::collections::BTreeMap;
use std::time::SystemTime;

use crate::alert::WebhookMessage;
use crate::config::{validate_config, AdminConfig, ConfigError, HookConfig, ServerConfig, ValidationError};
use crate::dingtalk::Channel;
use crate::routing::{MentionSpec, MentionTable, Route, Router};

/// Everything a request needs, compiled from one configuration.
#[derive(Debug)]
pub struct Runtime {
    /// Increases by one with every successful load.
    pub generation: u64,
    pub loaded_at: SystemTime,
    pub router: Router,
    pub mentions: MentionTable,
    pub base_mention: MentionSpec,
    pub channels: BTreeMap<String, Channel>,
    pub server: ServerConfig,
    pub admin: AdminConfig,
}

/// Outcome of evaluating one notification against a snapshot.
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    /// First matching route, if any.
    pub route: Option<&'a Route>,
    /// Names of every matching mention rule, in declaration order.
    pub mention_rules: Vec<&'a str>,
    /// Base mention merged with every matching rule.
    pub mention: MentionSpec,
}

impl Resolution<'_> {
    /// Channels to deliver to; empty when no route matched.
    pub fn channels(&self) -> &[String] {
        self.route.map(|r| r.channels.as_slice()).unwrap_or_default()
    }
}

impl Runtime {
    /// Validate and compile a configuration.
    ///
    /// This is the only fallible step between a config file and a served
    /// snapshot; installing the result cannot fail.
    pub fn compile(config: &HookConfig, generation: u64) -> Result<Self, ConfigError> {
        validate_config(config)?;

        let mut channels = BTreeMap::new();
        for (name, channel) in &config.channels {
            let compiled = Channel::compile(name, channel).map_err(|e| {
                ConfigError::Validation(vec![ValidationError::InvalidWebhook {
                    channel: name.clone(),
                    reason: e.to_string(),
                }])
            })?;
            channels.insert(name.clone(), compiled);
        }

        Ok(Self {
            generation,
            loaded_at: SystemTime::now(),
            router: Router::compile(&config.routes),
            mentions: MentionTable::compile(&config.mention_rules),
            base_mention: MentionSpec::from(&config.mention),
            channels,
            server: config.server.clone(),
            admin: config.admin.clone(),
        })
    }

    /// Route and mention decision for a notification.
    pub fn resolve<'a>(&'a self, msg: &'a WebhookMessage) -> Resolution<'a> {
        let route = self.router.first_match(msg);
        let mut mention_rules = Vec::new();
        let mut mention = self.base_mention.clone();
        for rule in self.mentions.matching(msg) {
            mention_rules.push(rule.name.as_str());
            mention = mention.merge(&rule.mention);
        }
        Resolution {
            route,
            mention_rules,
            mention,
        }
    }

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.get(name)
    }
}
