//! Route lookup.
//!
//! # Responsibilities
//! - Store compiled routes in declaration order
//! - Look up the first route matching a notification
//! - Return the matched route or an explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) ordered scan; the first match wins and later matches are ignored
//! - No match is a normal outcome (nothing is delivered), not an error

use crate::alert::WebhookMessage;
use crate::config::RouteConfig;
use crate::routing::matcher::When;

/// A compiled route.
#[derive(Debug, Clone)]
pub struct Route {
    pub name: String,
    pub when: When,
    pub channels: Vec<String>,
}

impl Route {
    pub fn compile(config: &RouteConfig) -> Self {
        Self {
            name: config.name.clone(),
            when: When::compile(&config.when),
            channels: config.channels.clone(),
        }
    }
}

/// Ordered route table.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Compile routes, preserving their declaration order.
    pub fn compile(configs: &[RouteConfig]) -> Self {
        Self {
            routes: configs.iter().map(Route::compile).collect(),
        }
    }

    pub fn first_match(&self, msg: &WebhookMessage) -> Option<&Route> {
        first_match(&self.routes, msg)
    }

    pub fn resolve(&self, msg: &WebhookMessage) -> &[String] {
        resolve_route(&self.routes, msg)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// The first route whose predicate accepts the notification.
pub fn first_match<'a>(routes: &'a [Route], msg: &WebhookMessage) -> Option<&'a Route> {
    routes.iter().find(|route| route.when.matches(msg))
}

/// Channels of the first matching route; empty when nothing matched.
pub fn resolve_route<'a>(routes: &'a [Route], msg: &WebhookMessage) -> &'a [String] {
    first_match(routes, msg)
        .map(|route| route.channels.as_slice())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WhenConfig;
    use std::collections::BTreeMap;

    fn route(name: &str, when: WhenConfig, channels: &[&str]) -> RouteConfig {
        RouteConfig {
            name: name.into(),
            when,
            channels: channels.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn critical_when() -> WhenConfig {
        let mut labels = BTreeMap::new();
        labels.insert("severity".to_string(), vec!["critical".to_string()]);
        WhenConfig {
            status: vec!["firing".into()],
            labels,
            ..Default::default()
        }
    }

    fn ops_critical() -> WebhookMessage {
        let mut msg = WebhookMessage {
            receiver: "ops".into(),
            status: "firing".into(),
            ..Default::default()
        };
        msg.common_labels.insert("severity".into(), "critical".into());
        msg
    }

    #[test]
    fn test_first_match_wins() {
        let router = Router::compile(&[
            route("r1", WhenConfig::default(), &["a"]),
            route("r2", WhenConfig::default(), &["b"]),
        ]);
        for _ in 0..10 {
            assert_eq!(router.resolve(&ops_critical()), ["a".to_string()]);
        }
        assert_eq!(router.first_match(&ops_critical()).unwrap().name, "r1");
    }

    #[test]
    fn test_no_match_is_empty() {
        let router = Router::compile(&[route(
            "only-dev",
            WhenConfig {
                receiver: vec!["dev".into()],
                ..Default::default()
            },
            &["a"],
        )]);
        assert!(router.first_match(&ops_critical()).is_none());
        assert!(router.resolve(&ops_critical()).is_empty());
        assert!(Router::default().resolve(&ops_critical()).is_empty());
    }

    #[test]
    fn test_specific_route_before_catch_all() {
        let router = Router::compile(&[
            route("crit", critical_when(), &["pager"]),
            route("default", WhenConfig::default(), &["email"]),
        ]);
        assert_eq!(router.resolve(&ops_critical()), ["pager".to_string()]);

        let mut warning = ops_critical();
        warning.common_labels.insert("severity".into(), "warning".into());
        assert_eq!(router.resolve(&warning), ["email".to_string()]);

        let catch_all = Router::compile(&[route("default", WhenConfig::default(), &["email"])]);
        assert_eq!(catch_all.resolve(&ops_critical()), ["email".to_string()]);
    }

    #[test]
    fn test_declaration_order_is_kept() {
        let router = Router::compile(&[
            route("z", WhenConfig::default(), &[]),
            route("a", WhenConfig::default(), &[]),
            route("m", WhenConfig::default(), &[]),
        ]);
        let names: Vec<_> = router.routes().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["z", "a", "m"]);
    }

    #[test]
    fn test_matched_route_without_channels_delivers_nothing() {
        let router = Router::compile(&[
            route("silence", critical_when(), &[]),
            route("default", WhenConfig::default(), &["email"]),
        ]);
        assert_eq!(router.first_match(&ops_critical()).unwrap().name, "silence");
        assert!(router.resolve(&ops_critical()).is_empty());
    }

    #[test]
    fn test_resolve_route_over_plain_slice() {
        let routes: Vec<Route> = [
            route("crit", critical_when(), &["pager"]),
            route("default", WhenConfig::default(), &["email"]),
        ]
        .iter()
        .map(Route::compile)
        .collect();
        assert_eq!(resolve_route(&routes, &ops_critical()), ["pager".to_string()]);
        assert!(resolve_route(&[], &ops_critical()).is_empty());
    }
}
