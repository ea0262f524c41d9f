//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming notification (receiver, status, common/group labels)
//!     → router.rs (ordered route scan, first match wins)
//!     → matcher.rs (evaluate compiled When predicates)
//!     → Return: channel list of the matched route, or nothing
//!
//!     → mention.rs (every matching mention rule, merged in order)
//!     → Return: merged MentionSpec
//!
//! Rule Compilation (at startup and on every reload):
//!     RouteConfig[] / MentionRuleConfig[]
//!     → Normalize (trim, drop blanks, lower-case statuses)
//!     → Compile into hash sets for O(1) membership
//!     → Freeze as immutable tables inside a runtime snapshot
//! ```
//!
//! # Design Decisions
//! - Tables are compiled once per config load and never mutated
//! - Exact string membership only; no prefix, substring or regex matching
//! - Declaration order is load-bearing for routes (first match wins)
//! - Mention rules are match-all: every match contributes

pub mod matcher;
pub mod mention;
pub mod router;

pub use matcher::When;
pub use mention::{resolve_mentions, MentionRule, MentionSpec, MentionTable};
pub use router::{first_match, resolve_route, Route, Router};
