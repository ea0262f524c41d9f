//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize; durations via duration.rs)
//!     → validation.rs (structural checks)
//!     → HookConfig (validated, immutable)
//!     → runtime::Runtime::compile (rule tables)
//!
//! On reload trigger (file change, SIGHUP, admin endpoint):
//!     watcher.rs / signals / admin handler
//!     → runtime::reload::Reloader
//!     → loader.rs + validation.rs
//!     → atomic swap of the runtime snapshot
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All sections have defaults to allow minimal configs
//! - Two error tiers: blank or duplicate rule entries are normalized away
//!   during compilation, while a file that cannot be parsed or wires things
//!   together inconsistently is rejected as a whole

pub mod duration;
pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use duration::Duration;
pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AdminConfig, ChannelConfig, HookConfig, LogFormat, MentionConfig, MentionRuleConfig,
    MessageType, ObservabilityConfig, RouteConfig, ServerConfig, WhenConfig,
};
pub use validation::{validate_config, ValidationError};
