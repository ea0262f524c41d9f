//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters, gauges, histograms via `metrics`)
//!
//! Consumers:
//!     → stdout (text or JSON lines)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields (route, channel, generation) instead of formatted text
//! - Unrouted notifications are logged at debug; they are not failures
//! - Metric updates are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
