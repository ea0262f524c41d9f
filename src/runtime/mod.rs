//! Runtime state shared by request handlers and the reload path.
//!
//! # Data Flow
//! ```text
//! HookConfig (validated)
//!     → snapshot.rs (compile routes, mention rules, channels into a Runtime)
//!     → store.rs (one atomic pointer swap)
//!
//! Request handler:
//!     store.load() once → resolve route + mentions on that snapshot only
//!
//! Reload trigger (watcher, SIGHUP, admin API):
//!     → reload.rs (load file → compile → store, serialized)
//! ```
//!
//! # Design Decisions
//! - Snapshots are immutable; a reload builds a whole new one
//! - The store is seeded at construction, so it is never empty
//! - `load()` never blocks; in-flight requests keep the snapshot they loaded
//! - A failed reload leaves the installed snapshot untouched

pub mod reload;
pub mod snapshot;
pub mod store;

pub use reload::{ReloadStatus, ReloadTrigger, Reloader};
pub use snapshot::{Resolution, Runtime};
pub use store::RuntimeStore;
