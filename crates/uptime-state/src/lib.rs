//! uptime-state — embedded state store for uptimed.
//!
//! Backed by [redb](https://docs.rs/redb), persists the two documents the
//! monitor works with: the full state map (target id → monitor record) and
//! the monitoring configuration. Both are JSON-serialized whole-document
//! blobs under fixed string keys, so a reader only ever observes them at
//! blob granularity.
//!
//! The `StateStore` is `Clone` + `Send` + `Sync` (backed by
//! `Arc<Database>`) and can be shared across async tasks.

pub mod error;
pub mod store;
pub mod tables;
pub mod types;

pub use error::{StateError, StateResult};
pub use store::StateStore;
pub use types::*;
