//! uptime-monitor — the monitoring engine for uptimed.
//!
//! # Architecture
//!
//! ```text
//! TickRunner::run (interval loop, watch-channel shutdown)
//!   └── run_tick
//!       ├── StateStore::load_state / load_config
//!       ├── one probe task per target (JoinSet fan-out, join all)
//!       ├── engine::apply_probe   (incident open/close state machine)
//!       ├── engine::compact       (log retention + incident cap)
//!       ├── engine::reconcile     (drop records no longer configured)
//!       └── StateStore::save_state (one whole-document write)
//! ```
//!
//! Probes are mutually independent: a timeout or panic in one never
//! aborts the tick or corrupts a sibling's record. The tick itself holds
//! no state between runs beyond what it loads from the store.

pub mod engine;
pub mod tick;

pub use tick::{TickRunner, TickSummary};
