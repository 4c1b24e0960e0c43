//! uptime-probe — reachability probing for uptimed.
//!
//! One bounded HEAD request per target per tick. Every failure mode (DNS
//! failure, connection refused, malformed response, timeout) is normalized
//! into a [`ProbeResult`](uptime_state::ProbeResult) with the sentinel
//! status 0 — probing never returns an error, so a bad target can never
//! abort a tick.

pub mod prober;

pub use prober::{Prober, PROBE_TIMEOUT};
