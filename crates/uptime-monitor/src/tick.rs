//! The tick runner — one full probe-all-targets-and-persist cycle, plus
//! the interval loop that drives it.
//!
//! The state map is loaded once at tick start, mutated in memory across
//! all targets, and written back once at tick end as a single blob. The
//! runner itself holds nothing between ticks.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::task::JoinSet;
use tracing::{error, info, warn};

use uptime_probe::Prober;
use uptime_state::{MonitorRecord, StateStore};

use crate::engine;

/// Outcome of one tick, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    /// Targets probed this tick.
    pub targets: usize,
    /// Probes that came back not-ok.
    pub failures: usize,
}

/// Drives the probe → apply → compact → reconcile → persist cycle.
#[derive(Clone)]
pub struct TickRunner {
    store: StateStore,
    prober: Prober,
}

impl TickRunner {
    pub fn new(store: StateStore, prober: Prober) -> Self {
        Self { store, prober }
    }

    /// Execute one tick.
    ///
    /// Probes run concurrently, one task per target, and are all joined
    /// before reconciliation; a failing or slow probe never blocks or
    /// corrupts a sibling's record. Store errors propagate and fail the
    /// tick (the next tick starts from the last persisted state).
    pub async fn run_tick(&self) -> anyhow::Result<TickSummary> {
        let mut state = self.store.load_state()?;
        let config = self.store.load_config()?;
        let success_codes: Arc<HashSet<u16>> =
            Arc::new(config.success_codes.iter().copied().collect());
        let now = epoch_millis();

        let mut probes = JoinSet::new();
        for target in config.urls.clone() {
            let prober = self.prober.clone();
            let success_codes = success_codes.clone();
            probes.spawn(async move {
                let result = prober.probe(&target, &success_codes, now).await;
                (target, result)
            });
        }

        let mut failures = 0;
        while let Some(joined) = probes.join_next().await {
            let (target, result) = match joined {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(error = %e, "probe task aborted");
                    continue;
                }
            };
            if !result.ok {
                failures += 1;
            }

            let record = state
                .entry(target.id.clone())
                .or_insert_with(|| MonitorRecord::new(&target));
            record.sync_target(&target);
            engine::apply_probe(record, result);
            engine::compact(record, now);
        }

        engine::reconcile(&mut state, &config);
        self.store.save_state(&state)?;

        Ok(TickSummary {
            targets: config.urls.len(),
            failures,
        })
    }

    /// Run ticks until the shutdown signal.
    ///
    /// The first tick fires immediately so a fresh deployment serves data
    /// without waiting a full interval. Each tick runs to completion
    /// before the next sleep, so ticks never overlap in-process.
    pub async fn run(&self, interval: Duration, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        info!(interval_secs = interval.as_secs(), "probe scheduler started");
        self.tick_and_log().await;

        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    self.tick_and_log().await;
                }
                _ = shutdown.changed() => {
                    info!("probe scheduler shutting down");
                    break;
                }
            }
        }
    }

    async fn tick_and_log(&self) {
        match self.run_tick().await {
            Ok(summary) => {
                info!(
                    targets = summary.targets,
                    failures = summary.failures,
                    "tick completed"
                );
            }
            Err(e) => error!(error = %e, "tick failed"),
        }
    }
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
