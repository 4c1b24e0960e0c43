//! HTTP probe logic.
//!
//! Issues a single HEAD request per check, with a hard wall-clock bound.
//! Redirects are followed; the final status decides health via the
//! configured success-code set.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use tracing::debug;

use uptime_state::{ProbeResult, Target, STATUS_FAILED};

/// Hard upper bound on probe wait time. Exceeding it is treated the same
/// as any other network failure.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(8);

const USER_AGENT: &str = "uptimed/0.1";

/// Issues reachability checks against monitored targets.
///
/// Cheap to clone: the underlying `reqwest::Client` is an `Arc` handle.
#[derive(Clone)]
pub struct Prober {
    client: reqwest::Client,
}

impl Prober {
    /// Build a prober with the process-wide timeout and redirect policy.
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    /// Perform one reachability check against a target.
    ///
    /// `now_ms` is the tick timestamp recorded on the result; `ok` is
    /// computed strictly as membership of the returned status in
    /// `success_codes`. Transport-level failures yield status
    /// [`STATUS_FAILED`] with a zero response time and are never `ok`.
    pub async fn probe(
        &self,
        target: &Target,
        success_codes: &HashSet<u16>,
        now_ms: u64,
    ) -> ProbeResult {
        let started = Instant::now();

        match self.client.head(&target.url).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                let elapsed_ms = started.elapsed().as_millis() as u64;
                let ok = success_codes.contains(&status);
                debug!(target = %target.id, status, elapsed_ms, ok, "probe completed");
                ProbeResult {
                    status,
                    ok,
                    response_time: elapsed_ms,
                    time: now_ms,
                }
            }
            Err(e) => {
                debug!(target = %target.id, error = %e, "probe failed");
                ProbeResult {
                    status: STATUS_FAILED,
                    ok: false,
                    response_time: 0,
                    time: now_ms,
                }
            }
        }
    }
}
