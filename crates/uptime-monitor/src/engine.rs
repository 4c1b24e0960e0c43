//! Per-target state transitions and retention.
//!
//! The state machine infers health from `lastStatus.ok`; a target with no
//! prior status counts as healthy, so its very first failing probe opens
//! an incident immediately. Retention keeps both histories bounded: logs
//! by a size-triggered age eviction, incidents by a hard cap.

use std::collections::HashSet;

use uptime_state::{Incident, MonitorConfig, MonitorRecord, ProbeResult, StateMap};

/// Log compaction triggers once the history grows past this many entries
/// (roughly one probe per 5 minutes for 30 days).
pub const LOG_HIGH_WATER_MARK: usize = 8640;

/// Maximum age of a detailed log entry once compaction triggers.
pub const RETENTION_WINDOW_MS: u64 = 30 * 24 * 60 * 60 * 1000;

/// Maximum incidents retained per target.
pub const INCIDENT_CAP: usize = 50;

/// Fold a fresh probe result into a record.
///
/// Incident bookkeeping happens first, driven by the `ok` transition; the
/// result then overwrites `last_status` and is appended to the log
/// unconditionally (healthy and unhealthy probes are both logged).
pub fn apply_probe(record: &mut MonitorRecord, result: ProbeResult) {
    let was_ok = record.last_status.map(|s| s.ok).unwrap_or(true);

    if was_ok && !result.ok {
        record.incidents.push(Incident {
            start: result.time,
            end: None,
            code: result.status,
        });
    } else if !was_ok && result.ok {
        // Only the most recent incident is ever eligible to be closed;
        // older entries are immutable once closed. If no open incident
        // exists the recovery is a no-op.
        if let Some(last) = record.incidents.last_mut() {
            if last.is_open() {
                last.end = Some(result.time);
            }
        }
    }

    record.last_status = Some(result);
    record.detailed_logs.push(result);
}

/// Enforce the retention bounds on one record.
///
/// Log eviction is size-triggered and age-based, not a ring buffer:
/// below the high-water mark nothing is evicted regardless of age, and
/// between compactions the list may exceed the nominal cap. The incident
/// cap keeps only the most recent entries, even if that discards an open
/// incident.
pub fn compact(record: &mut MonitorRecord, now_ms: u64) {
    if record.detailed_logs.len() > LOG_HIGH_WATER_MARK {
        let limit = now_ms.saturating_sub(RETENTION_WINDOW_MS);
        record.detailed_logs.retain(|log| log.time > limit);
    }

    if record.incidents.len() > INCIDENT_CAP {
        let excess = record.incidents.len() - INCIDENT_CAP;
        record.incidents.drain(..excess);
    }
}

/// Drop every record whose id is no longer in the configured target list.
///
/// Makes the persisted state map self-pruning as configuration changes;
/// surviving records are left untouched.
pub fn reconcile(state: &mut StateMap, config: &MonitorConfig) {
    let active: HashSet<&str> = config.urls.iter().map(|t| t.id.as_str()).collect();
    state.retain(|id, _| active.contains(id.as_str()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use uptime_state::Target;

    fn test_record() -> MonitorRecord {
        MonitorRecord::new(&Target {
            id: "a".to_string(),
            name: "A".to_string(),
            url: "https://a.example".to_string(),
            category_id: "general".to_string(),
        })
    }

    fn ok_at(time: u64) -> ProbeResult {
        ProbeResult {
            status: 200,
            ok: true,
            response_time: 10,
            time,
        }
    }

    fn fail_at(time: u64, status: u16) -> ProbeResult {
        ProbeResult {
            status,
            ok: false,
            response_time: 0,
            time,
        }
    }

    // ── State machine ──────────────────────────────────────────────

    #[test]
    fn healthy_probes_open_no_incident() {
        let mut record = test_record();
        apply_probe(&mut record, ok_at(0));
        apply_probe(&mut record, ok_at(10));

        assert!(record.incidents.is_empty());
        assert_eq!(record.detailed_logs.len(), 2);
        assert!(record.last_status.unwrap().ok);
    }

    #[test]
    fn first_probe_failure_opens_incident_immediately() {
        // No prior status counts as "was healthy".
        let mut record = test_record();
        apply_probe(&mut record, fail_at(20, 503));

        assert_eq!(record.incidents.len(), 1);
        let incident = record.incidents[0];
        assert_eq!(incident.start, 20);
        assert!(incident.is_open());
        assert_eq!(incident.code, 503);
    }

    #[test]
    fn outage_and_recovery_close_the_same_incident() {
        // Scenario: healthy at t=0,10; fails at t=20 with 500; recovers at t=30.
        let mut record = test_record();
        apply_probe(&mut record, ok_at(0));
        apply_probe(&mut record, ok_at(10));
        apply_probe(&mut record, fail_at(20, 500));

        assert_eq!(record.open_incident().unwrap().start, 20);

        apply_probe(&mut record, ok_at(30));

        assert_eq!(record.incidents.len(), 1);
        let incident = record.incidents[0];
        assert_eq!(incident.start, 20);
        assert_eq!(incident.end, Some(30));
        assert_eq!(incident.code, 500);
        assert!(record.open_incident().is_none());
    }

    #[test]
    fn continued_failure_keeps_one_open_incident_and_original_code() {
        let mut record = test_record();
        apply_probe(&mut record, fail_at(0, 500));
        apply_probe(&mut record, fail_at(10, 502));
        apply_probe(&mut record, fail_at(20, 503));

        assert_eq!(record.incidents.len(), 1);
        assert_eq!(record.incidents[0].code, 500);
        assert!(record.incidents[0].is_open());
    }

    #[test]
    fn at_most_one_incident_open_across_transitions() {
        let mut record = test_record();
        for (time, ok) in [
            (0, true),
            (10, false),
            (20, false),
            (30, true),
            (40, false),
            (50, true),
            (60, true),
            (70, false),
        ] {
            let result = if ok { ok_at(time) } else { fail_at(time, 500) };
            apply_probe(&mut record, result);

            let open = record.incidents.iter().filter(|i| i.is_open()).count();
            assert!(open <= 1, "more than one open incident at t={time}");
            // Only the chronologically last incident may be open.
            for incident in &record.incidents[..record.incidents.len().saturating_sub(1)] {
                assert!(!incident.is_open());
            }
        }
        assert_eq!(record.incidents.len(), 3);
    }

    #[test]
    fn recovery_without_open_incident_is_a_noop() {
        // Inconsistent state: unhealthy lastStatus but the only incident
        // is already closed.
        let mut record = test_record();
        record.last_status = Some(fail_at(10, 500));
        record.incidents.push(Incident {
            start: 0,
            end: Some(5),
            code: 500,
        });

        apply_probe(&mut record, ok_at(20));

        assert_eq!(record.incidents.len(), 1);
        assert_eq!(record.incidents[0].end, Some(5));
    }

    #[test]
    fn recovery_leaves_earlier_incidents_untouched() {
        let mut record = test_record();
        apply_probe(&mut record, fail_at(0, 500));
        apply_probe(&mut record, ok_at(10));
        apply_probe(&mut record, fail_at(20, 502));
        apply_probe(&mut record, ok_at(30));

        assert_eq!(record.incidents.len(), 2);
        assert_eq!(record.incidents[0].end, Some(10));
        assert_eq!(record.incidents[1].end, Some(30));
    }

    #[test]
    fn last_status_overwritten_unconditionally() {
        let mut record = test_record();
        apply_probe(&mut record, ok_at(0));
        apply_probe(&mut record, fail_at(10, 500));

        let last = record.last_status.unwrap();
        assert_eq!(last.status, 500);
        assert_eq!(last.time, 10);
    }

    // ── Retention ──────────────────────────────────────────────────

    #[test]
    fn logs_below_high_water_mark_never_evicted() {
        let mut record = test_record();
        // Ancient entries, but under the size trigger.
        for i in 0..100 {
            record.detailed_logs.push(ok_at(i));
        }

        compact(&mut record, RETENTION_WINDOW_MS * 10);

        assert_eq!(record.detailed_logs.len(), 100);
    }

    #[test]
    fn logs_above_high_water_mark_evicted_by_age() {
        let now = RETENTION_WINDOW_MS * 2;
        let limit = now - RETENTION_WINDOW_MS;
        let mut record = test_record();
        // Half stale, half fresh, together past the trigger.
        for i in 0..LOG_HIGH_WATER_MARK as u64 + 100 {
            let time = if i % 2 == 0 { limit - 1 } else { limit + i };
            record.detailed_logs.push(ok_at(time));
        }

        compact(&mut record, now);

        assert!(record.detailed_logs.iter().all(|l| l.time > limit));
        assert!(!record.detailed_logs.is_empty());
    }

    #[test]
    fn incidents_capped_to_most_recent() {
        let mut record = test_record();
        for i in 0..70u64 {
            record.incidents.push(Incident {
                start: i,
                end: Some(i + 1),
                code: 500,
            });
        }

        compact(&mut record, 0);

        assert_eq!(record.incidents.len(), INCIDENT_CAP);
        // Exactly the most recent entries by insertion order survive.
        assert_eq!(record.incidents[0].start, 20);
        assert_eq!(record.incidents[INCIDENT_CAP - 1].start, 69);
    }

    #[test]
    fn incident_cap_not_applied_below_threshold() {
        let mut record = test_record();
        for i in 0..INCIDENT_CAP as u64 {
            record.incidents.push(Incident {
                start: i,
                end: Some(i + 1),
                code: 500,
            });
        }

        compact(&mut record, 0);

        assert_eq!(record.incidents.len(), INCIDENT_CAP);
        assert_eq!(record.incidents[0].start, 0);
    }

    // ── Reconciliation ─────────────────────────────────────────────

    #[test]
    fn reconcile_prunes_stale_and_preserves_active() {
        let mut config = MonitorConfig::default();
        config.urls.truncate(2); // keep "google", "github"

        let mut state = StateMap::new();
        for target in MonitorConfig::default().urls {
            let mut record = MonitorRecord::new(&target);
            apply_probe(&mut record, fail_at(0, 500));
            state.insert(target.id.clone(), record);
        }
        assert_eq!(state.len(), 3);

        reconcile(&mut state, &config);

        assert_eq!(state.len(), 2);
        assert!(state.contains_key("google"));
        assert!(state.contains_key("github"));
        assert!(!state.contains_key("example"));
        // Surviving records keep their history.
        assert_eq!(state["google"].incidents.len(), 1);
    }
}
