//! Domain types for the uptimed state store.
//!
//! These types represent the persisted monitoring state (per-target
//! records, probe logs, incidents) and the monitoring configuration.
//! Serialized field names are camelCase so the persisted JSON matches the
//! wire format served by the API.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for a monitored target.
pub type TargetId = String;

/// The full persisted monitoring state: target id → monitor record.
pub type StateMap = HashMap<TargetId, MonitorRecord>;

// ── Configuration ─────────────────────────────────────────────────

/// One monitored URL with identity, display name, and category.
///
/// Identity is `id`; the other fields are display attributes and are
/// re-synced into the monitor record on every tick, so renaming a target
/// in config never loses its history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub id: TargetId,
    pub name: String,
    pub url: String,
    #[serde(default = "default_category_id")]
    pub category_id: String,
}

fn default_category_id() -> String {
    "none".to_string()
}

/// Display grouping for targets. Not consumed by the core logic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub default_open: bool,
}

/// Monitoring configuration, externally replaceable in full.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonitorConfig {
    /// Monitored targets, in display order.
    pub urls: Vec<Target>,
    pub categories: Vec<Category>,
    /// HTTP status codes considered healthy.
    pub success_codes: Vec<u16>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            urls: vec![
                Target {
                    id: "google".to_string(),
                    name: "Google".to_string(),
                    url: "https://www.google.com".to_string(),
                    category_id: "general".to_string(),
                },
                Target {
                    id: "github".to_string(),
                    name: "GitHub".to_string(),
                    url: "https://github.com".to_string(),
                    category_id: "general".to_string(),
                },
                Target {
                    id: "example".to_string(),
                    name: "Example".to_string(),
                    url: "https://www.example.com".to_string(),
                    category_id: "internal".to_string(),
                },
            ],
            categories: vec![
                Category {
                    id: "general".to_string(),
                    name: "General".to_string(),
                    default_open: true,
                },
                Category {
                    id: "internal".to_string(),
                    name: "Internal systems".to_string(),
                    default_open: true,
                },
            ],
            success_codes: vec![200, 201, 202, 203, 204, 301, 302, 307, 308],
        }
    }
}

// ── Probe results ─────────────────────────────────────────────────

/// Sentinel status for probes that failed before any HTTP response
/// (DNS failure, connection refused, timeout, malformed response).
/// Distinct from every real HTTP status code.
pub const STATUS_FAILED: u16 = 0;

/// Outcome of a single reachability check against a target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    /// HTTP status code, or [`STATUS_FAILED`] for transport failures.
    pub status: u16,
    /// Whether `status` is in the configured success-code set.
    pub ok: bool,
    /// Wall-clock milliseconds to response headers; 0 on failure.
    pub response_time: u64,
    /// Probe timestamp, unix epoch milliseconds.
    pub time: u64,
}

// ── Incidents ─────────────────────────────────────────────────────

/// A contiguous interval during which a target was unhealthy.
///
/// Invariant: per target, at most one incident is open at a time, and only
/// the chronologically last incident may be open.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    /// Timestamp of the first failing probe after a healthy period.
    pub start: u64,
    /// Timestamp of the first succeeding probe afterwards; `None` (JSON
    /// `null`) while the outage is ongoing.
    pub end: Option<u64>,
    /// The status that triggered the incident. Not updated by later
    /// failing probes within the same outage.
    pub code: u16,
}

impl Incident {
    /// Whether this incident is still ongoing.
    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }
}

// ── Monitor records ───────────────────────────────────────────────

/// Per-target monitoring state: display attributes, the most recent probe,
/// bounded probe history, and bounded incident history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonitorRecord {
    pub name: String,
    pub url: String,
    pub category_id: String,
    /// Most recent probe result; `None` until the first probe completes.
    pub last_status: Option<ProbeResult>,
    /// Chronological probe history.
    pub detailed_logs: Vec<ProbeResult>,
    /// Chronological incident history, ordered by `start`.
    pub incidents: Vec<Incident>,
}

impl MonitorRecord {
    /// Fresh record for a previously-unseen target.
    pub fn new(target: &Target) -> Self {
        Self {
            name: target.name.clone(),
            url: target.url.clone(),
            category_id: target.category_id.clone(),
            last_status: None,
            detailed_logs: Vec::new(),
            incidents: Vec::new(),
        }
    }

    /// Re-sync mutable display attributes from the current configuration.
    pub fn sync_target(&mut self, target: &Target) {
        self.name = target.name.clone();
        self.url = target.url.clone();
        self.category_id = target.category_id.clone();
    }

    /// The incident currently open, if any.
    pub fn open_incident(&self) -> Option<&Incident> {
        self.incidents.last().filter(|i| i.is_open())
    }
}
