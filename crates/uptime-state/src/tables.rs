//! redb table definitions for the uptimed state store.
//!
//! A single table of `&str` keys and `&[u8]` values (JSON-serialized
//! documents) holds the two whole-document blobs the monitor works with.

use redb::TableDefinition;

/// Whole-document blobs keyed by [`STATE_KEY`] and [`CONFIG_KEY`].
pub const BLOBS: TableDefinition<&str, &[u8]> = TableDefinition::new("blobs");

/// Key for the full state map (target id → monitor record).
pub const STATE_KEY: &str = "uptime_data";

/// Key for the monitoring configuration.
pub const CONFIG_KEY: &str = "config";
