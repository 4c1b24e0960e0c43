//! StateStore — redb-backed persistence for uptimed.
//!
//! Holds exactly two JSON blobs: the full state map under `uptime_data`
//! and the monitoring configuration under `config`. Both are read and
//! written whole, so consumers only ever observe them at blob granularity.
//! The store supports both on-disk and in-memory backends (the latter for
//! testing).

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable};
use tracing::{debug, warn};

use crate::error::{StateError, StateResult};
use crate::tables::{BLOBS, CONFIG_KEY, STATE_KEY};
use crate::types::{MonitorConfig, StateMap};

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

/// Thread-safe state store backed by redb.
#[derive(Clone)]
pub struct StateStore {
    db: Arc<Database>,
}

impl StateStore {
    /// Open (or create) a persistent state store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "state store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory state store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory state store opened");
        Ok(store)
    }

    /// Create the blobs table if it doesn't exist yet.
    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(BLOBS).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    /// Read a raw blob by key.
    fn get_blob(&self, key: &str) -> StateResult<Option<Vec<u8>>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(BLOBS).map_err(map_err!(Table))?;
        match table.get(key).map_err(map_err!(Read))? {
            Some(guard) => Ok(Some(guard.value().to_vec())),
            None => Ok(None),
        }
    }

    /// Write a raw blob by key in a single committed transaction.
    fn put_blob(&self, key: &str, value: &[u8]) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(BLOBS).map_err(map_err!(Table))?;
            table.insert(key, value).map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    // ── State map ──────────────────────────────────────────────────

    /// Load the full state map. A missing blob is an empty map; a
    /// malformed blob is an error (monitoring history must not be
    /// silently discarded).
    pub fn load_state(&self) -> StateResult<StateMap> {
        match self.get_blob(STATE_KEY)? {
            Some(bytes) => serde_json::from_slice(&bytes).map_err(map_err!(Deserialize)),
            None => Ok(StateMap::new()),
        }
    }

    /// Persist the full state map as one blob.
    pub fn save_state(&self, state: &StateMap) -> StateResult<()> {
        let value = serde_json::to_vec(state).map_err(map_err!(Serialize))?;
        self.put_blob(STATE_KEY, &value)?;
        debug!(targets = state.len(), "state map persisted");
        Ok(())
    }

    // ── Configuration ──────────────────────────────────────────────

    /// Load the monitoring configuration. Missing and malformed blobs
    /// both fall back to the built-in default.
    pub fn load_config(&self) -> StateResult<MonitorConfig> {
        match self.get_blob(CONFIG_KEY)? {
            Some(bytes) => match serde_json::from_slice(&bytes) {
                Ok(config) => Ok(config),
                Err(e) => {
                    warn!(error = %e, "malformed persisted config, using default");
                    Ok(MonitorConfig::default())
                }
            },
            None => Ok(MonitorConfig::default()),
        }
    }

    /// Persist a replacement configuration verbatim.
    pub fn save_config(&self, config: &MonitorConfig) -> StateResult<()> {
        let value = serde_json::to_vec(config).map_err(map_err!(Serialize))?;
        self.put_blob(CONFIG_KEY, &value)?;
        debug!(targets = config.urls.len(), "config persisted");
        Ok(())
    }
}
