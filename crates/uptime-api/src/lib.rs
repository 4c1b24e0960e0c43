//! uptime-api — HTTP interface for uptimed.
//!
//! A single query-parameterized endpoint, mirroring the persisted blobs:
//!
//! | Request | Response |
//! |---|---|
//! | GET `/?api=true` | `{ metrics, config }` JSON, permissive CORS |
//! | POST `/?admin=true` | password-gated full config replacement |
//! | anything else | the static HTML status page |
//!
//! The admin write compares a SHA-256 hash of the submitted password
//! against the trusted hash the daemon was started with; nothing is
//! mutated on a mismatch.

pub mod handlers;

use axum::routing::get;
use axum::Router;
use uptime_state::StateStore;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub store: StateStore,
    /// Hex-encoded SHA-256 of the admin password. `None` disables the
    /// admin write path entirely.
    pub admin_password_hash: Option<String>,
}

/// Build the complete router.
pub fn build_router(store: StateStore, admin_password_hash: Option<String>) -> Router {
    let state = ApiState {
        store,
        admin_password_hash,
    };

    Router::new()
        .route("/", get(handlers::index).post(handlers::admin))
        .fallback(handlers::index)
        .with_state(state)
}
