//! Route handlers.
//!
//! Reads go straight to the `StateStore` blobs; the admin write replaces
//! the configuration verbatim after the password hash check.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use uptime_state::{MonitorConfig, StateMap};

use crate::ApiState;

static INDEX_HTML: &str = include_str!("../static/index.html");

/// Mode selectors carried as query parameters.
#[derive(Debug, Deserialize, Default)]
pub struct RootQuery {
    api: Option<String>,
    admin: Option<String>,
}

/// Body of the status API response.
#[derive(serde::Serialize)]
struct StatusResponse {
    metrics: StateMap,
    config: MonitorConfig,
}

/// Body of an admin write.
#[derive(Debug, Deserialize)]
pub struct AdminRequest {
    pub password: String,
    pub config: Option<MonitorConfig>,
}

fn error_response(msg: &str, status: StatusCode) -> Response {
    (status, Json(serde_json::json!({ "error": msg }))).into_response()
}

/// Hex-encoded SHA-256 of a password.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// GET (and fallback) handler.
///
/// `?api=true` returns the current state map and configuration as JSON
/// with permissive cross-origin access; any other request shape gets the
/// static status page.
pub async fn index(
    Query(query): Query<RootQuery>,
    State(state): State<ApiState>,
) -> Response {
    if query.api.as_deref() == Some("true") {
        let metrics = match state.store.load_state() {
            Ok(metrics) => metrics,
            Err(e) => {
                return error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR)
            }
        };
        let config = match state.store.load_config() {
            Ok(config) => config,
            Err(e) => {
                return error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR)
            }
        };
        return (
            [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
            Json(StatusResponse { metrics, config }),
        )
            .into_response();
    }

    Html(INDEX_HTML).into_response()
}

/// POST handler.
///
/// Without `?admin=true` the request falls through to the status page.
/// With it, the password hash is checked first; an authorized request
/// missing the `config` field is an explicit error rather than a silent
/// no-op. The replacement config is persisted verbatim, unvalidated.
pub async fn admin(
    Query(query): Query<RootQuery>,
    State(state): State<ApiState>,
    body: Result<Json<AdminRequest>, JsonRejection>,
) -> Response {
    if query.admin.as_deref() != Some("true") {
        return Html(INDEX_HTML).into_response();
    }

    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return error_response(&rejection.to_string(), StatusCode::BAD_REQUEST)
        }
    };

    let authorized = state
        .admin_password_hash
        .as_deref()
        .is_some_and(|trusted| hash_password(&request.password) == trusted);
    if !authorized {
        warn!("admin write rejected: password mismatch");
        return error_response("Unauthorized", StatusCode::UNAUTHORIZED);
    }

    let Some(config) = request.config else {
        return error_response("config required", StatusCode::BAD_REQUEST);
    };

    match state.store.save_config(&config) {
        Ok(()) => {
            info!(targets = config.urls.len(), "configuration replaced");
            Json(serde_json::json!({ "success": true })).into_response()
        }
        Err(e) => error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR),
    }
}
