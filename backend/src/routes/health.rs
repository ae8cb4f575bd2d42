//! Probe endpoints for orchestrators
//!
//! `/health` and `/health/live` only prove the process answers. `/health/ready`
//! additionally pings the user store and turns 503 while it is unreachable.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::warn;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize)]
pub struct ProbeReport {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageState {
    Reachable,
    Unreachable,
}

fn report(status: &'static str, storage: Option<StorageState>) -> Json<ProbeReport> {
    Json(ProbeReport {
        status,
        version: VERSION,
        storage,
    })
}

/// GET /health
pub async fn health_check() -> Json<ProbeReport> {
    report("healthy", None)
}

/// GET /health/live
pub async fn liveness_check() -> Json<ProbeReport> {
    report("alive", None)
}

/// GET /health/ready
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ProbeReport>) {
    match state.users().store().ping().await {
        Ok(()) => (StatusCode::OK, report("ready", Some(StorageState::Reachable))),
        Err(e) => {
            warn!(error = %e, "Store ping failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                report("not_ready", Some(StorageState::Unreachable)),
            )
        }
    }
}
