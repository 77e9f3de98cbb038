use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::state::{AppState, ServiceStatus};

/// GET /health
/// Returns the startup readiness report. 503 when recommendations cannot be served.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let readiness = &*state.readiness;
    let status = match readiness.status {
        ServiceStatus::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        ServiceStatus::Ok | ServiceStatus::Degraded => StatusCode::OK,
    };

    (
        status,
        Json(json!({
            "status": readiness.status,
            "version": env!("CARGO_PKG_VERSION"),
            "service": "compass-api",
            "components": readiness.components,
            "checked_at": readiness.checked_at,
        })),
    )
}
