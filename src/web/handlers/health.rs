// Health handlers: POST /v1/check (RPC surface) and GET /health (probe).

use axum::extract::State;
use axum::Json;

use crate::filter::HealthCheckResponse;
use crate::web::AppState;

/// POST /v1/check: the RPC-level liveness check.
pub async fn check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    Json(state.filter.check())
}

/// GET /health: unauthenticated probe for process supervisors.
pub async fn health(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    Json(state.filter.check())
}
