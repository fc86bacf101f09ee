// Web server: axum binding of the filter RPC surface.
//
// Routes:
//   POST /v1/check        liveness over the RPC surface (gated)
//   POST /v1/filter-bulk  bulk moderation (gated)
//   GET  /health          supervisor probe (never gated)
//
// Layer stack, outermost first: trace -> CORS -> auth gate -> handler.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::AuthGate;
use crate::error::ModerationError;
use crate::filter::FilterService;

pub mod auth;
pub mod handlers;

/// Shared application state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub filter: FilterService,
    pub gate: AuthGate,
    pub request_timeout: Duration,
}

/// Serve until `shutdown` resolves, then drain in-flight calls and return.
pub async fn run_server(
    state: AppState,
    port: u16,
    bind: &str,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let app = build_router(state);

    let addr = format!("{bind}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("chat-filter listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let rpc = Router::new()
        .route("/v1/check", post(handlers::health::check))
        .route("/v1/filter-bulk", post(handlers::filter::filter_bulk))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    let public = Router::new().route("/health", get(handlers::health::health));

    Router::new()
        .merge(rpc)
        .merge(public)
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Typed JSON error response helper.
pub fn api_error(status: StatusCode, kind: &str, message: &str) -> Response {
    (
        status,
        axum::Json(serde_json::json!({ "error": kind, "message": message })),
    )
        .into_response()
}

impl IntoResponse for ModerationError {
    fn into_response(self) -> Response {
        let status = match &self {
            ModerationError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ModerationError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ModerationError::Cancelled(_) => StatusCode::REQUEST_TIMEOUT,
        };
        api_error(status, self.kind(), &self.to_string())
    }
}
