// Auth middleware: runs the authorization gate before any RPC handler.
//
// A rejected call never reaches the handler, so no filtering work happens.
// Validated claims are inserted into request extensions for handlers that
// want the caller's identity.

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use super::AppState;
use crate::error::{AuthError, ModerationError};

/// Axum middleware: reject calls without a valid bearer credential with 401.
pub async fn require_auth(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let authorization = match request.headers().get(header::AUTHORIZATION) {
        None => None,
        Some(value) => match value.to_str() {
            Ok(s) => Some(s),
            Err(_) => {
                return reject(AuthError::InvalidCredential(
                    "authorization header is not valid text".to_string(),
                ))
            }
        },
    };

    match state.gate.authorize(authorization) {
        Ok(claims) => {
            if let Some(claims) = claims {
                request.extensions_mut().insert(claims);
            }
            next.run(request).await
        }
        Err(e) => reject(e),
    }
}

fn reject(error: AuthError) -> Response {
    debug!(error = %error, "Rejected unauthenticated call");
    ModerationError::from(error).into_response()
}
