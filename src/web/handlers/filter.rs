// POST /v1/filter-bulk: moderate a batch of chat messages.
//
// Returns 200 with the full, index-aligned result batch.
// Returns 400 INVALID_ARGUMENT if the body is absent, null or undecodable.
// Returns 408 CANCELLED if the batch does not finish within the deadline.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::error::ModerationError;
use crate::filter::ChatMessageBulk;
use crate::web::AppState;

pub async fn filter_bulk(
    State(state): State<AppState>,
    body: Result<Json<Option<ChatMessageBulk>>, JsonRejection>,
) -> Response {
    let bulk = match body {
        Ok(Json(bulk)) => bulk,
        Err(rejection) => {
            return ModerationError::InvalidArgument(rejection.body_text()).into_response();
        }
    };

    match state
        .filter
        .filter_bulk_within(bulk, state.request_timeout)
        .await
    {
        Ok(result) => Json(result).into_response(),
        Err(e) => e.into_response(),
    }
}
