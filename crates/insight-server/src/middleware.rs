use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_LENGTH;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// Paths that skip the declared-size check.
const UNLIMITED_PATHS: &[&str] = &["/", "/health"];

pub const SIZE_LIMIT_DETAIL: &str = "File size exceeds limit";

/// Rejects requests whose declared `Content-Length` is above the body limit.
///
/// Bodies without a declared length are bounded by `DefaultBodyLimit` instead.
pub async fn limit_request_size(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if UNLIMITED_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let declared = request
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());

    if let Some(len) = declared {
        debug!(content_length = len, path = %request.uri().path(), "request size");
        if len > state.max_body_bytes {
            warn!(
                content_length = len,
                limit = state.max_body_bytes,
                "rejecting oversized request"
            );
            return ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, SIZE_LIMIT_DETAIL).into_response();
        }
    }

    next.run(request).await
}
