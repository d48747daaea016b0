use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use insight_core::InsightError;
use thiserror::Error;

use crate::response::ErrorBody;

/// Detail returned for failures that are not the caller's fault.
pub const SERVER_ERROR_DETAIL: &str = "server error";

/// An HTTP error with a client-facing detail message.
#[derive(Debug, Error)]
#[error("{status}: {detail}")]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    pub fn unsupported_media(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, detail)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_DETAIL)
    }
}

impl From<InsightError> for ApiError {
    fn from(err: InsightError) -> Self {
        if !err.is_client_error() {
            return Self::internal();
        }
        let status = match &err {
            InsightError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            InsightError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            InsightError::Fetch(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new(status, err.to_string())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::new(err.status(), err.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody::new(self.detail))).into_response()
    }
}
