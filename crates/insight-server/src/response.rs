use axum::http::StatusCode;
use insight_core::ImageInsight;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::macros::format_description;
use uuid::Uuid;

/// Successful extraction response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightResponse {
    pub id: String,
    pub insight: serde_json::Value,
    pub image_height: u32,
    pub image_width: u32,
    pub status_code: u16,
    pub message: String,
    /// UTC creation time, `YYYYMMDD::HHMMSS`.
    pub created_at: String,
}

impl InsightResponse {
    pub fn success(id: Uuid, insight: ImageInsight) -> Self {
        Self {
            id: id.to_string(),
            insight: insight.insight,
            image_height: insight.image_height,
            image_width: insight.image_width,
            status_code: StatusCode::OK.as_u16(),
            message: "success".to_string(),
            created_at: created_at(OffsetDateTime::now_utc()),
        }
    }
}

/// Error response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Formats a timestamp as `YYYYMMDD::HHMMSS`.
pub fn created_at(at: OffsetDateTime) -> String {
    at.format(format_description!("[year][month][day]::[hour][minute][second]"))
        .unwrap_or_default()
}
