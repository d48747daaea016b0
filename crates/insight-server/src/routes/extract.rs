use std::time::Instant;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use insight_core::imageio::loader::ACCEPTED_UPLOAD_MIMES;
use insight_core::{ExtractMetadata, ImageInput, decode_input};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::response::InsightResponse;
use crate::state::AppState;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Detail sent when the request carries no image.
pub const NO_INPUT_DETAIL: &str = "file media not supported";

pub fn routes() -> Router<AppState> {
    Router::new().route("/extract", post(extract))
}

/// Raw multipart fields of an extraction request.
#[derive(Debug, Default)]
struct ExtractForm {
    file: Option<(Vec<u8>, Option<String>)>,
    url: Option<String>,
    base64str: Option<String>,
    metadata: Option<String>,
}

impl ExtractForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    let mime = field.content_type().map(str::to_string);
                    let data = field.bytes().await?;
                    if !data.is_empty() {
                        form.file = Some((data.to_vec(), mime));
                    }
                }
                "url" => form.url = non_blank(field.text().await?),
                "base64str" => form.base64str = non_blank(field.text().await?),
                "metadata" => form.metadata = Some(field.text().await?),
                other => debug!(field = other, "ignoring unknown multipart field"),
            }
        }
        Ok(form)
    }

    /// Picks the input by precedence: file, then url, then base64str.
    fn into_input(self) -> Result<(ImageInput, Option<String>), ApiError> {
        let input = if let Some((data, mime)) = self.file {
            let accepted = mime
                .as_deref()
                .is_some_and(|m| ACCEPTED_UPLOAD_MIMES.contains(&m));
            if !accepted {
                return Err(ApiError::unsupported_media("Invalid file type."));
            }
            ImageInput::Bytes { data, mime }
        } else if let Some(url) = self.url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ApiError::bad_request("url must use http or https"));
            }
            ImageInput::Url(url)
        } else if let Some(text) = self.base64str {
            ImageInput::Base64(text)
        } else {
            return Err(ApiError::unsupported_media(NO_INPUT_DETAIL));
        };
        Ok((input, self.metadata))
    }
}

fn non_blank(text: String) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

async fn extract(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let request_id = Uuid::new_v4();
    let started = Instant::now();

    let result = run_extract(&state, multipart, request_id).await;
    let elapsed_ms = started.elapsed().as_millis();

    let mut response = match result {
        Ok(body) => {
            info!(%request_id, elapsed_ms, "extraction succeeded");
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => {
            if err.status.is_server_error() {
                error!(%request_id, status = %err.status, elapsed_ms, "extraction failed");
            } else {
                warn!(
                    %request_id,
                    status = %err.status,
                    detail = %err.detail,
                    "extraction rejected"
                );
            }
            err.into_response()
        }
    };

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

async fn run_extract(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
    request_id: Uuid,
) -> Result<InsightResponse, ApiError> {
    // A request without a multipart form carries no image.
    let multipart = multipart.map_err(|rejection| {
        debug!(%request_id, reason = %rejection.body_text(), "no multipart form");
        ApiError::unsupported_media(NO_INPUT_DETAIL)
    })?;
    let (input, metadata) = ExtractForm::read(multipart).await?.into_input()?;
    info!(%request_id, input = input.kind(), "extraction requested");

    let metadata = ExtractMetadata::parse(metadata.as_deref().unwrap_or_default())?;
    let input = state.loader.materialize(input).await?;

    let facade = state.facade.clone();
    let insight = tokio::task::spawn_blocking(move || {
        let loaded = decode_input(input)?;
        debug!(mime = %loaded.mime, dims = ?loaded.image.dimensions(), "image decoded");
        facade.process_image(&loaded.image, &metadata)
    })
    .await
    .map_err(|e| {
        error!(%request_id, error = %e, "processing task failed");
        ApiError::internal()
    })??;

    Ok(InsightResponse::success(request_id, insight))
}
