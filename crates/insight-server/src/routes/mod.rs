//! HTTP routes.

pub mod basic;
pub mod extract;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::limit_request_size;
use crate::state::AppState;

/// Prefix of the extraction API.
pub const EXTRACT_PREFIX: &str = "/v2/image_insight";

/// Builds the application router with its middleware stack.
pub fn router(state: AppState) -> Router {
    let body_limit = state.max_body_bytes;

    Router::new()
        .merge(basic::routes())
        .nest(EXTRACT_PREFIX, extract::routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            limit_request_size,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::time::Duration;

    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::Response;
    use insight_core::{ImageLoader, InsightFacade};
    use serde_json::Value;

    use super::router;
    use crate::state::AppState;

    /// A 1x1 PNG.
    pub const PNG_DATA_URL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    pub fn png_bytes() -> Vec<u8> {
        insight_core::imageio::split_data_url(PNG_DATA_URL).unwrap().0
    }

    pub fn app_with(facade: InsightFacade, max_body_bytes: usize) -> Router {
        let loader = ImageLoader::new(1024 * 1024, Duration::from_secs(2)).unwrap();
        router(AppState::new("test app", facade, loader, max_body_bytes))
    }

    pub fn app() -> Router {
        app_with(InsightFacade::dimensions(), 10 * 1024 * 1024)
    }

    pub async fn json_body(response: Response<Body>) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Serves one canned HTTP response on a local port and returns its base URL.
    pub async fn serve_once(head: &str, body: Vec<u8>) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let mut response = format!("{head}\r\nConnection: close\r\n\r\n").into_bytes();
        response.extend_from_slice(&body);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(&response).await.unwrap();
            socket.shutdown().await.ok();
        });
        format!("http://{addr}")
    }

    pub struct Part<'a> {
        pub name: &'a str,
        pub filename: Option<&'a str>,
        pub content_type: Option<&'a str>,
        pub data: Vec<u8>,
    }

    impl<'a> Part<'a> {
        pub fn text(name: &'a str, value: &str) -> Self {
            Self {
                name,
                filename: None,
                content_type: None,
                data: value.as_bytes().to_vec(),
            }
        }

        pub fn file(name: &'a str, content_type: &'a str, data: Vec<u8>) -> Self {
            Self {
                name,
                filename: Some("upload.bin"),
                content_type: Some(content_type),
                data,
            }
        }
    }

    pub const BOUNDARY: &str = "insight-test-boundary";

    pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
            if let Some(filename) = part.filename {
                disposition.push_str(&format!("; filename=\"{filename}\""));
            }
            body.extend_from_slice(disposition.as_bytes());
            body.extend_from_slice(b"\r\n");
            if let Some(content_type) = part.content_type {
                body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
            }
            body.extend_from_slice(b"\r\n");
            body.extend_from_slice(&part.data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }
}
