//! Input dispatch and remote image download.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info};

use super::data_url::bytes_to_data_url;
use super::{DEFAULT_MIME, DecodedImage, decode_base64, decode_bytes, decode_file};
use crate::error::{InsightError, Result};

/// Default bound for downloaded images.
pub const DEFAULT_MAX_DOWNLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Default timeout for remote image downloads.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// MIME types accepted for uploaded files.
pub const ACCEPTED_UPLOAD_MIMES: &[&str] = &["image/jpeg", "image/png", "application/pdf"];

/// An image as handed over by a caller, before decoding.
#[derive(Debug, Clone)]
pub enum ImageInput {
    /// Encoded image bytes with an optional declared MIME type.
    Bytes {
        data: Vec<u8>,
        mime: Option<String>,
    },
    /// A `http://` or `https://` URL.
    Url(String),
    /// A base64 string, optionally a `data:` URL.
    Base64(String),
    /// A file on the local filesystem.
    Path(PathBuf),
    /// An image that is already decoded.
    Decoded(DecodedImage),
}

impl ImageInput {
    /// Classifies free text: URLs first, then existing files, otherwise base64.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else if !trimmed.is_empty() && Path::new(trimmed).exists() {
            Self::Path(PathBuf::from(trimmed))
        } else {
            Self::Base64(text.to_string())
        }
    }

    /// Short name used in logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bytes { .. } => "bytes",
            Self::Url(_) => "url",
            Self::Base64(_) => "base64",
            Self::Path(_) => "path",
            Self::Decoded(_) => "decoded",
        }
    }
}

/// A decoded image together with the MIME type it was received as.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub image: DecodedImage,
    pub mime: String,
}

/// Decodes every input kind that does not need network access.
///
/// # Errors
///
/// `UnsupportedMediaType` for PDFs and for `ImageInput::Url`, which must go
/// through [`ImageLoader::load`] or [`ImageLoader::materialize`] first.
pub fn decode_input(input: ImageInput) -> Result<LoadedImage> {
    match input {
        ImageInput::Decoded(image) => {
            debug!("input already decoded, skipping");
            Ok(LoadedImage {
                image,
                mime: DEFAULT_MIME.to_string(),
            })
        }
        ImageInput::Bytes { data, mime } => {
            let mime = mime.unwrap_or_else(|| DEFAULT_MIME.to_string());
            if mime == "application/pdf" {
                return Err(InsightError::UnsupportedMediaType { mime });
            }
            debug!(len = data.len(), %mime, "decoding image bytes");
            Ok(LoadedImage {
                image: decode_bytes(&data)?,
                mime,
            })
        }
        ImageInput::Base64(text) => {
            debug!("decoding base64 image");
            let (image, mime) = decode_base64(&text)?;
            Ok(LoadedImage { image, mime })
        }
        ImageInput::Path(path) => {
            debug!(path = %path.display(), "decoding image file");
            Ok(LoadedImage {
                image: decode_file(&path)?,
                mime: DEFAULT_MIME.to_string(),
            })
        }
        ImageInput::Url(url) => Err(InsightError::UnsupportedMediaType {
            mime: format!("remote url {url} must be fetched before decoding"),
        }),
    }
}

/// Downloads remote images with a bounded body size and decodes inputs.
#[derive(Debug, Clone)]
pub struct ImageLoader {
    client: reqwest::Client,
    max_download_bytes: usize,
}

impl ImageLoader {
    /// Builds a loader with its own HTTP client.
    pub fn new(max_download_bytes: usize, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InsightError::Fetch(e.to_string()))?;
        Ok(Self::with_client(client, max_download_bytes))
    }

    #[must_use]
    pub fn with_client(client: reqwest::Client, max_download_bytes: usize) -> Self {
        Self {
            client,
            max_download_bytes,
        }
    }

    #[must_use]
    pub fn max_download_bytes(&self) -> usize {
        self.max_download_bytes
    }

    /// Downloads `url`, returning the body and the MIME from `Content-Type`.
    pub async fn fetch(&self, url: &str) -> Result<(Vec<u8>, String)> {
        info!(%url, "fetching remote image");
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| InsightError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(InsightError::Fetch(format!("{url} returned {status}")));
        }

        let limit = self.max_download_bytes;
        if response
            .content_length()
            .is_some_and(|len| len > limit as u64)
        {
            return Err(InsightError::PayloadTooLarge { limit });
        }

        let mime = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or("application/octet-stream")
            .to_string();

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| InsightError::Fetch(e.to_string()))?
        {
            if body.len() + chunk.len() > limit {
                return Err(InsightError::PayloadTooLarge { limit });
            }
            body.extend_from_slice(&chunk);
        }

        debug!(%url, len = body.len(), %mime, "remote image downloaded");
        Ok((body, mime))
    }

    /// Downloads `url` and returns it as a `data:` URL.
    pub async fn fetch_data_url(&self, url: &str) -> Result<String> {
        let (bytes, mime) = self.fetch(url).await?;
        Ok(bytes_to_data_url(&bytes, &mime))
    }

    /// Replaces a URL input with its downloaded bytes; other inputs pass through.
    ///
    /// The result can be decoded with [`decode_input`] off the async runtime.
    pub async fn materialize(&self, input: ImageInput) -> Result<ImageInput> {
        match input {
            ImageInput::Url(url) => {
                let (data, _) = self.fetch(&url).await?;
                Ok(ImageInput::Bytes { data, mime: None })
            }
            other => Ok(other),
        }
    }

    /// Fetches (if needed) and decodes an input.
    pub async fn load(&self, input: ImageInput) -> Result<LoadedImage> {
        let input = self.materialize(input).await?;
        decode_input(input)
    }
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::with_client(reqwest::Client::new(), DEFAULT_MAX_DOWNLOAD_BYTES)
    }
}
