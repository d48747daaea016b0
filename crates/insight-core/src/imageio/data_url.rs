//! Base64 and `data:` URL handling.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::{DecodedImage, decode_bytes, encode_image, guess_mime, read_file_bytes};
use crate::error::{InsightError, Result};

/// MIME reported for bare base64 strings without a `data:` prefix.
pub const UNKNOWN_MIME: &str = "unknown";

/// Splits a base64 string, optionally prefixed with `data:<mime>;base64,`,
/// into decoded bytes and its MIME type.
///
/// Without a prefix the MIME is [`UNKNOWN_MIME`].
pub fn split_data_url(input: &str) -> Result<(Vec<u8>, String)> {
    let input = input.trim();
    if input.is_empty() {
        return Err(InsightError::EmptyInput);
    }

    let (mime, payload) = match input
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
    {
        Some((header, payload)) => {
            let mime = header.split(';').next().unwrap_or_default().trim();
            let mime = if mime.is_empty() { UNKNOWN_MIME } else { mime };
            (mime.to_string(), payload)
        }
        None => (UNKNOWN_MIME.to_string(), input),
    };

    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return Err(InsightError::EmptyInput);
    }
    let bytes = STANDARD.decode(compact)?;
    Ok((bytes, mime))
}

/// Decodes a base64 (or `data:` URL) image, returning it with its MIME type.
pub fn decode_base64(input: &str) -> Result<(DecodedImage, String)> {
    let (bytes, mime) = split_data_url(input)?;
    let image = decode_bytes(&bytes)?;
    Ok((image, mime))
}

/// Encodes an image as a `data:` URL.
pub fn encode_data_url(image: &DecodedImage, mime: &str) -> Result<String> {
    let bytes = encode_image(image, mime)?;
    Ok(bytes_to_data_url(&bytes, mime))
}

/// Reads a file and returns it as a `data:` URL together with its MIME type.
///
/// # Errors
///
/// `UnsupportedMediaType` when the MIME type cannot be guessed from the
/// extension.
pub fn file_to_data_url(path: impl AsRef<Path>) -> Result<(String, String)> {
    let path = path.as_ref();
    let mime = guess_mime(path).ok_or_else(|| InsightError::UnsupportedMediaType {
        mime: format!("unknown type for {}", path.display()),
    })?;
    let bytes = read_file_bytes(path)?;
    Ok((bytes_to_data_url(&bytes, mime), mime.to_string()))
}

pub(crate) fn bytes_to_data_url(bytes: &[u8], mime: &str) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}
