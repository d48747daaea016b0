//! # Image IO
//!
//! Turns the ways a client can hand over an image (raw bytes, a base64 or
//! `data:` URL string, a remote URL, a local file) into a [`DecodedImage`],
//! and back into encoded bytes.

pub mod data_url;
pub mod loader;

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageFormat};

use crate::error::{InsightError, Result};

pub use data_url::{decode_base64, encode_data_url, file_to_data_url, split_data_url};
pub use loader::{ImageInput, ImageLoader, LoadedImage, decode_input};

/// MIME reported when nothing better is known.
pub const DEFAULT_MIME: &str = "image/jpeg";

/// A decoded image held in memory.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    inner: DynamicImage,
}

impl DecodedImage {
    #[must_use]
    pub fn new(inner: DynamicImage) -> Self {
        Self { inner }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    /// Number of colour channels (1 for luma, 3 for RGB, 4 for RGBA...).
    #[must_use]
    pub fn channels(&self) -> u8 {
        self.inner.color().channel_count()
    }

    /// `(height, width)`, in array-shape order.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.height(), self.width())
    }

    #[must_use]
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.inner
    }

    #[must_use]
    pub fn to_rgb8(&self) -> image::RgbImage {
        self.inner.to_rgb8()
    }
}

impl From<DynamicImage> for DecodedImage {
    fn from(inner: DynamicImage) -> Self {
        Self::new(inner)
    }
}

/// Guesses a MIME type from a file extension.
#[must_use]
pub fn guess_mime(path: impl AsRef<Path>) -> Option<&'static str> {
    let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" | "jpe" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "webp" => Some("image/webp"),
        "tif" | "tiff" => Some("image/tiff"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}

/// Reads a whole file into memory.
pub fn read_file_bytes(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    std::fs::read(path).map_err(|source| InsightError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Decodes an in-memory encoded image, detecting the format from its content.
pub fn decode_bytes(bytes: &[u8]) -> Result<DecodedImage> {
    if bytes.is_empty() {
        return Err(InsightError::EmptyInput);
    }
    image::load_from_memory(bytes)
        .map(DecodedImage::new)
        .map_err(|e| InsightError::Decode(e.to_string()))
}

/// Reads and decodes an image file.
pub fn decode_file(path: impl AsRef<Path>) -> Result<DecodedImage> {
    let bytes = read_file_bytes(path)?;
    decode_bytes(&bytes)
}

/// Encodes an image in the format named by `mime`.
pub fn encode_image(image: &DecodedImage, mime: &str) -> Result<Vec<u8>> {
    let format = ImageFormat::from_mime_type(mime).ok_or_else(|| {
        InsightError::UnsupportedMediaType {
            mime: mime.to_string(),
        }
    })?;

    // JPEG has no alpha channel.
    let converted;
    let source = if format == ImageFormat::Jpeg && image.inner.color().has_alpha() {
        converted = DynamicImage::ImageRgb8(image.inner.to_rgb8());
        &converted
    } else {
        &image.inner
    };

    let mut buffer = Cursor::new(Vec::new());
    source
        .write_to(&mut buffer, format)
        .map_err(|e| InsightError::Encode(e.to_string()))?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
pub(crate) mod test_support {
    use image::{DynamicImage, Rgb, RgbImage};

    use super::DecodedImage;

    /// A small gradient image, `width` x `height`.
    pub fn gradient(width: u32, height: u32) -> DecodedImage {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 11 % 256) as u8, 128])
        });
        DecodedImage::new(DynamicImage::ImageRgb8(img))
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::gradient;
    use super::*;

    #[test]
    fn guess_mime_by_extension() {
        assert_eq!(guess_mime("food/biryani.jpg"), Some("image/jpeg"));
        assert_eq!(guess_mime("a.JPEG"), Some("image/jpeg"));
        assert_eq!(guess_mime("scan.png"), Some("image/png"));
        assert_eq!(guess_mime("doc.pdf"), Some("application/pdf"));
        assert_eq!(guess_mime("notes.txt"), None);
        assert_eq!(guess_mime("no_extension"), None);
    }

    #[test]
    fn png_bytes_decode_with_dimensions() {
        let original = gradient(54, 40);
        let bytes = encode_image(&original, "image/png").unwrap();
        let decoded = decode_bytes(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (40, 54));
        assert_eq!(decoded.channels(), 3);
    }

    #[test]
    fn jpeg_encoding_drops_alpha() {
        let rgba = DecodedImage::new(DynamicImage::new_rgba8(8, 6));
        let bytes = encode_image(&rgba, "image/jpeg").unwrap();
        let decoded = decode_bytes(&bytes).unwrap();
        assert_eq!(decoded.width(), 8);
        assert_eq!(decoded.height(), 6);
    }

    #[test]
    fn empty_bytes_are_rejected() {
        assert!(matches!(decode_bytes(&[]), Err(InsightError::EmptyInput)));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = decode_bytes(b"definitely not an image").unwrap_err();
        assert!(matches!(err, InsightError::Decode(_)));
    }

    #[test]
    fn unknown_encode_mime_is_rejected() {
        let err = encode_image(&gradient(2, 2), "text/plain").unwrap_err();
        assert!(matches!(err, InsightError::UnsupportedMediaType { .. }));
    }

    #[test]
    fn decode_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("img.png");
        std::fs::write(&path, encode_image(&gradient(5, 3), "image/png").unwrap()).unwrap();

        let decoded = decode_file(&path).unwrap();
        assert_eq!(decoded.dimensions(), (3, 5));

        let missing = decode_file(dir.path().join("missing.png")).unwrap_err();
        assert!(matches!(missing, InsightError::Io { .. }));
    }
}
