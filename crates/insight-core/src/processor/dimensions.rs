use tracing::debug;

use super::ImageProcessor;
use crate::error::Result;
use crate::imageio::DecodedImage;
use crate::types::{ExtractMetadata, ImageInsight};

/// Reports image dimensions with an empty insight payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct DimensionsProcessor;

impl ImageProcessor for DimensionsProcessor {
    fn name(&self) -> &str {
        "dimensions"
    }

    fn process(&self, image: &DecodedImage, metadata: &ExtractMetadata) -> Result<ImageInsight> {
        let (height, width) = image.dimensions();
        debug!(height, width, ?metadata, "dimensions processed");
        Ok(ImageInsight::new(height, width))
    }
}
