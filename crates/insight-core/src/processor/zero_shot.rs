use super::ImageProcessor;
use crate::classifier::{Embedder, ZeroShotClassifier};
use crate::error::{InsightError, Result};
use crate::imageio::DecodedImage;
use crate::types::{ExtractMetadata, ImageInsight};

impl<E: Embedder> ImageProcessor for ZeroShotClassifier<E> {
    fn name(&self) -> &str {
        "zero-shot"
    }

    /// Classifies against `metadata.labels`.
    fn process(&self, image: &DecodedImage, metadata: &ExtractMetadata) -> Result<ImageInsight> {
        let classification = self.classify(image, metadata.labels())?;
        let insight = serde_json::to_value(&classification)
            .map_err(|e| InsightError::Inference(e.to_string()))?;
        let (height, width) = image.dimensions();
        Ok(ImageInsight::new(height, width).with_insight(insight))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ZeroShotConfig;
    use crate::classifier::zero_shot::test_support::{ColourEmbedder, solid};

    #[test]
    fn insight_contains_classification() {
        let classifier = ZeroShotClassifier::new(ColourEmbedder, ZeroShotConfig::default());
        let insight = classifier
            .process(
                &solid(10, 240, 10),
                &ExtractMetadata::with_labels(["red", "green", "blue"]),
            )
            .unwrap();

        assert_eq!(insight.image_height, 3);
        assert_eq!(insight.image_width, 4);
        assert_eq!(insight.insight["prediction"]["label"], "green");
        assert_eq!(insight.insight["other_predictions"].as_array().unwrap().len(), 3);
        assert_eq!(insight.insight["model_name"], "test/colour");
    }

    #[test]
    fn missing_labels_are_rejected() {
        let classifier = ZeroShotClassifier::new(ColourEmbedder, ZeroShotConfig::default());
        let err = classifier
            .process(&solid(0, 0, 0), &ExtractMetadata::default())
            .unwrap_err();
        assert!(matches!(err, InsightError::NoLabels));
    }
}
