//! # Zero-shot Classifier
//!
//! Scores an image against free-text labels. Each label becomes a prompt,
//! prompts and image are embedded, and the cosine similarities are turned
//! into probabilities with a softmax.

use tracing::{debug, info};

use super::Embedder;
use super::similarity::{cosine_scores, rank, softmax};
use crate::error::{InsightError, Result};
use crate::imageio::DecodedImage;
use crate::types::{Classification, ModelDescriptor};

/// Placeholder replaced by the label in prompt templates.
pub const LABEL_PLACEHOLDER: &str = "{label}";

/// Configuration for zero-shot classification.
#[derive(Debug, Clone)]
pub struct ZeroShotConfig {
    /// Prompt built for every label; `{label}` is substituted.
    pub prompt_template: String,
    /// Multiplier applied to cosine similarities before the softmax.
    pub logit_scale: f32,
}

impl Default for ZeroShotConfig {
    fn default() -> Self {
        Self {
            prompt_template: "a photo of a {label}".to_string(),
            logit_scale: 1.0,
        }
    }
}

impl ZeroShotConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = template.into();
        self
    }

    /// Non-positive and non-finite scales are replaced by `1.0`.
    pub fn with_logit_scale(mut self, scale: f32) -> Self {
        self.logit_scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };
        self
    }
}

/// Zero-shot image classifier over any [`Embedder`].
///
/// Labels are passed per call, so one instance can serve concurrent requests
/// with different label sets.
pub struct ZeroShotClassifier<E> {
    embedder: E,
    config: ZeroShotConfig,
}

impl<E: Embedder> ZeroShotClassifier<E> {
    pub fn new(embedder: E, config: ZeroShotConfig) -> Self {
        info!(model = embedder.model_name(), "zero-shot classifier ready");
        Self { embedder, config }
    }

    /// Builds one prompt per label.
    #[must_use]
    pub fn prompts(&self, labels: &[String]) -> Vec<String> {
        labels
            .iter()
            .map(|label| self.config.prompt_template.replace(LABEL_PLACEHOLDER, label))
            .collect()
    }

    /// Classifies one image against `labels`.
    ///
    /// # Errors
    ///
    /// `InsightError::NoLabels` if `labels` is empty; embedding failures are
    /// passed through.
    pub fn classify(&self, image: &DecodedImage, labels: &[String]) -> Result<Classification> {
        let text_embeddings = self.embed_labels(labels)?;
        self.classify_with(image, labels, &text_embeddings)
    }

    /// Classifies several images against the same labels, embedding the
    /// prompts once.
    pub fn classify_batch(
        &self,
        images: &[DecodedImage],
        labels: &[String],
    ) -> Result<Vec<Classification>> {
        let text_embeddings = self.embed_labels(labels)?;
        images
            .iter()
            .map(|image| self.classify_with(image, labels, &text_embeddings))
            .collect()
    }

    /// Describes the underlying model.
    #[must_use]
    pub fn descriptor(&self) -> ModelDescriptor {
        self.embedder.descriptor()
    }

    #[must_use]
    pub fn config(&self) -> &ZeroShotConfig {
        &self.config
    }

    fn embed_labels(&self, labels: &[String]) -> Result<Vec<Vec<f32>>> {
        if labels.is_empty() {
            return Err(InsightError::NoLabels);
        }
        let prompts = self.prompts(labels);
        debug!(?prompts, "embedding prompts");
        let embeddings = self.embedder.embed_texts(&prompts)?;
        if embeddings.len() != labels.len() {
            return Err(InsightError::Inference(format!(
                "expected {} text embeddings, got {}",
                labels.len(),
                embeddings.len()
            )));
        }
        Ok(embeddings)
    }

    fn classify_with(
        &self,
        image: &DecodedImage,
        labels: &[String],
        text_embeddings: &[Vec<f32>],
    ) -> Result<Classification> {
        let image_embedding = self.embedder.embed_image(image)?;
        if let Some(text) = text_embeddings
            .iter()
            .find(|t| t.len() != image_embedding.len())
        {
            return Err(InsightError::Inference(format!(
                "embedding size mismatch: image {} vs text {}",
                image_embedding.len(),
                text.len()
            )));
        }

        let scores: Vec<f32> = cosine_scores(&image_embedding, text_embeddings)
            .into_iter()
            .map(|s| s * self.config.logit_scale)
            .collect();
        let probabilities = softmax(&scores);

        let classification = rank(labels, &probabilities, self.embedder.model_name())
            .ok_or(InsightError::NoLabels)?;
        info!(
            label = %classification.prediction.label,
            confidence = classification.prediction.confidence,
            "predicted class"
        );
        Ok(classification)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Embeds images by their mean colour and texts by colour keywords, so
    /// classification outcomes are predictable without model weights.
    pub struct ColourEmbedder;

    impl Embedder for ColourEmbedder {
        fn embed_image(&self, image: &DecodedImage) -> Result<Vec<f32>> {
            let rgb = image.to_rgb8();
            let mut sums = [0f32; 3];
            for pixel in rgb.pixels() {
                for (sum, channel) in sums.iter_mut().zip(pixel.0) {
                    *sum += f32::from(channel);
                }
            }
            Ok(sums.to_vec())
        }

        fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    if t.contains("red") {
                        vec![1.0, 0.0, 0.0]
                    } else if t.contains("green") {
                        vec![0.0, 1.0, 0.0]
                    } else {
                        vec![0.0, 0.0, 1.0]
                    }
                })
                .collect())
        }

        fn model_name(&self) -> &str {
            "test/colour"
        }
    }

    pub fn solid(r: u8, g: u8, b: u8) -> DecodedImage {
        let img = image::RgbImage::from_pixel(4, 3, image::Rgb([r, g, b]));
        DecodedImage::new(image::DynamicImage::ImageRgb8(img))
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{ColourEmbedder, solid};
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn prompts_use_template() {
        let classifier = ZeroShotClassifier::new(ColourEmbedder, ZeroShotConfig::default());
        assert_eq!(
            classifier.prompts(&labels(&["cat", "dog"])),
            ["a photo of a cat", "a photo of a dog"]
        );

        let classifier = ZeroShotClassifier::new(
            ColourEmbedder,
            ZeroShotConfig::new().with_prompt_template("{label} dish"),
        );
        assert_eq!(classifier.prompts(&labels(&["cake"])), ["cake dish"]);
    }

    #[test]
    fn classify_picks_matching_colour() {
        let classifier = ZeroShotClassifier::new(ColourEmbedder, ZeroShotConfig::default());
        let result = classifier
            .classify(&solid(250, 10, 10), &labels(&["green apple", "red car", "blue sky"]))
            .unwrap();

        assert_eq!(result.prediction.label, "red car");
        assert_eq!(result.other_predictions[0].label, "red car");
        assert_eq!(result.other_predictions.len(), 3);
        assert_eq!(result.model_name, "test/colour");

        let total: f32 = result.other_predictions.iter().map(|p| p.confidence).sum();
        assert!((total - 1.0).abs() < 1e-5);
    }

    #[test]
    fn logit_scale_sharpens_distribution() {
        let image = solid(250, 10, 10);
        let names = labels(&["red", "green"]);
        let flat = ZeroShotClassifier::new(ColourEmbedder, ZeroShotConfig::default())
            .classify(&image, &names)
            .unwrap();
        let sharp = ZeroShotClassifier::new(
            ColourEmbedder,
            ZeroShotConfig::new().with_logit_scale(100.0),
        )
        .classify(&image, &names)
        .unwrap();
        assert!(sharp.prediction.confidence > flat.prediction.confidence);
    }

    #[test]
    fn invalid_logit_scale_falls_back() {
        assert_eq!(ZeroShotConfig::new().with_logit_scale(-3.0).logit_scale, 1.0);
        assert_eq!(ZeroShotConfig::new().with_logit_scale(f32::NAN).logit_scale, 1.0);
    }

    #[test]
    fn empty_labels_are_rejected() {
        let classifier = ZeroShotClassifier::new(ColourEmbedder, ZeroShotConfig::default());
        let err = classifier.classify(&solid(0, 0, 0), &[]).unwrap_err();
        assert!(matches!(err, InsightError::NoLabels));
    }

    #[test]
    fn batch_classifies_each_image() {
        let classifier = ZeroShotClassifier::new(ColourEmbedder, ZeroShotConfig::default());
        let results = classifier
            .classify_batch(
                &[solid(255, 0, 0), solid(0, 255, 0)],
                &labels(&["red", "green"]),
            )
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].prediction.label, "red");
        assert_eq!(results[1].prediction.label, "green");
    }

    #[test]
    fn descriptor_reports_model_name() {
        let classifier = ZeroShotClassifier::new(ColourEmbedder, ZeroShotConfig::default());
        assert_eq!(classifier.descriptor().model_name, "test/colour");
        assert!(classifier.descriptor().model_path.is_none());
    }

    /// Colour embedder that knows where its weights live.
    struct StoredColour;

    impl Embedder for StoredColour {
        fn embed_image(&self, image: &DecodedImage) -> Result<Vec<f32>> {
            ColourEmbedder.embed_image(image)
        }

        fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            ColourEmbedder.embed_texts(texts)
        }

        fn model_name(&self) -> &str {
            "test/stored-colour"
        }

        fn descriptor(&self) -> ModelDescriptor {
            ModelDescriptor::new(self.model_name()).with_path("/models/colour")
        }
    }

    #[test]
    fn descriptor_comes_from_the_embedder() {
        let classifier = ZeroShotClassifier::new(StoredColour, ZeroShotConfig::default());
        let descriptor = classifier.descriptor();
        assert_eq!(descriptor.model_name, "test/stored-colour");
        assert_eq!(
            descriptor.model_path,
            Some(std::path::PathBuf::from("/models/colour"))
        );
    }
}
