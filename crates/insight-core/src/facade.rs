//! # Insight Facade
//!
//! Single entry point used by the HTTP layer: picks a processor at startup
//! according to [`ProcessorKind`] and runs it for each image.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::classifier::{ClipEmbedder, ZeroShotClassifier, ZeroShotConfig};
use crate::error::{InsightError, Result};
use crate::imageio::DecodedImage;
use crate::processor::{DimensionsProcessor, ImageProcessor, ProcessorKind};
use crate::types::{ExtractMetadata, ImageInsight};

/// Configuration for the facade.
#[derive(Debug, Clone)]
pub struct FacadeConfig {
    /// Which processor to run.
    pub kind: ProcessorKind,
    /// Directory holding `model.safetensors` and `tokenizer.json`.
    pub model_dir: Option<PathBuf>,
    /// Zero-shot prompt and scale settings.
    pub zero_shot: ZeroShotConfig,
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            kind: ProcessorKind::Auto,
            model_dir: None,
            zero_shot: ZeroShotConfig::default(),
        }
    }
}

impl FacadeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kind(mut self, kind: ProcessorKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.model_dir = Some(dir.into());
        self
    }

    pub fn with_zero_shot(mut self, zero_shot: ZeroShotConfig) -> Self {
        self.zero_shot = zero_shot;
        self
    }
}

/// Owns the active processor.
pub struct InsightFacade {
    processor: Box<dyn ImageProcessor>,
    kind: ProcessorKind,
}

impl InsightFacade {
    /// Builds the processor selected by `config.kind`.
    ///
    /// # Errors
    ///
    /// With `ProcessorKind::ZeroShot`, model loading errors are returned.
    /// `ProcessorKind::Auto` logs them and falls back to dimensions.
    pub fn new(config: FacadeConfig) -> Result<Self> {
        match config.kind {
            ProcessorKind::Dimensions => Ok(Self::dimensions()),
            ProcessorKind::ZeroShot => {
                let processor = load_zero_shot(&config)?;
                Ok(Self {
                    processor,
                    kind: ProcessorKind::ZeroShot,
                })
            }
            ProcessorKind::Auto => match load_zero_shot(&config) {
                Ok(processor) => Ok(Self {
                    processor,
                    kind: ProcessorKind::ZeroShot,
                }),
                Err(e) => {
                    warn!(error = %e, "zero-shot model unavailable, falling back to dimensions");
                    Ok(Self::dimensions())
                }
            },
        }
    }

    /// A facade running the dimensions processor.
    #[must_use]
    pub fn dimensions() -> Self {
        Self {
            processor: Box::new(DimensionsProcessor),
            kind: ProcessorKind::Dimensions,
        }
    }

    /// A facade around a caller-supplied processor.
    #[must_use]
    pub fn with_processor(processor: Box<dyn ImageProcessor>, kind: ProcessorKind) -> Self {
        Self { processor, kind }
    }

    /// Runs the active processor.
    pub fn process_image(
        &self,
        image: &DecodedImage,
        metadata: &ExtractMetadata,
    ) -> Result<ImageInsight> {
        self.processor.process(image, metadata)
    }

    #[must_use]
    pub fn processor_name(&self) -> &str {
        self.processor.name()
    }

    /// The processor kind actually in use (never `Auto`).
    #[must_use]
    pub fn kind(&self) -> ProcessorKind {
        self.kind
    }
}

fn load_zero_shot(config: &FacadeConfig) -> Result<Box<dyn ImageProcessor>> {
    let dir = config
        .model_dir
        .clone()
        .ok_or_else(|| InsightError::ModelLoad("no model directory configured".into()))?;
    let embedder = ClipEmbedder::load(&dir)?;
    info!(dir = %dir.display(), "zero-shot processor enabled");
    Ok(Box::new(ZeroShotClassifier::new(
        embedder,
        config.zero_shot.clone(),
    )))
}
