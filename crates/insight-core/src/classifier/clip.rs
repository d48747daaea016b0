//! # CLIP Embedder
//!
//! Runs a CLIP ViT-B/32 checkpoint with candle. Weights and tokenizer are read
//! from a local directory only; nothing is downloaded at runtime.

use std::path::{Path, PathBuf};

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::clip::{ClipConfig, ClipModel};
use image::imageops::FilterType;
use tokenizers::Tokenizer;
use tracing::info;

use super::Embedder;
use crate::error::{InsightError, Result};
use crate::imageio::DecodedImage;
use crate::types::ModelDescriptor;
use crate::types::model::DEFAULT_MODEL_NAME;

/// Weights file expected inside the model directory.
pub const WEIGHTS_FILE: &str = "model.safetensors";
/// Tokenizer file expected inside the model directory.
pub const TOKENIZER_FILE: &str = "tokenizer.json";

const PAD_TOKEN: &str = "<|endoftext|>";

fn inference_err(e: impl std::fmt::Display) -> InsightError {
    InsightError::Inference(e.to_string())
}

fn load_err(e: impl std::fmt::Display) -> InsightError {
    InsightError::ModelLoad(e.to_string())
}

/// CLIP image/text embedder backed by candle.
pub struct ClipEmbedder {
    model: ClipModel,
    tokenizer: Tokenizer,
    pad_id: u32,
    max_text_len: usize,
    image_size: usize,
    device: Device,
    descriptor: ModelDescriptor,
}

impl ClipEmbedder {
    /// Loads `model.safetensors` and `tokenizer.json` from `model_dir`.
    ///
    /// # Errors
    ///
    /// `InsightError::ModelLoad` if either file is missing or unreadable.
    pub fn load(model_dir: impl AsRef<Path>) -> Result<Self> {
        Self::load_named(model_dir, DEFAULT_MODEL_NAME)
    }

    /// Like [`ClipEmbedder::load`], reporting `model_name` in results.
    pub fn load_named(model_dir: impl AsRef<Path>, model_name: &str) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        let weights = required_file(model_dir, WEIGHTS_FILE)?;
        let tokenizer_path = required_file(model_dir, TOKENIZER_FILE)?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(load_err)?;
        let pad_id = tokenizer.token_to_id(PAD_TOKEN).ok_or_else(|| {
            InsightError::ModelLoad(format!("tokenizer has no {PAD_TOKEN} token"))
        })?;

        let device = Device::Cpu;
        let config = ClipConfig::vit_base_patch32();
        // SAFETY: the weights file is not modified while mapped.
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[&weights], DType::F32, &device) }
            .map_err(load_err)?;
        let model = ClipModel::new(vb, &config).map_err(load_err)?;

        info!(model = model_name, dir = %model_dir.display(), "model and tokenizer loaded");
        Ok(Self {
            model,
            tokenizer,
            pad_id,
            max_text_len: config.text_config.max_position_embeddings,
            image_size: config.image_size,
            device,
            descriptor: ModelDescriptor::new(model_name).with_path(model_dir),
        })
    }

    /// Resizes to fill a square, scales pixels to `[-1, 1]`, returns `[1, 3, H, W]`.
    fn pixel_values(&self, image: &DecodedImage) -> candle_core::Result<Tensor> {
        let size = self.image_size as u32;
        let rgb = image
            .as_dynamic()
            .resize_to_fill(size, size, FilterType::Triangle)
            .to_rgb8()
            .into_raw();
        Tensor::from_vec(rgb, (self.image_size, self.image_size, 3), &self.device)?
            .permute((2, 0, 1))?
            .to_dtype(DType::F32)?
            .affine(2.0 / 255.0, -1.0)?
            .unsqueeze(0)
    }

    /// Tokenizes texts into a padded `[batch, len]` id tensor.
    fn input_ids(&self, texts: &[String]) -> Result<Tensor> {
        let mut rows = Vec::with_capacity(texts.len());
        for text in texts {
            let encoding = self
                .tokenizer
                .encode(text.as_str(), true)
                .map_err(inference_err)?;
            rows.push(encoding.get_ids().to_vec());
        }
        let rows = shape_rows(rows, self.max_text_len, self.pad_id);
        Tensor::new(rows, &self.device).map_err(inference_err)
    }
}

/// Cuts rows to `max_len` ids, ending cut rows with `end_id`, then right-pads
/// every row with `end_id` to the longest length.
fn shape_rows(mut rows: Vec<Vec<u32>>, max_len: usize, end_id: u32) -> Vec<Vec<u32>> {
    for row in &mut rows {
        if row.len() > max_len {
            row.truncate(max_len);
            if let Some(last) = row.last_mut() {
                *last = end_id;
            }
        }
    }
    let longest = rows.iter().map(Vec::len).max().unwrap_or(0);
    for row in &mut rows {
        row.resize(longest, end_id);
    }
    rows
}

impl Embedder for ClipEmbedder {
    fn embed_image(&self, image: &DecodedImage) -> Result<Vec<f32>> {
        let pixels = self.pixel_values(image).map_err(inference_err)?;
        self.model
            .get_image_features(&pixels)
            .and_then(|features| features.flatten_all())
            .and_then(|features| features.to_vec1::<f32>())
            .map_err(inference_err)
    }

    fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let input_ids = self.input_ids(texts)?;
        self.model
            .get_text_features(&input_ids)
            .and_then(|features| features.to_vec2::<f32>())
            .map_err(inference_err)
    }

    fn model_name(&self) -> &str {
        &self.descriptor.model_name
    }

    fn descriptor(&self) -> ModelDescriptor {
        self.descriptor.clone()
    }
}

fn required_file(dir: &Path, name: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    if path.is_file() {
        Ok(path)
    } else {
        Err(InsightError::ModelLoad(format!(
            "{name} not found at {}",
            path.display()
        )))
    }
}
