pub mod clip;
pub mod similarity;
pub mod zero_shot;

pub use clip::ClipEmbedder;
pub use zero_shot::{ZeroShotClassifier, ZeroShotConfig};

use crate::error::Result;
use crate::imageio::DecodedImage;
use crate::types::ModelDescriptor;

/// A joint image/text embedding model.
///
/// Implementations must return embeddings of the same dimension for images
/// and texts.
pub trait Embedder: Send + Sync {
    /// Embeds one image.
    fn embed_image(&self, image: &DecodedImage) -> Result<Vec<f32>>;

    /// Embeds a batch of texts, one vector per input.
    fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Name reported in classification results.
    fn model_name(&self) -> &str;

    /// Describes the model. Defaults to the name alone.
    fn descriptor(&self) -> ModelDescriptor {
        ModelDescriptor::new(self.model_name())
    }
}
