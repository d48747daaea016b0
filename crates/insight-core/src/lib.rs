//! # Insight Core
//!
//! Image ingestion, zero-shot classification and the processors behind the
//! image insight service.
//!
//! ## Quick Start
//!
//! ```rust
//! use insight_core::{ExtractMetadata, InsightFacade, decode_base64};
//!
//! // A 1x1 PNG.
//! let png = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";
//! let (image, mime) = decode_base64(png).unwrap();
//!
//! let facade = InsightFacade::dimensions();
//! let insight = facade.process_image(&image, &ExtractMetadata::default()).unwrap();
//!
//! assert_eq!(mime, "image/png");
//! assert_eq!((insight.image_height, insight.image_width), (1, 1));
//! ```
pub mod classifier;
pub mod error;
pub mod facade;
pub mod imageio;
pub mod processor;
pub mod types;

// Re-export primary API
pub use classifier::{ClipEmbedder, Embedder, ZeroShotClassifier, ZeroShotConfig};
pub use error::{InsightError, Result};
pub use facade::{FacadeConfig, InsightFacade};
pub use imageio::{
    DecodedImage, ImageInput, ImageLoader, LoadedImage, decode_base64, decode_bytes, decode_input,
    guess_mime,
};
pub use processor::{DimensionsProcessor, ImageProcessor, ProcessorKind};
pub use types::{Classification, ExtractMetadata, ImageInsight, ModelDescriptor, Prediction};
