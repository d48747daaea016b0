pub mod insight;
pub mod metadata;
pub mod model;

pub use insight::{Classification, ImageInsight, Prediction};
pub use metadata::ExtractMetadata;
pub use model::ModelDescriptor;
