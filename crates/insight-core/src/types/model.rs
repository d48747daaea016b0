use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default zero-shot model identifier.
pub const DEFAULT_MODEL_NAME: &str = "openai/clip-vit-base-patch32";

/// Describes a loaded (or loadable) model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Hub-style model name, reported back in classification insights.
    pub model_name: String,

    /// Optional model version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<f32>,

    /// Local directory the weights were loaded from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_path: Option<PathBuf>,

    /// Where the weights can be obtained.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_url: Option<String>,

    /// Labels the model was last configured with, if it has a fixed set.
    #[serde(default)]
    pub labels: Vec<String>,
}

impl ModelDescriptor {
    /// Creates a descriptor with only a name.
    #[must_use]
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            model_version: None,
            model_path: None,
            model_url: None,
            labels: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.model_url = Some(url.into());
        self
    }
}

impl Default for ModelDescriptor {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_NAME)
            .with_url(format!("https://huggingface.co/{DEFAULT_MODEL_NAME}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_descriptor_names_clip() {
        let descriptor = ModelDescriptor::default();
        assert_eq!(descriptor.model_name, DEFAULT_MODEL_NAME);
        assert!(descriptor.model_url.as_deref().unwrap().ends_with(DEFAULT_MODEL_NAME));
        assert!(descriptor.labels.is_empty());
    }

    #[test]
    fn optional_fields_are_skipped() {
        let json = serde_json::to_value(ModelDescriptor::new("tiny")).unwrap();
        assert_eq!(json["model_name"], "tiny");
        assert!(json.get("model_path").is_none());
        assert!(json.get("model_version").is_none());
    }
}
