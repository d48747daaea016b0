use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{InsightError, Result};

/// Processor arguments sent alongside an image.
///
/// `labels` drives zero-shot classification. Any other keys are kept in
/// `extra` so custom processors can read them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExtractMetadata {
    /// Parses the `metadata` form field.
    ///
    /// Blank input is treated as `{}`.
    ///
    /// # Errors
    ///
    /// Returns `InsightError::InvalidMetadata` if the text is not a JSON object
    /// or `labels` is not a list of strings.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Self::default());
        }

        let value: Value =
            serde_json::from_str(raw).map_err(|e| InsightError::InvalidMetadata(e.to_string()))?;
        if !value.is_object() {
            return Err(InsightError::InvalidMetadata(
                "metadata must be a JSON object".into(),
            ));
        }

        let mut metadata: Self = serde_json::from_value(value)
            .map_err(|e| InsightError::InvalidMetadata(e.to_string()))?;
        if let Some(labels) = metadata.labels.take() {
            metadata.labels = Some(
                labels
                    .into_iter()
                    .map(|l| l.trim().to_string())
                    .filter(|l| !l.is_empty())
                    .collect(),
            );
        }
        Ok(metadata)
    }

    /// Creates metadata carrying only labels.
    #[must_use]
    pub fn with_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: Some(labels.into_iter().map(Into::into).collect()),
            extra: Map::new(),
        }
    }

    /// Labels, or an empty slice when none were sent.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        self.labels.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_metadata_is_empty() {
        assert_eq!(ExtractMetadata::parse("").unwrap(), ExtractMetadata::default());
        assert_eq!(ExtractMetadata::parse("  {} ").unwrap(), ExtractMetadata::default());
    }

    #[test]
    fn labels_are_parsed_and_cleaned() {
        let metadata =
            ExtractMetadata::parse(r#"{"labels": ["biryani", " cake ", "", "other food"]}"#)
                .unwrap();
        assert_eq!(metadata.labels(), ["biryani", "cake", "other food"]);
    }

    #[test]
    fn extra_keys_are_kept() {
        let metadata = ExtractMetadata::parse(r#"{"labels": ["a"], "threshold": 0.5}"#).unwrap();
        assert_eq!(metadata.extra.get("threshold"), Some(&serde_json::json!(0.5)));
    }

    #[test]
    fn non_object_is_rejected() {
        let err = ExtractMetadata::parse("[1, 2]").unwrap_err();
        assert!(matches!(err, InsightError::InvalidMetadata(_)));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = ExtractMetadata::parse("{labels:").unwrap_err();
        assert!(matches!(err, InsightError::InvalidMetadata(_)));
    }

    #[test]
    fn wrong_label_type_is_rejected() {
        let err = ExtractMetadata::parse(r#"{"labels": "cake"}"#).unwrap_err();
        assert!(matches!(err, InsightError::InvalidMetadata(_)));
    }
}
