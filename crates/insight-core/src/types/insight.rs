use serde::{Deserialize, Serialize};

/// One label with its confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub confidence: f32,
}

/// Result of a zero-shot classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// The most likely label.
    pub prediction: Prediction,

    /// Every label, sorted by descending confidence.
    pub other_predictions: Vec<Prediction>,

    /// Model that produced the scores.
    pub model_name: String,
}

/// Output of an image processor for a single image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInsight {
    pub image_height: u32,
    pub image_width: u32,

    /// Processor specific payload. Always a JSON object.
    pub insight: serde_json::Value,
}

impl ImageInsight {
    /// Creates an insight with an empty payload.
    #[must_use]
    pub fn new(image_height: u32, image_width: u32) -> Self {
        Self {
            image_height,
            image_width,
            insight: serde_json::Value::Object(serde_json::Map::new()),
        }
    }

    #[must_use]
    pub fn with_insight(mut self, insight: serde_json::Value) -> Self {
        self.insight = insight;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_insight_has_empty_object() {
        let insight = ImageInsight::new(405, 540);
        assert_eq!(insight.image_height, 405);
        assert_eq!(insight.image_width, 540);
        assert_eq!(insight.insight, serde_json::json!({}));
    }

    #[test]
    fn classification_serializes_with_expected_keys() {
        let top = Prediction {
            label: "cake".into(),
            confidence: 0.7,
        };
        let classification = Classification {
            prediction: top.clone(),
            other_predictions: vec![top],
            model_name: "clip".into(),
        };
        let json = serde_json::to_value(&classification).unwrap();
        assert_eq!(json["prediction"]["label"], "cake");
        assert_eq!(json["other_predictions"].as_array().unwrap().len(), 1);
        assert_eq!(json["model_name"], "clip");
    }
}
