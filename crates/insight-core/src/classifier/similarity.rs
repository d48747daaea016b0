//! Embedding similarity and probability helpers.

use crate::types::{Classification, Prediction};

/// Scales `v` to unit length. Zero vectors are returned unchanged.
#[must_use]
pub fn l2_normalize(v: &[f32]) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm <= f32::EPSILON {
        return v.to_vec();
    }
    v.iter().map(|x| x / norm).collect()
}

/// Cosine similarity between one image embedding and each text embedding.
#[must_use]
pub fn cosine_scores(image: &[f32], texts: &[Vec<f32>]) -> Vec<f32> {
    let image = l2_normalize(image);
    texts
        .iter()
        .map(|text| {
            l2_normalize(text)
                .iter()
                .zip(&image)
                .map(|(a, b)| a * b)
                .sum()
        })
        .collect()
}

/// Numerically stable softmax.
#[must_use]
pub fn softmax(scores: &[f32]) -> Vec<f32> {
    if scores.is_empty() {
        return Vec::new();
    }
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Pairs labels with probabilities and ranks them.
///
/// The top prediction is the first maximum in label order; the full list is
/// sorted by descending confidence (stable for ties).
#[must_use]
pub fn rank(labels: &[String], probabilities: &[f32], model_name: &str) -> Option<Classification> {
    let mut predictions: Vec<Prediction> = labels
        .iter()
        .zip(probabilities)
        .map(|(label, &confidence)| Prediction {
            label: label.clone(),
            confidence,
        })
        .collect();

    let best = predictions
        .iter()
        .enumerate()
        .fold(None::<(usize, f32)>, |best, (i, p)| match best {
            Some((_, c)) if c >= p.confidence => best,
            _ => Some((i, p.confidence)),
        })?
        .0;
    let prediction = predictions[best].clone();

    predictions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    Some(Classification {
        prediction,
        other_predictions: predictions,
        model_name: model_name.to_string(),
    })
}
