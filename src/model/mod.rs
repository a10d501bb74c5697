//! Frozen multi-class risk classifier.

mod onnx;

pub use onnx::OnnxClassifier;

use crate::error::{DiagnosisError, DiagnosisResult};
use crate::features::{FeatureVector, FEATURE_COUNT};
use serde::{Deserialize, Serialize};

/// Predicted class and its score, serialized as `{"riesgo": .., "confianza": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    #[serde(rename = "riesgo")]
    pub risk_class: usize,
    #[serde(rename = "confianza")]
    pub confidence: f32,
}

impl PredictionResult {
    /// Argmax over per-class scores; the first index wins ties. The score is
    /// clamped into [0, 1].
    pub fn from_scores(scores: &[f32]) -> DiagnosisResult<Self> {
        if scores.is_empty() {
            return Err(DiagnosisError::inference("classifier returned no scores"));
        }
        if let Some(i) = scores.iter().position(|s| !s.is_finite()) {
            return Err(DiagnosisError::inference(format!("non-finite score at class {}", i)));
        }
        let mut best = 0;
        for (i, s) in scores.iter().enumerate().skip(1) {
            if *s > scores[best] {
                best = i;
            }
        }
        Ok(Self {
            risk_class: best,
            confidence: scores[best].clamp(0.0, 1.0),
        })
    }
}

/// A loaded classifier shared read-only across callers.
pub trait Classifier: Send + Sync {
    /// One forward pass over a single 1 x FEATURE_COUNT row; returns the output row.
    fn scores(&self, input: &[f32; FEATURE_COUNT]) -> DiagnosisResult<Vec<f32>>;

    fn predict(&self, features: &FeatureVector) -> DiagnosisResult<PredictionResult> {
        let scores = self.scores(&features.to_input())?;
        PredictionResult::from_scores(&scores)
    }
}
