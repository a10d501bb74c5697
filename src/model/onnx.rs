//! ONNX Runtime classifier. Input: [1, 10] f32, output: [1, C] per-class scores.
//! Loaded once at startup; a missing or unreadable artifact is an error, not a no-op.

use super::Classifier;
use crate::error::{DiagnosisError, DiagnosisResult};
use crate::features::FEATURE_COUNT;
use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub struct OnnxClassifier {
    // `Session::run` needs exclusive access; the lock covers the invoke step only.
    session: Mutex<Session>,
    output_name: String,
    expected_classes: Option<usize>,
    path: PathBuf,
}

impl OnnxClassifier {
    /// Load the artifact at `path`. When `expected_classes` is set, every output
    /// row must have exactly that many scores.
    pub fn load(path: &Path, expected_classes: Option<usize>) -> DiagnosisResult<Self> {
        if !path.exists() {
            return Err(DiagnosisError::inference(format!(
                "model not found: {}",
                path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| DiagnosisError::inference(format!("session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| DiagnosisError::inference(format!("optimization level: {}", e)))?
            .commit_from_file(path)
            .map_err(|e| DiagnosisError::inference(format!("load {}: {}", path.display(), e)))?;

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| DiagnosisError::inference("model defines no outputs"))?;

        tracing::info!(
            path = %path.display(),
            inputs = session.inputs.len(),
            output = %output_name,
            "classifier loaded"
        );

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            expected_classes,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Single input row as a 1 x FEATURE_COUNT array.
fn input_row(input: &[f32; FEATURE_COUNT]) -> DiagnosisResult<Array2<f32>> {
    Array2::from_shape_vec((1, FEATURE_COUNT), input.to_vec())
        .map_err(|e| DiagnosisError::inference(format!("input shape: {}", e)))
}

/// Output row must match the configured class count, when one is set.
fn check_output_width(scores: &[f32], expected: Option<usize>) -> DiagnosisResult<()> {
    match expected {
        Some(expected) if scores.len() != expected => Err(DiagnosisError::inference(format!(
            "output has {} scores, expected {}",
            scores.len(),
            expected
        ))),
        _ => Ok(()),
    }
}

impl Classifier for OnnxClassifier {
    fn scores(&self, input: &[f32; FEATURE_COUNT]) -> DiagnosisResult<Vec<f32>> {
        let arr = input_row(input)?;
        let tensor = Tensor::from_array(arr)
            .map_err(|e| DiagnosisError::inference(format!("input tensor: {}", e)))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| DiagnosisError::inference("classifier session lock poisoned"))?;
        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| DiagnosisError::inference(format!("invoke: {}", e)))?;

        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| DiagnosisError::inference(format!("missing output '{}'", self.output_name)))?;
        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| DiagnosisError::inference(format!("extract output: {}", e)))?;

        check_output_width(data, self.expected_classes)?;
        Ok(data.to_vec())
    }
}
