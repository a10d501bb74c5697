//! Runs one assessment: encode the record, invoke the classifier, label the class.

use crate::error::{DiagnoseError, DiagnosisError, DiagnosisResult, StoreError};
use crate::features::{self, FeatureVector};
use crate::measurement::MeasurementRecord;
use crate::model::{Classifier, PredictionResult};
use crate::storage::DiagnosisStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Display label for the classifier's class indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn from_class(class: usize) -> Option<Self> {
        match class {
            0 => Some(RiskLevel::Low),
            1 => Some(RiskLevel::Moderate),
            2 => Some(RiskLevel::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
        }
    }
}

/// Outcome of a single assessment, ready to persist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub features: FeatureVector,
    pub bmi: f64,
    pub prediction: PredictionResult,
    pub level: Option<RiskLevel>,
    pub assessed_at: DateTime<Utc>,
}

/// Holds the process-wide classifier handle. Cheap to clone.
#[derive(Clone)]
pub struct RiskService {
    classifier: Arc<dyn Classifier>,
}

impl RiskService {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &Arc<dyn Classifier> {
        &self.classifier
    }

    /// Encode then predict. Input errors surface before the classifier is touched.
    pub fn assess(&self, record: &MeasurementRecord) -> DiagnosisResult<Assessment> {
        let bmi = record.bmi()?;
        let features = features::encode(record)?;
        let prediction = self.classifier.predict(&features)?;
        Ok(finish(features, bmi, prediction))
    }

    /// Decode a JSON body and assess it. Decode and assessment failures share
    /// one error path.
    pub fn assess_json(&self, body: &str) -> DiagnosisResult<(MeasurementRecord, Assessment)> {
        let record = MeasurementRecord::from_json(body)?;
        let assessment = self.assess(&record)?;
        Ok((record, assessment))
    }

    /// Diagnose a stored patient: the patient is resolved before the body is
    /// decoded or the classifier runs; the result is persisted on success.
    pub fn diagnose_patient(
        &self,
        store: &DiagnosisStore,
        username: &str,
        body: &str,
    ) -> Result<(String, Assessment), DiagnoseError> {
        let patient = store
            .find_patient(username)?
            .ok_or_else(|| StoreError::PatientNotFound(username.to_string()))?;
        let (record, assessment) = self.assess_json(body)?;
        let id = store.save_diagnosis(patient.id, &record, &assessment)?;
        tracing::info!(patient = %patient.username, diagnosis_id = %id, "diagnosis stored");
        Ok((id, assessment))
    }

    /// For async callers: encoding runs inline, inference on the blocking pool.
    pub async fn assess_async(&self, record: MeasurementRecord) -> DiagnosisResult<Assessment> {
        let bmi = record.bmi()?;
        let features = features::encode(&record)?;
        let classifier = Arc::clone(&self.classifier);
        let prediction = tokio::task::spawn_blocking(move || classifier.predict(&features))
            .await
            .map_err(|e| DiagnosisError::inference(format!("inference task: {}", e)))??;
        Ok(finish(features, bmi, prediction))
    }
}

fn finish(features: FeatureVector, bmi: f64, prediction: PredictionResult) -> Assessment {
    let level = RiskLevel::from_class(prediction.risk_class);
    match level {
        Some(RiskLevel::High) => tracing::warn!(
            riesgo = prediction.risk_class,
            confianza = prediction.confidence,
            "high risk assessment"
        ),
        _ => tracing::debug!(
            riesgo = prediction.risk_class,
            confianza = prediction.confidence,
            features = ?features.values,
            "assessment"
        ),
    }
    Assessment {
        features,
        bmi,
        prediction,
        level,
        assessed_at: Utc::now(),
    }
}
