//! Patient measurement record as submitted for a diagnosis.

mod decode;

pub use decode::RawMeasurement;

use crate::error::{DiagnosisError, DiagnosisResult};
use serde::{Deserialize, Serialize};

/// Typed measurement record. Wire names follow the client form (`edad`, `ps`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    #[serde(rename = "edad")]
    pub age: i64,
    #[serde(rename = "genero")]
    pub sex: String,
    #[serde(rename = "ps")]
    pub systolic: i64,
    #[serde(rename = "pd")]
    pub diastolic: i64,
    #[serde(rename = "colesterol")]
    pub cholesterol: f64,
    #[serde(rename = "glucosa")]
    pub glucose: f64,
    #[serde(rename = "fuma")]
    pub smoker: String,
    pub alcohol: String,
    #[serde(rename = "actividad")]
    pub activity: String,
    /// kg
    #[serde(rename = "peso")]
    pub weight: f64,
    /// cm
    #[serde(rename = "estatura")]
    pub height: i64,
}

impl MeasurementRecord {
    /// Decode a JSON request body with the same coercions the form handler applies.
    pub fn from_json(body: &str) -> DiagnosisResult<Self> {
        let raw: RawMeasurement = serde_json::from_str(body)
            .map_err(|e| DiagnosisError::invalid(format!("malformed body: {}", e)))?;
        raw.try_into()
    }

    /// Body-mass index, weight / (height in metres)^2.
    pub fn bmi(&self) -> DiagnosisResult<f64> {
        if self.height == 0 {
            return Err(DiagnosisError::invalid("estatura must be non-zero"));
        }
        let metres = self.height as f64 / 100.0;
        Ok(self.weight / metres.powi(2))
    }
}
