//! Diagnosis persistence: patients, measurements, and classifier results.

mod encrypted;

pub use encrypted::DiagnosisStore;

use crate::measurement::MeasurementRecord;
use serde::{Deserialize, Serialize};

pub type PatientId = i64;

/// Account type; only `Patient` accounts appear in patient listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountKind {
    #[serde(rename = "paciente")]
    Patient,
    #[serde(rename = "admin")]
    Admin,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Patient => "paciente",
            AccountKind::Admin => "admin",
        }
    }
}

/// Editable personal data of an account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    pub nombre: String,
    pub apellido: String,
    pub fecha_nacimiento: Option<String>,
    pub genero: Option<String>,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub dni: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub username: String,
    #[serde(rename = "nombre")]
    pub first_name: String,
    #[serde(rename = "apellido")]
    pub last_name: String,
    #[serde(rename = "tipo")]
    pub kind: AccountKind,
}

/// Most recent result of a patient: `{"riesgo", "confianza", "fecha"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisSummary {
    pub riesgo: usize,
    pub confianza: f32,
    pub fecha: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisEntry {
    pub id: String,
    #[serde(rename = "fecha_diagnostico")]
    pub fecha: String,
    #[serde(flatten)]
    pub measurement: MeasurementRecord,
    #[serde(rename = "imc")]
    pub bmi: f64,
    pub riesgo: usize,
    pub confianza: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub id: PatientId,
    pub username: String,
    #[serde(rename = "nombre")]
    pub first_name: String,
    #[serde(rename = "apellido")]
    pub last_name: String,
    #[serde(rename = "total_diagnosticos")]
    pub total_diagnoses: u32,
    #[serde(rename = "ultimo_diagnostico")]
    pub last_diagnosis: Option<String>,
}
