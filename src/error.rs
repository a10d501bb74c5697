//! Error taxonomy for assessment and persistence.

use serde::Serialize;
use thiserror::Error;

pub type DiagnosisResult<T> = Result<T, DiagnosisError>;

/// Failure of a single assessment. Never carries a partial result.
#[derive(Debug, Error)]
pub enum DiagnosisError {
    /// Missing or malformed measurement field, or zero height.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Classifier artifact failed to load or invoke.
    #[error("inference error: {0}")]
    Inference(String),
}

impl DiagnosisError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        DiagnosisError::InvalidInput(msg.into())
    }

    pub fn inference(msg: impl Into<String>) -> Self {
        DiagnosisError::Inference(msg.into())
    }

    /// HTTP status class a caller should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            DiagnosisError::InvalidInput(_) => 400,
            DiagnosisError::Inference(_) => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            message: self.to_string(),
        }
    }
}

/// JSON error shape returned to clients: `{"message": "..."}`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("payload error: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("crypto error: {0}")]
    Crypto(String),

    #[error("patient already exists: {0}")]
    PatientExists(String),

    #[error("patient not found: {0}")]
    PatientNotFound(String),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Failure of a diagnosis for a stored patient: lookup, assessment, or save.
#[derive(Debug, Error)]
pub enum DiagnoseError {
    #[error(transparent)]
    Diagnosis(#[from] DiagnosisError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<aes_gcm::Error> for StoreError {
    fn from(_: aes_gcm::Error) -> Self {
        StoreError::Crypto("aead failure".to_string())
    }
}

impl From<base64::DecodeError> for StoreError {
    fn from(err: base64::DecodeError) -> Self {
        StoreError::Crypto(err.to_string())
    }
}
