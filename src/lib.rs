//! DEC risk core: cardiovascular risk assessment from patient measurements.
//!
//! Modular structure:
//! - [`measurement`] — Measurement record and request body decoding
//! - [`features`] — Threshold bucketing into a 10-slot feature vector
//! - [`model`] — Frozen ONNX classifier
//! - [`risk`] — Assessment orchestration
//! - [`storage`] — Encrypted diagnosis store
//! - [`logging`] — Structured logging

pub mod config;
pub mod error;
pub mod measurement;
pub mod features;
pub mod model;
pub mod risk;
pub mod storage;
pub mod logging;

pub use config::ServiceConfig;
pub use error::{ConfigError, DiagnoseError, DiagnosisError, StoreError};
pub use measurement::MeasurementRecord;
pub use features::{encode, FeatureVector};
pub use model::{Classifier, OnnxClassifier, PredictionResult};
pub use risk::{Assessment, RiskLevel, RiskService};
pub use storage::DiagnosisStore;
pub use logging::StructuredLogger;
