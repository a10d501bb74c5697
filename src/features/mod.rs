//! Categorical feature encoding of a measurement record.

pub mod buckets;
mod encoder;

pub use encoder::encode;

use serde::{Deserialize, Serialize};

/// Number of slots in the classifier input (tensor shape 1 x FEATURE_COUNT).
pub const FEATURE_COUNT: usize = 10;

/// Slot names in input order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "age",
    "sex",
    "systolic",
    "diastolic",
    "cholesterol",
    "glucose",
    "smoker",
    "alcohol",
    "activity",
    "bmi",
];

/// Bucketed features, each in `0..=2`, in `FEATURE_NAMES` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureVector {
    pub values: [u8; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn new(values: [u8; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.values
    }

    /// Input tensor row for the classifier.
    pub fn to_input(&self) -> [f32; FEATURE_COUNT] {
        self.values.map(f32::from)
    }

    pub fn get(&self, name: &str) -> Option<u8> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.values[i])
    }
}
