//! Measurement record -> feature vector.

use super::{buckets, FeatureVector};
use crate::error::DiagnosisResult;
use crate::measurement::MeasurementRecord;

/// Bucket every field of `record`. Pure; fails only when BMI cannot be derived
/// (zero height).
pub fn encode(record: &MeasurementRecord) -> DiagnosisResult<FeatureVector> {
    let bmi = record.bmi()?;
    Ok(FeatureVector::new([
        buckets::age(record.age),
        buckets::sex(&record.sex),
        buckets::systolic(record.systolic),
        buckets::diastolic(record.diastolic),
        buckets::cholesterol(record.cholesterol),
        buckets::glucose(record.glucose),
        buckets::yes_token(&record.smoker),
        buckets::yes_token(&record.alcohol),
        buckets::activity(&record.activity),
        buckets::bmi(bmi),
    ]))
}
