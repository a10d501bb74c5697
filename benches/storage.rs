//! Diagnosis store benchmark: encrypted insert and history read.

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dec_risk::features::FeatureVector;
use dec_risk::measurement::MeasurementRecord;
use dec_risk::model::PredictionResult;
use dec_risk::risk::{Assessment, RiskLevel};
use dec_risk::storage::DiagnosisStore;
use tempfile::tempdir;

fn sample() -> (MeasurementRecord, Assessment) {
    let record = MeasurementRecord {
        age: 52,
        sex: "masculino".into(),
        systolic: 135,
        diastolic: 85,
        cholesterol: 215.5,
        glucose: 101.0,
        smoker: "s".into(),
        alcohol: "n".into(),
        activity: "1-2 veces".into(),
        weight: 82.4,
        height: 174,
    };
    let assessment = Assessment {
        features: FeatureVector::new([1, 1, 1, 1, 1, 1, 1, 0, 1, 1]),
        bmi: 27.2,
        prediction: PredictionResult { risk_class: 1, confidence: 0.64 },
        level: Some(RiskLevel::Moderate),
        assessed_at: Utc::now(),
    };
    (record, assessment)
}

fn bench_save_diagnosis(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let store = DiagnosisStore::open(&dir.path().join("store.db"), b"bench-secret").unwrap();
    let patient = store.register_patient("bench", "Bench", "User").unwrap();
    let (record, assessment) = sample();

    c.bench_function("storage_save_diagnosis", |b| {
        b.iter(|| black_box(store.save_diagnosis(patient, &record, &assessment)).unwrap())
    });
}

fn bench_history(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let store = DiagnosisStore::open(&dir.path().join("store.db"), b"bench-secret").unwrap();
    let patient = store.register_patient("bench", "Bench", "User").unwrap();
    let (record, assessment) = sample();
    for _ in 0..20 {
        store.save_diagnosis(patient, &record, &assessment).unwrap();
    }

    c.bench_function("storage_history_20", |b| {
        b.iter(|| black_box(store.history(patient)).unwrap())
    });
}

criterion_group!(benches, bench_save_diagnosis, bench_history);
criterion_main!(benches);
