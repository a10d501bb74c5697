//! Inference benchmark: feature vector -> classifier predict (stub runtime).

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dec_risk::error::DiagnosisError;
use dec_risk::features::{FeatureVector, FEATURE_COUNT};
use dec_risk::model::{Classifier, PredictionResult};

struct FixedClassifier;

impl Classifier for FixedClassifier {
    fn scores(&self, input: &[f32; FEATURE_COUNT]) -> Result<Vec<f32>, DiagnosisError> {
        let s: f32 = input.iter().sum::<f32>() / 20.0;
        Ok(vec![1.0 - s, s * 0.5, s * 0.5])
    }
}

fn bench_predict(c: &mut Criterion) {
    let classifier = FixedClassifier;
    let fv = FeatureVector::new([1, 0, 2, 1, 0, 1, 0, 0, 2, 1]);

    c.bench_function("predict_stub_10d", |b| {
        b.iter(|| classifier.predict(black_box(&fv)))
    });
}

fn bench_argmax(c: &mut Criterion) {
    let mut g = c.benchmark_group("argmax_by_classes");
    for n in [2, 3, 8, 32] {
        let scores: Vec<f32> = (0..n).map(|i| i as f32 / n as f32).collect();
        g.bench_function(format!("classes_{}", n).as_str(), |b| {
            b.iter(|| PredictionResult::from_scores(black_box(&scores)))
        });
    }
    g.finish();
}

criterion_group!(benches, bench_predict, bench_argmax);
criterion_main!(benches);
