//! Pipeline benchmark: JSON body -> measurement record -> feature vector.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dec_risk::features::encode;
use dec_risk::measurement::MeasurementRecord;

const BODY: &str = r#"{"edad": "52", "genero": "masculino", "ps": 135, "pd": 85,
    "colesterol": 215.5, "glucosa": "101", "fuma": "s", "alcohol": "n",
    "actividad": "1-2 veces", "peso": 82.4, "estatura": 174}"#;

fn bench_decode(c: &mut Criterion) {
    c.bench_function("decode_body", |b| {
        b.iter(|| MeasurementRecord::from_json(black_box(BODY)))
    });
}

fn bench_encode(c: &mut Criterion) {
    let record = MeasurementRecord::from_json(BODY).unwrap();
    c.bench_function("encode_record", |b| b.iter(|| encode(black_box(&record))));
}

fn bench_decode_and_encode(c: &mut Criterion) {
    c.bench_function("decode_and_encode", |b| {
        b.iter(|| {
            let record = MeasurementRecord::from_json(black_box(BODY)).unwrap();
            black_box(encode(&record))
        })
    });
}

criterion_group!(benches, bench_decode, bench_encode, bench_decode_and_encode);
criterion_main!(benches);
