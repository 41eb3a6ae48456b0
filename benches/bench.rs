// Criterion benchmarks for the pure pipeline stages

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use predict_gate::{aggregate, classify, normalize, ModelOutcome};
use serde_json::{json, Map, Value};

fn raw_measurements() -> Map<String, Value> {
    json!({
        "name": "Jane",
        "Pregnancies": 2,
        "Glucose": 120.5,
        "BloodPressure": "72",
        "SkinThickness": 20,
        "Insulin": 85,
        "BMI": 28.1,
        "DiabetesPedigreeFunction": 0.52,
        "Age": 33
    })
    .as_object()
    .unwrap()
    .clone()
}

fn outcomes(n: usize) -> Vec<ModelOutcome> {
    (0..n)
        .map(|i| ModelOutcome {
            model: format!("model_{}", i),
            prediction: Some(i % 2 == 0),
            confidence: Some((i % 100) as f64),
        })
        .collect()
}

fn bench_normalize(c: &mut Criterion) {
    let raw = raw_measurements();
    c.bench_function("normalize", |b| {
        b.iter(|| normalize(black_box(&raw)).unwrap())
    });
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");
    for n in [1usize, 4, 16, 64] {
        let input = outcomes(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &input, |b, input| {
            b.iter(|| aggregate(black_box(input)).unwrap())
        });
    }
    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    c.bench_function("classify", |b| {
        b.iter(|| classify(black_box(72.5)))
    });
}

criterion_group!(benches, bench_normalize, bench_aggregate, bench_classify);
criterion_main!(benches);
