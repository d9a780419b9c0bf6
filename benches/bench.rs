// Criterion benchmarks for petmatch

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use petmatch::core::classifier::{classify, extract_breed, Label};
use petmatch::core::naming::{derive_username, slugify};
use petmatch::models::AnimalType;

fn create_labels(count: usize) -> Vec<Label> {
    (0..count)
        .map(|i| match i % 5 {
            0 => Label::new("dog", 0.95 - (i as f64) * 0.001),
            1 => Label::new("golden retriever", 0.88),
            2 => Label::new("mammal", 0.99),
            3 => Label::new("snout", 0.74),
            _ => Label::new(format!("label {}", i), 0.5),
        })
        .collect()
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");

    for size in [5, 10, 50] {
        let labels = create_labels(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &labels, |b, labels| {
            b.iter(|| classify(black_box(labels)));
        });
    }

    group.finish();
}

fn bench_extract_breed(c: &mut Criterion) {
    let labels = create_labels(10);
    c.bench_function("extract_breed", |b| {
        b.iter(|| extract_breed(black_box(&labels), black_box(AnimalType::Dog)));
    });
}

fn bench_username_derivation(c: &mut Criterion) {
    c.bench_function("slugify", |b| {
        b.iter(|| slugify(black_box("Jane Allison Doe-Smith")));
    });

    c.bench_function("derive_username_from_email", |b| {
        b.iter(|| derive_username(black_box(None), black_box(None), black_box("jane.doe@example.com")));
    });
}

criterion_group!(benches, bench_classify, bench_extract_breed, bench_username_derivation);
criterion_main!(benches);
