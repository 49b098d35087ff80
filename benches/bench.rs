//! Criterion benchmarks for review-sentiment.
//!
//! Covers the per-request path (normalization, vectorization, single-text
//! prediction) and the batch paths used during training.

use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use review_sentiment::analysis::TextNormalizer;
use review_sentiment::inference::InferenceService;
use review_sentiment::ml::VectorizerConfig;
use review_sentiment::training::{RawReview, TrainingConfig, TrainingOrchestrator};

/// Generate synthetic reviews with a rating for benchmarking.
fn generate_reviews(count: usize) -> Vec<RawReview> {
    let positive = [
        "great", "wonderful", "delicious", "love", "excellent", "fresh", "perfect",
    ];
    let negative = [
        "terrible", "awful", "stale", "broken", "waste", "refund", "disappointed",
    ];
    let neutral = [
        "product", "taste", "price", "package", "coffee", "arrived", "flavor", "box",
    ];

    let mut reviews = Vec::with_capacity(count);
    for i in 0..count {
        let rating = [1.0, 2.0, 3.0, 4.0, 5.0][i % 5];
        let doc_length = 20 + (i % 40);
        let mut words = Vec::with_capacity(doc_length);

        for j in 0..doc_length {
            let pool: &[&str] = match (rating as usize, j % 3) {
                (4 | 5, 0) => &positive,
                (1 | 2, 0) => &negative,
                _ => &neutral,
            };
            words.push(pool[(i * 7 + j * 13) % pool.len()]);
        }

        reviews.push(RawReview::new(rating, format!("{} #{i}", words.join(" "))));
    }

    reviews
}

fn bench_config() -> TrainingConfig {
    TrainingConfig {
        vectorizer: VectorizerConfig {
            min_df: 2,
            ..VectorizerConfig::default()
        },
        ..TrainingConfig::default()
    }
}

/// Benchmark text normalization.
fn bench_normalization(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalization");

    let normalizer = TextNormalizer::new().unwrap();
    let texts: Vec<String> = generate_reviews(1000)
        .into_iter()
        .filter_map(|r| r.text)
        .collect();

    group.bench_function("normalize_single_review", |b| {
        b.iter(|| black_box(normalizer.normalize(black_box(&texts[0]))))
    });

    group.throughput(Throughput::Elements(texts.len() as u64));
    group.bench_function("normalize_all_parallel", |b| {
        b.iter(|| black_box(normalizer.normalize_all(black_box(&texts))))
    });

    group.finish();
}

/// Benchmark vectorization and prediction against a trained bundle.
fn bench_inference(c: &mut Criterion) {
    let mut group = c.benchmark_group("inference");

    let mut orchestrator = TrainingOrchestrator::new(bench_config()).unwrap();
    let (bundle, _) = orchestrator.fit(generate_reviews(2000)).unwrap();
    let service = InferenceService::from_bundle(bundle).unwrap();

    let normalized = service
        .normalizer()
        .normalize("Wonderful coffee, fresh flavor and a great price");

    group.bench_function("vectorize_single_review", |b| {
        b.iter(|| black_box(service.bundle().vectorizer.transform_one(black_box(&normalized))))
    });

    group.bench_function("predict_single_review", |b| {
        b.iter(|| {
            black_box(service.predict(black_box("Stale coffee, arrived broken, want a refund")))
        })
    });

    let texts: Vec<String> = generate_reviews(500)
        .into_iter()
        .filter_map(|r| r.text)
        .collect();
    group.throughput(Throughput::Elements(texts.len() as u64));
    group.bench_function("predict_batch", |b| {
        b.iter(|| black_box(service.predict_batch(black_box(&texts))))
    });

    group.finish();
}

/// Benchmark a full fit without persistence.
fn bench_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("training");
    group.sample_size(10);

    let reviews = generate_reviews(2000);
    group.throughput(Throughput::Elements(reviews.len() as u64));
    group.bench_function("fit_2000_reviews", |b| {
        b.iter_with_setup(
            || reviews.clone(),
            |reviews| {
                let mut orchestrator = TrainingOrchestrator::new(bench_config()).unwrap();
                black_box(orchestrator.fit(reviews).unwrap())
            },
        )
    });

    group.finish();
}

criterion_group!(benches, bench_normalization, bench_inference);

// Separate group for slower benchmarks
criterion_group!(slow_benches, bench_training);

criterion_main!(benches, slow_benches);
