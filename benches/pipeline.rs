//! Benchmarks for signature construction and full detection runs.
//!
//! Run with: cargo bench

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sketchdedup::{DedupConfig, Deduplicator, Document, HashFunctionFamily, MinHasher, Shingler};

fn generate_article(idx: usize, variation: usize) -> String {
    let base = format!(
        "Officials said on Monday that report number {} on regional infection rates would be \
         published later this week, after a review of hospital admissions and testing data \
         from the previous month.",
        idx
    );
    if variation > 0 {
        format!("{} Updated with correction #{}.", base, variation)
    } else {
        base
    }
}

fn bench_signature(c: &mut Criterion) {
    let mut group = c.benchmark_group("signature");
    let family = HashFunctionFamily::new(143, 42).unwrap();
    let minhasher = MinHasher::new(&family);
    let shingler = Shingler::default();

    for size in [100, 500, 2000].iter() {
        let text = "lorem ipsum dolor sit amet ".repeat(*size / 27 + 1);
        let shingles = shingler.shingles(&text);
        group.throughput(Throughput::Elements(shingles.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &shingles, |b, s| {
            b.iter(|| minhasher.signature(black_box(s)));
        });
    }

    group.finish();
}

fn bench_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("run");
    group.sample_size(10);
    let dedup = Deduplicator::new(DedupConfig::default()).unwrap();

    for count in [100, 1000].iter() {
        let docs: Vec<Document> = (0..*count)
            .map(|i| Document::new(i.to_string(), generate_article(i / 2, i % 2)))
            .collect();
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &docs, |b, docs| {
            b.iter(|| dedup.run(black_box(docs.clone())).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_signature, bench_run);
criterion_main!(benches);
