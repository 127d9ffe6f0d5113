//! Cover building benchmarks.
//!
//! Measures cover construction across dataset sizes and shard sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use blocklink::{
    Cover, CoverConfig, DataModel, FieldValue, IdentifiedRecord, ModelConfig, VariableDefinition,
    VariableType,
};

const FIRST: &[&str] = &["donald", "daisy", "mickey", "minnie", "goofy", "pluto", "scrooge"];
const LAST: &[&str] = &["duck", "mouse", "dog", "mcduck", "smith", "jones"];
const CITIES: &[&str] = &["duckburg", "mouseton", "calisota", "st. canard"];

/// Generate synthetic person records: name, tags, city.
fn generate_records(count: usize) -> Vec<IdentifiedRecord> {
    let mut rng = StdRng::seed_from_u64(7);
    (0..count)
        .map(|i| {
            let name = format!(
                "{} {} {}",
                FIRST[rng.gen_range(0..FIRST.len())],
                LAST[rng.gen_range(0..LAST.len())],
                rng.gen_range(0..100)
            );
            let tags = FieldValue::set([
                LAST[rng.gen_range(0..LAST.len())],
                CITIES[rng.gen_range(0..CITIES.len())],
            ]);
            let city = if rng.gen_bool(0.2) {
                FieldValue::Missing
            } else {
                FieldValue::text(CITIES[rng.gen_range(0..CITIES.len())])
            };
            IdentifiedRecord::new(i as u64, vec![FieldValue::text(name), tags, city])
        })
        .collect()
}

fn model() -> DataModel {
    DataModel::builder()
        .config(ModelConfig::default().without_index_predicates())
        .definitions([
            VariableDefinition::field(0, VariableType::String),
            VariableDefinition::field(1, VariableType::Set),
            VariableDefinition::field(2, VariableType::Exact).with_missing(true),
        ])
        .build()
        .unwrap()
}

/// Benchmark cover building as the dataset grows.
fn bench_cover_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("cover_build");
    let predicates = model().predicates();

    for count in [100, 1_000, 10_000].iter() {
        let records = generate_records(*count);
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("records", count), &records, |b, records| {
            b.iter(|| black_box(Cover::build(&predicates, records, None).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark cover building with varying shard sizes.
fn bench_shard_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("cover_shard_size");
    let predicates = model().predicates();
    let records = generate_records(5_000);

    for shard_size in [64, 256, 1024, 4096].iter() {
        let config = CoverConfig {
            shard_size: *shard_size,
        };
        group.bench_with_input(BenchmarkId::new("shard", shard_size), &config, |b, config| {
            b.iter(|| black_box(Cover::build_with_config(&predicates, &records, None, config).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_cover_build, bench_shard_size);
criterion_main!(benches);
