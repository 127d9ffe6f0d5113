//! Predicate function benchmarks.
//!
//! Measures key generation for the text predicates of a string variable.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use blocklink::predicates::{functions, phonetic};
use blocklink::variables::{BASE_STRING_FUNCTIONS, SHORT_STRING_FUNCTIONS};
use blocklink::FieldValue;

const WORDS: &[&str] = &[
    "donald", "duck", "goofy", "mickey", "mouse", "daisy", "pluto", "minnie", "scrooge",
    "mcduck", "street", "avenue", "1992", "apt", "4b", "unit", "12",
];

/// Generate name/address-like values of `tokens` words each.
fn generate_values(count: usize, tokens: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..count)
        .map(|_| {
            (0..tokens)
                .map(|_| WORDS[rng.gen_range(0..WORDS.len())])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

/// Benchmark every string predicate over a batch of values.
fn bench_string_functions(c: &mut Criterion) {
    let mut group = c.benchmark_group("string_functions");
    let values: Vec<FieldValue> = generate_values(1_000, 4)
        .into_iter()
        .map(FieldValue::text)
        .collect();
    group.throughput(Throughput::Elements(values.len() as u64));

    for function in BASE_STRING_FUNCTIONS.iter().chain(SHORT_STRING_FUNCTIONS.iter()) {
        group.bench_with_input(
            BenchmarkId::new("function", function.name()),
            &values,
            |b, values| {
                b.iter(|| {
                    for value in values {
                        black_box(function.apply(value).unwrap());
                    }
                })
            },
        );
    }

    group.finish();
}

/// Benchmark suffix arrays as the value length grows.
fn bench_suffix_array_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("suffix_array_scaling");

    for tokens in [1, 4, 16, 64].iter() {
        let value = generate_values(1, *tokens).remove(0);
        group.throughput(Throughput::Bytes(value.len() as u64));
        group.bench_with_input(BenchmarkId::new("tokens", tokens), &value, |b, value| {
            b.iter(|| black_box(functions::suffix_array_keys(value)))
        });
    }

    group.finish();
}

/// Benchmark the phonetic encoder alone.
fn bench_double_metaphone(c: &mut Criterion) {
    let values = generate_values(1_000, 1);
    c.bench_function("double_metaphone", |b| {
        b.iter(|| {
            for value in &values {
                black_box(phonetic::double_metaphone(value));
            }
        })
    });
}

criterion_group!(
    benches,
    bench_string_functions,
    bench_suffix_array_scaling,
    bench_double_metaphone,
);
criterion_main!(benches);
