//! Benchmarks for rating matrix construction.
//!
//! Run with: `cargo bench -p cinematch-core --bench matrix`
//!
//! Measures selection + dense construction at several dataset sizes, using
//! the production caps from `cinematch_core::config`.

use cinematch_core::config::MatrixConfig;
use cinematch_core::matrix::build_matrix;
use cinematch_core::ratings::RatingRecord;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

// =============================================================================
// Test Data Generation
// =============================================================================

/// Deterministic sparse ratings: each user rates roughly one title in eight.
///
/// Activity is skewed so low user and item ids are the busiest, matching the
/// long tail of real rating data.
fn synthetic_ratings(n_users: u32, n_items: u32) -> Vec<RatingRecord> {
    let mut records = Vec::new();
    for user in 0..n_users {
        let stride = 1 + user % 8;
        let mut item = user % stride;
        while item < n_items {
            let rating = 0.5 * (1 + (user * 31 + item * 17) % 10) as f32;
            records.push(RatingRecord {
                user_id: user,
                item_id: item,
                title: format!("Movie {item}"),
                rating,
            });
            item += stride * 8;
        }
    }
    records
}

fn bench_build_matrix(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_matrix");
    group.sample_size(20);

    for (n_users, n_items) in [(500u32, 200u32), (2_000, 1_000), (6_000, 4_000)] {
        let records = synthetic_ratings(n_users, n_items);
        group.throughput(Throughput::Elements(records.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{n_users}x{n_items}")),
            &records,
            |b, records| {
                b.iter(|| build_matrix(black_box(records), &MatrixConfig::default()).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_build_matrix);
criterion_main!(benches);
