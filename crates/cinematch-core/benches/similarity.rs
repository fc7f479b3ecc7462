//! Benchmarks for recommendation queries.
//!
//! Run with: `cargo bench -p cinematch-core --bench similarity`
//!
//! A query correlates one column against every other column of the matrix,
//! so latency scales with `max_items * max_users`.

use cinematch_core::config::{MatrixConfig, RecommendConfig};
use cinematch_core::ratings::{RatingRecord, RatingStore};
use cinematch_core::session::Session;
use cinematch_core::similarity::pearson_pairwise;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Dense-ish ratings where users fall into taste groups, so correlations
/// between titles are meaningful rather than noise.
fn synthetic_session(n_users: u32, n_items: u32) -> Session {
    let mut records = Vec::new();
    for user in 0..n_users {
        for item in 0..n_items {
            if (user + item * 7) % 3 == 0 {
                continue;
            }
            let taste = if user % 4 == item % 4 { 4.0 } else { 2.0 };
            let rating = taste + 0.5 * ((user + item) % 3) as f32;
            records.push(RatingRecord {
                user_id: user,
                item_id: item,
                title: format!("Movie {item}"),
                rating,
            });
        }
    }
    Session::from_store(RatingStore::from_records(records), &MatrixConfig::default()).unwrap()
}

fn bench_pearson_pairwise(c: &mut Criterion) {
    let a: Vec<Option<f32>> = (0..5_000)
        .map(|i| (i % 3 != 0).then_some((i % 10) as f32 * 0.5))
        .collect();
    let b: Vec<Option<f32>> = (0..5_000)
        .map(|i| (i % 4 != 0).then_some(((i * 7) % 10) as f32 * 0.5))
        .collect();

    c.bench_function("pearson_pairwise_5000", |bench| {
        bench.iter(|| pearson_pairwise(black_box(&a), black_box(&b)));
    });
}

fn bench_recommend(c: &mut Criterion) {
    let mut group = c.benchmark_group("recommend");
    group.sample_size(20);

    for n_items in [100u32, 500, 1_000] {
        let session = synthetic_session(1_000, n_items);
        let config = RecommendConfig::default();
        group.bench_with_input(BenchmarkId::from_parameter(n_items), &session, |b, session| {
            b.iter(|| {
                session
                    .recommend(black_box("Movie 0"), black_box(&config))
                    .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pearson_pairwise, bench_recommend);
criterion_main!(benches);
