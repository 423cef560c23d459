//! Fusion-stage benchmark: RRF over realistic candidate pool sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tifo_core::document::Metadata;
use tifo_core::models::RetrievalItem;
use tifo_retrieval::fusion::reciprocal_rank_fusion;

fn candidates(prefix: &str, n: usize) -> Vec<RetrievalItem> {
    (0..n)
        .map(|i| RetrievalItem {
            // Half the ids overlap between the two arms.
            id: format!("{}-{}", if i % 2 == 0 { "shared" } else { prefix }, i),
            text: format!("documento di prova numero {i}"),
            metadata: Metadata::new(),
            dense_score: None,
            bm25_score: None,
            fused_score: 0.0,
        })
        .collect()
}

fn bench_fusion(c: &mut Criterion) {
    let mut group = c.benchmark_group("rrf_fusion");
    for pool in [10usize, 100, 500] {
        group.bench_with_input(BenchmarkId::from_parameter(pool), &pool, |b, &pool| {
            let dense = candidates("dense", pool);
            let sparse = candidates("sparse", pool);
            b.iter(|| {
                reciprocal_rank_fusion(
                    black_box(vec![dense.clone(), sparse.clone()]),
                    black_box(60),
                )
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_fusion);
criterion_main!(benches);
