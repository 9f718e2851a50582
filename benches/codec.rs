//! Frame codec benchmark suite.
//!
//! Benchmarks encode/decode across payload sizes and both compression
//! branches.
//!
//! Run with: cargo bench --bench codec
//! Results saved to: target/criterion/

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use serde_json::json;
use tokio::runtime::Runtime;

use worker_rpc::RequestId;
use worker_rpc::protocol::{self, Request};

// ============================================================================
// Benchmark Parameters
// ============================================================================

const PAYLOAD_SIZES: &[usize] = &[256, 4 * 1024, 64 * 1024];

fn payload(size: usize) -> Request {
    Request::with_id(RequestId::new("bench"), json!({ "blob": "x".repeat(size) }))
        .expect("object body")
}

// ============================================================================
// Benchmark: Encode
// ============================================================================

fn bench_encode(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("encode");
    for &size in PAYLOAD_SIZES {
        let request = payload(size);

        group.bench_with_input(BenchmarkId::new("plain", size), &request, |b, request| {
            b.to_async(&rt)
                .iter(|| async { protocol::encode(request, false, 0).await.unwrap() });
        });

        group.bench_with_input(
            BenchmarkId::new("compressed", size),
            &request,
            |b, request| {
                b.to_async(&rt)
                    .iter(|| async { protocol::encode(request, true, 0).await.unwrap() });
            },
        );
    }
    group.finish();
}

// ============================================================================
// Benchmark: Decode
// ============================================================================

fn bench_decode(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("decode");
    for &size in PAYLOAD_SIZES {
        let request = payload(size);
        let plain = rt.block_on(async { protocol::encode(&request, false, 0).await.unwrap() });
        let compressed = rt.block_on(async { protocol::encode(&request, true, 0).await.unwrap() });

        group.bench_with_input(BenchmarkId::new("plain", size), &plain, |b, frame| {
            b.to_async(&rt)
                .iter(|| async { protocol::decode(frame.clone()).await.unwrap() });
        });

        group.bench_with_input(
            BenchmarkId::new("compressed", size),
            &compressed,
            |b, frame| {
                b.to_async(&rt)
                    .iter(|| async { protocol::decode(frame.clone()).await.unwrap() });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
