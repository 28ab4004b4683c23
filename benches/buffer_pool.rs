//! Buffer reuse benchmarks
//!
//! Writes `hello world!` into a 100-byte buffer per iteration, either freshly
//! allocated or checked out of a pool.

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::sync::Arc;
use bytes::BytesMut;
use syncbench::pool::{AllocTracker, BufferPool};

const PAYLOAD: &[u8] = b"hello world!";
const CAPACITY: usize = 100;

fn bench_write(c: &mut Criterion) {
    c.bench_function("write", |b| {
        b.iter(|| {
            let mut buf = BytesMut::with_capacity(CAPACITY);
            buf.extend_from_slice(PAYLOAD);
            black_box(buf);
        })
    });
}

fn bench_write_with_pool(c: &mut Criterion) {
    let pool = BufferPool::new(CAPACITY, Arc::new(AllocTracker::new()));

    c.bench_function("write_with_pool", |b| {
        b.iter(|| {
            let mut buf = pool.acquire();
            buf.reset();
            buf.write_payload(PAYLOAD);
            black_box(&buf);
            buf.release();
        })
    });
}

criterion_group!(benches, bench_write, bench_write_with_pool);
criterion_main!(benches);
