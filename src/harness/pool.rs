//! Buffer reuse harness

use super::{join_all, BenchResult};
use crate::pool::{allocate_fresh, AllocStats, AllocTracker, AllocationStrategy, BufferPool};
use bytes::{BufMut, Bytes};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::debug;

/// Default buffer capacity
pub const DEFAULT_BUFFER_CAPACITY: usize = 100;

/// Default payload written on every iteration
pub const DEFAULT_PAYLOAD: &[u8] = b"hello world!";

/// Drives acquire → write → release cycles against an allocation strategy
#[derive(Debug, Clone)]
pub struct ObjectPoolBenchHarness {
    buffer_capacity: usize,
    payload: Bytes,
}

impl ObjectPoolBenchHarness {
    /// Harness writing `hello world!` into 100-byte buffers
    pub fn new() -> Self {
        Self::with_payload(DEFAULT_BUFFER_CAPACITY, Bytes::from_static(DEFAULT_PAYLOAD))
    }

    /// Harness writing `payload` into `buffer_capacity`-byte buffers
    pub fn with_payload(buffer_capacity: usize, payload: impl Into<Bytes>) -> Self {
        ObjectPoolBenchHarness {
            buffer_capacity,
            payload: payload.into(),
        }
    }

    /// Run `iterations` cycles sequentially on the calling thread
    pub fn run(&self, strategy: AllocationStrategy, iterations: u64) -> BenchResult {
        debug!("Running {} iterations of {}", iterations, strategy);

        let tracker = Arc::new(AllocTracker::new());
        let source = self.source(strategy, &tracker);

        let start = Instant::now();
        let local = source.drive(&self.payload, iterations);
        let elapsed = start.elapsed();

        tracker.add(local);
        let allocs = tracker.snapshot();
        BenchResult::new(iterations, elapsed, allocs.bytes, allocs.allocations)
    }

    /// Run `iterations` cycles split across `workers` concurrent tasks
    ///
    /// With [`AllocationStrategy::PooledReuse`] all workers share one pool,
    /// so at most `workers` buffers are ever created.
    pub async fn run_parallel(
        &self,
        strategy: AllocationStrategy,
        iterations: u64,
        workers: usize,
    ) -> anyhow::Result<BenchResult> {
        if workers == 0 {
            anyhow::bail!("run_parallel needs at least one worker");
        }

        debug!(
            "Running {} iterations of {} across {} workers",
            iterations, strategy, workers
        );

        let tracker = Arc::new(AllocTracker::new());
        let source = self.source(strategy, &tracker);

        let start = Instant::now();
        let mut tasks = JoinSet::new();

        for share in split_iterations(iterations, workers) {
            let source = source.clone();
            let payload = self.payload.clone();
            let tracker = tracker.clone();

            tasks.spawn(async move {
                let local = source.drive(&payload, share);
                tracker.add(local);
            });
        }

        join_all(tasks).await?;
        let elapsed = start.elapsed();

        let allocs = tracker.snapshot();
        Ok(BenchResult::new(iterations, elapsed, allocs.bytes, allocs.allocations))
    }

    fn source(&self, strategy: AllocationStrategy, tracker: &Arc<AllocTracker>) -> BufferSource {
        match strategy {
            AllocationStrategy::FreshAllocation => BufferSource::Fresh {
                capacity: self.buffer_capacity,
            },
            AllocationStrategy::PooledReuse => {
                BufferSource::Pooled(BufferPool::new(self.buffer_capacity, tracker.clone()))
            }
        }
    }
}

impl Default for ObjectPoolBenchHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Where one run gets its buffers from
#[derive(Clone)]
enum BufferSource {
    Fresh { capacity: usize },
    Pooled(BufferPool),
}

impl BufferSource {
    /// Run `iterations` cycles, returning the allocations counted locally
    ///
    /// The fresh path tallies into a worker-local counter so the timed loop
    /// never touches shared atomics. The pooled path reports growth to the
    /// pool's tracker itself and returns an empty tally.
    fn drive(&self, payload: &[u8], iterations: u64) -> AllocStats {
        let mut tally = AllocStats::default();

        match self {
            BufferSource::Fresh { capacity } => {
                for _ in 0..iterations {
                    let mut buf = allocate_fresh(*capacity, &mut tally);
                    buf.put_slice(payload);
                    if buf.capacity() > *capacity {
                        tally.record(buf.capacity());
                    }
                    std::hint::black_box(buf);
                }
            }
            BufferSource::Pooled(pool) => {
                for _ in 0..iterations {
                    let mut buf = pool.acquire();
                    buf.reset();
                    buf.write_payload(payload);
                    std::hint::black_box(&buf);
                    buf.release();
                }
            }
        }

        tally
    }
}

/// Split `iterations` into `workers` near-equal shares
fn split_iterations(iterations: u64, workers: usize) -> Vec<u64> {
    let workers = workers as u64;
    let base = iterations / workers;
    let extra = iterations % workers;

    (0..workers).map(|i| base + u64::from(i < extra)).collect()
}
