//! Measuring harnesses
//!
//! Each harness builds its backend fresh for every run, drives a fixed
//! workload shape against it and returns an immutable [`BenchResult`].

mod kv;
mod pool;

pub use kv::KeyValueBenchHarness;
pub use pool::{ObjectPoolBenchHarness, DEFAULT_BUFFER_CAPACITY, DEFAULT_PAYLOAD};

use serde::Serialize;
use std::time::Duration;
use tokio::task::JoinSet;

/// Outcome of one measured run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BenchResult {
    iterations: u64,
    elapsed: Duration,
    bytes_allocated: u64,
    allocations: u64,
}

impl BenchResult {
    /// Build a result from raw measurements
    pub fn new(iterations: u64, elapsed: Duration, bytes_allocated: u64, allocations: u64) -> Self {
        BenchResult {
            iterations,
            elapsed,
            bytes_allocated,
            allocations,
        }
    }

    /// Number of operations performed
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Wall-clock time of the run
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Bytes requested by allocations during the run
    pub fn bytes_allocated(&self) -> u64 {
        self.bytes_allocated
    }

    /// Allocations performed during the run
    pub fn allocations(&self) -> u64 {
        self.allocations
    }

    /// Average nanoseconds per operation
    pub fn ns_per_op(&self) -> f64 {
        per_op(self.elapsed.as_nanos() as f64, self.iterations)
    }

    /// Average bytes allocated per operation
    pub fn bytes_per_op(&self) -> f64 {
        per_op(self.bytes_allocated as f64, self.iterations)
    }

    /// Average allocations per operation
    pub fn allocs_per_op(&self) -> f64 {
        per_op(self.allocations as f64, self.iterations)
    }

    /// Sum of two results, used to aggregate samples
    pub fn merge(&self, other: &BenchResult) -> BenchResult {
        BenchResult {
            iterations: self.iterations + other.iterations,
            elapsed: self.elapsed + other.elapsed,
            bytes_allocated: self.bytes_allocated + other.bytes_allocated,
            allocations: self.allocations + other.allocations,
        }
    }
}

fn per_op(total: f64, iterations: u64) -> f64 {
    if iterations == 0 {
        0.0
    } else {
        total / iterations as f64
    }
}

/// Wait for every spawned task
///
/// All tasks are always drained. A task that panicked is not retried; the
/// first failure is returned once the rest have finished.
pub(crate) async fn join_all(mut tasks: JoinSet<()>) -> anyhow::Result<()> {
    let mut failure = None;

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            if failure.is_none() {
                failure = Some(e);
            }
        }
    }

    match failure {
        Some(e) => Err(anyhow::anyhow!("worker task failed: {}", e)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_op_metrics() {
        let result = BenchResult::new(4, Duration::from_nanos(400), 800, 4);

        assert_eq!(result.ns_per_op(), 100.0);
        assert_eq!(result.bytes_per_op(), 200.0);
        assert_eq!(result.allocs_per_op(), 1.0);
    }

    #[test]
    fn test_zero_iterations_do_not_divide() {
        let result = BenchResult::default();
        assert_eq!(result.ns_per_op(), 0.0);
    }

    #[test]
    fn test_merge() {
        let a = BenchResult::new(10, Duration::from_millis(1), 100, 1);
        let b = BenchResult::new(10, Duration::from_millis(3), 0, 0);

        let merged = a.merge(&b);
        assert_eq!(merged.iterations(), 20);
        assert_eq!(merged.elapsed(), Duration::from_millis(4));
        assert_eq!(merged.allocations(), 1);
    }

    #[tokio::test]
    async fn test_join_all_reports_panics_after_draining() {
        let mut tasks = JoinSet::new();
        tasks.spawn(async { panic!("boom") });
        tasks.spawn(async {});

        let err = join_all(tasks).await.unwrap_err();
        assert!(err.to_string().contains("worker task failed"));
    }
}
