//! Key/value contention harness

use super::{join_all, BenchResult};
use crate::store::{KeyValueStore, StoreVariant};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::debug;

/// Drives concurrent writers and readers against a store backend
///
/// Every writer hammers the same key, so all of them contend for the same
/// lock or map slot.
#[derive(Debug, Clone)]
pub struct KeyValueBenchHarness {
    key: Arc<str>,
    value: i64,
}

impl KeyValueBenchHarness {
    /// Harness writing `1` under `"test"`
    pub fn new() -> Self {
        Self::with_key_value("test", 1)
    }

    /// Harness writing `value` under `key`
    pub fn with_key_value(key: impl Into<String>, value: i64) -> Self {
        let key: String = key.into();
        KeyValueBenchHarness {
            key: Arc::from(key),
            value,
        }
    }

    /// Run the workload against a freshly built store of `variant`
    pub async fn run(
        &self,
        variant: StoreVariant,
        writer_count: usize,
        reader_count: usize,
        ops_per_writer: usize,
    ) -> anyhow::Result<BenchResult> {
        self.run_with_store(variant.build(), writer_count, reader_count, ops_per_writer)
            .await
    }

    /// Run the workload against a caller-supplied store
    ///
    /// Spawns `writer_count` tasks doing `ops_per_writer` sequential sets
    /// each, plus `reader_count` tasks doing a single get each, then waits
    /// for all of them.
    pub async fn run_with_store(
        &self,
        store: Arc<dyn KeyValueStore>,
        writer_count: usize,
        reader_count: usize,
        ops_per_writer: usize,
    ) -> anyhow::Result<BenchResult> {
        debug!(
            "Running {} writers x {} ops + {} readers on {}",
            writer_count,
            ops_per_writer,
            reader_count,
            store.name()
        );

        let before = store.stats();
        let start = Instant::now();
        let mut tasks = JoinSet::new();

        for _ in 0..writer_count {
            let store = store.clone();
            let key = self.key.clone();
            let value = self.value;

            tasks.spawn(async move {
                for _ in 0..ops_per_writer {
                    store.set(&key, value);
                }
            });
        }

        for _ in 0..reader_count {
            let store = store.clone();
            let key = self.key.clone();

            tasks.spawn(async move {
                std::hint::black_box(store.get(&key));
            });
        }

        join_all(tasks).await?;
        let elapsed = start.elapsed();
        let after = store.stats();

        let iterations = (writer_count * ops_per_writer + reader_count) as u64;
        Ok(BenchResult::new(
            iterations,
            elapsed,
            after.memory_bytes.saturating_sub(before.memory_bytes) as u64,
            after.inserts.saturating_sub(before.inserts),
        ))
    }
}

impl Default for KeyValueBenchHarness {
    fn default() -> Self {
        Self::new()
    }
}
