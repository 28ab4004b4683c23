//! syncbench - measured contention and reuse microbenchmarks
//!
//! Two independent harnesses with pluggable backends:
//! - `store` + `harness::KeyValueBenchHarness`: concurrent writers/readers
//!   against lock-guarded and concurrent maps
//! - `pool` + `harness::ObjectPoolBenchHarness`: fresh allocation vs. pooled
//!   buffer reuse
//!
//! `config`, `runner` and `report` form the benchmark frontend used by the
//! binary.

pub mod store;
pub mod pool;
pub mod harness;
pub mod config;
pub mod runner;
pub mod report;

/// Re-export commonly used types
pub use store::{KeyValueStore, StoreVariant};
pub use pool::{AllocationStrategy, BufferPool, PooledBuffer};
pub use harness::{BenchResult, KeyValueBenchHarness, ObjectPoolBenchHarness};
pub use config::BenchConfig;
pub use runner::Runner;
