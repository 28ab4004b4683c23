//! Benchmark suite configuration
//!
//! Every field has a default, so an empty JSON object (or no file at all)
//! reproduces the standard suite.

use crate::harness::{DEFAULT_BUFFER_CAPACITY, DEFAULT_PAYLOAD};
use crate::pool::AllocationStrategy;
use crate::store::StoreVariant;
use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How reports are rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Aligned text table
    #[default]
    Text,
    /// JSON array of reports
    Json,
}

/// Top-level suite configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Unmeasured runs before each case
    pub warmup_runs: usize,
    /// Measured runs per case
    pub samples: usize,
    /// Report format
    pub output: OutputFormat,
    /// Only run cases whose name contains this substring
    pub filter: Option<String>,
    /// Key/value contention cases
    pub kv: KvConfig,
    /// Buffer reuse cases
    pub pool: PoolConfig,
}

impl Default for BenchConfig {
    fn default() -> Self {
        BenchConfig {
            warmup_runs: 1,
            samples: 5,
            output: OutputFormat::default(),
            filter: None,
            kv: KvConfig::default(),
            pool: PoolConfig::default(),
        }
    }
}

/// Key/value harness settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KvConfig {
    /// Key every task targets
    pub key: String,
    /// Value every writer stores
    pub value: i64,
    /// Backends to measure
    pub variants: Vec<StoreVariant>,
    /// Workload shapes, each run against every variant
    pub scenarios: Vec<KvScenario>,
}

impl Default for KvConfig {
    fn default() -> Self {
        KvConfig {
            key: "test".to_string(),
            value: 1,
            variants: StoreVariant::ALL.to_vec(),
            scenarios: vec![
                KvScenario {
                    name: "write".to_string(),
                    writers: 500,
                    readers: 0,
                    ops_per_writer: 100,
                },
                KvScenario {
                    name: "write_and_read".to_string(),
                    writers: 1000,
                    readers: 1000,
                    ops_per_writer: 100,
                },
            ],
        }
    }
}

/// One key/value workload shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvScenario {
    /// Name used in reports
    pub name: String,
    /// Concurrent writer tasks
    pub writers: usize,
    /// Concurrent reader tasks, one get each
    #[serde(default)]
    pub readers: usize,
    /// Sequential sets per writer
    pub ops_per_writer: usize,
}

/// Buffer pool harness settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Acquire/write/release cycles per run
    pub iterations: u64,
    /// Concurrent tasks sharing the pool; 1 runs on the calling thread
    pub workers: usize,
    /// Initial capacity of every buffer
    pub buffer_capacity: usize,
    /// Bytes written on every cycle
    pub payload: String,
    /// Strategies to measure
    pub strategies: Vec<AllocationStrategy>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            iterations: 1_000_000,
            workers: 1,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            payload: String::from_utf8_lossy(DEFAULT_PAYLOAD).into_owned(),
            strategies: AllocationStrategy::ALL.to_vec(),
        }
    }
}

impl BenchConfig {
    /// Load the configuration from `path`, or use defaults when absent
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Read and validate a JSON configuration file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        Self::from_json(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let config: BenchConfig = serde_json::from_str(raw).context("Malformed JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Whether the case called `name` passes the filter
    pub fn selects(&self, name: &str) -> bool {
        match &self.filter {
            Some(filter) => name.contains(filter.as_str()),
            None => true,
        }
    }

    /// Reject values no run can be built from
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.samples > 0, "samples must be > 0");
        ensure!(!self.kv.key.is_empty(), "kv.key must not be empty");

        for scenario in &self.kv.scenarios {
            ensure!(
                scenario.writers + scenario.readers > 0,
                "kv scenario '{}' has no tasks",
                scenario.name
            );
        }

        ensure!(self.pool.workers > 0, "pool.workers must be > 0");
        ensure!(self.pool.buffer_capacity > 0, "pool.buffer_capacity must be > 0");
        Ok(())
    }
}
