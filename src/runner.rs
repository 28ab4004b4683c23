//! Benchmark suite runner
//!
//! The frontend around the harnesses: warm-up, repeated samples, naming and
//! aggregation of every configured case.

use crate::config::{BenchConfig, KvScenario};
use crate::harness::{BenchResult, KeyValueBenchHarness, ObjectPoolBenchHarness};
use crate::pool::AllocationStrategy;
use crate::report::BenchReport;
use crate::store::StoreVariant;
use anyhow::Context;
use bytes::Bytes;
use tracing::{debug, info};

/// Runs every case a [`BenchConfig`] describes
#[derive(Debug, Clone)]
pub struct Runner {
    config: BenchConfig,
}

impl Runner {
    /// Create a runner for a validated configuration
    pub fn new(config: BenchConfig) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Runner { config })
    }

    /// Run the whole suite, key/value cases first
    pub async fn run(&self) -> anyhow::Result<Vec<BenchReport>> {
        let mut reports = Vec::new();

        let kv = KeyValueBenchHarness::with_key_value(self.config.kv.key.clone(), self.config.kv.value);
        for scenario in &self.config.kv.scenarios {
            for &variant in &self.config.kv.variants {
                let name = format!("kv/{}/{}", scenario.name, variant);
                if !self.config.selects(&name) {
                    debug!("Skipping {}", name);
                    continue;
                }

                let report = self
                    .run_kv_case(&kv, scenario, variant, &name)
                    .await
                    .with_context(|| format!("Benchmark {} failed", name))?;
                reports.push(report);
            }
        }

        let pool = ObjectPoolBenchHarness::with_payload(
            self.config.pool.buffer_capacity,
            Bytes::from(self.config.pool.payload.clone()),
        );
        for &strategy in &self.config.pool.strategies {
            let name = format!("pool/write/{}", strategy);
            if !self.config.selects(&name) {
                debug!("Skipping {}", name);
                continue;
            }

            let report = self
                .run_pool_case(&pool, strategy, &name)
                .await
                .with_context(|| format!("Benchmark {} failed", name))?;
            reports.push(report);
        }

        info!("Suite finished: {} cases", reports.len());
        Ok(reports)
    }

    async fn run_kv_case(
        &self,
        harness: &KeyValueBenchHarness,
        scenario: &KvScenario,
        variant: StoreVariant,
        name: &str,
    ) -> anyhow::Result<BenchReport> {
        info!("Running {}", name);

        for _ in 0..self.config.warmup_runs {
            harness
                .run(variant, scenario.writers, scenario.readers, scenario.ops_per_writer)
                .await?;
        }

        let mut samples = Vec::with_capacity(self.config.samples);
        for _ in 0..self.config.samples {
            let sample = harness
                .run(variant, scenario.writers, scenario.readers, scenario.ops_per_writer)
                .await?;
            samples.push(sample);
        }

        Ok(BenchReport::from_samples(name, &samples))
    }

    async fn run_pool_case(
        &self,
        harness: &ObjectPoolBenchHarness,
        strategy: AllocationStrategy,
        name: &str,
    ) -> anyhow::Result<BenchReport> {
        info!("Running {}", name);

        for _ in 0..self.config.warmup_runs {
            self.pool_sample(harness, strategy).await?;
        }

        let mut samples = Vec::with_capacity(self.config.samples);
        for _ in 0..self.config.samples {
            samples.push(self.pool_sample(harness, strategy).await?);
        }

        Ok(BenchReport::from_samples(name, &samples))
    }

    async fn pool_sample(
        &self,
        harness: &ObjectPoolBenchHarness,
        strategy: AllocationStrategy,
    ) -> anyhow::Result<BenchResult> {
        let iterations = self.config.pool.iterations;

        match self.config.pool.workers {
            1 => Ok(harness.run(strategy, iterations)),
            workers => harness.run_parallel(strategy, iterations, workers).await,
        }
    }
}
