//! Report rendering
//!
//! Turns aggregated [`BenchResult`]s into per-operation figures, printed
//! either as a `go test -benchmem` style table or as JSON.

use crate::config::OutputFormat;
use crate::harness::BenchResult;
use serde::Serialize;
use std::fmt::Write as _;

/// Aggregated measurements for one benchmark case
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchReport {
    /// Case name, e.g. `kv/write/locked_map`
    pub name: String,
    /// Number of measured runs merged into `total`
    pub samples: usize,
    /// Operations across all samples
    pub iterations: u64,
    /// Average nanoseconds per operation
    pub ns_per_op: f64,
    /// Average bytes allocated per operation
    pub bytes_per_op: f64,
    /// Average allocations per operation
    pub allocs_per_op: f64,
    /// Sum of every sample
    pub total: BenchResult,
}

impl BenchReport {
    /// Merge `samples` into one report
    pub fn from_samples(name: impl Into<String>, samples: &[BenchResult]) -> Self {
        let total = samples
            .iter()
            .fold(BenchResult::default(), |acc, sample| acc.merge(sample));

        BenchReport {
            name: name.into(),
            samples: samples.len(),
            iterations: total.iterations(),
            ns_per_op: total.ns_per_op(),
            bytes_per_op: total.bytes_per_op(),
            allocs_per_op: total.allocs_per_op(),
            total,
        }
    }
}

/// Render reports in the requested format
pub fn render(reports: &[BenchReport], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(reports)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(reports)?),
    }
}

/// Render reports as an aligned text table
pub fn render_text(reports: &[BenchReport]) -> String {
    let width = reports
        .iter()
        .map(|r| r.name.len())
        .max()
        .unwrap_or(0)
        .max("name".len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<width$}  {:>12}  {:>14}  {:>12}  {:>16}",
        "name", "iterations", "ns/op", "B/op", "allocs/op",
    );

    for report in reports {
        let _ = writeln!(
            out,
            "{:<width$}  {:>12}  {:>8.2} ns/op  {:>7.0} B/op  {:>6.2} allocs/op",
            report.name,
            report.iterations,
            report.ns_per_op,
            report.bytes_per_op,
            report.allocs_per_op,
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sample_reports() -> Vec<BenchReport> {
        vec![
            BenchReport::from_samples(
                "pool/write/fresh_allocation",
                &[
                    BenchResult::new(100, Duration::from_nanos(5_000), 10_000, 100),
                    BenchResult::new(100, Duration::from_nanos(7_000), 10_000, 100),
                ],
            ),
            BenchReport::from_samples(
                "pool/write/pooled_reuse",
                &[BenchResult::new(100, Duration::from_nanos(2_000), 100, 1)],
            ),
        ]
    }

    #[test]
    fn test_from_samples_averages_over_all_runs() {
        let reports = sample_reports();

        assert_eq!(reports[0].samples, 2);
        assert_eq!(reports[0].iterations, 200);
        assert_eq!(reports[0].ns_per_op, 60.0);
        assert_eq!(reports[0].bytes_per_op, 100.0);
        assert_eq!(reports[0].allocs_per_op, 1.0);
    }

    #[test]
    fn test_text_table() {
        let text = render_text(&sample_reports());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("name"));
        assert!(lines[1].starts_with("pool/write/fresh_allocation"));
        assert!(lines[1].contains("60.00 ns/op"));
        assert!(lines[2].contains("0.01 allocs/op"));
    }

    #[test]
    fn test_json_output() {
        let json = render(&sample_reports(), OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed[1]["name"], "pool/write/pooled_reuse");
        assert_eq!(parsed[1]["total"]["allocations"], 1);
    }
}
