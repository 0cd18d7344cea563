pub mod select;

pub use select::kth_smallest;

use crate::graph::{CsrGraph, Graph};
use crate::types::{BenchmarkSummary, ExpansionMode, Metrics, MisResult};
use crate::verify::VerifyReport;
use serde::Serialize;

/// Metrics collector for MIS runs and benchmarks
pub struct MetricsCollector {
    seed: u64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self { seed: 42 }
    }

    /// Collect metrics for one run
    pub fn collect(&self, graph: &CsrGraph, result: &MisResult, report: &VerifyReport) -> Metrics {
        tracing::info!("Collecting metrics...");
        let log = &result.stats.round_log;

        let frontier_sizes: Vec<usize> = log.iter().map(|r| r.frontier).collect();
        let avg_frontier = if !frontier_sizes.is_empty() {
            frontier_sizes.iter().sum::<usize>() as f64 / frontier_sizes.len() as f64
        } else {
            0.0
        };
        let max_frontier = frontier_sizes.iter().max().copied().unwrap_or(0);

        let sparse_rounds = log
            .iter()
            .filter(|r| r.mode == Some(ExpansionMode::Sparse))
            .count();
        let dense_rounds = log
            .iter()
            .filter(|r| r.mode == Some(ExpansionMode::Dense))
            .count();
        let push_rounds = log
            .iter()
            .filter(|r| r.traversal == Some(ExpansionMode::Sparse))
            .count();
        let pull_rounds = log
            .iter()
            .filter(|r| r.traversal == Some(ExpansionMode::Dense))
            .count();

        Metrics {
            algorithm: result.stats.algorithm,
            order: result.stats.order.clone(),
            graph_digest: graph.digest(),
            vertices: graph.num_vertices(),
            edges: graph.num_edges() / 2,
            mis_size: result.size(),
            rounds: result.stats.rounds,
            avg_frontier,
            max_frontier,
            sparse_rounds,
            dense_rounds,
            push_rounds,
            pull_rounds,
            elapsed_ms: result.stats.elapsed_ms,
            valid: report.valid,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Median, min and max of repeated timings
    pub fn summarize(&self, name: &str, times_ms: &[f64]) -> BenchmarkSummary {
        BenchmarkSummary {
            name: name.to_string(),
            reps: times_ms.len(),
            median_ms: self.median(times_ms),
            min_ms: times_ms.iter().copied().reduce(f64::min).unwrap_or(0.0),
            max_ms: times_ms.iter().copied().reduce(f64::max).unwrap_or(0.0),
        }
    }

    /// Median; the mean of the two middle values for even lengths
    fn median(&self, values: &[f64]) -> f64 {
        let n = values.len();
        if n == 0 {
            return 0.0;
        }
        let lt = |a: &f64, b: &f64| a < b;
        let upper = kth_smallest(values, n / 2, lt, self.seed).unwrap_or(0.0);
        if n % 2 == 1 {
            upper
        } else {
            let lower = kth_smallest(values, n / 2 - 1, lt, self.seed).unwrap_or(0.0);
            (lower + upper) / 2.0
        }
    }

    /// Export to JSON file
    pub fn export_json<T: Serialize>(&self, value: &T, path: &str) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(value)?;
        std::fs::write(path, json)?;
        tracing::info!("Exported metrics to {}", path);
        Ok(())
    }

    /// Print metrics to console
    pub fn print_metrics(&self, metrics: &Metrics) {
        println!("\n═══════════════════════════════════════════════════");
        println!("              MIS Run Metrics ({})", metrics.algorithm);
        println!("═══════════════════════════════════════════════════\n");

        println!("📊 Graph:");
        println!("  Vertices:         {}", metrics.vertices);
        println!("  Edges:            {}", metrics.edges);
        println!("  Digest:           {}", &metrics.graph_digest[..16.min(metrics.graph_digest.len())]);

        println!("\n🔄 Rounds:");
        println!("  Order:            {}", metrics.order);
        println!("  Rounds:           {}", metrics.rounds);
        println!("  Avg Frontier:     {:.1}", metrics.avg_frontier);
        println!("  Max Frontier:     {}", metrics.max_frontier);
        println!("  Sparse Rounds:    {}", metrics.sparse_rounds);
        println!("  Dense Rounds:     {}", metrics.dense_rounds);
        println!("  Push Rounds:      {}", metrics.push_rounds);
        println!("  Pull Rounds:      {}", metrics.pull_rounds);

        println!("\n🎯 Result:");
        println!("  MIS Size:         {}", metrics.mis_size);
        println!("  Valid:            {}", metrics.valid);
        println!("  Time:             {:.2} ms", metrics.elapsed_ms);

        println!("\n═══════════════════════════════════════════════════\n");
    }

    pub fn print_summary(&self, summary: &BenchmarkSummary) {
        println!(
            "{}: r={}, med={:.3} ({:.3},{:.3}) ms",
            summary.name, summary.reps, summary.median_ms, summary.min_ms, summary.max_ms
        );
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MisConfig;
    use crate::generator::{GraphGenerator, GraphKind};
    use crate::mis::run_mis;
    use crate::types::Algorithm;
    use crate::verify::verify_flags;

    #[test]
    fn test_median_calculation() {
        let collector = MetricsCollector::new();
        assert_eq!(collector.median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(collector.median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(collector.median(&[]), 0.0);
    }

    #[test]
    fn test_summary() {
        let summary = MetricsCollector::new().summarize("rootset", &[5.0, 1.0, 3.0]);
        assert_eq!(summary.reps, 3);
        assert_eq!(summary.median_ms, 3.0);
        assert_eq!(summary.min_ms, 1.0);
        assert_eq!(summary.max_ms, 5.0);
    }

    #[test]
    fn test_collect_from_run() {
        let g = GraphGenerator::new(GraphKind::Grid, 100, 0, 0).generate().unwrap();
        let result = run_mis(&g, Algorithm::Rootset, &MisConfig::default()).unwrap();
        let report = verify_flags(&g, &result.flags).unwrap();
        let metrics = MetricsCollector::new().collect(&g, &result, &report);

        assert_eq!(metrics.vertices, 100);
        assert_eq!(metrics.edges, 180);
        assert_eq!(metrics.rounds, result.stats.rounds);
        assert_eq!(metrics.sparse_rounds + metrics.dense_rounds, metrics.rounds);
        assert_eq!(metrics.push_rounds + metrics.pull_rounds, metrics.rounds);
        assert!(metrics.valid);
    }

    #[test]
    fn test_metrics_export() {
        let collector = MetricsCollector::new();
        let summary = collector.summarize("speculative", &[1.0]);

        let temp_file = std::env::temp_dir().join("par_mis_test_metrics.json");
        let temp_file = temp_file.to_string_lossy().to_string();
        collector.export_json(&summary, &temp_file).unwrap();

        // Verify file was created
        assert!(std::path::Path::new(&temp_file).exists());

        // Clean up
        std::fs::remove_file(&temp_file).ok();
    }
}
