//! Metrics collection and registry.

use crate::selection::{BuildOutcome, BuildStats};
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// The result of one build call, for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Whether the build collected every requested index.
    pub complete: bool,
    /// Requested number of indices.
    pub target_count: u64,
    /// Counters accumulated during the build.
    pub stats: BuildStats,
    /// Length of the most recently accepted blob.
    pub last_blob_values: Option<usize>,
}

impl MetricsSnapshot {
    /// Creates a snapshot from a finished build.
    pub fn from_outcome(outcome: &BuildOutcome, target_count: usize) -> Self {
        let selection = outcome.selection();
        Self {
            complete: outcome.is_complete(),
            target_count: target_count as u64,
            stats: *selection.stats(),
            last_blob_values: selection.records().last().map(|r| r.blob.len()),
        }
    }
}

/// Prometheus metrics registry for index selection.
pub struct MetricsRegistry {
    registry: Registry,

    // Per-build gauges
    selection_complete: IntGauge,
    target_count: IntGauge,
    accepted_indices: IntGauge,
    last_blob_values: IntGauge,

    // Cumulative counters
    builds_total: IntCounter,
    attempts_total: IntCounter,
    empty_blobs_total: IntCounter,
    duplicates_total: IntCounter,
    rehashes_total: IntCounter,
}

impl MetricsRegistry {
    /// Creates a new metrics registry with all selection metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let selection_complete = IntGauge::new(
            "optical_index_selection_complete",
            "Whether the last build completed (1) or was cancelled (0)",
        )?;
        let target_count = IntGauge::new(
            "optical_index_target_count",
            "Indices requested by the last build",
        )?;
        let accepted_indices = IntGauge::new(
            "optical_index_accepted_indices",
            "Distinct indices accepted by the last build",
        )?;
        let last_blob_values = IntGauge::new(
            "optical_index_last_blob_values",
            "Number of values in the most recently accepted blob",
        )?;

        let builds_total = IntCounter::new(
            "optical_index_builds_total",
            "Total number of build calls recorded",
        )?;
        let attempts_total = IntCounter::new(
            "optical_index_attempts_total",
            "Total collection attempts",
        )?;
        let empty_blobs_total = IntCounter::new(
            "optical_index_empty_blobs_total",
            "Attempts that found no entropy-bearing region",
        )?;
        let duplicates_total = IntCounter::new(
            "optical_index_duplicate_indices_total",
            "Sampled indices discarded as duplicates",
        )?;
        let rehashes_total = IntCounter::new(
            "optical_index_sampler_rehashes_total",
            "Digest re-hashes performed by rejection sampling",
        )?;

        registry.register(Box::new(selection_complete.clone()))?;
        registry.register(Box::new(target_count.clone()))?;
        registry.register(Box::new(accepted_indices.clone()))?;
        registry.register(Box::new(last_blob_values.clone()))?;
        registry.register(Box::new(builds_total.clone()))?;
        registry.register(Box::new(attempts_total.clone()))?;
        registry.register(Box::new(empty_blobs_total.clone()))?;
        registry.register(Box::new(duplicates_total.clone()))?;
        registry.register(Box::new(rehashes_total.clone()))?;

        Ok(Self {
            registry,
            selection_complete,
            target_count,
            accepted_indices,
            last_blob_values,
            builds_total,
            attempts_total,
            empty_blobs_total,
            duplicates_total,
            rehashes_total,
        })
    }

    /// Records one finished build.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        self.selection_complete.set(i64::from(snapshot.complete));
        self.target_count.set(snapshot.target_count as i64);
        self.accepted_indices.set(snapshot.stats.accepted as i64);
        if let Some(values) = snapshot.last_blob_values {
            self.last_blob_values.set(values as i64);
        }

        self.builds_total.inc();
        self.attempts_total.inc_by(snapshot.stats.attempts);
        self.empty_blobs_total.inc_by(snapshot.stats.empty_blobs);
        self.duplicates_total.inc_by(snapshot.stats.duplicates);
        self.rehashes_total.inc_by(snapshot.stats.rehashes);
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> MetricsSnapshot {
        MetricsSnapshot {
            complete: true,
            target_count: 3,
            stats: BuildStats {
                attempts: 7,
                empty_blobs: 2,
                duplicates: 2,
                rehashes: 0,
                accepted: 3,
            },
            last_blob_values: Some(42),
        }
    }

    #[test]
    fn test_registry_creation() {
        assert!(MetricsRegistry::new().is_ok());
    }

    #[test]
    fn test_metrics_update() {
        let registry = MetricsRegistry::new().unwrap();
        registry.update(&snapshot());

        let output = registry.encode().unwrap();
        assert!(output.contains("optical_index_selection_complete 1"));
        assert!(output.contains("optical_index_attempts_total 7"));
        assert!(output.contains("optical_index_last_blob_values 42"));
    }

    #[test]
    fn test_counters_accumulate_across_builds() {
        let registry = MetricsRegistry::new().unwrap();
        registry.update(&snapshot());
        registry.update(&snapshot());

        let output = registry.encode().unwrap();
        assert!(output.contains("optical_index_builds_total 2"));
        assert!(output.contains("optical_index_empty_blobs_total 4"));
        assert!(output.contains("optical_index_accepted_indices 3"));
    }
}
