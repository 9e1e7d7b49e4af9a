//! Metrics collection and registry.

use crate::conditioning::{BufferStatus, Conditioner, ConditionerStats};
use prometheus::{Encoder, Gauge, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of conditioner state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Cumulative conditioner counters.
    pub stats: ConditionerStats,
    /// Current buffer status.
    pub status: BufferStatus,
    /// Committed bytes in the current cycle.
    pub fill_index: usize,
    /// Buffer capacity in bytes.
    pub capacity: usize,
}

impl MetricsSnapshot {
    /// Creates a snapshot from a single-owner conditioner.
    pub fn from_conditioner(conditioner: &Conditioner) -> Self {
        Self {
            stats: *conditioner.stats(),
            status: conditioner.buffer_status(),
            fill_index: conditioner.fill_index(),
            capacity: conditioner.capacity(),
        }
    }
}

/// Prometheus metrics registry for conditioner monitoring.
pub struct MetricsRegistry {
    registry: Registry,

    // Counters
    raw_bits_total: IntCounter,
    discarded_pairs_total: IntCounter,
    corrected_bits_total: IntCounter,
    bytes_committed_total: IntCounter,
    dropped_bits_total: IntCounter,
    fills_total: IntCounter,
    resets_total: IntCounter,

    // Current cycle
    buffer_status: IntGauge,
    buffer_fill_bytes: IntGauge,
    buffer_capacity_bytes: IntGauge,
    efficiency: Gauge,
}

/// Raises `counter` to `target`; counters cannot move backwards.
fn advance(counter: &IntCounter, target: u64) {
    let current = counter.get();
    if target > current {
        counter.inc_by(target - current);
    }
}

impl MetricsRegistry {
    /// Creates a new registry with all conditioner metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let raw_bits_total = IntCounter::new(
            "trng_raw_bits_total",
            "Raw bits consumed by the Von Neumann corrector",
        )?;
        let discarded_pairs_total = IntCounter::new(
            "trng_discarded_pairs_total",
            "Equal raw bit pairs discarded",
        )?;
        let corrected_bits_total = IntCounter::new(
            "trng_corrected_bits_total",
            "Corrected bits produced",
        )?;
        let bytes_committed_total = IntCounter::new(
            "trng_bytes_committed_total",
            "Conditioned bytes committed to the buffer",
        )?;
        let dropped_bits_total = IntCounter::new(
            "trng_dropped_bits_total",
            "Raw bits ignored while the buffer was full",
        )?;
        let fills_total = IntCounter::new(
            "trng_buffer_fills_total",
            "Times the buffer reached full",
        )?;
        let resets_total = IntCounter::new("trng_buffer_resets_total", "Buffer resets")?;

        let buffer_status = IntGauge::new(
            "trng_buffer_status",
            "Buffer status (0=empty, 1=filling, 2=full)",
        )?;
        let buffer_fill_bytes = IntGauge::new(
            "trng_buffer_fill_bytes",
            "Committed bytes in the current fill cycle",
        )?;
        let buffer_capacity_bytes =
            IntGauge::new("trng_buffer_capacity_bytes", "Buffer capacity in bytes")?;
        let efficiency = Gauge::new(
            "trng_corrector_efficiency",
            "Corrected bits per raw bit consumed",
        )?;

        registry.register(Box::new(raw_bits_total.clone()))?;
        registry.register(Box::new(discarded_pairs_total.clone()))?;
        registry.register(Box::new(corrected_bits_total.clone()))?;
        registry.register(Box::new(bytes_committed_total.clone()))?;
        registry.register(Box::new(dropped_bits_total.clone()))?;
        registry.register(Box::new(fills_total.clone()))?;
        registry.register(Box::new(resets_total.clone()))?;
        registry.register(Box::new(buffer_status.clone()))?;
        registry.register(Box::new(buffer_fill_bytes.clone()))?;
        registry.register(Box::new(buffer_capacity_bytes.clone()))?;
        registry.register(Box::new(efficiency.clone()))?;

        Ok(Self {
            registry,
            raw_bits_total,
            discarded_pairs_total,
            corrected_bits_total,
            bytes_committed_total,
            dropped_bits_total,
            fills_total,
            resets_total,
            buffer_status,
            buffer_fill_bytes,
            buffer_capacity_bytes,
            efficiency,
        })
    }

    /// Updates all metrics from a snapshot.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        let stats = &snapshot.stats;

        advance(&self.raw_bits_total, stats.raw_bits);
        advance(&self.discarded_pairs_total, stats.discarded_pairs);
        advance(&self.corrected_bits_total, stats.corrected_bits);
        advance(&self.bytes_committed_total, stats.bytes_committed);
        advance(&self.dropped_bits_total, stats.dropped_bits);
        advance(&self.fills_total, stats.fills);
        advance(&self.resets_total, stats.resets);

        self.buffer_status.set(snapshot.status as i64);
        self.buffer_fill_bytes.set(snapshot.fill_index as i64);
        self.buffer_capacity_bytes.set(snapshot.capacity as i64);
        self.efficiency.set(stats.efficiency());
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
    use crate::source::Bit;

    #[test]
    fn test_registry_creation() {
        assert!(MetricsRegistry::new().is_ok());
    }

    #[test]
    fn test_metrics_from_conditioner() {
        let registry = MetricsRegistry::new().unwrap();
        let mut conditioner = Conditioner::with_capacity(1);
        for _ in 0..8 {
            conditioner.accept_bit(Bit::One);
            conditioner.accept_bit(Bit::Zero);
        }
        conditioner.accept_bit(Bit::One);

        registry.update(&MetricsSnapshot::from_conditioner(&conditioner));

        let output = registry.encode().unwrap();
        assert!(output.contains("trng_raw_bits_total 16"));
        assert!(output.contains("trng_corrected_bits_total 8"));
        assert!(output.contains("trng_dropped_bits_total 1"));
        assert!(output.contains("trng_buffer_status 2"));
        assert!(output.contains("trng_buffer_capacity_bytes 1"));
    }

    #[test]
    fn test_counters_do_not_regress() {
        let registry = MetricsRegistry::new().unwrap();
        let mut snapshot = MetricsSnapshot::default();
        snapshot.stats.raw_bits = 100;
        registry.update(&snapshot);

        snapshot.stats.raw_bits = 40;
        registry.update(&snapshot);

        let output = registry.encode().unwrap();
        assert!(output.contains("trng_raw_bits_total 100"));
    }
}
