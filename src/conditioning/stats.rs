//! Conditioner counters.

/// Cumulative counters for one conditioner.
///
/// Counters survive `reset()`; they describe the life of the
/// conditioner rather than the current fill cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConditionerStats {
    /// Raw bits consumed by the corrector.
    pub raw_bits: u64,
    /// Equal pairs dropped by the corrector.
    pub discarded_pairs: u64,
    /// Corrected bits produced.
    pub corrected_bits: u64,
    /// Bytes committed to the buffer.
    pub bytes_committed: u64,
    /// Raw bits ignored because the buffer was full.
    pub dropped_bits: u64,
    /// Times the buffer reached full.
    pub fills: u64,
    /// Resets performed.
    pub resets: u64,
}

impl ConditionerStats {
    /// Corrected bits per raw bit consumed.
    ///
    /// An unbiased independent source yields 0.25; bias lowers it.
    pub fn efficiency(&self) -> f64 {
        if self.raw_bits == 0 {
            return 0.0;
        }
        self.corrected_bits as f64 / self.raw_bits as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_efficiency_empty() {
        assert_eq!(ConditionerStats::default().efficiency(), 0.0);
    }

    #[test]
    fn test_efficiency_ratio() {
        let stats = ConditionerStats {
            raw_bits: 400,
            corrected_bits: 100,
            ..Default::default()
        };
        assert!((stats.efficiency() - 0.25).abs() < f64::EPSILON);
    }
}
