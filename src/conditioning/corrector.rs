//! Von Neumann bias correction.
//!
//! Consecutive raw bits are taken in non-overlapping pairs. Equal
//! pairs (`00`, `11`) carry no usable information and are dropped.
//! A differing pair emits its first bit: `01 -> 0`, `10 -> 1`. For an
//! independent source with any fixed bias both outcomes are equally
//! likely, so the output is unbiased.

use crate::source::Bit;

/// Result of feeding one raw bit into the corrector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correction {
    /// First bit of a pair; held until its partner arrives.
    Pending,
    /// The pair was equal and has been dropped.
    Discarded,
    /// The pair differed and produced this corrected bit.
    Emitted(Bit),
}

/// Pairs raw bits and emits one corrected bit per differing pair.
///
/// The pairing slot persists across calls, since raw bits arrive
/// one per sampling tick.
#[derive(Debug, Clone, Default)]
pub struct VonNeumann {
    pending: Option<Bit>,
}

impl VonNeumann {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one raw bit.
    #[inline]
    pub fn feed(&mut self, bit: Bit) -> Correction {
        match self.pending.take() {
            None => {
                self.pending = Some(bit);
                Correction::Pending
            }
            Some(first) if first == bit => Correction::Discarded,
            Some(first) => Correction::Emitted(first),
        }
    }

    /// Returns true if a raw bit is waiting for its partner.
    #[inline]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drops any pending raw bit.
    #[inline]
    pub fn clear(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bits(raw: &[u8]) -> Vec<Bit> {
        raw.iter().map(|&b| Bit::from_lsb(b)).collect()
    }

    fn run(raw: &[Bit]) -> Vec<Bit> {
        let mut corrector = VonNeumann::new();
        raw.iter()
            .filter_map(|&b| match corrector.feed(b) {
                Correction::Emitted(out) => Some(out),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_zero_one_emits_zero() {
        assert_eq!(run(&bits(&[0, 1])), vec![Bit::Zero]);
    }

    #[test]
    fn test_one_zero_emits_one() {
        assert_eq!(run(&bits(&[1, 0])), vec![Bit::One]);
    }

    #[test]
    fn test_equal_pairs_discarded_and_slot_cleared() {
        let mut corrector = VonNeumann::new();

        assert_eq!(corrector.feed(Bit::Zero), Correction::Pending);
        assert!(corrector.has_pending());
        assert_eq!(corrector.feed(Bit::Zero), Correction::Discarded);
        assert!(!corrector.has_pending());

        assert_eq!(corrector.feed(Bit::One), Correction::Pending);
        assert_eq!(corrector.feed(Bit::One), Correction::Discarded);
        assert!(!corrector.has_pending());
    }

    #[test]
    fn test_pairs_do_not_overlap() {
        // (0,1) -> 0, then (1,0) -> 1; the middle "1,1" is never a pair.
        assert_eq!(run(&bits(&[0, 1, 1, 0])), vec![Bit::Zero, Bit::One]);
    }

    #[test]
    fn test_clear_drops_pending() {
        let mut corrector = VonNeumann::new();
        corrector.feed(Bit::One);
        corrector.clear();

        // Without the clear this would pair (1, 0) and emit.
        assert_eq!(corrector.feed(Bit::Zero), Correction::Pending);
    }

    proptest! {
        #[test]
        fn prop_output_count_matches_differing_pairs(raw in prop::collection::vec(0u8..2, 0..512)) {
            let input = bits(&raw);
            let expected: Vec<Bit> = input
                .chunks_exact(2)
                .filter(|pair| pair[0] != pair[1])
                .map(|pair| pair[0])
                .collect();

            prop_assert_eq!(run(&input), expected);
        }
    }
}
