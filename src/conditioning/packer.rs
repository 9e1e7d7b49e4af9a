//! Corrector and accumulator chained together.

use super::{
    accumulator::{BitAccumulator, BitOrder},
    corrector::{Correction, VonNeumann},
    stats::ConditionerStats,
};
use crate::source::Bit;

/// What one raw bit produced after correction and packing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Packed {
    /// No corrected bit (pending or discarded pair).
    Nothing,
    /// A corrected bit went into the partial byte.
    Bit,
    /// A corrected bit completed this byte.
    Byte(u8),
}

/// Producer-side conditioning state: pairing slot plus partial byte.
///
/// Shared by the single-owner and split conditioners so both apply
/// exactly the same pairing and packing rules.
#[derive(Debug, Clone)]
pub(crate) struct BitPacker {
    corrector: VonNeumann,
    accumulator: BitAccumulator,
}

impl BitPacker {
    pub(crate) fn new(order: BitOrder) -> Self {
        Self {
            corrector: VonNeumann::new(),
            accumulator: BitAccumulator::new(order),
        }
    }

    #[inline]
    pub(crate) fn feed(&mut self, bit: Bit, stats: &mut ConditionerStats) -> Packed {
        stats.raw_bits += 1;

        match self.corrector.feed(bit) {
            Correction::Pending => Packed::Nothing,
            Correction::Discarded => {
                stats.discarded_pairs += 1;
                Packed::Nothing
            }
            Correction::Emitted(out) => {
                stats.corrected_bits += 1;
                match self.accumulator.push(out) {
                    Some(byte) => Packed::Byte(byte),
                    None => Packed::Bit,
                }
            }
        }
    }

    pub(crate) fn has_pending_bit(&self) -> bool {
        self.corrector.has_pending()
    }

    pub(crate) fn accumulated_bits(&self) -> u8 {
        self.accumulator.len()
    }

    pub(crate) fn bit_order(&self) -> BitOrder {
        self.accumulator.order()
    }

    pub(crate) fn clear(&mut self) {
        self.corrector.clear();
        self.accumulator.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_counts_and_packs() {
        let mut packer = BitPacker::new(BitOrder::LsbFirst);
        let mut stats = ConditionerStats::default();

        assert_eq!(packer.feed(Bit::One, &mut stats), Packed::Nothing);
        assert_eq!(packer.feed(Bit::One, &mut stats), Packed::Nothing);
        assert_eq!(stats.discarded_pairs, 1);

        let mut last = Packed::Nothing;
        for _ in 0..8 {
            packer.feed(Bit::One, &mut stats);
            last = packer.feed(Bit::Zero, &mut stats);
        }

        assert_eq!(last, Packed::Byte(0xFF));
        assert_eq!(stats.raw_bits, 18);
        assert_eq!(stats.corrected_bits, 8);
        assert_eq!(packer.accumulated_bits(), 0);
    }
}
