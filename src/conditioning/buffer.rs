//! Single-owner conditioner and byte buffer.
//!
//! Accepts one raw bit per call, runs it through the Von Neumann
//! corrector, packs corrected bits into bytes and commits them to a
//! fixed-capacity buffer. Once the buffer is full, raw bits are dropped
//! without touching any state until `reset()`.

use super::{
    accumulator::BitOrder,
    packer::{BitPacker, Packed},
    stats::ConditionerStats,
    BitSink, BufferStatus,
};
use crate::config::{BufferConfig, ConfigError};
use crate::source::Bit;

/// Entropy conditioner owning its byte buffer.
///
/// All operations take `&self`/`&mut self`, so producer and consumer
/// must be serialized by the owner. For a producer running in a
/// separate context (interrupt, sampling thread) use
/// [`split`](super::split) instead.
pub struct Conditioner {
    /// Committed bytes; allocated once at construction.
    buffer: Box<[u8]>,
    /// Count of committed bytes.
    fill_index: usize,
    /// Pairing slot and partial byte.
    packer: BitPacker,
    status: BufferStatus,
    stats: ConditionerStats,
}

impl Conditioner {
    /// Creates an empty conditioner from a validated configuration.
    pub fn new(config: &BufferConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config.capacity, config.bit_order))
    }

    /// Creates an empty conditioner with LSB-first packing.
    ///
    /// A capacity of zero is raised to one byte.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::build(capacity.max(1), BitOrder::LsbFirst)
    }

    fn build(capacity: usize, order: BitOrder) -> Self {
        Self {
            buffer: vec![0u8; capacity].into_boxed_slice(),
            fill_index: 0,
            packer: BitPacker::new(order),
            status: BufferStatus::Empty,
            stats: ConditionerStats::default(),
        }
    }

    /// Feeds one raw bit.
    ///
    /// O(1) and never blocks. Ignored entirely while the buffer is full.
    pub fn accept_bit(&mut self, bit: Bit) {
        if self.status == BufferStatus::Full {
            self.stats.dropped_bits += 1;
            return;
        }

        match self.packer.feed(bit, &mut self.stats) {
            Packed::Nothing => {}
            Packed::Bit => self.status = BufferStatus::Filling,
            Packed::Byte(byte) => self.commit(byte),
        }
    }

    fn commit(&mut self, byte: u8) {
        self.buffer[self.fill_index] = byte;
        self.fill_index += 1;
        self.stats.bytes_committed += 1;

        tracing::trace!(
            index = self.fill_index - 1,
            capacity = self.buffer.len(),
            "Committed conditioned byte"
        );

        if self.fill_index == self.buffer.len() {
            self.status = BufferStatus::Full;
            self.stats.fills += 1;
            tracing::debug!(
                capacity = self.buffer.len(),
                raw_bits = self.stats.raw_bits,
                "Conditioned buffer full"
            );
        } else {
            self.status = BufferStatus::Filling;
        }
    }

    /// Returns the current status.
    #[inline]
    pub fn buffer_status(&self) -> BufferStatus {
        self.status
    }

    /// Returns all `capacity` bytes of the buffer.
    ///
    /// Only meaningful once [`buffer_status`](Self::buffer_status) is
    /// `Full`. Bytes at or past [`fill_index`](Self::fill_index) are
    /// zero before that.
    #[inline]
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Returns the buffer only when it is full.
    pub fn read_full(&self) -> Option<&[u8]> {
        self.status.is_full().then_some(&*self.buffer)
    }

    /// Returns the buffer capacity in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Returns the number of committed bytes.
    #[inline]
    pub fn fill_index(&self) -> usize {
        self.fill_index
    }

    /// Returns the number of corrected bits waiting in the partial byte.
    #[inline]
    pub fn accumulated_bits(&self) -> u8 {
        self.packer.accumulated_bits()
    }

    /// Returns true if a raw bit is waiting for its pair partner.
    #[inline]
    pub fn has_pending_bit(&self) -> bool {
        self.packer.has_pending_bit()
    }

    /// Returns the configured bit order.
    pub fn bit_order(&self) -> BitOrder {
        self.packer.bit_order()
    }

    /// Returns the cumulative counters.
    pub fn stats(&self) -> &ConditionerStats {
        &self.stats
    }

    /// Discards all buffered and partial data and returns to `Empty`.
    ///
    /// Safe in any status. Capacity and bit order are kept.
    pub fn reset(&mut self) {
        self.buffer.fill(0);
        self.fill_index = 0;
        self.packer.clear();
        self.status = BufferStatus::Empty;
        self.stats.resets += 1;
        tracing::info!(capacity = self.buffer.len(), "Conditioner reset");
    }
}

impl BitSink for Conditioner {
    fn accept_bit(&mut self, bit: Bit) {
        Conditioner::accept_bit(self, bit);
    }

    fn buffer_status(&self) -> BufferStatus {
        self.status
    }
}

impl Default for Conditioner {
    fn default() -> Self {
        Self::with_capacity(crate::config::DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for Conditioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conditioner")
            .field("capacity", &self.buffer.len())
            .field("fill_index", &self.fill_index)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Raw bits for one corrected bit, with no wasted pairs.
    fn raw_for(corrected: u8) -> [Bit; 2] {
        if corrected == 1 {
            [Bit::One, Bit::Zero]
        } else {
            [Bit::Zero, Bit::One]
        }
    }

    fn feed(conditioner: &mut Conditioner, raw: &[u8]) {
        for &b in raw {
            conditioner.accept_bit(Bit::try_from(b).unwrap());
        }
    }

    fn feed_corrected(conditioner: &mut Conditioner, corrected: &[u8]) {
        for &c in corrected {
            for bit in raw_for(c) {
                conditioner.accept_bit(bit);
            }
        }
    }

    #[test]
    fn test_starts_empty() {
        let conditioner = Conditioner::default();
        assert_eq!(conditioner.buffer_status(), BufferStatus::Empty);
        assert_eq!(conditioner.capacity(), 10);
        assert_eq!(conditioner.fill_index(), 0);
        assert!(conditioner.buffer().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_empty_until_first_corrected_bit() {
        let mut conditioner = Conditioner::with_capacity(1);

        feed(&mut conditioner, &[0]);
        assert_eq!(conditioner.buffer_status(), BufferStatus::Empty);
        assert!(conditioner.has_pending_bit());

        feed(&mut conditioner, &[0, 1, 1]);
        assert_eq!(conditioner.buffer_status(), BufferStatus::Empty);
        assert!(!conditioner.has_pending_bit());

        feed(&mut conditioner, &[1, 0]);
        assert_eq!(conditioner.buffer_status(), BufferStatus::Filling);
        assert_eq!(conditioner.accumulated_bits(), 1);
    }

    #[test]
    fn test_single_byte_scenario() {
        let mut conditioner = Conditioner::with_capacity(1);
        let raw = [0, 1, 1, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 1, 1, 0];

        feed(&mut conditioner, &raw[..15]);
        assert_eq!(conditioner.buffer_status(), BufferStatus::Filling);

        feed(&mut conditioner, &raw[15..]);
        assert_eq!(conditioner.buffer_status(), BufferStatus::Full);
        // Corrected 0,1,0,1,0,1,0,1 with the first bit in bit 0.
        assert_eq!(conditioner.buffer(), &[0xAA]);
    }

    #[test]
    fn test_single_byte_scenario_msb_first() {
        let config = BufferConfig {
            capacity: 1,
            bit_order: BitOrder::MsbFirst,
        };
        let mut conditioner = Conditioner::new(&config).unwrap();
        feed(&mut conditioner, &[0, 1, 1, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 1, 1, 0]);

        assert_eq!(conditioner.read_full(), Some(&[0x55u8][..]));
    }

    #[test]
    fn test_new_rejects_zero_capacity() {
        assert!(matches!(
            Conditioner::new(&BufferConfig::with_capacity(0)),
            Err(ConfigError::InvalidCapacity)
        ));
        assert_eq!(Conditioner::with_capacity(0).capacity(), 1);
    }

    #[test]
    fn test_status_transitions_once() {
        let mut conditioner = Conditioner::with_capacity(3);
        let mut transitions = vec![conditioner.buffer_status()];

        for byte in [0x12u8, 0x34, 0x56] {
            let corrected: Vec<u8> = (0..8).map(|i| (byte >> i) & 1).collect();
            for &c in &corrected {
                for bit in raw_for(c) {
                    conditioner.accept_bit(bit);
                    let status = conditioner.buffer_status();
                    if transitions.last() != Some(&status) {
                        transitions.push(status);
                    }
                }
            }
        }

        assert_eq!(
            transitions,
            vec![BufferStatus::Empty, BufferStatus::Filling, BufferStatus::Full]
        );
        assert_eq!(conditioner.buffer(), &[0x12, 0x34, 0x56]);
        assert_eq!(conditioner.fill_index(), 3);
        assert_eq!(conditioner.stats().fills, 1);
    }

    #[test]
    fn test_full_ignores_further_bits() {
        let mut conditioner = Conditioner::with_capacity(1);
        feed_corrected(&mut conditioner, &[1, 1, 1, 1, 0, 0, 0, 0]);
        assert_eq!(conditioner.buffer(), &[0x0F]);

        feed(&mut conditioner, &[1, 0, 0, 1, 1]);

        assert_eq!(conditioner.buffer_status(), BufferStatus::Full);
        assert_eq!(conditioner.buffer(), &[0x0F]);
        assert_eq!(conditioner.fill_index(), 1);
        assert!(!conditioner.has_pending_bit());
        assert_eq!(conditioner.stats().dropped_bits, 5);
    }

    #[test]
    fn test_reset_from_each_status() {
        let mut conditioner = Conditioner::with_capacity(1);

        conditioner.reset();
        assert_eq!(conditioner.buffer_status(), BufferStatus::Empty);

        feed(&mut conditioner, &[1, 0, 1]);
        assert_eq!(conditioner.buffer_status(), BufferStatus::Filling);
        conditioner.reset();
        assert_eq!(conditioner.buffer_status(), BufferStatus::Empty);
        assert_eq!(conditioner.accumulated_bits(), 0);
        assert!(!conditioner.has_pending_bit());

        feed_corrected(&mut conditioner, &[1; 8]);
        assert_eq!(conditioner.buffer_status(), BufferStatus::Full);
        conditioner.reset();
        assert_eq!(conditioner.buffer_status(), BufferStatus::Empty);
        assert_eq!(conditioner.fill_index(), 0);
        assert_eq!(conditioner.buffer(), &[0x00]);
        assert_eq!(conditioner.stats().resets, 3);
    }

    #[test]
    fn test_read_full_gated_on_status() {
        let mut conditioner = Conditioner::with_capacity(2);
        feed_corrected(&mut conditioner, &[1; 8]);

        assert_eq!(conditioner.fill_index(), 1);
        assert!(conditioner.read_full().is_none());
        // Premature read still exposes the partial buffer.
        assert_eq!(conditioner.buffer(), &[0xFF, 0x00]);
    }

    #[test]
    fn test_stats_track_pairs() {
        let mut conditioner = Conditioner::with_capacity(4);
        feed(&mut conditioner, &[0, 0, 1, 1, 0, 1, 1, 0, 1]);

        let stats = conditioner.stats();
        assert_eq!(stats.raw_bits, 9);
        assert_eq!(stats.discarded_pairs, 2);
        assert_eq!(stats.corrected_bits, 2);
        assert!(conditioner.has_pending_bit());
    }

    proptest! {
        #[test]
        fn prop_reset_reproduces_buffer(raw in prop::collection::vec(0u8..2, 0..2048)) {
            let mut conditioner = Conditioner::with_capacity(4);

            feed(&mut conditioner, &raw);
            let first = conditioner.buffer().to_vec();
            let first_status = conditioner.buffer_status();

            conditioner.reset();
            feed(&mut conditioner, &raw);

            prop_assert_eq!(conditioner.buffer(), &first[..]);
            prop_assert_eq!(conditioner.buffer_status(), first_status);
        }

        #[test]
        fn prop_full_is_stable(extra in prop::collection::vec(0u8..2, 0..256)) {
            let mut conditioner = Conditioner::with_capacity(2);
            feed_corrected(&mut conditioner, &[1, 0, 1, 1, 0, 0, 1, 0, 0, 1, 1, 1, 0, 1, 0, 0]);
            prop_assert_eq!(conditioner.buffer_status(), BufferStatus::Full);
            let snapshot = conditioner.buffer().to_vec();

            feed(&mut conditioner, &extra);

            prop_assert_eq!(conditioner.buffer(), &snapshot[..]);
            prop_assert_eq!(conditioner.fill_index(), 2);
            prop_assert_eq!(conditioner.buffer_status(), BufferStatus::Full);
        }

        #[test]
        fn prop_fill_index_within_capacity(raw in prop::collection::vec(0u8..2, 0..1024)) {
            let mut conditioner = Conditioner::with_capacity(3);
            feed(&mut conditioner, &raw);

            let full = conditioner.fill_index() == conditioner.capacity();
            prop_assert!(conditioner.fill_index() <= conditioner.capacity());
            prop_assert_eq!(full, conditioner.buffer_status() == BufferStatus::Full);
        }
    }
}
