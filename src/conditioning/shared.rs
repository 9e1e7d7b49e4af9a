//! Split producer/consumer conditioner for concurrent contexts.
//!
//! [`split`] hands out a [`BitProducer`] for the sampling context
//! (interrupt handler, sampling thread) and a [`BufferConsumer`] for
//! ordinary program flow. The pairing slot and partial byte live only in
//! the producer, so the per-bit path touches shared memory only when a
//! byte is committed or the status changes.
//!
//! # Ordering
//!
//! The producer commits in this order:
//!
//! 1. byte store (`Relaxed`)
//! 2. fill index store (`Release`)
//! 3. status store (`Release`), always last
//!
//! The consumer loads the status with `Acquire` before touching any
//! byte. Observing `Full` therefore guarantees all `capacity` bytes are
//! visible.
//!
//! # Reset
//!
//! [`BufferConsumer::reset`] clears the shared bytes, bumps a reset
//! epoch and stores `Empty`. The producer notices the new epoch on its
//! next call and drops its private pairing and partial-byte state. A
//! reset that races an in-flight commit is NOT handled here; stop the
//! producer (mask the interrupt, park the thread) before resetting.

use super::{
    accumulator::BitOrder,
    packer::{BitPacker, Packed},
    stats::ConditionerStats,
    BitSink, BufferStatus,
};
use crate::config::{BufferConfig, ConfigError};
use crate::source::Bit;
use std::sync::atomic::{AtomicU32, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

/// State visible to both halves.
struct Shared {
    bytes: Box<[AtomicU8]>,
    fill_index: AtomicUsize,
    status: AtomicU8,
    epoch: AtomicU32,
}

impl Shared {
    fn new(capacity: usize) -> Self {
        Self {
            bytes: (0..capacity).map(|_| AtomicU8::new(0)).collect(),
            fill_index: AtomicUsize::new(0),
            status: AtomicU8::new(BufferStatus::Empty as u8),
            epoch: AtomicU32::new(0),
        }
    }

    #[inline]
    fn status(&self) -> BufferStatus {
        BufferStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    #[inline]
    fn publish(&self, status: BufferStatus) {
        self.status.store(status as u8, Ordering::Release);
    }
}

/// Splits a new conditioner into its producer and consumer halves.
pub fn split(config: &BufferConfig) -> Result<(BitProducer, BufferConsumer), ConfigError> {
    config.validate()?;

    let shared = Arc::new(Shared::new(config.capacity));
    let producer = BitProducer {
        shared: Arc::clone(&shared),
        packer: BitPacker::new(config.bit_order),
        epoch: 0,
        stats: ConditionerStats::default(),
    };
    let consumer = BufferConsumer { shared };

    Ok((producer, consumer))
}

/// Producer half: accepts raw bits.
///
/// `Send` but deliberately not `Clone`: there is exactly one producer.
pub struct BitProducer {
    shared: Arc<Shared>,
    packer: BitPacker,
    /// Last reset epoch this producer has seen.
    epoch: u32,
    stats: ConditionerStats,
}

impl BitProducer {
    /// Feeds one raw bit. Never blocks and never allocates.
    pub fn accept_bit(&mut self, bit: Bit) {
        // Status first: an Acquire load that sees a reset's `Empty`
        // also sees the epoch bumped before it.
        let status = self.shared.status();
        let epoch = self.shared.epoch.load(Ordering::Acquire);
        if epoch != self.epoch {
            self.packer.clear();
            self.epoch = epoch;
        }

        if status == BufferStatus::Full {
            self.stats.dropped_bits += 1;
            return;
        }

        match self.packer.feed(bit, &mut self.stats) {
            Packed::Nothing => {}
            Packed::Bit => {
                if status == BufferStatus::Empty {
                    self.shared.publish(BufferStatus::Filling);
                }
            }
            Packed::Byte(byte) => self.commit(byte),
        }
    }

    fn commit(&mut self, byte: u8) {
        let index = self.shared.fill_index.load(Ordering::Relaxed);
        let Some(slot) = self.shared.bytes.get(index) else {
            // Only reachable if a reset raced this commit.
            return;
        };

        slot.store(byte, Ordering::Relaxed);
        let filled = index + 1;
        self.shared.fill_index.store(filled, Ordering::Release);
        self.stats.bytes_committed += 1;

        if filled == self.shared.bytes.len() {
            self.shared.publish(BufferStatus::Full);
            self.stats.fills += 1;
            tracing::debug!(
                capacity = filled,
                raw_bits = self.stats.raw_bits,
                "Shared conditioned buffer full"
            );
        } else {
            self.shared.publish(BufferStatus::Filling);
        }
    }

    /// Returns the status as seen by the producer.
    pub fn buffer_status(&self) -> BufferStatus {
        self.shared.status()
    }

    /// Returns the producer's cumulative counters.
    pub fn stats(&self) -> &ConditionerStats {
        &self.stats
    }

    /// Returns the configured bit order.
    pub fn bit_order(&self) -> BitOrder {
        self.packer.bit_order()
    }
}

impl BitSink for BitProducer {
    fn accept_bit(&mut self, bit: Bit) {
        BitProducer::accept_bit(self, bit);
    }

    fn buffer_status(&self) -> BufferStatus {
        self.shared.status()
    }
}

/// Consumer half: polls status, reads and resets the buffer.
pub struct BufferConsumer {
    shared: Arc<Shared>,
}

impl BufferConsumer {
    /// Returns the current status. This load is the synchronization
    /// point with the producer.
    pub fn buffer_status(&self) -> BufferStatus {
        self.shared.status()
    }

    /// Returns the number of committed bytes.
    pub fn fill_index(&self) -> usize {
        self.shared.fill_index.load(Ordering::Acquire)
    }

    /// Returns the buffer capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.shared.bytes.len()
    }

    /// Copies all `capacity` bytes, whatever the status.
    ///
    /// Bytes past [`fill_index`](Self::fill_index) are not meaningful
    /// unless the status is `Full`.
    pub fn buffer(&self) -> Vec<u8> {
        // Acquire pairs with the producer's last status store.
        let _ = self.shared.status();
        self.snapshot()
    }

    /// Copies the buffer only when it is full.
    pub fn read_full(&self) -> Option<Vec<u8>> {
        self.shared.status().is_full().then(|| self.snapshot())
    }

    /// Copies the buffer into `dest` when full, returning bytes copied.
    ///
    /// Returns `None` without touching `dest` if the buffer is not full.
    /// Copies `min(dest.len(), capacity)` bytes.
    pub fn copy_full_into(&self, dest: &mut [u8]) -> Option<usize> {
        if !self.shared.status().is_full() {
            return None;
        }
        let n = dest.len().min(self.shared.bytes.len());
        for (d, s) in dest.iter_mut().zip(self.shared.bytes.iter()) {
            *d = s.load(Ordering::Relaxed);
        }
        Some(n)
    }

    fn snapshot(&self) -> Vec<u8> {
        self.shared
            .bytes
            .iter()
            .map(|b| b.load(Ordering::Relaxed))
            .collect()
    }

    /// Discards buffered data and returns to `Empty`.
    ///
    /// The producer must not be inside `accept_bit` while this runs.
    pub fn reset(&mut self) {
        for byte in self.shared.bytes.iter() {
            byte.store(0, Ordering::Relaxed);
        }
        self.shared.fill_index.store(0, Ordering::Relaxed);
        self.shared.epoch.fetch_add(1, Ordering::Release);
        self.shared.publish(BufferStatus::Empty);

        tracing::info!(capacity = self.shared.bytes.len(), "Shared conditioner reset");
    }
}

impl std::fmt::Debug for BufferConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferConsumer")
            .field("capacity", &self.capacity())
            .field("fill_index", &self.fill_index())
            .field("status", &self.buffer_status())
            .finish()
    }
}
