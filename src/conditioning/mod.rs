//! Von Neumann conditioning and byte buffering.
//!
//! Raw bits go in one at a time. Equal pairs are dropped, differing
//! pairs yield their first bit, corrected bits are packed into bytes and
//! the bytes fill a fixed-capacity buffer. Two owners are provided:
//!
//! - [`Conditioner`]: everything behind one `&mut` handle.
//! - [`split`]: a [`BitProducer`]/[`BufferConsumer`] pair for a producer
//!   that runs concurrently with the consumer.

mod accumulator;
mod buffer;
mod corrector;
mod packer;
mod shared;
mod stats;
mod status;

pub use accumulator::{BitAccumulator, BitOrder};
pub use buffer::Conditioner;
pub use corrector::{Correction, VonNeumann};
pub use shared::{split, BitProducer, BufferConsumer};
pub use stats::ConditionerStats;
pub use status::BufferStatus;

use crate::source::Bit;

/// Anything that accepts raw bits one at a time.
pub trait BitSink {
    /// Feeds one raw bit. Must not block.
    fn accept_bit(&mut self, bit: Bit);

    /// Returns the current buffer status.
    fn buffer_status(&self) -> BufferStatus;
}

impl<K: BitSink + ?Sized> BitSink for &mut K {
    fn accept_bit(&mut self, bit: Bit) {
        (**self).accept_bit(bit);
    }

    fn buffer_status(&self) -> BufferStatus {
        (**self).buffer_status()
    }
}
