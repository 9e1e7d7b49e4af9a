//! Raw bit sources and the loop that feeds them into a conditioner.
//!
//! The physical noise source (unstable oscillator, analog sampler, ...)
//! lives outside this crate. All the conditioner needs from it is one
//! raw bit at a time, which is what [`BitSource`] describes. Two
//! implementations are provided for testing and demonstration.

mod bit;
mod pattern;
mod simulated;

pub use bit::{Bit, BitError};
pub use pattern::PatternSource;
pub use simulated::SimulatedSource;

use crate::conditioning::{BitSink, BufferStatus};
use thiserror::Error;

/// Errors that can occur while sampling raw bits.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("bit source exhausted")]
    Exhausted,
    #[error("invalid probability of a one bit: {0} (must be within 0.0..=1.0)")]
    InvalidProbability(f64),
    #[error("failed to sample bit: {0}")]
    SampleFailed(String),
    #[error(transparent)]
    InvalidBit(#[from] BitError),
}

/// Trait for raw bit producers.
///
/// Implementations hand out exactly one unconditioned bit per call,
/// mirroring a sampler that reads one noise bit per timer tick.
pub trait BitSource {
    /// Samples the next raw bit.
    fn sample(&mut self) -> Result<Bit, SourceError>;
}

impl<S: BitSource + ?Sized> BitSource for &mut S {
    fn sample(&mut self) -> Result<Bit, SourceError> {
        (**self).sample()
    }
}

/// Result of a [`fill`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillOutcome {
    /// Raw bits pulled from the source.
    pub raw_bits: u64,
    /// Sink status when the run stopped.
    pub status: BufferStatus,
}

impl FillOutcome {
    /// Returns true if the sink reached [`BufferStatus::Full`].
    pub fn is_full(&self) -> bool {
        self.status == BufferStatus::Full
    }
}

/// Feeds raw bits from `source` into `sink` until the sink is full.
///
/// Stops early after `max_raw_bits` samples so that a stuck source
/// (constant output, every pair discarded) cannot spin forever.
/// Source errors are propagated immediately.
pub fn fill<S, K>(
    source: &mut S,
    sink: &mut K,
    max_raw_bits: u64,
) -> Result<FillOutcome, SourceError>
where
    S: BitSource + ?Sized,
    K: BitSink + ?Sized,
{
    let mut raw_bits = 0u64;

    while sink.buffer_status() != BufferStatus::Full && raw_bits < max_raw_bits {
        let bit = source.sample()?;
        sink.accept_bit(bit);
        raw_bits += 1;
    }

    let status = sink.buffer_status();
    if status != BufferStatus::Full {
        tracing::debug!(
            raw_bits,
            max_raw_bits,
            "Raw bit budget spent before buffer filled"
        );
    }

    Ok(FillOutcome { raw_bits, status })
}
