//! TRNG Conditioning Library
//!
//! Turns a stream of raw, individually sampled noise bits into a
//! fixed-size buffer of bias-corrected bytes. The noise source itself
//! (ring oscillator, analog sampler, ...) lives outside this crate and
//! only has to hand over one bit at a time.
//!
//! # Architecture
//!
//! ```text
//! source → conditioning (Von Neumann → byte packing → buffer) → consumer
//!                  ↓
//!               metrics
//! ```
//!
//! # Conventions
//!
//! - **Pairing**: raw bits are taken in non-overlapping pairs; `00`/`11`
//!   are dropped, `01` yields `0` and `10` yields `1`.
//! - **Bit order**: the first corrected bit lands in bit 0 of each byte
//!   unless [`BitOrder::MsbFirst`] is configured.
//! - **Full is final**: once the buffer is full, raw bits are ignored
//!   until reset, so the contents cannot change under a reader.
//! - **No post-processing**: no hashing or whitening of the buffer.
//!
//! # Example
//!
//! ```
//! use trng_conditioner::{Bit, BufferStatus, Conditioner};
//!
//! let mut conditioner = Conditioner::with_capacity(1);
//!
//! for raw in [0u8, 1, 1, 0].repeat(4) {
//!     conditioner.accept_bit(Bit::try_from(raw).unwrap());
//! }
//!
//! assert_eq!(conditioner.buffer_status(), BufferStatus::Full);
//! assert_eq!(conditioner.buffer(), &[0xAA]);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod conditioning;
pub mod config;
pub mod metrics;
pub mod source;

// Re-export commonly used types at crate root
pub use conditioning::{
    split, BitOrder, BitProducer, BitSink, BufferConsumer, BufferStatus, Conditioner,
    ConditionerStats,
};
pub use config::{BufferConfig, ConfigError, FileConfig};
pub use source::{fill, Bit, BitError, BitSource, FillOutcome, PatternSource, SimulatedSource};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
