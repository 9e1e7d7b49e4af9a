//! Prometheus metrics for conditioner monitoring.
//!
//! # Metrics Exposed
//!
//! ## Counters
//! - `trng_raw_bits_total` - Raw bits consumed by the corrector
//! - `trng_discarded_pairs_total` - Equal pairs dropped
//! - `trng_corrected_bits_total` - Corrected bits produced
//! - `trng_bytes_committed_total` - Bytes committed to the buffer
//! - `trng_dropped_bits_total` - Raw bits ignored while full
//! - `trng_buffer_fills_total` - Completed fills
//! - `trng_buffer_resets_total` - Resets
//!
//! ## Current Cycle
//! - `trng_buffer_status` - 0=empty, 1=filling, 2=full
//! - `trng_buffer_fill_bytes` - Committed bytes
//! - `trng_buffer_capacity_bytes` - Capacity
//! - `trng_corrector_efficiency` - Corrected bits per raw bit
//!
//! # Example
//!
//! ```no_run
//! use trng_conditioner::conditioning::Conditioner;
//! use trng_conditioner::metrics::{MetricsRegistry, MetricsSnapshot};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//! let conditioner = Conditioner::default();
//!
//! registry.update(&MetricsSnapshot::from_conditioner(&conditioner));
//! println!("{}", registry.encode().unwrap());
//! ```

mod collector;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
