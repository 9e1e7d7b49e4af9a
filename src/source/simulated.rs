//! Simulated biased noise source.
//!
//! Stands in for a physical sampler when no hardware is attached.
//! Bits are drawn from a ChaCha20 stream and thresholded against a
//! configurable probability, so the output can be deliberately biased
//! to exercise the Von Neumann corrector.

use super::{Bit, BitSource, SourceError};
use crate::config::SourceConfig;
use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};

/// Scale for mapping the top 53 bits of a `u64` onto `[0, 1)`.
const UNIT_SCALE: f64 = (1u64 << 53) as f64;

/// Biased bit source backed by ChaCha20.
pub struct SimulatedSource {
    rng: ChaCha20Rng,
    /// Probability that a sampled bit is one.
    probability_one: f64,
    /// Bits sampled so far.
    samples: u64,
}

impl SimulatedSource {
    /// Creates a source seeded from the OS entropy source.
    pub fn from_os_entropy(probability_one: f64) -> Result<Self, SourceError> {
        Self::with_rng(ChaCha20Rng::from_entropy(), probability_one)
    }

    /// Creates a reproducible source from a fixed seed.
    pub fn from_seed(seed: u64, probability_one: f64) -> Result<Self, SourceError> {
        Self::with_rng(ChaCha20Rng::seed_from_u64(seed), probability_one)
    }

    /// Creates a source from the `[source]` configuration section.
    pub fn from_config(config: &SourceConfig) -> Result<Self, SourceError> {
        match config.seed {
            Some(seed) => Self::from_seed(seed, config.probability_one),
            None => Self::from_os_entropy(config.probability_one),
        }
    }

    fn with_rng(rng: ChaCha20Rng, probability_one: f64) -> Result<Self, SourceError> {
        if !(0.0..=1.0).contains(&probability_one) {
            return Err(SourceError::InvalidProbability(probability_one));
        }
        Ok(Self {
            rng,
            probability_one,
            samples: 0,
        })
    }

    /// Returns the configured probability of a one bit.
    pub fn probability_one(&self) -> f64 {
        self.probability_one
    }

    /// Returns the number of bits sampled so far.
    pub fn samples(&self) -> u64 {
        self.samples
    }
}

impl BitSource for SimulatedSource {
    fn sample(&mut self) -> Result<Bit, SourceError> {
        let unit = (self.rng.next_u64() >> 11) as f64 / UNIT_SCALE;
        self.samples += 1;
        Ok(Bit::from(unit < self.probability_one))
    }
}

impl std::fmt::Debug for SimulatedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedSource")
            .field("probability_one", &self.probability_one)
            .field("samples", &self.samples)
            .finish_non_exhaustive()
    }
}
