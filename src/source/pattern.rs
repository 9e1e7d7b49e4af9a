//! Deterministic bit source replaying a fixed pattern.

use super::{Bit, BitSource, SourceError};

/// Replays a fixed sequence of bits, wrapping around at the end.
///
/// NOT an entropy source. Used to drive the conditioner with known
/// input in tests and demonstrations.
#[derive(Debug, Clone)]
pub struct PatternSource {
    pattern: Vec<Bit>,
    position: usize,
}

impl PatternSource {
    pub fn new(pattern: Vec<Bit>) -> Self {
        Self {
            pattern,
            position: 0,
        }
    }

    /// Builds a pattern from 0/1 values, rejecting anything else.
    pub fn from_raw(raw: &[u8]) -> Result<Self, SourceError> {
        let pattern = raw
            .iter()
            .map(|&b| Bit::try_from(b))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(pattern))
    }

    /// Returns the number of bits handed out so far modulo the pattern length.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Rewinds to the start of the pattern.
    pub fn rewind(&mut self) {
        self.position = 0;
    }
}

impl BitSource for PatternSource {
    fn sample(&mut self) -> Result<Bit, SourceError> {
        let bit = *self
            .pattern
            .get(self.position)
            .ok_or(SourceError::Exhausted)?;
        self.position = (self.position + 1) % self.pattern.len();
        Ok(bit)
    }
}
