//! Single raw bit sampled from a noise source.

use thiserror::Error;

/// Errors raised when converting a raw sample into a [`Bit`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BitError {
    #[error("raw sample {0} is not a bit (expected 0 or 1)")]
    OutOfRange(u8),
}

/// One sampled bit.
///
/// The conditioner only ever sees values of this type, so a raw
/// register read that is neither 0 nor 1 has to be rejected (or masked)
/// before it reaches the bit path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bit {
    /// Logic low.
    Zero,
    /// Logic high.
    One,
}

impl Bit {
    /// Takes the least-significant bit of a wider sample.
    ///
    /// Use this when the sampler reads into a byte-wide register and
    /// only bit 0 carries the noise value.
    #[inline]
    pub fn from_lsb(sample: u8) -> Self {
        if sample & 1 == 1 {
            Bit::One
        } else {
            Bit::Zero
        }
    }

    /// Returns the bit as 0 or 1.
    #[inline]
    pub fn as_u8(self) -> u8 {
        match self {
            Bit::Zero => 0,
            Bit::One => 1,
        }
    }

    /// Returns true for [`Bit::One`].
    #[inline]
    pub fn is_one(self) -> bool {
        self == Bit::One
    }
}

impl From<bool> for Bit {
    #[inline]
    fn from(value: bool) -> Self {
        if value {
            Bit::One
        } else {
            Bit::Zero
        }
    }
}

impl From<Bit> for u8 {
    #[inline]
    fn from(bit: Bit) -> Self {
        bit.as_u8()
    }
}

impl TryFrom<u8> for Bit {
    type Error = BitError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Bit::Zero),
            1 => Ok(Bit::One),
            other => Err(BitError::OutOfRange(other)),
        }
    }
}

impl std::fmt::Display for Bit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}
