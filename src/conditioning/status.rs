//! Buffer fill status.

/// Current fill state of a conditioned byte buffer.
///
/// ```text
/// Empty --(first corrected bit)--> Filling --(last byte committed)--> Full
///   ^                                 |                                  |
///   +-------------(reset)-------------+---------------(reset)------------+
/// ```
///
/// Nothing leaves `Full` except a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum BufferStatus {
    /// No corrected bit has been produced since the last reset.
    #[default]
    Empty = 0,
    /// Corrected bits are being packed; the buffer is not ready.
    Filling = 1,
    /// Every byte is committed; contents are stable until reset.
    Full = 2,
}

impl BufferStatus {
    /// Decodes the value stored in an atomic status flag.
    ///
    /// Unknown encodings map to `Filling`, which keeps a consumer from
    /// treating a torn or corrupted flag as a ready buffer.
    #[inline]
    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            0 => BufferStatus::Empty,
            2 => BufferStatus::Full,
            _ => BufferStatus::Filling,
        }
    }

    /// Returns true once the buffer may be read.
    #[inline]
    pub fn is_full(self) -> bool {
        self == BufferStatus::Full
    }
}

impl std::fmt::Display for BufferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BufferStatus::Empty => "empty",
            BufferStatus::Filling => "filling",
            BufferStatus::Full => "full",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_encoding() {
        for status in [BufferStatus::Empty, BufferStatus::Filling, BufferStatus::Full] {
            assert_eq!(BufferStatus::from_u8(status as u8), status);
        }
        assert_eq!(BufferStatus::from_u8(0xEE), BufferStatus::Filling);
    }
}
