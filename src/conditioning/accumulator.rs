//! Packing of corrected bits into bytes.

use crate::source::Bit;
use serde::{Deserialize, Serialize};

/// Where the first corrected bit of a byte lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BitOrder {
    /// First corrected bit occupies bit 0.
    #[default]
    LsbFirst,
    /// First corrected bit occupies bit 7.
    MsbFirst,
}

/// Partial byte under construction (0-7 valid bits).
#[derive(Debug, Clone, Default)]
pub struct BitAccumulator {
    value: u8,
    count: u8,
    order: BitOrder,
}

impl BitAccumulator {
    pub fn new(order: BitOrder) -> Self {
        Self {
            value: 0,
            count: 0,
            order,
        }
    }

    /// Shifts in one corrected bit.
    ///
    /// Returns the completed byte once eight bits are collected and
    /// leaves the accumulator empty.
    #[inline]
    pub fn push(&mut self, bit: Bit) -> Option<u8> {
        let shift = match self.order {
            BitOrder::LsbFirst => self.count,
            BitOrder::MsbFirst => 7 - self.count,
        };
        self.value |= bit.as_u8() << shift;
        self.count += 1;

        if self.count == 8 {
            let byte = self.value;
            self.clear();
            Some(byte)
        } else {
            None
        }
    }

    /// Returns the number of valid bits held.
    #[inline]
    pub fn len(&self) -> u8 {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the configured bit order.
    #[inline]
    pub fn order(&self) -> BitOrder {
        self.order
    }

    #[inline]
    pub fn clear(&mut self) {
        self.value = 0;
        self.count = 0;
    }
}
