//! # Piggyback Bitset
//!
//! Eight flags in one byte: bits 0..4 track piggybacked inputs, bits
//! 4..8 piggybacked outputs. Kept behind named accessors so the state
//! machine never does free bit-twiddling.

use serde::{Deserialize, Serialize};
use shared_types::position::MAX_OUTPUTS;

/// Piggyback state of an in-flight exit's four inputs and four outputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitMap(u8);

impl ExitMap {
    /// All bits clear.
    pub fn empty() -> Self {
        Self(0)
    }

    /// Whether input `i` is piggybacked. Out-of-range indices read as
    /// not piggybacked; range checks happen at the request boundary.
    pub fn input(&self, i: u16) -> bool {
        (i as usize) < MAX_OUTPUTS && self.0 & (1 << i) != 0
    }

    /// Whether output `i` is piggybacked.
    pub fn output(&self, i: u16) -> bool {
        (i as usize) < MAX_OUTPUTS && self.0 & (1 << (i + MAX_OUTPUTS as u16)) != 0
    }

    /// Marks input `i` piggybacked.
    pub fn set_input(&mut self, i: u16) {
        if (i as usize) < MAX_OUTPUTS {
            self.0 |= 1 << i;
        }
    }

    /// Marks output `i` piggybacked.
    pub fn set_output(&mut self, i: u16) {
        if (i as usize) < MAX_OUTPUTS {
            self.0 |= 1 << (i + MAX_OUTPUTS as u16);
        }
    }

    /// Clears input `i`.
    pub fn clear_input(&mut self, i: u16) {
        if (i as usize) < MAX_OUTPUTS {
            self.0 &= !(1 << i);
        }
    }

    /// Clears output `i`.
    pub fn clear_output(&mut self, i: u16) {
        if (i as usize) < MAX_OUTPUTS {
            self.0 &= !(1 << (i + MAX_OUTPUTS as u16));
        }
    }

    /// Whether no input or output remains piggybacked.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}
