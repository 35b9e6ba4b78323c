//! # Exit Priorities
//!
//! A priority is the single 256-bit value the finalization heap orders
//! exits by:
//!
//! ```text
//! bits 192..256  exitable_at (unix seconds)
//! bits  64..192  transaction-level utxo position
//! bits   0..64   low 64 bits of the exit id
//! ```
//!
//! Exitable time is the major key and transaction position the minor key,
//! so among exits that become payable at the same time the older output
//! wins. The id bits only disambiguate distinct exits that would
//! otherwise pack identically, letting the processor map a popped
//! priority back to its exit.

use crate::ids::ExitId;
use crate::position::UtxoPos;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Packed ordering key for one enqueued exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExitPriority(pub U256);

impl ExitPriority {
    /// Packs exitable time, transaction position and exit id into the
    /// heap ordering key. The output index of `pos` is ignored: ordering
    /// between competing exits is transaction-level.
    pub fn pack(exitable_at: u64, pos: UtxoPos, exit_id: ExitId) -> Self {
        let tx_pos = U256::from(pos.tx_pos().encode());
        let value = (U256::from(exitable_at) << 192) | (tx_pos << 64) | U256::from(exit_id.low64());
        Self(value)
    }

    /// Recovers the exitable timestamp from the top 64 bits.
    pub fn exitable_at(&self) -> u64 {
        (self.0 >> 192).low_u64()
    }

    /// Recovers the transaction-level position from the middle bits.
    pub fn tx_pos_encoded(&self) -> u128 {
        ((self.0 >> 64) & ((U256::one() << 128) - 1)).low_u128()
    }

    /// The raw 256-bit key.
    pub fn raw(&self) -> U256 {
        self.0
    }
}
