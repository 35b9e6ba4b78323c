//! # UTXO Positions
//!
//! A position identifies one output of one transaction in one child-chain
//! block, packed into a single ordered integer:
//!
//! ```text
//! encoded = block_num * 1_000_000_000 + tx_index * 10_000 + output_index
//! ```
//!
//! The packed form is what gets compared everywhere ordering matters:
//! exit priorities, competitor ordering, oldest-wins tie breaks. Lower
//! encoded value means older output.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of outputs a payment transaction may carry.
pub const MAX_OUTPUTS: usize = 4;

/// Maximum transaction index within a block.
pub const MAX_TX_INDEX: u32 = 65_535;

/// Multiplier separating the block number from the rest of the position.
pub const BLOCK_OFFSET: u128 = 1_000_000_000;

/// Multiplier separating the transaction index from the output index.
pub const TX_OFFSET: u128 = 10_000;

/// Errors raised by position construction and decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    /// Output index must be below [`MAX_OUTPUTS`].
    #[error("Invalid output index: {0} (max {})", MAX_OUTPUTS - 1)]
    InvalidOutputIndex(u16),

    /// Transaction index must fit in 16 bits.
    #[error("Transaction index overflow: {0} (max {MAX_TX_INDEX})")]
    TxIndexOverflow(u32),

    /// The encoded integer does not decode to in-range fields.
    #[error("Malformed position: {0}")]
    MalformedPosition(u128),

    /// A transaction-level position must carry output index zero.
    #[error("Not a transaction position: output index {0} is nonzero")]
    NotTxPosition(u16),
}

/// Position of a single transaction output on the child chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UtxoPos {
    /// Child-chain block number.
    pub block_num: u64,
    /// Index of the transaction within the block.
    pub tx_index: u32,
    /// Index of the output within the transaction.
    pub output_index: u16,
}

impl UtxoPos {
    /// Builds a position, validating field ranges.
    pub fn new(block_num: u64, tx_index: u32, output_index: u16) -> Result<Self, PositionError> {
        if output_index as usize >= MAX_OUTPUTS {
            return Err(PositionError::InvalidOutputIndex(output_index));
        }
        if tx_index > MAX_TX_INDEX {
            return Err(PositionError::TxIndexOverflow(tx_index));
        }
        Ok(Self {
            block_num,
            tx_index,
            output_index,
        })
    }

    /// Packs the position into its ordered integer form.
    pub fn encode(&self) -> u128 {
        self.block_num as u128 * BLOCK_OFFSET
            + self.tx_index as u128 * TX_OFFSET
            + self.output_index as u128
    }

    /// Unpacks an encoded position, validating that the embedded fields
    /// are in range.
    pub fn decode(encoded: u128) -> Result<Self, PositionError> {
        let block_num = encoded / BLOCK_OFFSET;
        let tx_index = (encoded % BLOCK_OFFSET) / TX_OFFSET;
        let output_index = encoded % TX_OFFSET;
        if block_num > u64::MAX as u128
            || tx_index > MAX_TX_INDEX as u128
            || output_index >= MAX_OUTPUTS as u128
        {
            return Err(PositionError::MalformedPosition(encoded));
        }
        Ok(Self {
            block_num: block_num as u64,
            tx_index: tx_index as u32,
            output_index: output_index as u16,
        })
    }

    /// Strips the output index, yielding the transaction-level position
    /// used when competing transactions are ordered against each other.
    pub fn tx_pos(&self) -> Self {
        Self {
            output_index: 0,
            ..*self
        }
    }

    /// Validates that this already is a transaction-level position.
    pub fn expect_tx_pos(&self) -> Result<Self, PositionError> {
        if self.output_index != 0 {
            return Err(PositionError::NotTxPosition(self.output_index));
        }
        Ok(*self)
    }

    /// A deposit block holds exactly one transaction and sits between the
    /// child blocks submitted by the operator.
    pub fn is_deposit(&self, child_block_interval: u64) -> bool {
        self.block_num % child_block_interval != 0
    }
}

impl std::fmt::Display for UtxoPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{} ({})",
            self.block_num,
            self.tx_index,
            self.output_index,
            self.encode()
        )
    }
}
