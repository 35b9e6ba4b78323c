//! # Payment Transaction Model
//!
//! The exit engine never interprets child-chain transactions beyond the
//! payment shape: a type tag, up to four inputs (positions of the outputs
//! being spent) and up to four outputs. The byte codec is bincode; the
//! engines treat `encode`/`decode` as the pure codec boundary and work on
//! the decoded model.

use crate::position::UtxoPos;
use crate::{Address, TokenId};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transaction type tag for plain payment transactions.
pub const PAYMENT_TX_TYPE: u32 = 1;

/// Output type tag for plain payment outputs.
pub const PAYMENT_OUTPUT_TYPE: u32 = 1;

/// Codec and shape errors for transaction bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The bytes do not decode as a payment transaction.
    #[error("Undecodable transaction bytes: {0}")]
    Undecodable(String),

    /// Decoded shape violates the input/output arity bounds.
    #[error("Malformed transaction: {0}")]
    Malformed(&'static str),

    /// An output index points past the declared outputs.
    #[error("No output at index {0}")]
    NoSuchOutput(u16),

    /// An input index points past the declared inputs.
    #[error("No input at index {0}")]
    NoSuchInput(u16),
}

/// A single transaction output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    /// Output type tag, keys the output-guard handler registry.
    pub output_type: u32,
    /// Output guard: for plain payments, the owner address.
    pub output_guard: Address,
    /// Token the output denominates.
    pub token: TokenId,
    /// Output amount.
    pub amount: U256,
}

/// A decoded child-chain payment transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTransaction {
    /// Transaction type tag, keys the exit-game registry.
    pub tx_type: u32,
    /// Positions of the outputs this transaction spends.
    pub inputs: Vec<UtxoPos>,
    /// Outputs this transaction creates.
    pub outputs: Vec<TxOutput>,
}

impl PaymentTransaction {
    /// Builds a transaction, validating arity bounds.
    pub fn new(
        tx_type: u32,
        inputs: Vec<UtxoPos>,
        outputs: Vec<TxOutput>,
    ) -> Result<Self, CodecError> {
        let tx = Self {
            tx_type,
            inputs,
            outputs,
        };
        tx.validate_shape()?;
        Ok(tx)
    }

    /// Serializes to the wire byte form.
    pub fn encode(&self) -> Vec<u8> {
        // bincode of a bounded struct cannot fail
        bincode::serialize(self).unwrap_or_default()
    }

    /// Deserializes from wire bytes, rejecting out-of-shape transactions.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let tx: Self =
            bincode::deserialize(bytes).map_err(|e| CodecError::Undecodable(e.to_string()))?;
        tx.validate_shape()?;
        Ok(tx)
    }

    fn validate_shape(&self) -> Result<(), CodecError> {
        if self.inputs.is_empty() {
            return Err(CodecError::Malformed("transaction has no inputs"));
        }
        if self.inputs.len() > crate::position::MAX_OUTPUTS {
            return Err(CodecError::Malformed("too many inputs"));
        }
        if self.outputs.len() > crate::position::MAX_OUTPUTS {
            return Err(CodecError::Malformed("too many outputs"));
        }
        Ok(())
    }

    /// The output at `index`.
    pub fn output(&self, index: u16) -> Result<&TxOutput, CodecError> {
        self.outputs
            .get(index as usize)
            .ok_or(CodecError::NoSuchOutput(index))
    }

    /// The input position at `index`.
    pub fn input(&self, index: u16) -> Result<UtxoPos, CodecError> {
        self.inputs
            .get(index as usize)
            .copied()
            .ok_or(CodecError::NoSuchInput(index))
    }
}
