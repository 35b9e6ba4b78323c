//! Error types for the Standard Exit engine.

use primitive_types::U256;
use px_02_registries::RegistryError;
use shared_types::{CodecError, PositionError};
use thiserror::Error;

/// All errors the Standard Exit engine can produce.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StandardExitError {
    /// The exiting or spending transaction bytes do not decode.
    #[error("Transaction codec failure: {0}")]
    Codec(#[from] CodecError),

    /// The utxo position is malformed.
    #[error("Position failure: {0}")]
    Position(#[from] PositionError),

    /// Registry lookup failed (unregistered, quarantined).
    #[error("Registry failure: {0}")]
    Registry(#[from] RegistryError),

    /// Exiting a zero-amount output is pointless and forbidden.
    #[error("Output amount is zero")]
    AmountZero,

    /// No submitted child block at the claimed position.
    #[error("Unknown child block: {block_num}")]
    UnknownBlock {
        /// The block number the exit claimed.
        block_num: u64,
    },

    /// The inclusion proof does not verify against the block root.
    #[error("Invalid inclusion proof")]
    InvalidInclusionProof,

    /// The output guard does not validate under its handler.
    #[error("Invalid output guard")]
    InvalidOutputGuard,

    /// Caller is not the resolved exit target of the output.
    #[error("Caller is not the exit target")]
    NotExitTarget,

    /// Posted bond differs from the required bond.
    #[error("Invalid bond: expected {expected}, got {got}")]
    InvalidBond {
        /// Required bond at the time of the call.
        expected: U256,
        /// What the caller posted.
        got: U256,
    },

    /// Posted process bounty differs from the required bounty.
    #[error("Invalid bounty: expected {expected}, got {got}")]
    InvalidBounty {
        /// Required bounty at the time of the call.
        expected: U256,
        /// What the caller posted.
        got: U256,
    },

    /// A live exit already exists for this output.
    #[error("Exit already exists")]
    AlreadyExists,

    /// No exit under the given id.
    #[error("Exit not found")]
    ExitNotFound,

    /// The exit was already voided by a spend challenge.
    #[error("Exit already challenged")]
    AlreadyChallenged,

    /// The presented spend does not satisfy the spending condition.
    #[error("Spending condition failed")]
    SpendingConditionFailed,
}
