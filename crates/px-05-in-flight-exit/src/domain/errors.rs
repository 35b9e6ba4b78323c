//! Error types for the In-Flight Exit engine.

use primitive_types::U256;
use px_02_registries::RegistryError;
use shared_types::{CodecError, PositionError, TokenId};
use thiserror::Error;

/// All errors the In-Flight Exit engine can produce.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InFlightExitError {
    /// A transaction failed to decode.
    #[error("Transaction codec failure: {0}")]
    Codec(#[from] CodecError),

    /// A utxo position is malformed.
    #[error("Position failure: {0}")]
    Position(#[from] PositionError),

    /// Registry lookup failed (unregistered, quarantined).
    #[error("Registry failure: {0}")]
    Registry(#[from] RegistryError),

    /// The parallel start arrays have diverging lengths.
    #[error("Input arrays mismatch: expected {expected} entries, got {got}")]
    InputArraysMismatch {
        /// Input count declared by the in-flight transaction.
        expected: usize,
        /// Length of the offending array.
        got: usize,
    },

    /// The same input appears twice.
    #[error("Duplicate input at position {0}")]
    DuplicateInput(u128),

    /// A supplied input position differs from the one the in-flight
    /// transaction declares.
    #[error("Input {index} does not match the in-flight transaction")]
    InputMismatch {
        /// Input index.
        index: u16,
    },

    /// No submitted child block at the claimed position.
    #[error("Unknown child block: {block_num}")]
    UnknownBlock {
        /// The block number the proof pointed at.
        block_num: u64,
    },

    /// An input transaction is neither included nor a deposit.
    #[error("Input {index} is not standard-finalized")]
    InputNotFinalized {
        /// Input index.
        index: u16,
    },

    /// A spending condition rejected the claimed spend.
    #[error("Spending condition failed for input {input_index}")]
    SpendingConditionFailed {
        /// Index of the input whose condition failed.
        input_index: u16,
    },

    /// Outputs claim more of a token than the inputs provide.
    #[error("Token overspent: {token:02x?}")]
    OverspentToken {
        /// The overspent token.
        token: TokenId,
    },

    /// An in-flight exit for this transaction is already active.
    #[error("In-flight exit already started")]
    AlreadyStarted,

    /// An in-flight exit for this transaction already finalized.
    #[error("In-flight exit already finalized")]
    AlreadyFinalized,

    /// Posted bond differs from the required bond.
    #[error("Invalid bond: expected {expected}, got {got}")]
    InvalidBond {
        /// Required bond at the time of the call.
        expected: U256,
        /// What the caller posted.
        got: U256,
    },

    /// Posted bounty differs from the required bounty.
    #[error("Invalid bounty: expected {expected}, got {got}")]
    InvalidBounty {
        /// Required bounty at the time of the call.
        expected: U256,
        /// What the caller posted.
        got: U256,
    },

    /// No in-flight exit under the given id.
    #[error("In-flight exit not found")]
    ExitNotFound,

    /// The piggyback / canonicity-challenge phase is over.
    #[error("First phase ended at {ended_at}")]
    PhaseEnded {
        /// When the first half of the exit period elapsed.
        ended_at: u64,
    },

    /// Input or output index out of range.
    #[error("Invalid index: {index}")]
    InvalidIndex {
        /// The offending index.
        index: u16,
    },

    /// The indexed slot holds no input or output.
    #[error("Empty indexed slot: {index}")]
    EmptyIndexedSlot {
        /// The offending index.
        index: u16,
    },

    /// The slot was already piggybacked; piggyback is one-shot.
    #[error("Already piggybacked: {index}")]
    AlreadyPiggybacked {
        /// The offending index.
        index: u16,
    },

    /// Caller is not the slot's exit target.
    #[error("Caller is not the exit target")]
    NotExitTarget,

    /// A competing transaction must differ from the in-flight one.
    #[error("Competing transaction is the in-flight transaction")]
    SameTransaction,

    /// Challenge transactions must share an input with the in-flight
    /// transaction.
    #[error("Transactions share no input")]
    InputsNotShared,

    /// The presented position does not strictly improve on the recorded
    /// competitor; equal positions are rejected.
    #[error("Competitor not older: presented {presented}, recorded {recorded}")]
    CompetitorNotOlder {
        /// Position presented by this challenge or response.
        presented: u128,
        /// Position currently recorded.
        recorded: u128,
    },

    /// Responding requires an open canonicity challenge.
    #[error("No canonicity challenge to respond to")]
    NoChallengeToRespond,

    /// An inclusion proof does not verify against the block root.
    #[error("Invalid inclusion proof")]
    InvalidInclusionProof,

    /// The targeted slot is not piggybacked.
    #[error("Slot {index} is not piggybacked")]
    NotPiggybacked {
        /// The offending index.
        index: u16,
    },
}
