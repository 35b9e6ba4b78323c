//! # Shared Outbound Ports
//!
//! Collaborator contracts consumed by the exit engines. Each is a trait
//! so tests (and deployments) can inject deterministic implementations.

use crate::position::UtxoPos;
use crate::{Address, Hash, Timestamp};
use primitive_types::U256;
use thiserror::Error;

/// Time source for consistent timestamp handling.
///
/// Abstracted to allow testing with deterministic time.
pub trait TimeSource: Send + Sync {
    /// Returns the current unix timestamp in seconds.
    fn now(&self) -> Timestamp;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// A submitted child-chain block as the root chain knows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildBlock {
    /// Merkle root over the block's transactions.
    pub root: Hash,
    /// Root-chain timestamp at submission.
    pub timestamp: Timestamp,
}

/// Provider of submitted child-chain block roots.
///
/// The block-submission mechanism itself is outside the engine; exits
/// only ever read roots and submission timestamps from it.
pub trait BlockSource: Send + Sync {
    /// The block at `block_num`, if one has been submitted.
    fn child_block(&self, block_num: u64) -> Option<ChildBlock>;
}

/// Merkle inclusion proof verifier.
///
/// `proof` is the sibling path from the leaf to the root; the leaf index
/// is the transaction index of `pos`.
pub trait InclusionVerifier: Send + Sync {
    /// Whether `leaf` is included at `pos` under `root`.
    fn verify(&self, leaf: &[u8], pos: UtxoPos, root: &Hash, proof: &[Hash]) -> bool;
}

/// A failed value transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Transfer of {amount} to {to:02x?} rejected")]
pub struct TransferError {
    /// Intended recipient.
    pub to: Address,
    /// Amount that failed to move.
    pub amount: U256,
}

/// Bond and bounty payout channel.
///
/// A failing transfer must never abort the operation that triggered it;
/// callers record the failure and retain the funds.
pub trait FundsTransfer: Send + Sync {
    /// Pays `amount` of the native asset to `to`.
    fn transfer(&self, to: Address, amount: U256) -> Result<(), TransferError>;
}

/// Ledger of outputs that have already been paid out by some exit path.
///
/// Both engines consult it before paying and flag through it after, so
/// no output can be withdrawn twice even across exit kinds.
pub trait SpentOutputBook: Send + Sync {
    /// Whether the output was already finalized by any exit.
    fn is_spent(&self, id: &crate::ids::OutputId) -> bool;

    /// Marks the output finalized.
    fn flag_spent(&mut self, id: crate::ids::OutputId);
}
