//! # Plugin Contracts
//!
//! The trait seams the registries dispatch through. Implementations are
//! registered under type tags and looked up dynamically, preserving the
//! extensibility of the original plugin contracts without reflection.

use serde::{Deserialize, Serialize};
use shared_types::ports::TransferError;
use shared_types::{Address, TokenId, UtxoPos, U256};

/// Exit-game finalization protocol of a registered game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    /// Minimal Viable Plasma: confirmation signatures. Reserved; no game
    /// using it ships with this framework.
    Mvp,
    /// MoreVP: in-flight exits, no confirmation signatures.
    MoreVp,
}

/// A registered exit game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitGameEntry {
    /// Address-like identity of the game.
    pub game: Address,
    /// Finalization protocol the game follows.
    pub protocol: Protocol,
}

/// A vault holding the funds a family of tokens exits into.
///
/// The engine only ever instructs withdrawals; custody and the actual
/// asset movement live behind this boundary.
pub trait Vault: Send + Sync {
    /// Releases `amount` of `token` to `target`.
    fn withdraw(&self, token: TokenId, target: Address, amount: U256) -> Result<(), TransferError>;
}

/// Verifier deciding whether a transaction legitimately spends an output.
///
/// Keyed in the registry by `(output_type, spending_tx_type)`.
pub trait SpendingCondition: Send + Sync {
    /// Whether `spending_tx` spends the output guarded by `output_guard`
    /// at `utxo_pos` through its input `input_index`, given `witness`.
    fn verify(
        &self,
        output_guard: &Address,
        utxo_pos: UtxoPos,
        spending_tx: &[u8],
        input_index: u16,
        witness: &[u8],
    ) -> bool;
}

/// Interpreter of output guards for a given output type.
pub trait OutputGuardHandler: Send + Sync {
    /// Whether `guard` is well-formed for this output type given the
    /// caller-supplied preimage.
    fn is_valid(&self, guard: &Address, preimage: &[u8]) -> bool;

    /// The address allowed to exit the guarded output.
    fn exit_target(&self, guard: &Address, preimage: &[u8]) -> Address;
}
