//! Error types for the Exit Processor.

use px_02_registries::RegistryError;
use px_03_bonds::BondError;
use px_04_standard_exit::StandardExitError;
use px_05_in_flight_exit::InFlightExitError;
use shared_types::TokenId;
use thiserror::Error;

/// All errors the processor and service facade can produce.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessorError {
    /// The queue for this vault/token pair is empty or was never created.
    #[error("Nothing to process for vault {vault_id}, token {token:02x?}")]
    NothingToProcess {
        /// Vault whose queue was drained.
        vault_id: u32,
        /// Token whose queue was drained.
        token: TokenId,
    },

    /// The token does not exit through the given vault.
    #[error("Token {token:02x?} exits through vault {expected}, not {got}")]
    WrongVault {
        /// The token in question.
        token: TokenId,
        /// Vault the token actually belongs to.
        expected: u32,
        /// Vault the caller named.
        got: u32,
    },

    /// A registry operation failed.
    #[error("Registry failure: {0}")]
    Registry(#[from] RegistryError),

    /// A bond proposal was out of bounds.
    #[error("Bond failure: {0}")]
    Bond(#[from] BondError),

    /// A standard-exit operation failed.
    #[error("Standard exit failure: {0}")]
    StandardExit(#[from] StandardExitError),

    /// An in-flight-exit operation failed.
    #[error("In-flight exit failure: {0}")]
    InFlightExit(#[from] InFlightExitError),
}
