//! # Shared Types Crate
//!
//! This crate contains the domain primitives shared by every exit-engine
//! subsystem: UTXO positions and their ordering, exit priorities, the
//! payment transaction model, exit/output id derivation, the event
//! taxonomy, framework configuration, and the outbound port traits for
//! external collaborators (clock, child-chain blocks, inclusion proofs,
//! fund transfers).
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: all cross-subsystem types are defined here.
//! - **No ambient authority**: callers and operators are explicit values
//!   passed into operations, never globals.
//! - **Total ordering**: `UtxoPos` and `ExitPriority` define the ordering
//!   relation the whole finalization pipeline depends on.

pub mod config;
pub mod events;
pub mod ids;
pub mod ports;
pub mod position;
pub mod priority;
pub mod transaction;

pub use config::PlasmaConfig;
pub use events::{ExitEvent, ExitSide};
pub use ids::{in_flight_exit_id, output_id, standard_exit_id, ExitId, OutputId};
pub use ports::{
    BlockSource, ChildBlock, FundsTransfer, InclusionVerifier, SpentOutputBook, SystemTimeSource,
    TimeSource,
};
pub use position::{PositionError, UtxoPos, MAX_OUTPUTS};
pub use priority::ExitPriority;
pub use transaction::{CodecError, PaymentTransaction, TxOutput};

// Re-export U256 from primitive-types for use across all subsystems
pub use primitive_types::U256;

/// A 32-byte hash.
pub type Hash = [u8; 32];

/// A 20-byte Ethereum-style address.
pub type Address = [u8; 20];

/// Token identifier; the zero address denotes the native asset.
pub type TokenId = Address;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// The token id of the native (ETH-like) asset.
pub const NATIVE_TOKEN: TokenId = [0u8; 20];
