//! # PX-06 Exit Processor
//!
//! The component that ties the framework together: it owns one priority
//! queue per (vault, token) pair, the ledger of already-finalized
//! outputs, and both exit engines, and it is the only component allowed
//! to insert into or pop from the queues. Exits leave the system here,
//! oldest priority first, once their challenge period has elapsed.
//!
//! The crate also carries the async service facade ([`PlasmaFramework`])
//! that serializes every transition behind a write lock and broadcasts
//! exit events with per-call correlation ids, and the default adapters
//! (SHA-256 Merkle inclusion, payment spending condition and output
//! guard) that make the framework runnable end to end.
//!
//! ## Module Structure
//!
//! ```text
//! px-06-exit-processor/
//! ├── processor.rs   # ExitProcessor, token queues, spent-output ledger
//! ├── service.rs     # PlasmaFramework async facade + event broadcast
//! ├── ports.rs       # PlasmaFrameworkApi inbound trait
//! ├── adapters.rs    # Merkle verifier, payment condition/guard plugins
//! └── error.rs       # ProcessorError
//! ```

pub mod adapters;
pub mod error;
pub mod ports;
pub mod processor;
pub mod service;

pub use adapters::{
    MerkleInclusionVerifier, MerkleTree, PaymentOutputGuardHandler, PaymentSpendingCondition,
};
pub use error::ProcessorError;
pub use ports::{PlasmaFrameworkApi, Tracked};
pub use processor::{
    ExitKind, ExitProcessor, FrameworkRegistries, FrameworkServices, SpentOutputLedger,
};
pub use service::{FrameworkEvent, PlasmaFramework};
