//! # PX-04 Standard Exit Engine
//!
//! Withdrawal of a single finalized UTXO back to the root chain.
//!
//! ## State machine
//!
//! ```text
//! NonExistent ──start──→ Exitable ──challenge──→ Challenged (dead record)
//!                            │                        │
//!                         process                  process
//!                            ↓                        ↓
//!                        Processed (paid, deleted)  Omitted (deleted)
//! ```
//!
//! Starting requires proving the output (inclusion proof for block
//! outputs, deposit trust for deposit positions), posting the exact bond
//! and bounty, and being the output's exit target. A successful spend
//! challenge voids the exit and forfeits the bond to the challenger.
//! Processing pays the vault amount, returns the bond and pays the
//! bounty to whoever triggered processing.
//!
//! ## Module Structure
//!
//! ```text
//! px-04-standard-exit/
//! ├── domain/        # StandardExit record, requests, errors
//! └── engine.rs      # start / challenge / process
//! ```

pub mod domain;
pub mod engine;

pub use domain::entities::{StandardExit, StartedStandardExit};
pub use domain::errors::StandardExitError;
pub use domain::requests::{ChallengeStandardExitRequest, StartStandardExitRequest};
pub use engine::{StandardExitContext, StandardExitEngine};
