//! # PX-05 In-Flight Exit Engine
//!
//! Withdrawal of the inputs or outputs of a transaction that may never
//! have made it into a child block. The most adversarial corner of the
//! framework: owners piggyback the pieces they claim, anyone may dispute
//! whether the transaction is canonical (the first spend of its inputs),
//! and any piggybacked piece can be individually knocked out by proof it
//! was spent elsewhere.
//!
//! ## State machine
//!
//! ```text
//!                 challenge canonicity (older competitor)
//!                ┌──────────────────────────────────────┐
//!                ↓                                      │
//! NonExistent ─start─→ Active(canonical) ⇄ Challenged(non-canonical)
//!                │          respond (older inclusion)   │
//!                │                                      │
//!                └───────── process(token)* ────────────┘
//!                                  ↓
//!                        Processed (record deleted)
//! ```
//!
//! Piggyback state per input/output lives in a [`domain::ExitMap`]
//! bitset orthogonal to canonicity: spend challenges clear single bits
//! without touching the canonical flag.
//!
//! ## Module Structure
//!
//! ```text
//! px-05-in-flight-exit/
//! ├── domain/         # InFlightExit, WithdrawData, ExitMap, requests, errors
//! └── engine/         # start / piggyback / canonicity / spend / process
//! ```

pub mod domain;
pub mod engine;

pub use domain::entities::{
    EnqueueSignal, InFlightExit, PiggybackOutcome, StartedInFlightExit, WithdrawData,
};
pub use domain::errors::InFlightExitError;
pub use domain::exit_map::ExitMap;
pub use domain::requests::{
    ChallengeCanonicityRequest, ChallengeInputSpentRequest, ChallengeOutputSpentRequest,
    PiggybackInputRequest, PiggybackOutputRequest, RespondCanonicityRequest,
    StartInFlightExitRequest,
};
pub use engine::{InFlightExitContext, InFlightExitEngine};
