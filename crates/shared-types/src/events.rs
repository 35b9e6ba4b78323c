//! # Exit Events
//!
//! Every observable state change emits one of these. Off-chain monitors
//! and the test suite assert on them; payout failures in particular are
//! only visible here (the funds stay put, the batch keeps going).

use crate::ids::ExitId;
use crate::{Address, TokenId};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Which side of an in-flight exit a piggyback or challenge targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitSide {
    /// An input of the in-flight transaction.
    Input,
    /// An output of the in-flight transaction.
    Output,
}

/// Observable state changes of the exit engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitEvent {
    /// A standard exit was opened.
    StandardExitStarted {
        exit_id: ExitId,
        exit_target: Address,
        token: TokenId,
        amount: U256,
        utxo_pos: u128,
    },
    /// A standard exit was proven spent and voided.
    StandardExitChallenged { exit_id: ExitId, challenger: Address },
    /// An in-flight exit was opened.
    InFlightExitStarted { exit_id: ExitId, initiator: Address },
    /// An input or output was piggybacked onto an in-flight exit.
    InFlightExitPiggybacked {
        exit_id: ExitId,
        side: ExitSide,
        index: u16,
        exit_target: Address,
    },
    /// A competing transaction proved the in-flight transaction
    /// non-canonical.
    InFlightExitChallenged {
        exit_id: ExitId,
        challenger: Address,
        competitor_position: u128,
    },
    /// Inclusion of the in-flight transaction restored canonicity.
    InFlightExitChallengeResponded {
        exit_id: ExitId,
        responder: Address,
        position: u128,
    },
    /// A piggybacked input or output was proven spent and removed.
    InFlightExitBlocked {
        exit_id: ExitId,
        side: ExitSide,
        index: u16,
        challenger: Address,
    },
    /// An exit was enqueued for finalization.
    ExitQueued {
        exit_id: ExitId,
        token: TokenId,
        priority: U256,
    },
    /// An exit was popped but paid nothing (challenged, or its output
    /// already finalized elsewhere).
    ExitOmitted { exit_id: ExitId },
    /// An exit (or one in-flight slot) paid out through its vault.
    ExitFinalized {
        exit_id: ExitId,
        token: TokenId,
        exit_target: Address,
        amount: U256,
    },
    /// The vault refused a withdrawal; funds retained.
    WithdrawFailed {
        exit_id: ExitId,
        token: TokenId,
        exit_target: Address,
        amount: U256,
    },
    /// A bond or bounty transfer was refused; funds retained.
    BondReturnFailed { to: Address, amount: U256 },
}
