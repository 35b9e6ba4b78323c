//! Domain entities for the In-Flight Exit engine.

use crate::domain::exit_map::ExitMap;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use shared_types::position::MAX_OUTPUTS;
use shared_types::{Address, ExitId, ExitPriority, OutputId, TokenId, UtxoPos};
use std::collections::HashSet;

/// Exit data for one input or output of an in-flight exit.
///
/// Zero-ish until its slot is populated (inputs at start, outputs at
/// piggyback); the whole slot is dropped again on a successful spend
/// challenge or once processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawData {
    /// Stable id of the underlying output.
    pub output_id: OutputId,
    /// Position of the underlying output. For outputs of the in-flight
    /// transaction this is unknown (the transaction may never have been
    /// included) and holds the in-flight exit's position.
    pub utxo_pos: UtxoPos,
    /// The output's guard.
    pub output_guard: Address,
    /// Output type tag, keys spending-condition lookups.
    pub output_type: u32,
    /// Who withdraws this slot.
    pub exit_target: Address,
    /// Token of the slot.
    pub token: TokenId,
    /// Amount of the slot.
    pub amount: U256,
    /// Bond posted when this slot was piggybacked.
    pub piggyback_bond_size: U256,
    /// Bounty posted for processing this slot.
    pub bounty_size: U256,
}

/// A live in-flight exit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InFlightExit {
    /// When the exit was started; anchors the two challenge phases.
    pub exit_start_timestamp: u64,
    /// Piggyback state of inputs and outputs.
    pub exit_map: ExitMap,
    /// Position of the youngest input, the exit's ordering position.
    pub position: UtxoPos,
    /// Bytes of the in-flight transaction.
    pub tx_bytes: Vec<u8>,
    /// Current holder of the start bond; challenges and responses move
    /// this back and forth.
    pub bond_owner: Address,
    /// The start bond.
    pub bond_size: U256,
    /// Whether the transaction currently counts as canonical.
    pub is_canonical: bool,
    /// Oldest competitor position presented so far; `None` until the
    /// first canonicity challenge.
    pub oldest_competitor_position: Option<UtxoPos>,
    /// Input slots, populated at start.
    pub inputs: [Option<WithdrawData>; MAX_OUTPUTS],
    /// Output slots, populated at piggyback.
    pub outputs: [Option<WithdrawData>; MAX_OUTPUTS],
    /// Tokens already enqueued with the processor.
    pub enqueued_tokens: HashSet<TokenId>,
    /// Whether the start bond has been paid back during processing.
    pub bond_returned: bool,
}

impl InFlightExit {
    /// Tokens still carried by at least one piggybacked slot.
    pub fn piggybacked_tokens(&self) -> HashSet<TokenId> {
        let mut tokens = HashSet::new();
        for (i, slot) in self.inputs.iter().enumerate() {
            if let Some(data) = slot {
                if self.exit_map.input(i as u16) {
                    tokens.insert(data.token);
                }
            }
        }
        for (i, slot) in self.outputs.iter().enumerate() {
            if let Some(data) = slot {
                if self.exit_map.output(i as u16) {
                    tokens.insert(data.token);
                }
            }
        }
        tokens
    }
}

/// Everything the processor needs after a successful start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedInFlightExit {
    /// Id of the new exit.
    pub exit_id: ExitId,
    /// Position of the youngest input.
    pub position: UtxoPos,
}

/// Outcome of a successful piggyback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PiggybackOutcome {
    /// The exit piggybacked onto.
    pub exit_id: ExitId,
    /// Set when this was the first piggyback for its token: the
    /// processor must enqueue this priority under that token's queue.
    pub enqueue: Option<EnqueueSignal>,
}

/// Instruction to enqueue an exit under one token queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnqueueSignal {
    /// Priority to insert.
    pub priority: ExitPriority,
    /// Token queue to insert into.
    pub token: TokenId,
    /// When the exit becomes processable.
    pub exitable_at: u64,
}
