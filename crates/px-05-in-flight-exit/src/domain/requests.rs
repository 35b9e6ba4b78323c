//! Request payloads for the In-Flight Exit operations.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use shared_types::{Address, ExitId, Hash, UtxoPos};

/// Open an in-flight exit on an unconfirmed transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartInFlightExitRequest {
    /// Who opens the exit; becomes the initial bond owner.
    pub caller: Address,
    /// The in-flight transaction.
    pub in_flight_tx_bytes: Vec<u8>,
    /// Creating transaction of each input, parallel to the in-flight
    /// transaction's inputs.
    pub input_tx_bytes: Vec<Vec<u8>>,
    /// Position of each input.
    pub input_utxo_pos: Vec<UtxoPos>,
    /// Inclusion proof per input (unused entries empty for deposits).
    pub input_inclusion_proofs: Vec<Vec<Hash>>,
    /// Spending-condition witness per input, proving the in-flight
    /// transaction may spend it.
    pub input_witnesses: Vec<Vec<u8>>,
    /// Output-guard preimage per input, for resolving its owner.
    pub input_guard_preimages: Vec<Vec<u8>>,
    /// Posted start bond.
    pub bond: U256,
}

/// Piggyback one input of an in-flight exit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PiggybackInputRequest {
    /// Who piggybacks; must be the input's exit target.
    pub caller: Address,
    /// The exit.
    pub exit_id: ExitId,
    /// Input index.
    pub input_index: u16,
    /// Posted piggyback bond.
    pub bond: U256,
    /// Posted process bounty for this slot.
    pub bounty: U256,
}

/// Piggyback one output of an in-flight exit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PiggybackOutputRequest {
    /// Who piggybacks; must resolve as the output's exit target.
    pub caller: Address,
    /// The exit.
    pub exit_id: ExitId,
    /// Output index.
    pub output_index: u16,
    /// Preimage for the output-guard handler.
    pub output_guard_preimage: Vec<u8>,
    /// Posted piggyback bond.
    pub bond: U256,
    /// Posted process bounty for this slot.
    pub bounty: U256,
}

/// Dispute canonicity with a competing spend of a shared input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeCanonicityRequest {
    /// The challenger; takes over the start bond on success.
    pub caller: Address,
    /// The exit being challenged.
    pub exit_id: ExitId,
    /// Which in-flight input the competitor double-spends.
    pub in_flight_input_index: u16,
    /// The competing transaction.
    pub competing_tx_bytes: Vec<u8>,
    /// Which input of the competitor spends the shared input.
    pub competing_input_index: u16,
    /// Position of the competitor if it was included; `None` for an
    /// unincluded competitor, which is ordered after every included one.
    pub competing_tx_pos: Option<UtxoPos>,
    /// Inclusion proof for `competing_tx_pos`.
    pub inclusion_proof: Vec<Hash>,
    /// Spending-condition witness for the competing spend.
    pub witness: Vec<u8>,
}

/// Restore canonicity by proving the in-flight transaction's inclusion
/// at an older position than the recorded competitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RespondCanonicityRequest {
    /// The responder; takes over the start bond on success.
    pub caller: Address,
    /// The in-flight transaction (identifies the exit).
    pub in_flight_tx_bytes: Vec<u8>,
    /// Where the in-flight transaction was included.
    pub in_flight_tx_pos: UtxoPos,
    /// Inclusion proof for that position.
    pub inclusion_proof: Vec<Hash>,
}

/// Knock a piggybacked input out by proving it spent elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeInputSpentRequest {
    /// The challenger; receives the slot's bond and bounty.
    pub caller: Address,
    /// The exit.
    pub exit_id: ExitId,
    /// The piggybacked input being knocked out.
    pub input_index: u16,
    /// The transaction spending that input; must differ from the
    /// in-flight transaction.
    pub challenging_tx_bytes: Vec<u8>,
    /// Which input of the challenging transaction does the spending.
    pub challenging_input_index: u16,
    /// Spending-condition witness.
    pub witness: Vec<u8>,
}

/// Knock a piggybacked output out by proving it spent elsewhere.
///
/// Spending an output presupposes the in-flight transaction was
/// included, so the challenge carries that inclusion proof too.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeOutputSpentRequest {
    /// The challenger; receives the slot's bond and bounty.
    pub caller: Address,
    /// The exit.
    pub exit_id: ExitId,
    /// The piggybacked output being knocked out.
    pub output_index: u16,
    /// Where the in-flight transaction was included.
    pub in_flight_tx_pos: UtxoPos,
    /// Inclusion proof for the in-flight transaction.
    pub in_flight_inclusion_proof: Vec<Hash>,
    /// The transaction spending the output.
    pub challenging_tx_bytes: Vec<u8>,
    /// Which input of the challenging transaction does the spending.
    pub challenging_input_index: u16,
    /// Spending-condition witness.
    pub witness: Vec<u8>,
}
