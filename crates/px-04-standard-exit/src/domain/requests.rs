//! Request payloads for the Standard Exit operations.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use shared_types::{Address, ExitId, Hash, UtxoPos};

/// Start a standard exit on one output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartStandardExitRequest {
    /// Who is exiting; must resolve to the output's exit target.
    pub caller: Address,
    /// Position of the output being exited.
    pub utxo_pos: UtxoPos,
    /// Bytes of the transaction that created the output.
    pub tx_bytes: Vec<u8>,
    /// Preimage for the output-guard handler.
    pub output_guard_preimage: Vec<u8>,
    /// Sibling path proving inclusion; ignored for deposit positions.
    pub inclusion_proof: Vec<Hash>,
    /// Posted exit bond; must match the current bond size exactly.
    pub bond: U256,
    /// Posted process bounty; must match the current bounty exactly.
    pub bounty: U256,
}

/// Challenge a standard exit with proof its output was spent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeStandardExitRequest {
    /// The challenger; receives the exit bond on success.
    pub caller: Address,
    /// The exit being challenged.
    pub exit_id: ExitId,
    /// Bytes of the transaction spending the exiting output.
    pub spending_tx_bytes: Vec<u8>,
    /// Which input of the spending transaction spends the output.
    pub input_index: u16,
    /// Witness for the spending condition.
    pub witness: Vec<u8>,
}
