//! Domain entities for the Standard Exit engine.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use shared_types::{Address, ExitId, ExitPriority, OutputId, TokenId, UtxoPos};

/// A live standard exit record.
///
/// Created by `start`; `exitable` flips to false on a successful spend
/// challenge; the record is deleted when `process` reaches it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardExit {
    /// False once a spend challenge voided the exit.
    pub exitable: bool,
    /// Position of the exiting output.
    pub utxo_pos: UtxoPos,
    /// Stable id of the exiting output.
    pub output_id: OutputId,
    /// Output type tag, keys spending-condition lookups on challenge.
    pub output_type: u32,
    /// The output's guard (owner for plain payments).
    pub output_guard: Address,
    /// Address the exit pays out to.
    pub exit_target: Address,
    /// Token being withdrawn.
    pub token: TokenId,
    /// Amount being withdrawn.
    pub amount: U256,
    /// Bond posted at start, returned on successful processing.
    pub bond_size: U256,
    /// Bounty posted at start, paid to the process caller.
    pub bounty_size: U256,
}

/// Everything the processor needs after a successful start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedStandardExit {
    /// Id of the new exit.
    pub exit_id: ExitId,
    /// Priority to enqueue.
    pub priority: ExitPriority,
    /// Token the exit withdraws, selects the queue and vault.
    pub token: TokenId,
    /// When the exit becomes processable.
    pub exitable_at: u64,
}
