//! # In-Flight Exit State Machine
//!
//! The engine struct and its shared plumbing. The operations live in one
//! file each:
//!
//! ```text
//! engine/
//! ├── start.rs       # open an exit on an unconfirmed transaction
//! ├── piggyback.rs   # opt inputs/outputs into the payout
//! ├── canonicity.rs  # challenge / respond on canonicity
//! ├── spend.rs       # knock out piggybacked inputs/outputs
//! └── process.rs     # finalize one token of the exit
//! ```

pub mod canonicity;
pub mod piggyback;
pub mod process;
pub mod spend;
pub mod start;

use crate::domain::entities::InFlightExit;
use px_02_registries::{OutputGuardHandlerRegistry, SpendingConditionRegistry};
use px_03_bonds::{BondError, BondSize};
use shared_types::position::MAX_TX_INDEX;
use shared_types::{
    BlockSource, ExitId, FundsTransfer, InclusionVerifier, PlasmaConfig, TimeSource, UtxoPos, U256,
};
use std::collections::{HashMap, HashSet};

/// Ordering position assigned to a competitor that was never included:
/// strictly newer than any included position, so any later inclusion
/// proof strictly improves on it.
pub(crate) const UNINCLUDED_POSITION: UtxoPos = UtxoPos {
    block_num: u64::MAX,
    tx_index: MAX_TX_INDEX,
    output_index: 0,
};

/// Collaborators an in-flight-exit operation reads through.
pub struct InFlightExitContext<'a> {
    /// Clock.
    pub clock: &'a dyn TimeSource,
    /// Submitted child-chain blocks.
    pub blocks: &'a dyn BlockSource,
    /// Merkle inclusion verification.
    pub inclusion: &'a dyn InclusionVerifier,
    /// Bond and bounty payout channel.
    pub funds: &'a dyn FundsTransfer,
    /// Spending-condition plugins.
    pub conditions: &'a SpendingConditionRegistry,
    /// Output-guard plugins.
    pub guards: &'a OutputGuardHandlerRegistry,
}

/// The In-Flight Exit engine.
pub struct InFlightExitEngine {
    pub(crate) config: PlasmaConfig,
    pub(crate) exits: HashMap<ExitId, InFlightExit>,
    pub(crate) finalized: HashSet<ExitId>,
    pub(crate) bond: BondSize,
    pub(crate) piggyback_bond: BondSize,
    pub(crate) bounty: BondSize,
}

impl InFlightExitEngine {
    /// Creates an engine with bond sizes seeded from the configuration.
    pub fn new(config: PlasmaConfig) -> Self {
        let bond = BondSize::new(config.in_flight_exit_bond);
        let piggyback_bond = BondSize::new(config.piggyback_bond);
        let bounty = BondSize::new(config.process_bounty);
        Self {
            config,
            exits: HashMap::new(),
            finalized: HashSet::new(),
            bond,
            piggyback_bond,
            bounty,
        }
    }

    /// The exit record under `id`, if one is live.
    pub fn exit(&self, id: &ExitId) -> Option<&InFlightExit> {
        self.exits.get(id)
    }

    /// Number of live exit records.
    pub fn exit_count(&self) -> usize {
        self.exits.len()
    }

    /// Bond required to start an exit at `now`.
    pub fn bond_size(&self, now: u64) -> U256 {
        self.bond.current(now)
    }

    /// Bond required to piggyback a slot at `now`.
    pub fn piggyback_bond_size(&self, now: u64) -> U256 {
        self.piggyback_bond.current(now)
    }

    /// Bounty required alongside a piggyback at `now`.
    pub fn bounty_size(&self, now: u64) -> U256 {
        self.bounty.current(now)
    }

    /// Proposes a new start bond (operator path).
    pub fn propose_bond(&mut self, new_value: U256, now: u64) -> Result<(), BondError> {
        self.bond.propose(new_value, now)
    }

    /// Proposes a new piggyback bond (operator path).
    pub fn propose_piggyback_bond(&mut self, new_value: U256, now: u64) -> Result<(), BondError> {
        self.piggyback_bond.propose(new_value, now)
    }
}
