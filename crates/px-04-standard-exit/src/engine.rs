//! # Standard Exit State Machine
//!
//! `start` / `challenge` / `process` over the exit records. The engine
//! owns only its own records and bond sizing; the clock, block roots,
//! proof verification, plugin registries and payout channels are passed
//! in per call, so every transition is a pure function of its inputs and
//! the injected collaborators.

use crate::domain::entities::{StandardExit, StartedStandardExit};
use crate::domain::errors::StandardExitError;
use crate::domain::requests::{ChallengeStandardExitRequest, StartStandardExitRequest};
use px_02_registries::{OutputGuardHandlerRegistry, SpendingConditionRegistry, Vault};
use px_03_bonds::{BondError, BondSize};
use shared_types::ids::{output_id, standard_exit_id};
use shared_types::{
    BlockSource, ExitEvent, ExitId, ExitPriority, FundsTransfer, InclusionVerifier, PaymentTransaction,
    PlasmaConfig, SpentOutputBook, TimeSource, U256,
};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Collaborators a standard-exit operation reads through.
pub struct StandardExitContext<'a> {
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

/// The Standard Exit engine.
pub struct StandardExitEngine {
    config: PlasmaConfig,
    exits: HashMap<ExitId, StandardExit>,
    bond: BondSize,
    bounty: BondSize,
}

impl StandardExitEngine {
    /// Creates an engine with bond sizes seeded from the configuration.
    pub fn new(config: PlasmaConfig) -> Self {
        let bond = BondSize::new(config.standard_exit_bond);
        let bounty = BondSize::new(config.process_bounty);
        Self {
            config,
            exits: HashMap::new(),
            bond,
            bounty,
        }
    }

    /// The exit record under `id`, if one is live.
    pub fn exit(&self, id: &ExitId) -> Option<&StandardExit> {
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

    /// Bounty required alongside the bond at `now`.
    pub fn bounty_size(&self, now: u64) -> U256 {
        self.bounty.current(now)
    }

    /// Proposes a new start bond (operator path).
    pub fn propose_bond(&mut self, new_value: U256, now: u64) -> Result<(), BondError> {
        self.bond.propose(new_value, now)
    }

    /// Opens a standard exit on one proven or deposited output.
    pub fn start(
        &mut self,
        req: StartStandardExitRequest,
        ctx: &StandardExitContext<'_>,
    ) -> Result<(StartedStandardExit, Vec<ExitEvent>), StandardExitError> {
        let now = ctx.clock.now();
        let tx = PaymentTransaction::decode(&req.tx_bytes)?;
        let output = *tx.output(req.utxo_pos.output_index)?;

        if output.amount.is_zero() {
            return Err(StandardExitError::AmountZero);
        }

        let handler = ctx.guards.handler(output.output_type, now)?;
        if !handler.is_valid(&output.output_guard, &req.output_guard_preimage) {
            return Err(StandardExitError::InvalidOutputGuard);
        }
        let exit_target = handler.exit_target(&output.output_guard, &req.output_guard_preimage);
        if req.caller != exit_target {
            return Err(StandardExitError::NotExitTarget);
        }

        let expected_bond = self.bond.current(now);
        if req.bond != expected_bond {
            return Err(StandardExitError::InvalidBond {
                expected: expected_bond,
                got: req.bond,
            });
        }
        let expected_bounty = self.bounty.current(now);
        if req.bounty != expected_bounty {
            return Err(StandardExitError::InvalidBounty {
                expected: expected_bounty,
                got: req.bounty,
            });
        }

        let is_deposit = req.utxo_pos.is_deposit(self.config.child_block_interval);
        let block = ctx
            .blocks
            .child_block(req.utxo_pos.block_num)
            .ok_or(StandardExitError::UnknownBlock {
                block_num: req.utxo_pos.block_num,
            })?;
        if !is_deposit
            && !ctx
                .inclusion
                .verify(&req.tx_bytes, req.utxo_pos, &block.root, &req.inclusion_proof)
        {
            return Err(StandardExitError::InvalidInclusionProof);
        }

        let exit_id = standard_exit_id(is_deposit, &req.tx_bytes, req.utxo_pos);
        if self.exits.contains_key(&exit_id) {
            return Err(StandardExitError::AlreadyExists);
        }

        let exitable_at = if is_deposit {
            now + self.config.min_exit_period
        } else {
            (block.timestamp + 2 * self.config.min_exit_period).max(now + self.config.min_exit_period)
        };

        let record = StandardExit {
            exitable: true,
            utxo_pos: req.utxo_pos,
            output_id: output_id(
                is_deposit,
                &req.tx_bytes,
                req.utxo_pos.output_index,
                req.utxo_pos,
            ),
            output_type: output.output_type,
            output_guard: output.output_guard,
            exit_target,
            token: output.token,
            amount: output.amount,
            bond_size: req.bond,
            bounty_size: req.bounty,
        };
        self.exits.insert(exit_id, record);

        info!(
            utxo_pos = %req.utxo_pos,
            is_deposit,
            exitable_at,
            "standard exit started"
        );
        let started = StartedStandardExit {
            exit_id,
            priority: ExitPriority::pack(exitable_at, req.utxo_pos, exit_id),
            token: output.token,
            exitable_at,
        };
        let events = vec![ExitEvent::StandardExitStarted {
            exit_id,
            exit_target,
            token: output.token,
            amount: output.amount,
            utxo_pos: req.utxo_pos.encode(),
        }];
        Ok((started, events))
    }

    /// Voids an exit by proving its output spent; the bond goes to the
    /// challenger.
    pub fn challenge(
        &mut self,
        req: ChallengeStandardExitRequest,
        ctx: &StandardExitContext<'_>,
    ) -> Result<Vec<ExitEvent>, StandardExitError> {
        let now = ctx.clock.now();
        let exit = self
            .exits
            .get_mut(&req.exit_id)
            .ok_or(StandardExitError::ExitNotFound)?;
        if !exit.exitable {
            return Err(StandardExitError::AlreadyChallenged);
        }

        let spending_tx = PaymentTransaction::decode(&req.spending_tx_bytes)?;
        let condition = ctx
            .conditions
            .condition(exit.output_type, spending_tx.tx_type, now)?;
        if !condition.verify(
            &exit.output_guard,
            exit.utxo_pos,
            &req.spending_tx_bytes,
            req.input_index,
            &req.witness,
        ) {
            return Err(StandardExitError::SpendingConditionFailed);
        }

        exit.exitable = false;
        let bond = exit.bond_size;
        info!(challenger = ?req.caller, "standard exit challenged");

        let mut events = vec![ExitEvent::StandardExitChallenged {
            exit_id: req.exit_id,
            challenger: req.caller,
        }];
        if ctx.funds.transfer(req.caller, bond).is_err() {
            warn!(to = ?req.caller, "challenge bond transfer rejected, funds retained");
            events.push(ExitEvent::BondReturnFailed {
                to: req.caller,
                amount: bond,
            });
        }
        Ok(events)
    }

    /// Finalizes one exit whose exitable time has arrived.
    ///
    /// Never fails: a voided, missing or already-finalized exit is an
    /// omitted no-op so duplicate processor calls stay safe, and payout
    /// failures degrade to events.
    pub fn process(
        &mut self,
        exit_id: ExitId,
        reward_to: shared_types::Address,
        vault: &dyn Vault,
        funds: &dyn FundsTransfer,
        book: &mut dyn SpentOutputBook,
    ) -> Vec<ExitEvent> {
        let Some(exit) = self.exits.remove(&exit_id) else {
            return vec![ExitEvent::ExitOmitted { exit_id }];
        };
        if !exit.exitable || book.is_spent(&exit.output_id) {
            debug!(exitable = exit.exitable, "standard exit omitted");
            return vec![ExitEvent::ExitOmitted { exit_id }];
        }

        book.flag_spent(exit.output_id);
        let mut events = Vec::new();
        match vault.withdraw(exit.token, exit.exit_target, exit.amount) {
            Ok(()) => {
                info!(amount = %exit.amount, "standard exit finalized");
                events.push(ExitEvent::ExitFinalized {
                    exit_id,
                    token: exit.token,
                    exit_target: exit.exit_target,
                    amount: exit.amount,
                });
            }
            Err(_) => {
                warn!("vault withdrawal rejected, funds retained");
                events.push(ExitEvent::WithdrawFailed {
                    exit_id,
                    token: exit.token,
                    exit_target: exit.exit_target,
                    amount: exit.amount,
                });
            }
        }
        if funds.transfer(exit.exit_target, exit.bond_size).is_err() {
            events.push(ExitEvent::BondReturnFailed {
                to: exit.exit_target,
                amount: exit.bond_size,
            });
        }
        if funds.transfer(reward_to, exit.bounty_size).is_err() {
            events.push(ExitEvent::BondReturnFailed {
                to: reward_to,
                amount: exit.bounty_size,
            });
        }
        events
    }
}
