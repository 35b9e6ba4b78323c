//! Piggybacking inputs and outputs onto an in-flight exit.
//!
//! A piggyback is the owner's declaration "pay this piece out to me".
//! It is one-shot per slot, restricted to the first half of the exit
//! period, and the first piggyback per token tells the processor to
//! enqueue the exit under that token's queue.

use crate::domain::entities::{EnqueueSignal, InFlightExit, PiggybackOutcome, WithdrawData};
use crate::domain::errors::InFlightExitError;
use crate::domain::requests::{PiggybackInputRequest, PiggybackOutputRequest};
use crate::engine::{InFlightExitContext, InFlightExitEngine};
use shared_types::ids::output_id;
use shared_types::position::MAX_OUTPUTS;
use shared_types::{
    Address, BlockSource, ExitEvent, ExitId, ExitPriority, ExitSide, PaymentTransaction,
    PlasmaConfig, TokenId, U256,
};
use tracing::info;

impl InFlightExitEngine {
    /// Piggybacks one input. The caller must be the input's exit
    /// target, established when the exit was started.
    pub fn piggyback_input(
        &mut self,
        req: PiggybackInputRequest,
        ctx: &InFlightExitContext<'_>,
    ) -> Result<(PiggybackOutcome, Vec<ExitEvent>), InFlightExitError> {
        let now = ctx.clock.now();
        check_bond_and_bounty(
            req.bond,
            self.piggyback_bond.current(now),
            req.bounty,
            self.bounty.current(now),
        )?;
        let config = self.config.clone();
        let exit = self
            .exits
            .get_mut(&req.exit_id)
            .ok_or(InFlightExitError::ExitNotFound)?;
        check_phase(&config, exit, now)?;
        if req.input_index as usize >= MAX_OUTPUTS {
            return Err(InFlightExitError::InvalidIndex {
                index: req.input_index,
            });
        }
        if exit.exit_map.input(req.input_index) {
            return Err(InFlightExitError::AlreadyPiggybacked {
                index: req.input_index,
            });
        }
        let slot = exit.inputs[req.input_index as usize]
            .as_mut()
            .ok_or(InFlightExitError::EmptyIndexedSlot {
                index: req.input_index,
            })?;
        if req.caller != slot.exit_target {
            return Err(InFlightExitError::NotExitTarget);
        }
        slot.piggyback_bond_size = req.bond;
        slot.bounty_size = req.bounty;
        let token = slot.token;
        let exit_target = slot.exit_target;
        exit.exit_map.set_input(req.input_index);

        let enqueue = enqueue_if_first(&config, exit, req.exit_id, token, now, ctx.blocks)?;
        info!(index = req.input_index, "input piggybacked");
        Ok(finish(
            req.exit_id,
            ExitSide::Input,
            req.input_index,
            exit_target,
            token,
            enqueue,
        ))
    }

    /// Piggybacks one output. The output's exit target is resolved
    /// on the spot through its output-guard handler.
    pub fn piggyback_output(
        &mut self,
        req: PiggybackOutputRequest,
        ctx: &InFlightExitContext<'_>,
    ) -> Result<(PiggybackOutcome, Vec<ExitEvent>), InFlightExitError> {
        let now = ctx.clock.now();
        check_bond_and_bounty(
            req.bond,
            self.piggyback_bond.current(now),
            req.bounty,
            self.bounty.current(now),
        )?;
        let config = self.config.clone();
        let exit = self
            .exits
            .get_mut(&req.exit_id)
            .ok_or(InFlightExitError::ExitNotFound)?;
        check_phase(&config, exit, now)?;
        if req.output_index as usize >= MAX_OUTPUTS {
            return Err(InFlightExitError::InvalidIndex {
                index: req.output_index,
            });
        }
        if exit.exit_map.output(req.output_index) {
            return Err(InFlightExitError::AlreadyPiggybacked {
                index: req.output_index,
            });
        }

        let tx = PaymentTransaction::decode(&exit.tx_bytes)?;
        let output = *tx
            .output(req.output_index)
            .map_err(|_| InFlightExitError::EmptyIndexedSlot {
                index: req.output_index,
            })?;
        let handler = ctx.guards.handler(output.output_type, now)?;
        let exit_target = handler.exit_target(&output.output_guard, &req.output_guard_preimage);
        if req.caller != exit_target {
            return Err(InFlightExitError::NotExitTarget);
        }

        let token = output.token;
        exit.outputs[req.output_index as usize] = Some(WithdrawData {
            output_id: output_id(false, &exit.tx_bytes, req.output_index, exit.position),
            utxo_pos: exit.position,
            output_guard: output.output_guard,
            output_type: output.output_type,
            exit_target,
            token,
            amount: output.amount,
            piggyback_bond_size: req.bond,
            bounty_size: req.bounty,
        });
        exit.exit_map.set_output(req.output_index);

        let enqueue = enqueue_if_first(&config, exit, req.exit_id, token, now, ctx.blocks)?;
        info!(index = req.output_index, "output piggybacked");
        Ok(finish(
            req.exit_id,
            ExitSide::Output,
            req.output_index,
            exit_target,
            token,
            enqueue,
        ))
    }
}

fn check_bond_and_bounty(
    bond: U256,
    expected_bond: U256,
    bounty: U256,
    expected_bounty: U256,
) -> Result<(), InFlightExitError> {
    if bond != expected_bond {
        return Err(InFlightExitError::InvalidBond {
            expected: expected_bond,
            got: bond,
        });
    }
    if bounty != expected_bounty {
        return Err(InFlightExitError::InvalidBounty {
            expected: expected_bounty,
            got: bounty,
        });
    }
    Ok(())
}

/// Fails unless `now` is still within the first half of the exit
/// period, the window piggybacks and canonicity challenges share.
pub(crate) fn check_phase(
    config: &PlasmaConfig,
    exit: &InFlightExit,
    now: u64,
) -> Result<(), InFlightExitError> {
    let ended_at = config.first_phase_end(exit.exit_start_timestamp);
    if now >= ended_at {
        return Err(InFlightExitError::PhaseEnded { ended_at });
    }
    Ok(())
}

/// The first piggyback per token puts the whole exit into that token's
/// queue; later piggybacks of the same token ride along.
fn enqueue_if_first(
    config: &PlasmaConfig,
    exit: &mut InFlightExit,
    exit_id: ExitId,
    token: TokenId,
    now: u64,
    blocks: &dyn BlockSource,
) -> Result<Option<EnqueueSignal>, InFlightExitError> {
    if exit.enqueued_tokens.contains(&token) {
        return Ok(None);
    }
    let exitable_at = if exit.position.is_deposit(config.child_block_interval) {
        now + config.min_exit_period
    } else {
        let block = blocks
            .child_block(exit.position.block_num)
            .ok_or(InFlightExitError::UnknownBlock {
                block_num: exit.position.block_num,
            })?;
        (block.timestamp + 2 * config.min_exit_period).max(now + config.min_exit_period)
    };
    exit.enqueued_tokens.insert(token);
    Ok(Some(EnqueueSignal {
        priority: ExitPriority::pack(exitable_at, exit.position, exit_id),
        token,
        exitable_at,
    }))
}

fn finish(
    exit_id: ExitId,
    side: ExitSide,
    index: u16,
    exit_target: Address,
    token: TokenId,
    enqueue: Option<EnqueueSignal>,
) -> (PiggybackOutcome, Vec<ExitEvent>) {
    let mut events = vec![ExitEvent::InFlightExitPiggybacked {
        exit_id,
        side,
        index,
        exit_target,
    }];
    if let Some(signal) = &enqueue {
        events.push(ExitEvent::ExitQueued {
            exit_id,
            token,
            priority: signal.priority.0,
        });
    }
    (PiggybackOutcome { exit_id, enqueue }, events)
}
