//! Spend challenges against piggybacked slots.
//!
//! A piggybacked input or output proven spent by some other transaction
//! is knocked out individually: its bit clears, its withdraw data is
//! dropped, and its bond plus bounty pay the challenger. The rest of
//! the exit is untouched.

use crate::domain::errors::InFlightExitError;
use crate::domain::requests::{ChallengeInputSpentRequest, ChallengeOutputSpentRequest};
use crate::engine::{InFlightExitContext, InFlightExitEngine};
use shared_types::position::MAX_OUTPUTS;
use shared_types::{ExitEvent, ExitSide, PaymentTransaction, UtxoPos};
use tracing::info;

impl InFlightExitEngine {
    /// Knocks out a piggybacked input by proving a transaction other
    /// than the in-flight one spends it.
    pub fn challenge_input_spent(
        &mut self,
        req: ChallengeInputSpentRequest,
        ctx: &InFlightExitContext<'_>,
    ) -> Result<Vec<ExitEvent>, InFlightExitError> {
        let now = ctx.clock.now();
        let exit = self
            .exits
            .get_mut(&req.exit_id)
            .ok_or(InFlightExitError::ExitNotFound)?;
        if req.input_index as usize >= MAX_OUTPUTS {
            return Err(InFlightExitError::InvalidIndex {
                index: req.input_index,
            });
        }
        if !exit.exit_map.input(req.input_index) {
            return Err(InFlightExitError::NotPiggybacked {
                index: req.input_index,
            });
        }
        if req.challenging_tx_bytes == exit.tx_bytes {
            return Err(InFlightExitError::SameTransaction);
        }
        let slot = exit.inputs[req.input_index as usize]
            .as_ref()
            .ok_or(InFlightExitError::EmptyIndexedSlot {
                index: req.input_index,
            })?;

        let challenging_tx = PaymentTransaction::decode(&req.challenging_tx_bytes)?;
        if challenging_tx.input(req.challenging_input_index)? != slot.utxo_pos {
            return Err(InFlightExitError::InputsNotShared);
        }
        let condition = ctx
            .conditions
            .condition(slot.output_type, challenging_tx.tx_type, now)?;
        if !condition.verify(
            &slot.output_guard,
            slot.utxo_pos,
            &req.challenging_tx_bytes,
            req.challenging_input_index,
            &req.witness,
        ) {
            return Err(InFlightExitError::SpendingConditionFailed {
                input_index: req.challenging_input_index,
            });
        }

        exit.exit_map.clear_input(req.input_index);
        let data = exit.inputs[req.input_index as usize].take();
        let mut events = vec![ExitEvent::InFlightExitBlocked {
            exit_id: req.exit_id,
            side: ExitSide::Input,
            index: req.input_index,
            challenger: req.caller,
        }];
        if let Some(data) = data {
            let reward = data.piggyback_bond_size + data.bounty_size;
            if ctx.funds.transfer(req.caller, reward).is_err() {
                events.push(ExitEvent::BondReturnFailed {
                    to: req.caller,
                    amount: reward,
                });
            }
        }
        info!(index = req.input_index, "piggybacked input knocked out");
        Ok(events)
    }

    /// Knocks out a piggybacked output. Spending an output presupposes
    /// the in-flight transaction was included somewhere, so the
    /// challenge proves that inclusion first and derives the output's
    /// position from it.
    pub fn challenge_output_spent(
        &mut self,
        req: ChallengeOutputSpentRequest,
        ctx: &InFlightExitContext<'_>,
    ) -> Result<Vec<ExitEvent>, InFlightExitError> {
        let now = ctx.clock.now();
        let exit = self
            .exits
            .get_mut(&req.exit_id)
            .ok_or(InFlightExitError::ExitNotFound)?;
        if req.output_index as usize >= MAX_OUTPUTS {
            return Err(InFlightExitError::InvalidIndex {
                index: req.output_index,
            });
        }
        if !exit.exit_map.output(req.output_index) {
            return Err(InFlightExitError::NotPiggybacked {
                index: req.output_index,
            });
        }
        if req.challenging_tx_bytes == exit.tx_bytes {
            return Err(InFlightExitError::SameTransaction);
        }
        let slot = exit.outputs[req.output_index as usize]
            .as_ref()
            .ok_or(InFlightExitError::EmptyIndexedSlot {
                index: req.output_index,
            })?;

        let tx_pos = req.in_flight_tx_pos.expect_tx_pos()?;
        let block =
            ctx.blocks
                .child_block(tx_pos.block_num)
                .ok_or(InFlightExitError::UnknownBlock {
                    block_num: tx_pos.block_num,
                })?;
        if !ctx
            .inclusion
            .verify(&exit.tx_bytes, tx_pos, &block.root, &req.in_flight_inclusion_proof)
        {
            return Err(InFlightExitError::InvalidInclusionProof);
        }
        let output_pos = UtxoPos::new(tx_pos.block_num, tx_pos.tx_index, req.output_index)?;

        let challenging_tx = PaymentTransaction::decode(&req.challenging_tx_bytes)?;
        if challenging_tx.input(req.challenging_input_index)? != output_pos {
            return Err(InFlightExitError::InputsNotShared);
        }
        let condition = ctx
            .conditions
            .condition(slot.output_type, challenging_tx.tx_type, now)?;
        if !condition.verify(
            &slot.output_guard,
            output_pos,
            &req.challenging_tx_bytes,
            req.challenging_input_index,
            &req.witness,
        ) {
            return Err(InFlightExitError::SpendingConditionFailed {
                input_index: req.challenging_input_index,
            });
        }

        exit.exit_map.clear_output(req.output_index);
        let data = exit.outputs[req.output_index as usize].take();
        let mut events = vec![ExitEvent::InFlightExitBlocked {
            exit_id: req.exit_id,
            side: ExitSide::Output,
            index: req.output_index,
            challenger: req.caller,
        }];
        if let Some(data) = data {
            let reward = data.piggyback_bond_size + data.bounty_size;
            if ctx.funds.transfer(req.caller, reward).is_err() {
                events.push(ExitEvent::BondReturnFailed {
                    to: req.caller,
                    amount: reward,
                });
            }
        }
        info!(index = req.output_index, "piggybacked output knocked out");
        Ok(events)
    }
}
