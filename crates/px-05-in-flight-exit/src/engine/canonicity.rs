//! The canonicity game.
//!
//! A challenge presents a competing transaction that spends one of the
//! in-flight transaction's inputs; a response presents the in-flight
//! transaction included at an older position than the recorded
//! competitor. Either way the presented position must be strictly older
//! than what is on record, so the game converges and equal positions
//! never flip the state. The start bond follows whoever last won a
//! round.

use crate::domain::errors::InFlightExitError;
use crate::domain::requests::{ChallengeCanonicityRequest, RespondCanonicityRequest};
use crate::engine::piggyback::check_phase;
use crate::engine::{InFlightExitContext, InFlightExitEngine, UNINCLUDED_POSITION};
use shared_types::ids::in_flight_exit_id;
use shared_types::position::MAX_OUTPUTS;
use shared_types::{ExitEvent, PaymentTransaction, UtxoPos};
use tracing::info;

impl InFlightExitEngine {
    /// Disputes canonicity with a competing spend of a shared input.
    ///
    /// Succeeds when the competitor is strictly older than the recorded
    /// one (or when no competitor is recorded yet); the exit flips to
    /// non-canonical and the challenger takes over the start bond.
    pub fn challenge_canonicity(
        &mut self,
        req: ChallengeCanonicityRequest,
        ctx: &InFlightExitContext<'_>,
    ) -> Result<Vec<ExitEvent>, InFlightExitError> {
        let now = ctx.clock.now();
        let config = self.config.clone();
        let exit = self
            .exits
            .get_mut(&req.exit_id)
            .ok_or(InFlightExitError::ExitNotFound)?;
        check_phase(&config, exit, now)?;

        if req.competing_tx_bytes == exit.tx_bytes {
            return Err(InFlightExitError::SameTransaction);
        }
        if req.in_flight_input_index as usize >= MAX_OUTPUTS {
            return Err(InFlightExitError::InvalidIndex {
                index: req.in_flight_input_index,
            });
        }
        let slot = exit.inputs[req.in_flight_input_index as usize]
            .as_ref()
            .ok_or(InFlightExitError::EmptyIndexedSlot {
                index: req.in_flight_input_index,
            })?;

        let competing_tx = PaymentTransaction::decode(&req.competing_tx_bytes)?;
        let ife_tx = PaymentTransaction::decode(&exit.tx_bytes)?;
        let shared_input = ife_tx.input(req.in_flight_input_index)?;
        if competing_tx.input(req.competing_input_index)? != shared_input {
            return Err(InFlightExitError::InputsNotShared);
        }

        let condition = ctx
            .conditions
            .condition(slot.output_type, competing_tx.tx_type, now)?;
        if !condition.verify(
            &slot.output_guard,
            slot.utxo_pos,
            &req.competing_tx_bytes,
            req.competing_input_index,
            &req.witness,
        ) {
            return Err(InFlightExitError::SpendingConditionFailed {
                input_index: req.competing_input_index,
            });
        }

        // An unincluded competitor still proves a double-spend; it is
        // ordered after every included transaction.
        let competitor_pos = match req.competing_tx_pos {
            Some(pos) => {
                let tx_pos = pos.expect_tx_pos()?;
                let block = ctx.blocks.child_block(tx_pos.block_num).ok_or(
                    InFlightExitError::UnknownBlock {
                        block_num: tx_pos.block_num,
                    },
                )?;
                if !ctx.inclusion.verify(
                    &req.competing_tx_bytes,
                    tx_pos,
                    &block.root,
                    &req.inclusion_proof,
                ) {
                    return Err(InFlightExitError::InvalidInclusionProof);
                }
                tx_pos
            }
            None => UNINCLUDED_POSITION,
        };
        check_strictly_older(competitor_pos, exit.oldest_competitor_position)?;

        exit.is_canonical = false;
        exit.oldest_competitor_position = Some(competitor_pos);
        exit.bond_owner = req.caller;

        info!(competitor = %competitor_pos, "in-flight exit proven non-canonical");
        Ok(vec![ExitEvent::InFlightExitChallenged {
            exit_id: req.exit_id,
            challenger: req.caller,
            competitor_position: competitor_pos.encode(),
        }])
    }

    /// Restores canonicity by proving the in-flight transaction was
    /// itself included at a position strictly older than the recorded
    /// competitor. The responder takes over the start bond.
    pub fn respond_to_canonicity_challenge(
        &mut self,
        req: RespondCanonicityRequest,
        ctx: &InFlightExitContext<'_>,
    ) -> Result<Vec<ExitEvent>, InFlightExitError> {
        let exit_id = in_flight_exit_id(&req.in_flight_tx_bytes);
        let exit = self
            .exits
            .get_mut(&exit_id)
            .ok_or(InFlightExitError::ExitNotFound)?;
        if exit.is_canonical || exit.oldest_competitor_position.is_none() {
            return Err(InFlightExitError::NoChallengeToRespond);
        }

        let tx_pos = req.in_flight_tx_pos.expect_tx_pos()?;
        check_strictly_older(tx_pos, exit.oldest_competitor_position)?;

        let block =
            ctx.blocks
                .child_block(tx_pos.block_num)
                .ok_or(InFlightExitError::UnknownBlock {
                    block_num: tx_pos.block_num,
                })?;
        if !ctx.inclusion.verify(
            &req.in_flight_tx_bytes,
            tx_pos,
            &block.root,
            &req.inclusion_proof,
        ) {
            return Err(InFlightExitError::InvalidInclusionProof);
        }

        exit.is_canonical = true;
        exit.oldest_competitor_position = Some(tx_pos);
        exit.bond_owner = req.caller;

        info!(position = %tx_pos, "canonicity restored");
        Ok(vec![ExitEvent::InFlightExitChallengeResponded {
            exit_id,
            responder: req.caller,
            position: tx_pos.encode(),
        }])
    }
}

/// Each round must strictly improve on the recorded position; a tie
/// leaves the state alone and the round fails.
fn check_strictly_older(
    presented: UtxoPos,
    recorded: Option<UtxoPos>,
) -> Result<(), InFlightExitError> {
    if let Some(recorded) = recorded {
        if presented >= recorded {
            return Err(InFlightExitError::CompetitorNotOlder {
                presented: presented.encode(),
                recorded: recorded.encode(),
            });
        }
    }
    Ok(())
}
