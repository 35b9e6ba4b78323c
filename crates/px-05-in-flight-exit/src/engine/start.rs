//! Opening an in-flight exit.

use crate::domain::entities::{InFlightExit, StartedInFlightExit, WithdrawData};
use crate::domain::errors::InFlightExitError;
use crate::domain::exit_map::ExitMap;
use crate::engine::{InFlightExitContext, InFlightExitEngine};
use crate::domain::requests::StartInFlightExitRequest;
use shared_types::ids::{in_flight_exit_id, output_id};
use shared_types::position::MAX_OUTPUTS;
use shared_types::{ExitEvent, PaymentTransaction, TokenId, U256};
use std::collections::HashMap;
use tracing::info;

impl InFlightExitEngine {
    /// Opens an in-flight exit: proves every input standard-finalized
    /// and legitimately spent by the in-flight transaction, checks the
    /// declared state transition, and stores the exit keyed by the
    /// transaction's id with the youngest input as its position.
    ///
    /// Nothing is enqueued yet; only piggybacks put an in-flight exit
    /// into a token queue.
    pub fn start(
        &mut self,
        req: StartInFlightExitRequest,
        ctx: &InFlightExitContext<'_>,
    ) -> Result<(StartedInFlightExit, Vec<ExitEvent>), InFlightExitError> {
        let now = ctx.clock.now();
        let tx = PaymentTransaction::decode(&req.in_flight_tx_bytes)?;
        let input_count = tx.inputs.len();

        for got in [
            req.input_tx_bytes.len(),
            req.input_utxo_pos.len(),
            req.input_inclusion_proofs.len(),
            req.input_witnesses.len(),
            req.input_guard_preimages.len(),
        ] {
            if got != input_count {
                return Err(InFlightExitError::InputArraysMismatch {
                    expected: input_count,
                    got,
                });
            }
        }

        let expected_bond = self.bond.current(now);
        if req.bond != expected_bond {
            return Err(InFlightExitError::InvalidBond {
                expected: expected_bond,
                got: req.bond,
            });
        }

        for i in 0..input_count {
            for j in (i + 1)..input_count {
                if req.input_utxo_pos[i] == req.input_utxo_pos[j] {
                    return Err(InFlightExitError::DuplicateInput(
                        req.input_utxo_pos[i].encode(),
                    ));
                }
            }
        }

        let exit_id = in_flight_exit_id(&req.in_flight_tx_bytes);
        if self.exits.contains_key(&exit_id) {
            return Err(InFlightExitError::AlreadyStarted);
        }
        if self.finalized.contains(&exit_id) {
            return Err(InFlightExitError::AlreadyFinalized);
        }

        let mut inputs: [Option<WithdrawData>; MAX_OUTPUTS] = Default::default();
        let mut input_sums: HashMap<TokenId, U256> = HashMap::new();
        let mut youngest = req.input_utxo_pos[0];

        for i in 0..input_count {
            let index = i as u16;
            let pos = req.input_utxo_pos[i];
            if tx.input(index)? != pos {
                return Err(InFlightExitError::InputMismatch { index });
            }

            let input_tx = PaymentTransaction::decode(&req.input_tx_bytes[i])?;
            let output = *input_tx.output(pos.output_index)?;
            let is_deposit = pos.is_deposit(self.config.child_block_interval);
            let block = ctx
                .blocks
                .child_block(pos.block_num)
                .ok_or(InFlightExitError::UnknownBlock {
                    block_num: pos.block_num,
                })?;
            if !is_deposit
                && !ctx.inclusion.verify(
                    &req.input_tx_bytes[i],
                    pos,
                    &block.root,
                    &req.input_inclusion_proofs[i],
                )
            {
                return Err(InFlightExitError::InputNotFinalized { index });
            }

            let condition = ctx.conditions.condition(output.output_type, tx.tx_type, now)?;
            if !condition.verify(
                &output.output_guard,
                pos,
                &req.in_flight_tx_bytes,
                index,
                &req.input_witnesses[i],
            ) {
                return Err(InFlightExitError::SpendingConditionFailed { input_index: index });
            }

            let handler = ctx.guards.handler(output.output_type, now)?;
            let exit_target =
                handler.exit_target(&output.output_guard, &req.input_guard_preimages[i]);

            inputs[i] = Some(WithdrawData {
                output_id: output_id(is_deposit, &req.input_tx_bytes[i], pos.output_index, pos),
                utxo_pos: pos,
                output_guard: output.output_guard,
                output_type: output.output_type,
                exit_target,
                token: output.token,
                amount: output.amount,
                piggyback_bond_size: U256::zero(),
                bounty_size: U256::zero(),
            });
            let in_sum = input_sums.entry(output.token).or_insert_with(U256::zero);
            // an input sum past U256::MAX covers any output sum anyway
            *in_sum = in_sum.saturating_add(output.amount);
            if pos > youngest {
                youngest = pos;
            }
        }

        let mut output_sums: HashMap<TokenId, U256> = HashMap::new();
        for output in &tx.outputs {
            let out_sum = output_sums.entry(output.token).or_insert_with(U256::zero);
            // an output sum that overflows U256 exceeds any possible input sum
            *out_sum = out_sum
                .checked_add(output.amount)
                .ok_or(InFlightExitError::OverspentToken { token: output.token })?;
        }
        for (token, out_sum) in &output_sums {
            let in_sum = input_sums.get(token).copied().unwrap_or_else(U256::zero);
            if *out_sum > in_sum {
                return Err(InFlightExitError::OverspentToken { token: *token });
            }
        }

        self.exits.insert(
            exit_id,
            InFlightExit {
                exit_start_timestamp: now,
                exit_map: ExitMap::empty(),
                position: youngest,
                tx_bytes: req.in_flight_tx_bytes,
                bond_owner: req.caller,
                bond_size: req.bond,
                is_canonical: true,
                oldest_competitor_position: None,
                inputs,
                outputs: Default::default(),
                enqueued_tokens: Default::default(),
                bond_returned: false,
            },
        );

        info!(position = %youngest, input_count, "in-flight exit started");
        let events = vec![ExitEvent::InFlightExitStarted {
            exit_id,
            initiator: req.caller,
        }];
        Ok((
            StartedInFlightExit {
                exit_id,
                position: youngest,
            },
            events,
        ))
    }
}
