//! Finalization of one token of an in-flight exit.
//!
//! Called by the processor when a priority it enqueued for this exit
//! reaches the head of a token queue. Never fails: a missing record is
//! an omitted no-op, payout failures degrade to events, and the record
//! is deleted once its last piggybacked slot has been handled.

use crate::domain::entities::WithdrawData;
use crate::engine::InFlightExitEngine;
use px_02_registries::Vault;
use shared_types::{
    Address, ExitEvent, ExitId, FundsTransfer, SpentOutputBook, TokenId,
};
use tracing::{debug, info, warn};

impl InFlightExitEngine {
    /// Pays out every piggybacked slot of `token`.
    ///
    /// Canonicity decides which side withdraws: a canonical transaction
    /// pays its outputs (the inputs were legitimately consumed), a
    /// non-canonical one gives the inputs back. The losing side still
    /// gets its piggyback bonds returned. Every handled slot marks its
    /// output spent so no other exit path can pay it again.
    pub fn process(
        &mut self,
        exit_id: ExitId,
        token: TokenId,
        reward_to: Address,
        vault: &dyn Vault,
        funds: &dyn FundsTransfer,
        book: &mut dyn SpentOutputBook,
    ) -> Vec<ExitEvent> {
        let Some(exit) = self.exits.get_mut(&exit_id) else {
            return vec![ExitEvent::ExitOmitted { exit_id }];
        };
        let mut events = Vec::new();

        if !exit.bond_returned {
            if funds.transfer(exit.bond_owner, exit.bond_size).is_err() {
                events.push(ExitEvent::BondReturnFailed {
                    to: exit.bond_owner,
                    amount: exit.bond_size,
                });
            }
            exit.bond_returned = true;
        }

        let canonical = exit.is_canonical;
        for index in 0..exit.inputs.len() as u16 {
            if !exit.exit_map.input(index) {
                continue;
            }
            let Some(data) = exit.inputs[index as usize].as_ref() else {
                continue;
            };
            if data.token != token {
                continue;
            }
            exit.exit_map.clear_input(index);
            let Some(data) = exit.inputs[index as usize].take() else {
                continue;
            };
            if canonical {
                // Canonical: the input was genuinely consumed, nothing
                // to withdraw. Flag it so no standard exit resurrects it.
                book.flag_spent(data.output_id);
                debug!(index, "canonical in-flight exit, input not paid");
                return_slot_funds(&data, reward_to, funds, &mut events);
            } else {
                pay_slot(exit_id, &data, reward_to, vault, funds, book, &mut events);
            }
        }

        for index in 0..exit.outputs.len() as u16 {
            if !exit.exit_map.output(index) {
                continue;
            }
            let Some(data) = exit.outputs[index as usize].as_ref() else {
                continue;
            };
            if data.token != token {
                continue;
            }
            exit.exit_map.clear_output(index);
            let Some(data) = exit.outputs[index as usize].take() else {
                continue;
            };
            if canonical {
                pay_slot(exit_id, &data, reward_to, vault, funds, book, &mut events);
            } else {
                debug!(index, "non-canonical in-flight exit, output not paid");
                return_slot_funds(&data, reward_to, funds, &mut events);
            }
        }

        if exit.exit_map.is_empty() {
            self.exits.remove(&exit_id);
            self.finalized.insert(exit_id);
            info!("in-flight exit fully processed");
        }
        events
    }
}

/// Withdraws one slot through its vault, then returns its bond and
/// bounty. Already-finalized outputs are omitted instead.
fn pay_slot(
    exit_id: ExitId,
    data: &WithdrawData,
    reward_to: Address,
    vault: &dyn Vault,
    funds: &dyn FundsTransfer,
    book: &mut dyn SpentOutputBook,
    events: &mut Vec<ExitEvent>,
) {
    if book.is_spent(&data.output_id) {
        debug!("slot already finalized elsewhere, omitted");
        events.push(ExitEvent::ExitOmitted { exit_id });
        return_slot_funds(data, reward_to, funds, events);
        return;
    }
    book.flag_spent(data.output_id);
    match vault.withdraw(data.token, data.exit_target, data.amount) {
        Ok(()) => {
            info!(amount = %data.amount, "in-flight exit slot finalized");
            events.push(ExitEvent::ExitFinalized {
                exit_id,
                token: data.token,
                exit_target: data.exit_target,
                amount: data.amount,
            });
        }
        Err(_) => {
            warn!("vault withdrawal rejected, funds retained");
            events.push(ExitEvent::WithdrawFailed {
                exit_id,
                token: data.token,
                exit_target: data.exit_target,
                amount: data.amount,
            });
        }
    }
    return_slot_funds(data, reward_to, funds, events);
}

fn return_slot_funds(
    data: &WithdrawData,
    reward_to: Address,
    funds: &dyn FundsTransfer,
    events: &mut Vec<ExitEvent>,
) {
    if funds
        .transfer(data.exit_target, data.piggyback_bond_size)
        .is_err()
    {
        events.push(ExitEvent::BondReturnFailed {
            to: data.exit_target,
            amount: data.piggyback_bond_size,
        });
    }
    if funds.transfer(reward_to, data.bounty_size).is_err() {
        events.push(ExitEvent::BondReturnFailed {
            to: reward_to,
            amount: data.bounty_size,
        });
    }
}
