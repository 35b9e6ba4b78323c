//! Batch processing behavior: priority order across exits, payout
//! failures staying contained to one exit, and bond governance through
//! the processor.

use crate::helpers::*;
use px_03_bonds::bond::UPDATE_WAITING_PERIOD;
use px_04_standard_exit::{StandardExitError, StartStandardExitRequest};
use px_06_exit_processor::ProcessorError;
use shared_types::TimeSource;
use shared_types::config::NATIVE_VAULT_ID;
use shared_types::{Address, ExitEvent, ExitId, NATIVE_TOKEN, U256};

fn exit_deposit(h: &mut Harness, block_num: u64, owner: Address, amount: u64) -> ExitId {
    let (tx, utxo_pos) = h.deposit(block_num, 500, owner, amount);
    let now = h.clock.now();
    let (exit_id, _) = h
        .processor
        .start_standard_exit(StartStandardExitRequest {
            caller: owner,
            utxo_pos,
            tx_bytes: tx,
            output_guard_preimage: vec![],
            inclusion_proof: vec![],
            bond: h.processor.standard_exits().bond_size(now),
            bounty: h.processor.standard_exits().bounty_size(now),
        })
        .unwrap();
    exit_id
}

fn finalized_ids(events: &[ExitEvent]) -> Vec<ExitId> {
    events
        .iter()
        .filter_map(|e| match e {
            ExitEvent::ExitFinalized { exit_id, .. } => Some(*exit_id),
            _ => None,
        })
        .collect()
}

#[test]
fn exits_finalize_in_position_order_within_a_maturity_class() {
    let mut h = Harness::new(1_000);
    // Started in reverse position order at the same instant; the queue
    // must pop the oldest position first.
    let late = exit_deposit(&mut h, 3, CAROL, 300);
    let early = exit_deposit(&mut h, 1, ALICE, 100);
    let middle = exit_deposit(&mut h, 2, BOB, 200);
    assert_eq!(h.processor.queued_count(NATIVE_VAULT_ID, &NATIVE_TOKEN), 3);

    h.clock.set(1_000 + EXIT_PERIOD);
    let (popped, events) = h
        .processor
        .process_exits(NATIVE_VAULT_ID, NATIVE_TOKEN, 10, CAROL)
        .unwrap();
    assert_eq!(popped, 3);
    assert_eq!(finalized_ids(&events), vec![early, middle, late]);
}

#[test]
fn max_count_leaves_the_tail_queued() {
    let mut h = Harness::new(1_000);
    let first = exit_deposit(&mut h, 1, ALICE, 100);
    let second = exit_deposit(&mut h, 2, BOB, 200);

    h.clock.set(1_000 + EXIT_PERIOD);
    let (popped, events) = h
        .processor
        .process_exits(NATIVE_VAULT_ID, NATIVE_TOKEN, 1, CAROL)
        .unwrap();
    assert_eq!(popped, 1);
    assert_eq!(finalized_ids(&events), vec![first]);
    assert_eq!(h.processor.queued_count(NATIVE_VAULT_ID, &NATIVE_TOKEN), 1);

    let (popped, events) = h
        .processor
        .process_exits(NATIVE_VAULT_ID, NATIVE_TOKEN, 1, CAROL)
        .unwrap();
    assert_eq!(popped, 1);
    assert_eq!(finalized_ids(&events), vec![second]);
}

#[test]
fn a_refused_payout_does_not_poison_the_batch() {
    let mut h = Harness::new(1_000);
    let bond = h.processor.standard_exits().bond_size(1_000);
    let alice_exit = exit_deposit(&mut h, 1, ALICE, 100);
    let bob_exit = exit_deposit(&mut h, 2, BOB, 200);

    // Alice's bond refund bounces; her withdrawal and Bob's whole exit
    // still go through.
    h.funds.reject_payments_to(ALICE);
    h.clock.set(1_000 + EXIT_PERIOD);
    let (popped, events) = h
        .processor
        .process_exits(NATIVE_VAULT_ID, NATIVE_TOKEN, 10, CAROL)
        .unwrap();
    assert_eq!(popped, 2);
    assert_eq!(finalized_ids(&events), vec![alice_exit, bob_exit]);
    assert!(events.contains(&ExitEvent::BondReturnFailed {
        to: ALICE,
        amount: bond,
    }));
    assert_eq!(h.funds.total_paid(ALICE), U256::zero());
    assert_eq!(h.funds.total_paid(BOB), bond);
}

#[test]
fn proposed_bond_applies_only_after_the_waiting_period() {
    let mut h = Harness::new(1_000);
    let old_bond = h.processor.standard_exits().bond_size(1_000);
    let new_bond = old_bond * U256::from(2);
    h.processor.propose_standard_exit_bond(new_bond).unwrap();
    assert_eq!(h.processor.standard_exits().bond_size(1_000), old_bond);

    h.clock.set(1_000 + UPDATE_WAITING_PERIOD);
    let now = h.clock.now();
    assert_eq!(h.processor.standard_exits().bond_size(now), new_bond);

    // A start posted at the stale bond is turned away.
    let (tx, utxo_pos) = h.deposit(1, 500, ALICE, 100);
    let err = h
        .processor
        .start_standard_exit(StartStandardExitRequest {
            caller: ALICE,
            utxo_pos,
            tx_bytes: tx,
            output_guard_preimage: vec![],
            inclusion_proof: vec![],
            bond: old_bond,
            bounty: h.processor.standard_exits().bounty_size(now),
        })
        .unwrap_err();
    assert_eq!(
        err,
        ProcessorError::StandardExit(StandardExitError::InvalidBond {
            expected: new_bond,
            got: old_bond,
        })
    );
}
