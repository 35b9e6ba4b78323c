//! Standard exit lifecycle against real block roots: start with a
//! Merkle proof the production verifier accepts, mature, process,
//! and the challenge path that voids all of it.

use crate::helpers::*;
use px_04_standard_exit::{
    ChallengeStandardExitRequest, StandardExitError, StartStandardExitRequest,
};
use shared_types::TimeSource;
use px_06_exit_processor::ProcessorError;
use shared_types::config::NATIVE_VAULT_ID;
use shared_types::{ExitEvent, NATIVE_TOKEN, U256};

fn start_request(h: &Harness, caller: shared_types::Address) -> StartStandardExitRequest {
    let now = h.clock.now();
    StartStandardExitRequest {
        caller,
        utxo_pos: pos(0, 0, 0),
        tx_bytes: vec![],
        output_guard_preimage: vec![],
        inclusion_proof: vec![],
        bond: h.processor.standard_exits().bond_size(now),
        bounty: h.processor.standard_exits().bounty_size(now),
    }
}

#[test]
fn included_output_exits_with_a_real_inclusion_proof() {
    let mut h = Harness::new(1_000);
    let (_deposit_tx, deposit_pos) = h.deposit(1, 500, ALICE, 1_000);

    // Alice spends her deposit; the spend lands at index 1 of block
    // 1000 so the proof has a genuine sibling.
    let filler = payment_tx(vec![pos(2, 0, 0)], &[(CAROL, 5)]);
    let spend = payment_tx(vec![deposit_pos], &[(BOB, 700), (ALICE, 300)]);
    let tree = h.seal_block(1_000, 900, &[filler, spend.clone()]);

    let req = StartStandardExitRequest {
        utxo_pos: pos(1_000, 1, 0),
        tx_bytes: spend,
        inclusion_proof: tree.proof(1),
        ..start_request(&h, BOB)
    };
    let (exit_id, events) = h.processor.start_standard_exit(req).unwrap();
    assert!(events
        .iter()
        .any(|e| matches!(e, ExitEvent::StandardExitStarted { exit_target, .. } if *exit_target == BOB)));
    assert!(events.iter().any(|e| matches!(e, ExitEvent::ExitQueued { .. })));
    assert_eq!(h.processor.queued_count(NATIVE_VAULT_ID, &NATIVE_TOKEN), 1);

    // Included at block timestamp 900, so maturity is 900 + two exit
    // periods.
    let bond = h.processor.standard_exits().bond_size(h.clock.now());
    let bounty = h.processor.standard_exits().bounty_size(h.clock.now());
    h.clock.set(900 + 2 * EXIT_PERIOD);
    let (popped, events) = h
        .processor
        .process_exits(NATIVE_VAULT_ID, NATIVE_TOKEN, 10, CAROL)
        .unwrap();
    assert_eq!(popped, 1);
    assert!(events.contains(&ExitEvent::ExitFinalized {
        exit_id,
        token: NATIVE_TOKEN,
        exit_target: BOB,
        amount: U256::from(700),
    }));
    assert_eq!(h.funds.total_paid(BOB), bond);
    assert_eq!(h.funds.total_paid(CAROL), bounty);
    assert_eq!(h.processor.queued_count(NATIVE_VAULT_ID, &NATIVE_TOKEN), 0);
}

#[test]
fn proof_for_the_wrong_leaf_is_rejected() {
    let mut h = Harness::new(1_000);
    let (_deposit_tx, deposit_pos) = h.deposit(1, 500, ALICE, 1_000);

    let filler = payment_tx(vec![pos(2, 0, 0)], &[(CAROL, 5)]);
    let spend = payment_tx(vec![deposit_pos], &[(BOB, 700)]);
    let tree = h.seal_block(1_000, 900, &[filler, spend.clone()]);

    let req = StartStandardExitRequest {
        utxo_pos: pos(1_000, 1, 0),
        tx_bytes: spend,
        // Sibling path of leaf 0, claimed for leaf 1.
        inclusion_proof: tree.proof(0),
        ..start_request(&h, BOB)
    };
    let err = h.processor.start_standard_exit(req).unwrap_err();
    assert_eq!(
        err,
        ProcessorError::StandardExit(StandardExitError::InvalidInclusionProof)
    );
    assert_eq!(h.processor.queued_count(NATIVE_VAULT_ID, &NATIVE_TOKEN), 0);
}

#[test]
fn challenged_exit_pays_the_challenger_and_processes_to_nothing() {
    let mut h = Harness::new(1_000);
    let (deposit_tx, deposit_pos) = h.deposit(1, 500, ALICE, 1_000);

    let bond = h.processor.standard_exits().bond_size(1_000);
    let req = StartStandardExitRequest {
        utxo_pos: deposit_pos,
        tx_bytes: deposit_tx,
        ..start_request(&h, ALICE)
    };
    let (exit_id, _) = h.processor.start_standard_exit(req).unwrap();

    // Alice had already spent the deposit; Bob proves it.
    let spend = payment_tx(vec![deposit_pos], &[(CAROL, 1_000)]);
    let events = h
        .processor
        .challenge_standard_exit(ChallengeStandardExitRequest {
            caller: BOB,
            exit_id,
            spending_tx_bytes: spend,
            input_index: 0,
            witness: ALICE.to_vec(),
        })
        .unwrap();
    assert!(events.contains(&ExitEvent::StandardExitChallenged {
        exit_id,
        challenger: BOB,
    }));
    assert_eq!(h.funds.total_paid(BOB), bond);

    // The queue entry survives the challenge but pays nothing.
    h.clock.set(1_000 + EXIT_PERIOD);
    let (popped, events) = h
        .processor
        .process_exits(NATIVE_VAULT_ID, NATIVE_TOKEN, 10, CAROL)
        .unwrap();
    assert_eq!(popped, 1);
    assert_eq!(events, vec![ExitEvent::ExitOmitted { exit_id }]);
    assert_eq!(h.funds.total_paid(CAROL), U256::zero());
}

#[test]
fn an_output_finalizes_at_most_once_across_restarts() {
    let mut h = Harness::new(1_000);
    let (deposit_tx, deposit_pos) = h.deposit(1, 500, ALICE, 1_000);

    let req = StartStandardExitRequest {
        utxo_pos: deposit_pos,
        tx_bytes: deposit_tx.clone(),
        ..start_request(&h, ALICE)
    };
    let (exit_id, _) = h.processor.start_standard_exit(req.clone()).unwrap();

    h.clock.set(1_000 + EXIT_PERIOD);
    let (_, events) = h
        .processor
        .process_exits(NATIVE_VAULT_ID, NATIVE_TOKEN, 10, CAROL)
        .unwrap();
    assert!(events
        .iter()
        .any(|e| matches!(e, ExitEvent::ExitFinalized { .. })));

    // The same output exits again; the spent-output ledger omits it at
    // processing time.
    let now = h.clock.now();
    let retry = StartStandardExitRequest {
        bond: h.processor.standard_exits().bond_size(now),
        bounty: h.processor.standard_exits().bounty_size(now),
        ..req
    };
    let (retry_id, _) = h.processor.start_standard_exit(retry).unwrap();
    assert_eq!(retry_id, exit_id);

    h.clock.advance(EXIT_PERIOD);
    let (popped, events) = h
        .processor
        .process_exits(NATIVE_VAULT_ID, NATIVE_TOKEN, 10, CAROL)
        .unwrap();
    assert_eq!(popped, 1);
    assert_eq!(events, vec![ExitEvent::ExitOmitted { exit_id }]);
}
