//! In-flight exit flows end to end: canonical exits paying outputs,
//! canonicity games played with real inclusion proofs, and
//! non-canonical exits refunding their inputs.

use crate::helpers::*;
use px_05_in_flight_exit::{
    ChallengeCanonicityRequest, ChallengeInputSpentRequest, InFlightExitError,
    PiggybackInputRequest, PiggybackOutputRequest, RespondCanonicityRequest,
    StartInFlightExitRequest,
};
use px_06_exit_processor::ProcessorError;
use shared_types::config::{NATIVE_VAULT_ID, TOKEN_VAULT_ID};
use shared_types::TimeSource;
use shared_types::{Address, ExitEvent, ExitId, NATIVE_TOKEN, U256};

/// Opens an in-flight exit spending `deposit_pos` (owned by Alice) into
/// the given outputs.
fn start_ife(
    h: &mut Harness,
    deposit_tx: &[u8],
    deposit_pos: shared_types::UtxoPos,
    outputs: &[(Address, u64)],
) -> (ExitId, Vec<u8>) {
    let tx = payment_tx(vec![deposit_pos], outputs);
    let (exit_id, events) = h
        .processor
        .start_in_flight_exit(StartInFlightExitRequest {
            caller: ALICE,
            in_flight_tx_bytes: tx.clone(),
            input_tx_bytes: vec![deposit_tx.to_vec()],
            input_utxo_pos: vec![deposit_pos],
            input_inclusion_proofs: vec![vec![]],
            input_witnesses: vec![ALICE.to_vec()],
            input_guard_preimages: vec![vec![]],
            bond: h.processor.in_flight_exits().bond_size(h.clock.now()),
        })
        .unwrap();
    assert!(events
        .iter()
        .any(|e| matches!(e, ExitEvent::InFlightExitStarted { initiator, .. } if *initiator == ALICE)));
    (exit_id, tx)
}

#[test]
fn canonical_exit_pays_outputs_and_returns_every_bond() {
    let mut h = Harness::new(1_000);
    let (deposit_tx, deposit_pos) = h.deposit(1, 500, ALICE, 1_000);
    let (exit_id, _tx) = start_ife(&mut h, &deposit_tx, deposit_pos, &[(BOB, 600), (ALICE, 400)]);

    let start_bond = h.processor.in_flight_exits().bond_size(1_000);
    let piggyback_bond = h.processor.in_flight_exits().piggyback_bond_size(1_000);
    let bounty = h.processor.in_flight_exits().bounty_size(1_000);

    let events = h
        .processor
        .piggyback_in_flight_output(PiggybackOutputRequest {
            caller: BOB,
            exit_id,
            output_index: 0,
            output_guard_preimage: vec![],
            bond: piggyback_bond,
            bounty,
        })
        .unwrap();
    assert!(events.iter().any(|e| matches!(e, ExitEvent::ExitQueued { .. })));
    assert_eq!(h.processor.queued_count(NATIVE_VAULT_ID, &NATIVE_TOKEN), 1);

    h.clock.set(1_000 + EXIT_PERIOD);
    let (popped, events) = h
        .processor
        .process_exits(NATIVE_VAULT_ID, NATIVE_TOKEN, 10, CAROL)
        .unwrap();
    assert_eq!(popped, 1);
    assert!(events.contains(&ExitEvent::ExitFinalized {
        exit_id,
        token: NATIVE_TOKEN,
        exit_target: BOB,
        amount: U256::from(600),
    }));
    // Start bond to the opener, piggyback bond to the output owner,
    // bounty to whoever processed.
    assert_eq!(h.funds.total_paid(ALICE), start_bond);
    assert_eq!(h.funds.total_paid(BOB), piggyback_bond);
    assert_eq!(h.funds.total_paid(CAROL), bounty);
}

#[test]
fn non_canonical_exit_refunds_piggybacked_inputs() {
    let mut h = Harness::new(1_000);
    let (deposit_tx, deposit_pos) = h.deposit(1, 500, ALICE, 1_000);
    let (exit_id, _tx) = start_ife(&mut h, &deposit_tx, deposit_pos, &[(BOB, 1_000)]);

    let start_bond = h.processor.in_flight_exits().bond_size(1_000);
    let piggyback_bond = h.processor.in_flight_exits().piggyback_bond_size(1_000);
    let bounty = h.processor.in_flight_exits().bounty_size(1_000);

    h.processor
        .piggyback_in_flight_input(PiggybackInputRequest {
            caller: ALICE,
            exit_id,
            input_index: 0,
            bond: piggyback_bond,
            bounty,
        })
        .unwrap();

    // Bob shows a competing unincluded spend of the same deposit.
    let competitor = payment_tx(vec![deposit_pos], &[(CAROL, 1_000)]);
    let events = h
        .processor
        .challenge_in_flight_exit_not_canonical(ChallengeCanonicityRequest {
            caller: BOB,
            exit_id,
            in_flight_input_index: 0,
            competing_tx_bytes: competitor,
            competing_input_index: 0,
            competing_tx_pos: None,
            inclusion_proof: vec![],
            witness: ALICE.to_vec(),
        })
        .unwrap();
    assert!(events
        .iter()
        .any(|e| matches!(e, ExitEvent::InFlightExitChallenged { challenger, .. } if *challenger == BOB)));

    h.clock.set(1_000 + EXIT_PERIOD);
    let (popped, events) = h
        .processor
        .process_exits(NATIVE_VAULT_ID, NATIVE_TOKEN, 10, CAROL)
        .unwrap();
    assert_eq!(popped, 1);
    // The input comes back to Alice; the challenger holds the start
    // bond.
    assert!(events.contains(&ExitEvent::ExitFinalized {
        exit_id,
        token: NATIVE_TOKEN,
        exit_target: ALICE,
        amount: U256::from(1_000),
    }));
    assert_eq!(h.funds.total_paid(BOB), start_bond);
    assert_eq!(h.funds.total_paid(ALICE), piggyback_bond);
    assert_eq!(h.funds.total_paid(CAROL), bounty);
}

#[test]
fn a_spent_input_is_knocked_out_before_processing() {
    let mut h = Harness::new(1_000);
    let (deposit_tx, deposit_pos) = h.deposit(1, 500, ALICE, 1_000);
    let (exit_id, _tx) = start_ife(&mut h, &deposit_tx, deposit_pos, &[(BOB, 1_000)]);

    let piggyback_bond = h.processor.in_flight_exits().piggyback_bond_size(1_000);
    let bounty = h.processor.in_flight_exits().bounty_size(1_000);
    h.processor
        .piggyback_in_flight_input(PiggybackInputRequest {
            caller: ALICE,
            exit_id,
            input_index: 0,
            bond: piggyback_bond,
            bounty,
        })
        .unwrap();

    // Carol proves the deposit was spent by a different transaction.
    let double_spend = payment_tx(vec![deposit_pos], &[(CAROL, 1_000)]);
    let events = h
        .processor
        .challenge_in_flight_input_spent(ChallengeInputSpentRequest {
            caller: CAROL,
            exit_id,
            input_index: 0,
            challenging_tx_bytes: double_spend,
            challenging_input_index: 0,
            witness: ALICE.to_vec(),
        })
        .unwrap();
    assert!(events
        .iter()
        .any(|e| matches!(e, ExitEvent::InFlightExitBlocked { challenger, .. } if *challenger == CAROL)));
    assert_eq!(h.funds.total_paid(CAROL), piggyback_bond + bounty);

    // The queue entry remains but no slot is left to pay.
    h.clock.set(1_000 + EXIT_PERIOD);
    let (popped, events) = h
        .processor
        .process_exits(NATIVE_VAULT_ID, NATIVE_TOKEN, 10, BOB)
        .unwrap();
    assert_eq!(popped, 1);
    assert!(!events
        .iter()
        .any(|e| matches!(e, ExitEvent::ExitFinalized { .. })));
    assert!(h.processor.in_flight_exits().exit(&exit_id).is_none());
}

#[test]
fn tokens_of_one_exit_process_through_their_own_vaults() {
    let mut h = Harness::new(1_000);
    let (native_tx, native_pos) = h.deposit(1, 500, ALICE, 500);
    let (token_tx, token_pos) = h.deposit_in(2, 500, ALICE, TOKEN, 500);

    // One in-flight transaction moving both assets to Bob.
    let tx = payment_tx_in(
        vec![native_pos, token_pos],
        &[(BOB, NATIVE_TOKEN, 500), (BOB, TOKEN, 500)],
    );
    let (exit_id, _) = h
        .processor
        .start_in_flight_exit(StartInFlightExitRequest {
            caller: ALICE,
            in_flight_tx_bytes: tx,
            input_tx_bytes: vec![native_tx, token_tx],
            input_utxo_pos: vec![native_pos, token_pos],
            input_inclusion_proofs: vec![vec![], vec![]],
            input_witnesses: vec![ALICE.to_vec(), ALICE.to_vec()],
            input_guard_preimages: vec![vec![], vec![]],
            bond: h.processor.in_flight_exits().bond_size(1_000),
        })
        .unwrap();

    let start_bond = h.processor.in_flight_exits().bond_size(1_000);
    let piggyback_bond = h.processor.in_flight_exits().piggyback_bond_size(1_000);
    let bounty = h.processor.in_flight_exits().bounty_size(1_000);
    for output_index in [0u16, 1] {
        h.processor
            .piggyback_in_flight_output(PiggybackOutputRequest {
                caller: BOB,
                exit_id,
                output_index,
                output_guard_preimage: vec![],
                bond: piggyback_bond,
                bounty,
            })
            .unwrap();
    }
    // Each token queues under its own vault.
    assert_eq!(h.processor.queued_count(NATIVE_VAULT_ID, &NATIVE_TOKEN), 1);
    assert_eq!(h.processor.queued_count(TOKEN_VAULT_ID, &TOKEN), 1);

    h.clock.set(1_000 + EXIT_PERIOD);
    let (popped, events) = h
        .processor
        .process_exits(NATIVE_VAULT_ID, NATIVE_TOKEN, 10, CAROL)
        .unwrap();
    assert_eq!(popped, 1);
    assert!(events.contains(&ExitEvent::ExitFinalized {
        exit_id,
        token: NATIVE_TOKEN,
        exit_target: BOB,
        amount: U256::from(500),
    }));
    // The record survives until its other token is processed; the
    // start bond comes back exactly once.
    assert!(h.processor.in_flight_exits().exit(&exit_id).is_some());
    assert_eq!(h.funds.total_paid(ALICE), start_bond);

    let (popped, events) = h
        .processor
        .process_exits(TOKEN_VAULT_ID, TOKEN, 10, CAROL)
        .unwrap();
    assert_eq!(popped, 1);
    assert!(events.contains(&ExitEvent::ExitFinalized {
        exit_id,
        token: TOKEN,
        exit_target: BOB,
        amount: U256::from(500),
    }));
    assert!(h.processor.in_flight_exits().exit(&exit_id).is_none());
    assert_eq!(h.funds.total_paid(ALICE), start_bond);
    assert_eq!(h.funds.total_paid(BOB), piggyback_bond * U256::from(2));
    assert_eq!(h.funds.total_paid(CAROL), bounty * U256::from(2));
}

#[test]
fn canonicity_game_is_decided_by_real_inclusion_proofs() {
    let mut h = Harness::new(1_000);
    let (deposit_tx, deposit_pos) = h.deposit(1, 500, ALICE, 1_000);
    let (exit_id, ife_tx) = start_ife(&mut h, &deposit_tx, deposit_pos, &[(BOB, 1_000)]);

    // The in-flight transaction was in fact included at block 1000;
    // a competitor spending the same deposit landed later, in block
    // 2000 at index 1.
    let ife_tree = h.seal_block(1_000, 900, std::slice::from_ref(&ife_tx));
    let filler = payment_tx(vec![pos(3, 0, 0)], &[(CAROL, 5)]);
    let competitor = payment_tx(vec![deposit_pos], &[(CAROL, 1_000)]);
    let competitor_tree = h.seal_block(2_000, 950, &[filler, competitor.clone()]);

    let challenge = ChallengeCanonicityRequest {
        caller: BOB,
        exit_id,
        in_flight_input_index: 0,
        competing_tx_bytes: competitor,
        competing_input_index: 0,
        competing_tx_pos: Some(pos(2_000, 1, 0)),
        inclusion_proof: competitor_tree.proof(1),
        witness: ALICE.to_vec(),
    };
    h.processor
        .challenge_in_flight_exit_not_canonical(challenge.clone())
        .unwrap();
    let recorded = h.processor.in_flight_exits().exit(&exit_id).unwrap();
    assert!(!recorded.is_canonical);

    // Inclusion at an older position restores canonicity.
    let events = h
        .processor
        .respond_to_non_canonical_challenge(RespondCanonicityRequest {
            caller: ALICE,
            in_flight_tx_bytes: ife_tx,
            in_flight_tx_pos: pos(1_000, 0, 0),
            inclusion_proof: ife_tree.proof(0),
        })
        .unwrap();
    assert!(events
        .iter()
        .any(|e| matches!(e, ExitEvent::InFlightExitChallengeResponded { responder, .. } if *responder == ALICE)));
    let recorded = h.processor.in_flight_exits().exit(&exit_id).unwrap();
    assert!(recorded.is_canonical);

    // The same competitor is no longer older than the recorded
    // position.
    let err = h
        .processor
        .challenge_in_flight_exit_not_canonical(challenge)
        .unwrap_err();
    assert!(matches!(
        err,
        ProcessorError::InFlightExit(InFlightExitError::CompetitorNotOlder { .. })
    ));
}
