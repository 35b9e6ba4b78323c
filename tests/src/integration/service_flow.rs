//! The async facade over the same stack: calls through
//! `PlasmaFrameworkApi`, events observed on the broadcast channel.

use crate::helpers::*;
use px_04_standard_exit::StartStandardExitRequest;
use px_06_exit_processor::{PlasmaFramework, PlasmaFrameworkApi};
use shared_types::config::NATIVE_VAULT_ID;
use shared_types::{ExitEvent, NATIVE_TOKEN};

#[tokio::test]
async fn a_full_exit_round_trip_through_the_api() {
    let h = Harness::new(1_000);
    let (tx, utxo_pos) = h.deposit(1, 500, ALICE, 1_000);
    let clock = h.clock.clone();
    let funds = h.funds.clone();
    let framework = PlasmaFramework::new(h.processor);
    let mut rx = framework.subscribe();

    let (bond, bounty) = framework.with_processor(|p| {
        (
            p.standard_exits().bond_size(1_000),
            p.standard_exits().bounty_size(1_000),
        )
    });
    let started = framework
        .start_standard_exit(StartStandardExitRequest {
            caller: ALICE,
            utxo_pos,
            tx_bytes: tx,
            output_guard_preimage: vec![],
            inclusion_proof: vec![],
            bond,
            bounty,
        })
        .await
        .unwrap();

    // Both events of the start arrive under the call's correlation id.
    let first = rx.recv().await.unwrap();
    assert_eq!(first.correlation_id, started.correlation_id);
    assert!(matches!(first.event, ExitEvent::StandardExitStarted { .. }));
    let second = rx.recv().await.unwrap();
    assert_eq!(second.correlation_id, started.correlation_id);
    assert!(matches!(second.event, ExitEvent::ExitQueued { .. }));

    clock.set(1_000 + EXIT_PERIOD);
    let processed = framework
        .process_exits(NATIVE_VAULT_ID, NATIVE_TOKEN, 10, BOB)
        .await
        .unwrap();
    assert_eq!(processed.value, 1);
    assert_ne!(processed.correlation_id, started.correlation_id);

    let finalized = rx.recv().await.unwrap();
    assert_eq!(finalized.correlation_id, processed.correlation_id);
    assert!(matches!(
        finalized.event,
        ExitEvent::ExitFinalized { exit_target, .. } if exit_target == ALICE
    ));
    assert_eq!(funds.total_paid(BOB), bounty);
}
