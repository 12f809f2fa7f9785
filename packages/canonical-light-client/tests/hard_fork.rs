//! Rollback and re-anchoring of canonical clients across rollapp hard forks

mod helpers;

use canonical_light_client::{
    msgs::{ClientMessage, UpdateClientMsg},
    CanonicalClientError, LightClientStore, UpdateOutcome,
};
use cosmwasm_std::Order;
use helpers::*;
use rollapp_light_client::{sequencer::validator_set_hash, AnyClientState, ClientState, Height};
use rollapp_light_client::{test_utils::block_descriptor, StateStatus};

fn client_state(keeper: &TestKeeper, client_id: &str) -> ClientState {
    match keeper.clients().client_state(client_id).unwrap() {
        Some(AnyClientState::Tendermint(client_state)) => client_state,
        other => panic!("unexpected client state: {other:?}"),
    }
}

fn stored_heights(keeper: &TestKeeper, client_id: &str) -> Vec<u64> {
    keeper
        .clients()
        .consensus_state_heights(client_id, Order::Ascending)
        .unwrap()
        .into_iter()
        .map(|height| height.revision_height)
        .collect()
}

/// A canonical client with consensus states at 5, 8, 12 and 15
fn fork_setup() -> (TestKeeper, String) {
    let mut keeper = keeper();
    with_history(&mut keeper);
    let client_id = with_canonical_client(&mut keeper);
    for at in [8, 12, 15] {
        let consensus_state = consensus_state_at(at, SEQUENCER_A, SEQUENCER_A);
        store_consensus_state(&mut keeper, &client_id, &consensus_state, at);
    }
    (keeper, client_id)
}

#[test]
fn trigger_purges_heights_from_the_rollback_height() {
    init_tracing();
    let (mut keeper, client_id) = fork_setup();
    keeper.save_signer(&client_id, 10, b"signer-at-rollback");
    keeper.save_signer(&client_id, 12, b"signer-above");
    keeper.save_signer(&client_id, 8, b"signer-below");

    keeper.on_hard_fork(ROLLAPP_ID, 10).unwrap();

    assert!(keeper.is_hard_forking(ROLLAPP_ID));
    assert_eq!(stored_heights(&keeper, &client_id), vec![5, 8]);
    assert_eq!(
        keeper.clients().consensus_metadata(&client_id, height(12)).unwrap(),
        None
    );
    assert_eq!(keeper.get_signer(&client_id, 10), None);
    assert_eq!(keeper.get_signer(&client_id, 12), None);
    assert!(keeper.get_signer(&client_id, 8).is_some());

    let client_state = client_state(&keeper, &client_id);
    assert_eq!(client_state.frozen_height, height(10));
    assert_eq!(client_state.latest_height, height(8));
}

#[test]
fn trigger_without_canonical_client_does_nothing() {
    let mut keeper = keeper();
    with_history(&mut keeper);

    keeper.on_hard_fork(ROLLAPP_ID, 10).unwrap();

    assert!(!keeper.is_hard_forking(ROLLAPP_ID));
}

#[test]
fn finalization_reaching_the_rollback_height_resolves_the_fork() {
    let (mut keeper, client_id) = fork_setup();
    keeper.on_hard_fork(ROLLAPP_ID, 15).unwrap();

    let finalized = finalize(&mut keeper, 11);
    keeper.on_state_finalized(&finalized, &ENV).unwrap();

    assert!(!keeper.is_hard_forking(ROLLAPP_ID));
    let client_state = client_state(&keeper, &client_id);
    assert!(client_state.frozen_height.is_zero());
    assert_eq!(client_state.latest_height, height(20));

    let consensus_state = keeper
        .clients()
        .consensus_state(&client_id, height(20))
        .unwrap()
        .unwrap();
    let descriptor = block_descriptor(20);
    assert_eq!(consensus_state.root, descriptor.state_root);
    assert_eq!(Some(consensus_state.timestamp), descriptor.timestamp);
    assert_eq!(
        consensus_state.validators_hash,
        validator_set_hash(&key_of(SEQUENCER_A))
    );
    assert_eq!(
        consensus_state.next_validators_hash,
        validator_set_hash(&key_of(SEQUENCER_A))
    );

    let metadata = keeper
        .clients()
        .consensus_metadata(&client_id, height(20))
        .unwrap()
        .unwrap();
    assert_eq!(metadata.processed_time, ENV.time);
    assert_eq!(metadata.processed_height, Height::new(0, ENV.height));
}

#[test]
fn records_below_the_rollback_height_are_reconciled_when_the_fork_resolves() {
    let (mut keeper, client_id) = fork_setup();
    let mut forged = consensus_state_at(12, SEQUENCER_A, SEQUENCER_A);
    forged.root = b"forged".to_vec();
    store_consensus_state(&mut keeper, &client_id, &forged, 12);
    keeper.save_signer(&client_id, 12, &validator_set_hash(&key_of(SEQUENCER_A)));
    keeper.on_hard_fork(ROLLAPP_ID, 15).unwrap();
    assert!(keeper.get_signer(&client_id, 12).is_some());

    let finalized = finalize(&mut keeper, 11);
    keeper.on_state_finalized(&finalized, &ENV).unwrap();

    assert!(!keeper.is_hard_forking(ROLLAPP_ID));
    assert_eq!(keeper.get_signer(&client_id, 12), None);
    assert_eq!(
        keeper.rollapps().frauds,
        vec![FraudReport {
            rollapp_id: ROLLAPP_ID.to_string(),
            client_id,
            height: 12,
            signer: SEQUENCER_A.to_string(),
        }]
    );
}

#[test]
fn rollback_below_every_consensus_state_keeps_the_revision() {
    let (mut keeper, client_id) = fork_setup();

    keeper.on_hard_fork(ROLLAPP_ID, 3).unwrap();

    assert!(stored_heights(&keeper, &client_id).is_empty());
    assert_eq!(client_state(&keeper, &client_id).latest_height, height(0));
}

#[test]
fn next_validators_follow_the_current_proposer() {
    let (mut keeper, client_id) = fork_setup();
    keeper
        .sequencers_mut()
        .proposers
        .insert(ROLLAPP_ID.to_string(), SEQUENCER_B.to_string());
    keeper.on_hard_fork(ROLLAPP_ID, 15).unwrap();

    let finalized = finalize(&mut keeper, 11);
    keeper.on_state_finalized(&finalized, &ENV).unwrap();

    let consensus_state = keeper
        .clients()
        .consensus_state(&client_id, height(20))
        .unwrap()
        .unwrap();
    assert_eq!(
        consensus_state.next_validators_hash,
        validator_set_hash(&key_of(SEQUENCER_B))
    );
}

#[test]
fn finalization_below_the_rollback_height_keeps_the_fork() {
    let (mut keeper, client_id) = fork_setup();
    keeper.on_hard_fork(ROLLAPP_ID, 25).unwrap();

    let finalized = finalize(&mut keeper, 11);
    keeper.on_state_finalized(&finalized, &ENV).unwrap();

    assert!(keeper.is_hard_forking(ROLLAPP_ID));
    assert_eq!(client_state(&keeper, &client_id).frozen_height, height(25));
}

#[test]
fn missing_proposer_postpones_resolution() {
    let (mut keeper, _) = fork_setup();
    keeper.sequencers_mut().proposers.clear();
    keeper.on_hard_fork(ROLLAPP_ID, 15).unwrap();

    let finalized = finalize(&mut keeper, 11);
    keeper.on_state_finalized(&finalized, &ENV).unwrap();
    assert!(keeper.is_hard_forking(ROLLAPP_ID));

    assert!(matches!(
        keeper.resolve_hard_fork(ROLLAPP_ID, &ENV),
        Err(CanonicalClientError::NoActiveProposer(_))
    ));
}

#[test]
fn explicit_resolution_needs_a_finalized_state_info() {
    let (mut keeper, _) = fork_setup();
    keeper.on_hard_fork(ROLLAPP_ID, 15).unwrap();

    assert!(matches!(
        keeper.resolve_hard_fork(ROLLAPP_ID, &ENV),
        Err(CanonicalClientError::NoFinalizedStateInfo(_))
    ));

    finalize(&mut keeper, 11);
    keeper.resolve_hard_fork(ROLLAPP_ID, &ENV).unwrap();
    assert!(!keeper.is_hard_forking(ROLLAPP_ID));
}

#[test]
fn updates_resume_after_resolution() {
    let (mut keeper, client_id) = fork_setup();
    keeper.on_hard_fork(ROLLAPP_ID, 15).unwrap();
    let finalized = finalize(&mut keeper, 11);
    keeper.on_state_finalized(&finalized, &ENV).unwrap();

    add_state_info(&mut keeper, 21, 10, SEQUENCER_A, StateStatus::Pending);
    let outcome = keeper
        .handle_update_client(&UpdateClientMsg {
            client_id,
            client_message: ClientMessage::Header(header_at(22, SEQUENCER_A, SEQUENCER_A)),
        })
        .unwrap();
    assert_eq!(outcome, UpdateOutcome::Accepted);
}
