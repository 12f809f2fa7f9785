//! Common test utilities and in-memory collaborators for keeper scenario tests
#![allow(dead_code)]

use std::collections::BTreeMap;

use canonical_light_client::{
    msgs::{CreateClientMsg, Header},
    BlockEnv, CanonicalClientConfig, ChannelDirectory, ConnectionEnd, ConsensusMetadata, Host,
    HostClientStore, Keeper, LightClientStore, RollappDirectory, Sequencer, SequencerDirectory,
};
use cosmwasm_std::MemoryStorage;
use rollapp_light_client::{
    params::ExpectedClientParams,
    test_utils::{block_descriptor, compatible_consensus_state, sequencer_pub_key, state_info},
    AnyClientState, ConsensusState, Height, Rollapp, StateInfo, StateStatus, TrustThreshold,
};
use tendermint::PublicKey;

pub const ROLLAPP_ID: &str = "rollapp_1-1";
pub const AUTHORITY: &str = "gov";
pub const SEQUENCER_A: &str = "seq-a";
pub const SEQUENCER_B: &str = "seq-b";
/// Never registered for any rollapp
pub const STRANGER: &str = "stranger";
/// Revision of the chain id `rollapp_1-1`
pub const CLIENT_REVISION: u64 = 1;

pub const ENV: BlockEnv = BlockEnv {
    height: 1_000,
    time: 1_724_400_000_000_000_000,
};

/// The consensus key behind a sequencer address
pub fn key_of(address: &str) -> PublicKey {
    match address {
        SEQUENCER_A => sequencer_pub_key(1),
        SEQUENCER_B => sequencer_pub_key(2),
        _ => sequencer_pub_key(9),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FraudReport {
    pub rollapp_id: String,
    pub client_id: String,
    pub height: u64,
    pub signer: String,
}

#[derive(Default)]
pub struct MockRollapps {
    pub rollapps: BTreeMap<String, Rollapp>,
    pub state_infos: Vec<StateInfo>,
    pub frauds: Vec<FraudReport>,
    pub fail_fraud: bool,
}

impl RollappDirectory for MockRollapps {
    fn get_rollapp(&self, rollapp_id: &str) -> Option<Rollapp> {
        self.rollapps.get(rollapp_id).cloned()
    }

    fn find_state_info_by_height(&self, rollapp_id: &str, height: u64) -> Option<StateInfo> {
        self.state_infos
            .iter()
            .rev()
            .find(|si| si.rollapp_id == rollapp_id && si.contains_height(height))
            .cloned()
    }

    fn get_latest_state_info(&self, rollapp_id: &str) -> Option<StateInfo> {
        self.state_infos
            .iter()
            .rev()
            .find(|si| si.rollapp_id == rollapp_id)
            .cloned()
    }

    fn handle_fraud(
        &mut self,
        rollapp_id: &str,
        client_id: &str,
        height: u64,
        signer: &str,
    ) -> anyhow::Result<()> {
        if self.fail_fraud {
            anyhow::bail!("slashing failed");
        }
        self.frauds.push(FraudReport {
            rollapp_id: rollapp_id.to_string(),
            client_id: client_id.to_string(),
            height,
            signer: signer.to_string(),
        });
        Ok(())
    }
}

#[derive(Default)]
pub struct MockSequencers {
    pub sequencers: Vec<Sequencer>,
    pub proposers: BTreeMap<String, String>,
}

impl MockSequencers {
    pub fn register(&mut self, address: &str, rollapp_id: &str) {
        self.sequencers.push(Sequencer {
            address: address.to_string(),
            rollapp_id: rollapp_id.to_string(),
            pub_key: key_of(address),
            bonded: true,
        });
    }
}

impl SequencerDirectory for MockSequencers {
    fn sequencer_pub_key(&self, address: &str) -> Option<PublicKey> {
        self.sequencers
            .iter()
            .find(|sequencer| sequencer.address == address)
            .map(|sequencer| sequencer.pub_key)
    }

    fn proposer(&self, rollapp_id: &str) -> Option<Sequencer> {
        let address = self.proposers.get(rollapp_id)?;
        self.sequencers
            .iter()
            .find(|sequencer| &sequencer.address == address)
            .cloned()
    }

    fn sequencers_by_rollapp(&self, rollapp_id: &str) -> Vec<Sequencer> {
        self.sequencers
            .iter()
            .filter(|sequencer| sequencer.rollapp_id == rollapp_id)
            .cloned()
            .collect()
    }
}

#[derive(Default)]
pub struct MockChannels {
    pub connections: BTreeMap<(String, String), ConnectionEnd>,
}

impl MockChannels {
    pub fn open(&mut self, channel_id: &str, connection_id: &str, client_id: &str) {
        self.connections.insert(
            ("transfer".to_string(), channel_id.to_string()),
            ConnectionEnd {
                connection_id: connection_id.to_string(),
                client_id: client_id.to_string(),
            },
        );
    }
}

impl ChannelDirectory for MockChannels {
    fn channel_connection(&self, port_id: &str, channel_id: &str) -> Option<ConnectionEnd> {
        self.connections
            .get(&(port_id.to_string(), channel_id.to_string()))
            .cloned()
    }
}

pub struct TestHost;

impl Host for TestHost {
    type Storage = MemoryStorage;
    type Clients = HostClientStore;
    type Rollapps = MockRollapps;
    type Sequencers = MockSequencers;
    type Channels = MockChannels;
}

pub type TestKeeper = Keeper<TestHost>;

/// A keeper over `storage` for rollapp `rollapp_1-1` sequenced by `seq-a` and `seq-b`, `seq-a` proposing
pub fn keeper_with(storage: MemoryStorage, config: CanonicalClientConfig) -> TestKeeper {
    let mut rollapps = MockRollapps::default();
    rollapps
        .rollapps
        .insert(ROLLAPP_ID.to_string(), Rollapp::new(ROLLAPP_ID));

    let mut sequencers = MockSequencers::default();
    sequencers.register(SEQUENCER_A, ROLLAPP_ID);
    sequencers.register(SEQUENCER_B, ROLLAPP_ID);
    sequencers
        .proposers
        .insert(ROLLAPP_ID.to_string(), SEQUENCER_A.to_string());

    Keeper::new(
        storage,
        HostClientStore::default(),
        rollapps,
        sequencers,
        MockChannels::default(),
        config,
    )
}

pub fn keeper() -> TestKeeper {
    keeper_with(MemoryStorage::new(), CanonicalClientConfig::new(AUTHORITY))
}

/// Appends a state info covering `[start_height, start_height + num_blocks)`
pub fn add_state_info(
    keeper: &mut TestKeeper,
    start_height: u64,
    num_blocks: u64,
    sequencer: &str,
    status: StateStatus,
) -> StateInfo {
    let index = keeper.rollapps().state_infos.len() as u64 + 1;
    let si = state_info(ROLLAPP_ID, index, start_height, num_blocks, sequencer, status);
    keeper.rollapps_mut().state_infos.push(si.clone());
    si
}

/// Marks the state info starting at `start_height` finalized and returns it
pub fn finalize(keeper: &mut TestKeeper, start_height: u64) -> StateInfo {
    let si = keeper
        .rollapps_mut()
        .state_infos
        .iter_mut()
        .find(|si| si.start_height == start_height)
        .expect("state info exists");
    si.status = StateStatus::Finalized;
    si.clone()
}

/// `[1, 10]` finalized and `[11, 20]` pending, both by `seq-a`
pub fn with_history(keeper: &mut TestKeeper) {
    add_state_info(keeper, 1, 10, SEQUENCER_A, StateStatus::Finalized);
    add_state_info(keeper, 11, 10, SEQUENCER_A, StateStatus::Pending);
}

pub fn height(revision_height: u64) -> Height {
    Height::new(CLIENT_REVISION, revision_height)
}

/// A client state carrying the canonical parameters
pub fn canonical_client_state(latest_height: u64) -> AnyClientState {
    ExpectedClientParams::default()
        .expected_client_state(ROLLAPP_ID, height(latest_height))
        .into()
}

/// A client state for the rollapp with a trust level below 1/1
pub fn low_trust_client_state(latest_height: u64) -> AnyClientState {
    let mut client_state =
        ExpectedClientParams::default().expected_client_state(ROLLAPP_ID, height(latest_height));
    client_state.trust_level = TrustThreshold {
        numerator: 1,
        denominator: 3,
    };
    client_state.into()
}

/// The consensus state honest sequencers produce at `height`
pub fn consensus_state_at(height: u64, signer: &str, next_signer: &str) -> ConsensusState {
    compatible_consensus_state(
        &block_descriptor(height),
        &key_of(signer),
        &key_of(next_signer),
    )
}

/// A header matching [`consensus_state_at`]
pub fn header_at(revision_height: u64, signer: &str, next_signer: &str) -> Header {
    let cs = consensus_state_at(revision_height, signer, next_signer);
    Header {
        height: height(revision_height),
        app_revision: 0,
        root: cs.root,
        timestamp: cs.timestamp,
        validators_hash: cs.validators_hash,
        next_validators_hash: cs.next_validators_hash,
    }
}

pub fn create_client_msg(client_state: AnyClientState, consensus_state: ConsensusState) -> CreateClientMsg {
    CreateClientMsg {
        client_state,
        consensus_state,
    }
}

/// Creates a client the way the IBC client pipeline does, without the keeper's hooks
pub fn create_client(keeper: &mut TestKeeper, msg: &CreateClientMsg) -> String {
    keeper
        .clients_mut()
        .create_client(
            &msg.client_state,
            &msg.consensus_state,
            ConsensusMetadata {
                processed_time: ENV.time,
                processed_height: Height::new(0, ENV.height),
            },
        )
        .unwrap()
}

/// Stores a consensus state the way a successful client update does
pub fn store_consensus_state(keeper: &mut TestKeeper, client_id: &str, consensus_state: &ConsensusState, at: u64) {
    keeper
        .clients_mut()
        .set_consensus_state(client_id, height(at), consensus_state)
        .unwrap();
}

/// A canonical client with an honest consensus state at height 5
pub fn with_canonical_client(keeper: &mut TestKeeper) -> String {
    let msg = create_client_msg(
        canonical_client_state(5),
        consensus_state_at(5, SEQUENCER_A, SEQUENCER_A),
    );
    let client_id = create_client(keeper, &msg);
    keeper.set_canonical_client(ROLLAPP_ID, &client_id);
    client_id
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
