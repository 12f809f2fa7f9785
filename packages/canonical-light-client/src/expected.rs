//! Interfaces of the hub modules the keeper depends on.
//!
//! The keeper never reaches into another module's state directly, every
//! read and write goes through one of these traits.

use cosmwasm_std::{Order, Storage};
use rollapp_light_client::{AnyClientState, ConsensusState, Height, Rollapp, StateInfo};
use serde::{Deserialize, Serialize};
use tendermint::PublicKey;

use crate::error::ClientStoreError;

/// Binds together the concrete collaborators of a [`crate::keeper::Keeper`]
pub trait Host {
    /// The keeper's own key-value store
    type Storage: Storage;
    /// The IBC light client store
    type Clients: LightClientStore;
    /// The rollapp module
    type Rollapps: RollappDirectory;
    /// The sequencer module
    type Sequencers: SequencerDirectory;
    /// The IBC channel module
    type Channels: ChannelDirectory;
}

/// The current block of the hub, injected so that results never depend on a local clock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockEnv {
    /// Hub block height
    pub height: u64,
    /// Hub block time in unix nanoseconds
    pub time: u64,
}

/// Bookkeeping the IBC client store keeps next to every consensus state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusMetadata {
    /// Hub block time at which the consensus state was stored
    pub processed_time: u64,
    /// Hub block height at which the consensus state was stored
    pub processed_height: Height,
}

/// The IBC light client store
pub trait LightClientStore {
    /// The client state of `client_id`
    /// # Errors
    /// Returns an error if the stored value cannot be decoded
    fn client_state(&self, client_id: &str) -> Result<Option<AnyClientState>, ClientStoreError>;

    /// Store the client state of `client_id`
    /// # Errors
    /// Returns an error if the value cannot be encoded
    fn set_client_state(
        &mut self,
        client_id: &str,
        client_state: &AnyClientState,
    ) -> Result<(), ClientStoreError>;

    /// All client states in store order
    /// # Errors
    /// Returns an error if a stored value cannot be decoded
    fn client_states(&self) -> Result<Vec<(String, AnyClientState)>, ClientStoreError>;

    /// The consensus state of `client_id` at `height`
    /// # Errors
    /// Returns an error if the stored value cannot be decoded
    fn consensus_state(
        &self,
        client_id: &str,
        height: Height,
    ) -> Result<Option<ConsensusState>, ClientStoreError>;

    /// Store a consensus state of `client_id` at `height`
    /// # Errors
    /// Returns an error if the value cannot be encoded
    fn set_consensus_state(
        &mut self,
        client_id: &str,
        height: Height,
        consensus_state: &ConsensusState,
    ) -> Result<(), ClientStoreError>;

    /// Delete the consensus state of `client_id` at `height`
    fn delete_consensus_state(&mut self, client_id: &str, height: Height);

    /// Heights of all consensus states of `client_id`, in the given order
    /// # Errors
    /// Returns an error if a stored key cannot be decoded
    fn consensus_state_heights(
        &self,
        client_id: &str,
        order: Order,
    ) -> Result<Vec<Height>, ClientStoreError>;

    /// Update bookkeeping of the consensus state at `height`
    /// # Errors
    /// Returns an error if the stored value cannot be decoded
    fn consensus_metadata(
        &self,
        client_id: &str,
        height: Height,
    ) -> Result<Option<ConsensusMetadata>, ClientStoreError>;

    /// Store update bookkeeping of the consensus state at `height`
    /// # Errors
    /// Returns an error if the value cannot be encoded
    fn set_consensus_metadata(
        &mut self,
        client_id: &str,
        height: Height,
        metadata: &ConsensusMetadata,
    ) -> Result<(), ClientStoreError>;

    /// Delete update bookkeeping of the consensus state at `height`
    fn delete_consensus_metadata(&mut self, client_id: &str, height: Height);

    /// The identifier the next created client of `client_type` will get
    fn next_client_id(&self, client_type: &str) -> String;
}

/// The rollapp module
pub trait RollappDirectory {
    /// The rollapp, if registered
    fn get_rollapp(&self, rollapp_id: &str) -> Option<Rollapp>;

    /// The state info covering `height`, pending or finalized
    fn find_state_info_by_height(&self, rollapp_id: &str, height: u64) -> Option<StateInfo>;

    /// The most recent state info of the rollapp
    fn get_latest_state_info(&self, rollapp_id: &str) -> Option<StateInfo>;

    /// Punish the sequencer that signed an inconsistent header
    /// # Errors
    /// Returns an error if the punishment could not be applied
    fn handle_fraud(
        &mut self,
        rollapp_id: &str,
        client_id: &str,
        height: u64,
        signer: &str,
    ) -> anyhow::Result<()>;
}

/// A sequencer registered for a rollapp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequencer {
    /// Hub address of the sequencer
    pub address: String,
    /// The rollapp it sequences
    pub rollapp_id: String,
    /// Consensus key signing rollapp blocks
    pub pub_key: PublicKey,
    /// Whether the sequencer is bonded
    pub bonded: bool,
}

/// The sequencer module
pub trait SequencerDirectory {
    /// The consensus key of the sequencer at `address`
    fn sequencer_pub_key(&self, address: &str) -> Option<PublicKey>;

    /// The sequencer currently designated to propose rollapp blocks
    fn proposer(&self, rollapp_id: &str) -> Option<Sequencer>;

    /// All sequencers ever registered for the rollapp
    fn sequencers_by_rollapp(&self, rollapp_id: &str) -> Vec<Sequencer>;
}

/// The connection a channel is built on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEnd {
    /// Connection identifier
    pub connection_id: String,
    /// Light client the connection is built on
    pub client_id: String,
}

/// The IBC channel module
pub trait ChannelDirectory {
    /// The connection of the channel, if the channel exists
    fn channel_connection(&self, port_id: &str, channel_id: &str) -> Option<ConnectionEnd>;
}
