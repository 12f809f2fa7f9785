//! Messages the keeper observes or handles

use rollapp_light_client::{AnyClientState, ConsensusState, Height};
use serde::{Deserialize, Serialize};

/// Creation of an IBC light client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateClientMsg {
    /// The initial client state
    pub client_state: AnyClientState,
    /// The consensus state at the client's latest height
    pub consensus_state: ConsensusState,
}

/// A signed tendermint header, reduced to what the keeper inspects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Height of the header
    pub height: Height,
    /// Rollapp revision the block was produced under
    pub app_revision: u64,
    /// App hash
    pub root: Vec<u8>,
    /// Block time in unix nanoseconds
    pub timestamp: u64,
    /// Hash of the validator set that signed the block
    pub validators_hash: Vec<u8>,
    /// Hash of the validator set for the next block
    pub next_validators_hash: Vec<u8>,
}

impl Header {
    /// The consensus state the light client stores for this header
    #[must_use]
    pub fn consensus_state(&self) -> ConsensusState {
        ConsensusState {
            timestamp: self.timestamp,
            root: self.root.clone(),
            validators_hash: self.validators_hash.clone(),
            next_validators_hash: self.next_validators_hash.clone(),
        }
    }
}

/// The payload of a client update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientMessage {
    /// A new header
    Header(Header),
    /// Two conflicting headers
    Misbehaviour {
        /// Height of the first header
        header_1_height: Height,
        /// Height of the second header
        header_2_height: Height,
    },
    /// Any other client message
    Other,
}

/// Update of an IBC light client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateClientMsg {
    /// The client being updated
    pub client_id: String,
    /// The update payload
    pub client_message: ClientMessage,
}

/// Acknowledgement of a channel handshake
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelOpenAckMsg {
    /// Port of the channel
    pub port_id: String,
    /// The channel being opened
    pub channel_id: String,
    /// Channel on the counterparty
    pub counterparty_channel_id: String,
}

/// Explicit assignment of a rollapp's canonical client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetCanonicalClientMsg {
    /// The issuer of the command
    pub signer: String,
    /// The rollapp
    pub rollapp_id: String,
    /// The client to make canonical
    pub client_id: String,
}

/// Any message of a transaction, as seen by the keeper's hooks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Msg {
    /// See [`CreateClientMsg`]
    CreateClient(CreateClientMsg),
    /// See [`UpdateClientMsg`]
    UpdateClient(UpdateClientMsg),
    /// See [`ChannelOpenAckMsg`]
    ChannelOpenAck(ChannelOpenAckMsg),
    /// See [`SetCanonicalClientMsg`]
    SetCanonicalClient(SetCanonicalClientMsg),
    /// Anything the keeper does not inspect
    Other,
}
