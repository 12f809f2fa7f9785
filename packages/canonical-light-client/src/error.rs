//! Defines the [`CanonicalClientError`] and [`ClientStoreError`] types.

use rollapp_light_client::{CompatibilityError, ParamsError};
use thiserror::Error;

/// Error types that can be returned by keeper operations
#[derive(Error, Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum CanonicalClientError {
    /// The rollapp is rolling back, ordinary client updates are blocked
    #[error("hard fork in progress for rollapp {rollapp_id}")]
    HardForkInProgress {
        /// The forking rollapp
        rollapp_id: String,
    },

    /// The rollapp already has a bound channel
    #[error("channel already exists for rollapp {rollapp_id}: {channel_id}")]
    ChannelAlreadyExists {
        /// The rollapp
        rollapp_id: String,
        /// The channel already bound
        channel_id: String,
    },

    /// A consensus state disagrees with the rollapp's finalized state
    #[error("incompatible consensus state of client {client_id} at height {height}: {source}")]
    IncompatibleConsensusState {
        /// The light client
        client_id: String,
        /// The rollapp height
        height: u64,
        /// The failed check
        #[source]
        source: CompatibilityError,
    },

    /// A header for a canonical client disagrees with the rollapp's state at its height
    #[error("rejected update of canonical client {client_id} at height {height}: {source}")]
    IncompatibleUpdate {
        /// The canonical client
        client_id: String,
        /// Height of the header
        height: u64,
        /// The failed check
        #[source]
        source: CompatibilityError,
    },

    /// Misbehaviour submissions are not accepted for canonical clients
    #[error("misbehaviour evidence is disabled for canonical clients")]
    MisbehaviourDisabled,

    /// The header was produced under another rollapp revision
    #[error("client update revision mismatch (expected: {expected}, actual: {actual})")]
    RevisionMismatch {
        /// Current rollapp revision
        expected: u64,
        /// Revision carried by the header
        actual: u64,
    },

    /// The header was not signed by a sequencer of the rollapp
    #[error("update canonical client with non sequencer header")]
    NotSequencerHeader,

    /// The header was signed by a sequencer that is no longer bonded
    #[error("header is from unbonded sequencer {0}")]
    UnbondedSequencer(String),

    /// The signer is not allowed to issue the command
    #[error("unauthorized")]
    Unauthorized,

    /// Rollapp not found
    #[error("rollapp not found: {0}")]
    RollappNotFound(String),

    /// Sequencer not found
    #[error("sequencer not found: {0}")]
    SequencerNotFound(String),

    /// No sequencer is currently proposing for the rollapp
    #[error("no active proposer for rollapp {0}")]
    NoActiveProposer(String),

    /// Client state not found
    #[error("client state not found: {0}")]
    ClientStateNotFound(String),

    /// The client is not a tendermint client
    #[error("client {0} is not a tendermint client")]
    InvalidClientType(String),

    /// The client tracks another chain
    #[error("client chain id {chain_id} does not match rollapp {rollapp_id}")]
    ChainIdMismatch {
        /// Chain id of the client
        chain_id: String,
        /// The rollapp
        rollapp_id: String,
    },

    /// The client does not carry the canonical parameters
    #[error("invalid canonical client params: {0}")]
    InvalidParams(#[from] ParamsError),

    /// None of the client's consensus states could be checked against a state update
    #[error("no matching consensus state found for client {0}")]
    NoMatchingConsensusState(String),

    /// The rollapp already has a canonical client
    #[error("rollapp {0} already has a canonical client")]
    CanonicalClientExists(String),

    /// The client is already canonical for some rollapp
    #[error("client {client_id} is already canonical for rollapp {rollapp_id}")]
    ClientAlreadyCanonical {
        /// The client
        client_id: String,
        /// The rollapp it is canonical for
        rollapp_id: String,
    },

    /// The rollapp has no canonical client
    #[error("canonical client not found for rollapp {0}")]
    CanonicalClientNotFound(String),

    /// No state info covers the height
    #[error("state info not found: rollapp {rollapp_id} height {height}")]
    StateInfoNotFound {
        /// The rollapp
        rollapp_id: String,
        /// The height looked up
        height: u64,
    },

    /// The keeper configuration does not parse
    #[error("invalid config at {path}: {source}")]
    InvalidConfig {
        /// Path of the offending field
        path: String,
        /// The deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// The height is the last one representable, its successor cannot be looked up
    #[error("height {0} has no successor")]
    HeightOverflow(u64),

    /// The rollapp has no finalized state info
    #[error("no finalized state info for rollapp {0}")]
    NoFinalizedStateInfo(String),

    /// The state info does not carry a descriptor for the height
    #[error("block descriptor not found: rollapp {rollapp_id} height {height}")]
    BlockDescriptorNotFound {
        /// The rollapp
        rollapp_id: String,
        /// The height looked up
        height: u64,
    },

    /// The block descriptor carries no timestamp
    #[error("block descriptor has no timestamp: rollapp {rollapp_id} height {height}")]
    MissingTimestamp {
        /// The rollapp
        rollapp_id: String,
        /// The height of the descriptor
        height: u64,
    },

    /// Genesis state is inconsistent
    #[error("invalid genesis: {0}")]
    InvalidGenesis(String),

    /// A store invariant does not hold
    #[error("invariant broken: {0}")]
    InvariantBroken(String),

    /// The light client store failed
    #[error("client store: {0}")]
    ClientStore(#[from] ClientStoreError),
}

/// Errors returned by a [`crate::expected::LightClientStore`]
#[derive(Error, Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum ClientStoreError {
    /// Serializing a stored value failed
    #[error("serializing {what} failed: {source}")]
    Serialize {
        /// What was serialized
        what: &'static str,
        /// The serde error
        #[source]
        source: serde_json::Error,
    },

    /// Deserializing a stored value failed
    #[error("deserializing {what} failed: {source}")]
    Deserialize {
        /// What was deserialized
        what: &'static str,
        /// The serde error
        #[source]
        source: serde_json::Error,
    },

    /// A store key does not have the expected layout
    #[error("corrupted store key: {0}")]
    CorruptedKey(String),
}
