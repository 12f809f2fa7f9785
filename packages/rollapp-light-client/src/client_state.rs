//! Light client state as stored by the hub's IBC client store

use core::fmt;
use std::time::Duration;

use ics23::ProofSpec;
use serde::{Deserialize, Serialize};

/// The client type prefix used by tendermint light clients
pub const TENDERMINT_CLIENT_TYPE: &str = "07-tendermint";
/// The client type prefix used by solo machine light clients
pub const SOLO_MACHINE_CLIENT_TYPE: &str = "06-solomachine";

/// An IBC height, ordered by revision number first
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Height {
    /// The revision the height belongs to
    pub revision_number: u64,
    /// The height within the revision
    pub revision_height: u64,
}

impl Height {
    /// Construct a height
    #[must_use]
    pub const fn new(revision_number: u64, revision_height: u64) -> Self {
        Self {
            revision_number,
            revision_height,
        }
    }

    /// The zero height, used as the "not frozen" marker
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0, 0)
    }

    /// Whether this is the zero height
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.revision_number == 0 && self.revision_height == 0
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.revision_number, self.revision_height)
    }
}

/// Fraction of the trusted validator set that must sign a new header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustThreshold {
    /// Numerator of the fraction
    pub numerator: u64,
    /// Denominator of the fraction
    pub denominator: u64,
}

impl TrustThreshold {
    /// The whole validator set must sign
    pub const ONE: Self = Self {
        numerator: 1,
        denominator: 1,
    };
}

/// Tendermint light client state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(clippy::module_name_repetitions, clippy::struct_excessive_bools)]
pub struct ClientState {
    /// The chain id the client tracks
    pub chain_id: String,
    /// Trust level required for non-adjacent updates
    pub trust_level: TrustThreshold,
    /// Duration during which a header stays trusted
    pub trusting_period: Duration,
    /// Unbonding period of the tracked chain
    pub unbonding_period: Duration,
    /// Allowed clock drift of new headers
    pub max_clock_drift: Duration,
    /// Height at which the client was frozen, zero when active
    pub frozen_height: Height,
    /// Latest height the client was updated to
    pub latest_height: Height,
    /// ICS-23 proof specs used for membership proofs
    #[serde(with = "proof_specs_codec")]
    pub proof_specs: Vec<ProofSpec>,
    /// Store path of the upgraded client
    pub upgrade_path: Vec<String>,
    /// Deprecated, must be false for canonical clients
    pub allow_update_after_expiry: bool,
    /// Deprecated, must be false for canonical clients
    pub allow_update_after_misbehaviour: bool,
}

impl ClientState {
    /// Whether the client is frozen
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        !self.frozen_height.is_zero()
    }
}

/// Solo machine light client state, carried only so that it can be told apart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoloMachineClientState {
    /// Current sequence of the solo machine
    pub sequence: u64,
    /// Whether the client is frozen
    pub is_frozen: bool,
}

/// Any light client state known to the hub.
///
/// Only the tendermint variant is relevant for rollapps, every other variant
/// is passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnyClientState {
    /// ICS-07 tendermint client
    Tendermint(ClientState),
    /// ICS-06 solo machine client
    SoloMachine(SoloMachineClientState),
    /// Any other client type
    Other {
        /// The client type identifier
        client_type: String,
    },
}

impl AnyClientState {
    /// The tendermint client state, if this is one
    #[must_use]
    pub const fn as_tendermint(&self) -> Option<&ClientState> {
        match self {
            Self::Tendermint(cs) => Some(cs),
            Self::SoloMachine(_) | Self::Other { .. } => None,
        }
    }

    /// Mutable access to the tendermint client state, if this is one
    pub fn as_tendermint_mut(&mut self) -> Option<&mut ClientState> {
        match self {
            Self::Tendermint(cs) => Some(cs),
            Self::SoloMachine(_) | Self::Other { .. } => None,
        }
    }

    /// The client type identifier
    #[must_use]
    pub fn client_type(&self) -> &str {
        match self {
            Self::Tendermint(_) => TENDERMINT_CLIENT_TYPE,
            Self::SoloMachine(_) => SOLO_MACHINE_CLIENT_TYPE,
            Self::Other { client_type } => client_type,
        }
    }
}

impl From<ClientState> for AnyClientState {
    fn from(cs: ClientState) -> Self {
        Self::Tendermint(cs)
    }
}

/// Proof specs are protobuf messages, so they are stored protobuf-encoded.
mod proof_specs_codec {
    use ics23::ProofSpec;
    use prost::Message;
    use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(specs: &[ProofSpec], serializer: S) -> Result<S::Ok, S::Error> {
        let encoded: Vec<Vec<u8>> = specs.iter().map(Message::encode_to_vec).collect();
        encoded.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<ProofSpec>, D::Error> {
        Vec::<Vec<u8>>::deserialize(deserializer)?
            .iter()
            .map(|bz| ProofSpec::decode(bz.as_slice()).map_err(D::Error::custom))
            .collect()
    }
}
