//! Consensus state of a tendermint light client at a single height

use serde::{Deserialize, Serialize};

/// Tendermint consensus state as recorded by a light client update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusState {
    /// Block time in unix nanoseconds, zero when unknown
    pub timestamp: u64,
    /// App hash of the block
    pub root: Vec<u8>,
    /// Hash of the validator set that signed the block
    pub validators_hash: Vec<u8>,
    /// Hash of the validator set for the next block
    pub next_validators_hash: Vec<u8>,
}
