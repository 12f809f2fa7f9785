//! Test utilities for the rollapp light client

#[cfg(any(test, feature = "test-utils"))]
pub use fixtures::*;

#[allow(missing_docs, clippy::missing_panics_doc, clippy::must_use_candidate)]
#[cfg(any(test, feature = "test-utils"))]
mod fixtures {
    use ed25519_dalek::SigningKey;
    use tendermint::PublicKey;

    use crate::{
        consensus_state::ConsensusState,
        rollapp::{BlockDescriptor, StateInfo, StateStatus},
        sequencer::validator_set_hash,
    };

    pub const BASE_TIMESTAMP: u64 = 1_724_392_989_000_000_000;

    /// A deterministic, valid ed25519 sequencer key
    pub fn sequencer_pub_key(seed: u8) -> PublicKey {
        let signing_key = SigningKey::from_bytes(&[seed; 32]);
        PublicKey::from_raw_ed25519(signing_key.verifying_key().as_bytes())
            .expect("valid ed25519 key")
    }

    pub fn state_root(height: u64) -> Vec<u8> {
        format!("root-{height}").into_bytes()
    }

    pub fn block_descriptor(height: u64) -> BlockDescriptor {
        BlockDescriptor {
            height,
            state_root: state_root(height),
            timestamp: Some(BASE_TIMESTAMP + height),
        }
    }

    pub fn state_info(
        rollapp_id: &str,
        index: u64,
        start_height: u64,
        num_blocks: u64,
        sequencer: &str,
        status: StateStatus,
    ) -> StateInfo {
        StateInfo {
            rollapp_id: rollapp_id.to_string(),
            index,
            start_height,
            num_blocks,
            sequencer: sequencer.to_string(),
            status,
            block_descriptors: (start_height..start_height + num_blocks)
                .map(block_descriptor)
                .collect(),
        }
    }

    /// The consensus state an honest sequencer produces for `bd`
    pub fn compatible_consensus_state(
        bd: &BlockDescriptor,
        signer: &PublicKey,
        next_signer: &PublicKey,
    ) -> ConsensusState {
        ConsensusState {
            timestamp: bd.timestamp.unwrap_or_default(),
            root: bd.state_root.clone(),
            validators_hash: validator_set_hash(signer),
            next_validators_hash: validator_set_hash(next_signer),
        }
    }
}
