//! Compatibility between light client consensus data and the rollapp's own state

use tendermint::PublicKey;

use crate::{
    consensus_state::ConsensusState, error::CompatibilityError, rollapp::BlockDescriptor,
    sequencer::validator_set_hash,
};

/// The light client's view of a rollapp block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IbcState {
    /// App hash of the block
    pub root: Vec<u8>,
    /// Block time in unix nanoseconds
    pub timestamp: Option<u64>,
    /// Hash of the validator set that signed the block
    pub validators_hash: Vec<u8>,
    /// Hash of the validator set for the next block
    pub next_validators_hash: Vec<u8>,
}

impl From<&ConsensusState> for IbcState {
    fn from(cs: &ConsensusState) -> Self {
        Self {
            root: cs.root.clone(),
            timestamp: (cs.timestamp != 0).then_some(cs.timestamp),
            validators_hash: cs.validators_hash.clone(),
            next_validators_hash: cs.next_validators_hash.clone(),
        }
    }
}

/// The rollapp's own view of a block and of who produces the next one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollappState {
    /// Sequencer that produced the block
    pub block_sequencer: PublicKey,
    /// The finalized descriptor of the block
    pub block_descriptor: BlockDescriptor,
    /// Sequencer that produces the next block
    pub next_block_sequencer: PublicKey,
    /// The descriptor of the next block, when already known
    pub next_block_descriptor: Option<BlockDescriptor>,
}

/// Checks that a light client consensus state agrees with the rollapp state at the same height.
///
/// Checks run in a fixed order and stop at the first failure:
/// state root, signer, next validator set, timestamp.
/// # Errors
/// Returns the [`CompatibilityError`] of the first failed check.
pub fn check_compatibility(
    ibc_state: &IbcState,
    rollapp_state: &RollappState,
) -> Result<(), CompatibilityError> {
    if ibc_state.root != rollapp_state.block_descriptor.state_root {
        return Err(CompatibilityError::StateRootMismatch);
    }

    if ibc_state.validators_hash != validator_set_hash(&rollapp_state.block_sequencer) {
        return Err(CompatibilityError::SignerMismatch);
    }

    if ibc_state.next_validators_hash != validator_set_hash(&rollapp_state.next_block_sequencer) {
        return Err(CompatibilityError::NextValidatorMismatch);
    }

    match (ibc_state.timestamp, rollapp_state.block_descriptor.timestamp) {
        (None, None) => Err(CompatibilityError::TimestampNotFound),
        (Some(ibc_ts), Some(bd_ts)) if ibc_ts == bd_ts => Ok(()),
        _ => Err(CompatibilityError::TimestampMismatch),
    }
}
