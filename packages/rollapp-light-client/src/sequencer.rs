//! Sequencer identity as seen by a tendermint light client.
//!
//! A rollapp block is produced by a single sequencer, so the validator set a
//! light client tracks is always a one-member set with voting power 1.

use tendermint::{
    validator::{Info, Set},
    vote::Power,
    PublicKey,
};

/// The hash of the single-validator set made of `pub_key`.
///
/// This is what a header signed by the sequencer carries as `validators_hash`
/// and what the previous header carries as `next_validators_hash`.
#[must_use]
pub fn validator_set_hash(pub_key: &PublicKey) -> Vec<u8> {
    let validator = Info::new(*pub_key, Power::from(1_u32));
    Set::without_proposer(vec![validator])
        .hash()
        .as_bytes()
        .to_vec()
}
