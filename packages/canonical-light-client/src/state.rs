//! State management for the canonical client keeper

use cosmwasm_std::{Order, Record, Storage};
use serde::{Deserialize, Serialize};

use crate::error::ClientStoreError;

/// Key space mapping a rollapp to its canonical client
pub const ROLLAPP_CLIENT_PREFIX: u8 = 0x01;
/// Key space mapping a canonical client back to its rollapp
pub const CANONICAL_CLIENT_PREFIX: u8 = 0x02;
/// Key space holding the signer of optimistically accepted headers
pub const CONSENSUS_STATE_SIGNER_PREFIX: u8 = 0x03;
/// Key space of rollapps with a hard fork in progress
pub const HARD_FORK_PREFIX: u8 = 0x04;

const HARD_FORK_MARKER: &[u8] = &[1];
const SIGNER_KEY_SEPARATOR: u8 = b'/';

/// A rollapp and its canonical client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalClient {
    /// The rollapp
    pub rollapp_id: String,
    /// Its canonical client
    pub client_id: String,
}

/// The signer of a header accepted before the rollapp state at its height was known
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusStateSigner {
    /// The canonical client
    pub client_id: String,
    /// Rollapp height of the header
    pub height: u64,
    /// Validator set hash of the header's signer
    pub signer: Vec<u8>,
}

fn prefixed(prefix: u8, key: &[u8]) -> Vec<u8> {
    let mut db_key = Vec::with_capacity(1 + key.len());
    db_key.push(prefix);
    db_key.extend_from_slice(key);
    db_key
}

fn prefix_range(storage: &dyn Storage, prefix: u8) -> Box<dyn Iterator<Item = Record> + '_> {
    let start = [prefix];
    let end = [prefix + 1];
    storage.range(Some(start.as_slice()), Some(end.as_slice()), Order::Ascending)
}

/// The key of a rollapp's canonical client
#[must_use]
pub fn rollapp_client_key(rollapp_id: &str) -> Vec<u8> {
    prefixed(ROLLAPP_CLIENT_PREFIX, rollapp_id.as_bytes())
}

/// The key of a canonical client's rollapp
#[must_use]
pub fn canonical_client_key(client_id: &str) -> Vec<u8> {
    prefixed(CANONICAL_CLIENT_PREFIX, client_id.as_bytes())
}

/// The key of the signer record of `client_id` at `height`
#[must_use]
pub fn consensus_state_signer_key(client_id: &str, height: u64) -> Vec<u8> {
    let mut key = prefixed(CONSENSUS_STATE_SIGNER_PREFIX, client_id.as_bytes());
    key.push(SIGNER_KEY_SEPARATOR);
    key.extend_from_slice(&height.to_be_bytes());
    key
}

/// Splits a signer record key into client id and height
/// # Errors
/// Returns an error if the key was not built by [`consensus_state_signer_key`]
pub fn parse_consensus_state_signer_key(key: &[u8]) -> Result<(String, u64), ClientStoreError> {
    let corrupted = || ClientStoreError::CorruptedKey(hex::encode(key));

    let body = key
        .strip_prefix(&[CONSENSUS_STATE_SIGNER_PREFIX])
        .ok_or_else(corrupted)?;
    if body.len() < 9 {
        return Err(corrupted());
    }
    let (client_part, height_part) = body.split_at(body.len() - 8);
    let client_id = client_part
        .strip_suffix(&[SIGNER_KEY_SEPARATOR])
        .ok_or_else(corrupted)?;
    let height = u64::from_be_bytes(height_part.try_into().map_err(|_| corrupted())?);

    Ok((String::from_utf8_lossy(client_id).into_owned(), height))
}

/// The key of a rollapp's hard fork marker
#[must_use]
pub fn hard_fork_key(rollapp_id: &str) -> Vec<u8> {
    prefixed(HARD_FORK_PREFIX, rollapp_id.as_bytes())
}

/// The canonical client of `rollapp_id`
#[must_use]
pub fn get_canonical_client(storage: &dyn Storage, rollapp_id: &str) -> Option<String> {
    storage
        .get(&rollapp_client_key(rollapp_id))
        .map(|bz| String::from_utf8_lossy(&bz).into_owned())
}

/// The rollapp `client_id` is canonical for
#[must_use]
pub fn get_rollapp_for_client(storage: &dyn Storage, client_id: &str) -> Option<String> {
    storage
        .get(&canonical_client_key(client_id))
        .map(|bz| String::from_utf8_lossy(&bz).into_owned())
}

/// Writes both directions of the registry
pub fn set_canonical_client(storage: &mut dyn Storage, rollapp_id: &str, client_id: &str) {
    storage.set(&rollapp_client_key(rollapp_id), client_id.as_bytes());
    storage.set(&canonical_client_key(client_id), rollapp_id.as_bytes());
}

/// The registry read from the rollapp side, ordered by rollapp id
#[must_use]
pub fn get_all_canonical_clients(storage: &dyn Storage) -> Vec<CanonicalClient> {
    prefix_range(storage, ROLLAPP_CLIENT_PREFIX)
        .map(|(key, value)| CanonicalClient {
            rollapp_id: String::from_utf8_lossy(&key[1..]).into_owned(),
            client_id: String::from_utf8_lossy(&value).into_owned(),
        })
        .collect()
}

/// The registry read from the client side, ordered by client id
#[must_use]
pub fn get_all_client_rollapps(storage: &dyn Storage) -> Vec<CanonicalClient> {
    prefix_range(storage, CANONICAL_CLIENT_PREFIX)
        .map(|(key, value)| CanonicalClient {
            rollapp_id: String::from_utf8_lossy(&value).into_owned(),
            client_id: String::from_utf8_lossy(&key[1..]).into_owned(),
        })
        .collect()
}

/// Records the signer of a header at `height`
pub fn save_signer(storage: &mut dyn Storage, client_id: &str, height: u64, signer: &[u8]) {
    storage.set(&consensus_state_signer_key(client_id, height), signer);
}

/// The recorded signer at `height`
#[must_use]
pub fn get_signer(storage: &dyn Storage, client_id: &str, height: u64) -> Option<Vec<u8>> {
    storage.get(&consensus_state_signer_key(client_id, height))
}

/// Deletes the signer record at `height`
pub fn remove_signer(storage: &mut dyn Storage, client_id: &str, height: u64) {
    storage.remove(&consensus_state_signer_key(client_id, height));
}

/// All signer records, ordered by client id then height
/// # Errors
/// Returns an error if a stored key is corrupted
pub fn get_all_signers(storage: &dyn Storage) -> Result<Vec<ConsensusStateSigner>, ClientStoreError> {
    prefix_range(storage, CONSENSUS_STATE_SIGNER_PREFIX)
        .map(|(key, signer)| {
            let (client_id, height) = parse_consensus_state_signer_key(&key)?;
            Ok(ConsensusStateSigner {
                client_id,
                height,
                signer,
            })
        })
        .collect()
}

/// Marks a hard fork of `rollapp_id` as in progress
pub fn set_hard_fork_in_progress(storage: &mut dyn Storage, rollapp_id: &str) {
    storage.set(&hard_fork_key(rollapp_id), HARD_FORK_MARKER);
}

/// Whether a hard fork of `rollapp_id` is in progress
#[must_use]
pub fn is_hard_forking(storage: &dyn Storage, rollapp_id: &str) -> bool {
    storage.get(&hard_fork_key(rollapp_id)).is_some()
}

/// Clears the hard fork marker of `rollapp_id`
pub fn clear_hard_fork(storage: &mut dyn Storage, rollapp_id: &str) {
    storage.remove(&hard_fork_key(rollapp_id));
}

/// All rollapps with a hard fork in progress
#[must_use]
pub fn get_all_hard_forks(storage: &dyn Storage) -> Vec<String> {
    prefix_range(storage, HARD_FORK_PREFIX)
        .map(|(key, _)| String::from_utf8_lossy(&key[1..]).into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use cosmwasm_std::MemoryStorage;

    use super::*;

    #[test]
    fn registry_is_written_in_both_directions() {
        let mut storage = MemoryStorage::new();
        set_canonical_client(&mut storage, "rollapp_1-1", "07-tendermint-0");

        assert_eq!(
            get_canonical_client(&storage, "rollapp_1-1").as_deref(),
            Some("07-tendermint-0")
        );
        assert_eq!(
            get_rollapp_for_client(&storage, "07-tendermint-0").as_deref(),
            Some("rollapp_1-1")
        );
        assert_eq!(get_canonical_client(&storage, "rollapp_2-1"), None);
        assert_eq!(get_all_canonical_clients(&storage), get_all_client_rollapps(&storage));
    }

    #[test]
    fn key_spaces_do_not_leak_into_each_other() {
        let mut storage = MemoryStorage::new();
        set_canonical_client(&mut storage, "rollapp_1-1", "07-tendermint-0");
        save_signer(&mut storage, "07-tendermint-0", 5, b"hash");
        set_hard_fork_in_progress(&mut storage, "rollapp_1-1");

        assert_eq!(get_all_canonical_clients(&storage).len(), 1);
        assert_eq!(get_all_client_rollapps(&storage).len(), 1);
        assert_eq!(get_all_signers(&storage).unwrap().len(), 1);
        assert_eq!(get_all_hard_forks(&storage), vec!["rollapp_1-1".to_string()]);
    }

    #[test]
    fn signers_are_ordered_by_height() {
        let mut storage = MemoryStorage::new();
        for height in [300, 2, 256, 1] {
            save_signer(&mut storage, "07-tendermint-0", height, b"hash");
        }

        let heights: Vec<u64> = get_all_signers(&storage)
            .unwrap()
            .into_iter()
            .map(|record| record.height)
            .collect();
        assert_eq!(heights, vec![1, 2, 256, 300]);
    }

    #[test]
    fn signer_key_round_trips_through_parse() {
        let key = consensus_state_signer_key("07-tendermint-12", 47);
        assert_eq!(
            parse_consensus_state_signer_key(&key).unwrap(),
            ("07-tendermint-12".to_string(), 47)
        );
    }

    #[test]
    fn truncated_signer_key_is_rejected() {
        let key = consensus_state_signer_key("07-tendermint-0", 47);
        assert!(matches!(
            parse_consensus_state_signer_key(&key[..5]),
            Err(ClientStoreError::CorruptedKey(_))
        ));
    }

    #[test]
    fn signer_removal_and_hard_fork_clear() {
        let mut storage = MemoryStorage::new();
        save_signer(&mut storage, "07-tendermint-0", 5, b"hash");
        remove_signer(&mut storage, "07-tendermint-0", 5);
        assert_eq!(get_signer(&storage, "07-tendermint-0", 5), None);

        set_hard_fork_in_progress(&mut storage, "rollapp_1-1");
        assert!(is_hard_forking(&storage, "rollapp_1-1"));
        clear_hard_fork(&mut storage, "rollapp_1-1");
        assert!(!is_hard_forking(&storage, "rollapp_1-1"));
    }
}
