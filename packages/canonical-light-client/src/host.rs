//! A [`LightClientStore`] over a plain key-value store, laid out the way `ibc-go` lays out client state

use cosmwasm_std::{MemoryStorage, Order, Storage};
use rollapp_light_client::{AnyClientState, ConsensusState, Height};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    error::ClientStoreError,
    expected::{ConsensusMetadata, LightClientStore},
};

/// The store key used by `ibc-go` to store the client state
pub const HOST_CLIENT_STATE_KEY: &str = "clientState";
/// The store key used by `ibc-go` to store the consensus states
pub const HOST_CONSENSUS_STATES_KEY: &str = "consensusStates";
/// The store key used by `ibc-go` to store sorted keys of consensusStates
pub const HOST_ITERATE_CONSENSUS_STATES_KEY: &str = "iterateConsensusStates";
/// The store key suffix of a consensus state's processed time
pub const PROCESSED_TIME_KEY: &str = "processedTime";
/// The store key suffix of a consensus state's processed height
pub const PROCESSED_HEIGHT_KEY: &str = "processedHeight";
/// The store key of the client identifier counter
pub const NEXT_CLIENT_SEQUENCE_KEY: &str = "nextClientSequence";

const CLIENTS_PREFIX: &str = "clients";

/// The key used to store the client state
#[must_use]
pub fn client_state_key(client_id: &str) -> String {
    format!("{CLIENTS_PREFIX}/{client_id}/{HOST_CLIENT_STATE_KEY}")
}

/// The key used to store the consensus states by height
#[must_use]
pub fn consensus_db_key(client_id: &str, height: Height) -> String {
    format!(
        "{CLIENTS_PREFIX}/{client_id}/{HOST_CONSENSUS_STATES_KEY}/{}-{}",
        height.revision_number, height.revision_height
    )
}

fn iteration_prefix(client_id: &str) -> Vec<u8> {
    format!("{CLIENTS_PREFIX}/{client_id}/{HOST_ITERATE_CONSENSUS_STATES_KEY}/").into_bytes()
}

/// The key used to iterate the consensus states in height order
#[must_use]
pub fn iteration_db_key(client_id: &str, height: Height) -> Vec<u8> {
    let mut key = iteration_prefix(client_id);
    key.extend_from_slice(&height.revision_number.to_be_bytes());
    key.extend_from_slice(&height.revision_height.to_be_bytes());
    key
}

fn processed_time_key(client_id: &str, height: Height) -> String {
    format!("{}/{PROCESSED_TIME_KEY}", consensus_db_key(client_id, height))
}

fn processed_height_key(client_id: &str, height: Height) -> String {
    format!("{}/{PROCESSED_HEIGHT_KEY}", consensus_db_key(client_id, height))
}

fn prefix_end(prefix: &[u8]) -> Vec<u8> {
    let mut end = prefix.to_vec();
    // all prefixes end in '/', incrementing the last byte never overflows
    if let Some(last) = end.last_mut() {
        *last += 1;
    }
    end
}

fn encode<T: Serialize>(what: &'static str, value: &T) -> Result<Vec<u8>, ClientStoreError> {
    serde_json::to_vec(value).map_err(|source| ClientStoreError::Serialize { what, source })
}

fn decode<T: DeserializeOwned>(what: &'static str, bz: &[u8]) -> Result<T, ClientStoreError> {
    serde_json::from_slice(bz).map_err(|source| ClientStoreError::Deserialize { what, source })
}

/// The IBC client store backed by any [`Storage`]
#[derive(Default)]
pub struct HostClientStore<S: Storage = MemoryStorage> {
    storage: S,
}

impl<S: Storage> HostClientStore<S> {
    /// Wraps `storage`
    #[must_use]
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// The underlying storage
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    fn next_client_sequence(&self) -> u64 {
        self.storage
            .get(NEXT_CLIENT_SEQUENCE_KEY.as_bytes())
            .and_then(|bz| bz.try_into().ok())
            .map_or(0, u64::from_be_bytes)
    }

    /// Creates a client under the next free identifier, as the IBC client pipeline does
    /// # Errors
    /// Returns an error if the states cannot be encoded
    pub fn create_client(
        &mut self,
        client_state: &AnyClientState,
        consensus_state: &ConsensusState,
        processed: ConsensusMetadata,
    ) -> Result<String, ClientStoreError> {
        let client_id = self.next_client_id(client_state.client_type());
        let sequence = self.next_client_sequence() + 1;
        self.storage
            .set(NEXT_CLIENT_SEQUENCE_KEY.as_bytes(), &sequence.to_be_bytes());

        self.set_client_state(&client_id, client_state)?;
        if let Some(latest_height) = client_state.as_tendermint().map(|cs| cs.latest_height) {
            self.set_consensus_state(&client_id, latest_height, consensus_state)?;
            self.set_consensus_metadata(&client_id, latest_height, &processed)?;
        }

        Ok(client_id)
    }
}

impl<S: Storage> LightClientStore for HostClientStore<S> {
    fn client_state(&self, client_id: &str) -> Result<Option<AnyClientState>, ClientStoreError> {
        self.storage
            .get(client_state_key(client_id).as_bytes())
            .map(|bz| decode("client state", &bz))
            .transpose()
    }

    fn set_client_state(
        &mut self,
        client_id: &str,
        client_state: &AnyClientState,
    ) -> Result<(), ClientStoreError> {
        let bz = encode("client state", client_state)?;
        self.storage.set(client_state_key(client_id).as_bytes(), &bz);
        Ok(())
    }

    fn client_states(&self) -> Result<Vec<(String, AnyClientState)>, ClientStoreError> {
        let prefix = format!("{CLIENTS_PREFIX}/").into_bytes();
        let suffix = format!("/{HOST_CLIENT_STATE_KEY}");
        let end = prefix_end(&prefix);

        self.storage
            .range(Some(prefix.as_slice()), Some(end.as_slice()), Order::Ascending)
            .filter_map(|(key, value)| {
                let key = String::from_utf8_lossy(&key).into_owned();
                let client_id = key
                    .strip_prefix(&format!("{CLIENTS_PREFIX}/"))?
                    .strip_suffix(&suffix)?
                    .to_string();
                // consensus keys of a client share the prefix
                (!client_id.contains('/')).then_some((client_id, value))
            })
            .map(|(client_id, value)| Ok((client_id, decode("client state", &value)?)))
            .collect()
    }

    fn consensus_state(
        &self,
        client_id: &str,
        height: Height,
    ) -> Result<Option<ConsensusState>, ClientStoreError> {
        self.storage
            .get(consensus_db_key(client_id, height).as_bytes())
            .map(|bz| decode("consensus state", &bz))
            .transpose()
    }

    fn set_consensus_state(
        &mut self,
        client_id: &str,
        height: Height,
        consensus_state: &ConsensusState,
    ) -> Result<(), ClientStoreError> {
        let consensus_key = consensus_db_key(client_id, height);
        let bz = encode("consensus state", consensus_state)?;
        self.storage.set(consensus_key.as_bytes(), &bz);
        self.storage
            .set(&iteration_db_key(client_id, height), consensus_key.as_bytes());
        Ok(())
    }

    fn delete_consensus_state(&mut self, client_id: &str, height: Height) {
        self.storage
            .remove(consensus_db_key(client_id, height).as_bytes());
        self.storage.remove(&iteration_db_key(client_id, height));
    }

    fn consensus_state_heights(
        &self,
        client_id: &str,
        order: Order,
    ) -> Result<Vec<Height>, ClientStoreError> {
        let prefix = iteration_prefix(client_id);
        let end = prefix_end(&prefix);

        self.storage
            .range(Some(prefix.as_slice()), Some(end.as_slice()), order)
            .map(|(key, _)| {
                let encoded = key
                    .strip_prefix(prefix.as_slice())
                    .filter(|encoded| encoded.len() == 16)
                    .ok_or_else(|| ClientStoreError::CorruptedKey(hex::encode(&key)))?;
                let (revision, height) = encoded.split_at(8);
                let to_u64 = |bz: &[u8]| {
                    bz.try_into()
                        .map(u64::from_be_bytes)
                        .map_err(|_| ClientStoreError::CorruptedKey(hex::encode(&key)))
                };
                Ok(Height::new(to_u64(revision)?, to_u64(height)?))
            })
            .collect()
    }

    fn consensus_metadata(
        &self,
        client_id: &str,
        height: Height,
    ) -> Result<Option<ConsensusMetadata>, ClientStoreError> {
        let processed_time = self
            .storage
            .get(processed_time_key(client_id, height).as_bytes());
        let processed_height = self
            .storage
            .get(processed_height_key(client_id, height).as_bytes());

        match (processed_time, processed_height) {
            (Some(time), Some(height)) => Ok(Some(ConsensusMetadata {
                processed_time: decode("processed time", &time)?,
                processed_height: decode("processed height", &height)?,
            })),
            _ => Ok(None),
        }
    }

    fn set_consensus_metadata(
        &mut self,
        client_id: &str,
        height: Height,
        metadata: &ConsensusMetadata,
    ) -> Result<(), ClientStoreError> {
        let time = encode("processed time", &metadata.processed_time)?;
        let processed_height = encode("processed height", &metadata.processed_height)?;
        self.storage
            .set(processed_time_key(client_id, height).as_bytes(), &time);
        self.storage.set(
            processed_height_key(client_id, height).as_bytes(),
            &processed_height,
        );
        Ok(())
    }

    fn delete_consensus_metadata(&mut self, client_id: &str, height: Height) {
        self.storage
            .remove(processed_time_key(client_id, height).as_bytes());
        self.storage
            .remove(processed_height_key(client_id, height).as_bytes());
    }

    fn next_client_id(&self, client_type: &str) -> String {
        format!("{client_type}-{}", self.next_client_sequence())
    }
}
