//! The canonical client keeper, its registry and read-only queries

use cosmwasm_std::Order;
use rollapp_light_client::{
    check_compatibility, client_state::TENDERMINT_CLIENT_TYPE, sequencer::validator_set_hash,
    AnyClientState, ClientState, Height, IbcState, RollappState, StateInfo,
};
use tendermint::PublicKey;

use crate::{
    config::CanonicalClientConfig,
    error::CanonicalClientError,
    expected::{Host, LightClientStore, RollappDirectory, Sequencer, SequencerDirectory},
    state::{self, CanonicalClient, ConsensusStateSigner},
};

/// Decides and guards the canonical light client of every rollapp.
///
/// All collaborators are injected at construction, the keeper holds no
/// other state than what lives in its own `storage`.
pub struct Keeper<H: Host> {
    pub(crate) storage: H::Storage,
    pub(crate) clients: H::Clients,
    pub(crate) rollapps: H::Rollapps,
    pub(crate) sequencers: H::Sequencers,
    pub(crate) channels: H::Channels,
    pub(crate) config: CanonicalClientConfig,
}

impl<H: Host> Keeper<H> {
    /// Creates a keeper over the given collaborators
    pub const fn new(
        storage: H::Storage,
        clients: H::Clients,
        rollapps: H::Rollapps,
        sequencers: H::Sequencers,
        channels: H::Channels,
        config: CanonicalClientConfig,
    ) -> Self {
        Self {
            storage,
            clients,
            rollapps,
            sequencers,
            channels,
            config,
        }
    }

    /// The keeper configuration
    #[must_use]
    pub const fn config(&self) -> &CanonicalClientConfig {
        &self.config
    }

    /// The keeper's own store
    #[must_use]
    pub const fn storage(&self) -> &H::Storage {
        &self.storage
    }

    /// The IBC light client store
    #[must_use]
    pub const fn clients(&self) -> &H::Clients {
        &self.clients
    }

    /// Mutable access to the IBC light client store
    pub fn clients_mut(&mut self) -> &mut H::Clients {
        &mut self.clients
    }

    /// The rollapp module
    #[must_use]
    pub const fn rollapps(&self) -> &H::Rollapps {
        &self.rollapps
    }

    /// Mutable access to the rollapp module
    pub fn rollapps_mut(&mut self) -> &mut H::Rollapps {
        &mut self.rollapps
    }

    /// The sequencer module
    #[must_use]
    pub const fn sequencers(&self) -> &H::Sequencers {
        &self.sequencers
    }

    /// Mutable access to the sequencer module
    pub fn sequencers_mut(&mut self) -> &mut H::Sequencers {
        &mut self.sequencers
    }

    /// The IBC channel module
    #[must_use]
    pub const fn channels(&self) -> &H::Channels {
        &self.channels
    }

    /// Mutable access to the IBC channel module
    pub fn channels_mut(&mut self) -> &mut H::Channels {
        &mut self.channels
    }

    /// The canonical client of `rollapp_id`
    #[must_use]
    pub fn get_canonical_client(&self, rollapp_id: &str) -> Option<String> {
        state::get_canonical_client(&self.storage, rollapp_id)
    }

    /// The rollapp `client_id` is canonical for
    #[must_use]
    pub fn get_rollapp_for_client(&self, client_id: &str) -> Option<String> {
        state::get_rollapp_for_client(&self.storage, client_id)
    }

    /// Writes the registry entry in both directions, without any check
    pub fn set_canonical_client(&mut self, rollapp_id: &str, client_id: &str) {
        state::set_canonical_client(&mut self.storage, rollapp_id, client_id);
    }

    /// Every registry entry, ordered by rollapp id
    #[must_use]
    pub fn get_all_canonical_clients(&self) -> Vec<CanonicalClient> {
        state::get_all_canonical_clients(&self.storage)
    }

    /// The client state a canonical client of `rollapp_id` is expected to have
    #[must_use]
    pub fn expected_client_state(&self, rollapp_id: &str) -> ClientState {
        self.config
            .expected_client
            .expected_client_state(rollapp_id, Height::zero())
    }

    /// Records the signer of an optimistically accepted header
    pub fn save_signer(&mut self, client_id: &str, height: u64, signer: &[u8]) {
        state::save_signer(&mut self.storage, client_id, height, signer);
    }

    /// The signer recorded at `height`
    #[must_use]
    pub fn get_signer(&self, client_id: &str, height: u64) -> Option<Vec<u8>> {
        state::get_signer(&self.storage, client_id, height)
    }

    /// Deletes the signer record at `height`
    pub fn remove_signer(&mut self, client_id: &str, height: u64) {
        state::remove_signer(&mut self.storage, client_id, height);
    }

    /// Every signer record, ordered by client id then height
    /// # Errors
    /// Returns an error if the store is corrupted
    pub fn get_all_signers(&self) -> Result<Vec<ConsensusStateSigner>, CanonicalClientError> {
        Ok(state::get_all_signers(&self.storage)?)
    }

    /// Whether a hard fork of `rollapp_id` is in progress
    #[must_use]
    pub fn is_hard_forking(&self, rollapp_id: &str) -> bool {
        state::is_hard_forking(&self.storage, rollapp_id)
    }

    /// The tendermint client state of `client_id`
    pub(crate) fn tendermint_client_state(
        &self,
        client_id: &str,
    ) -> Result<ClientState, CanonicalClientError> {
        match self.clients.client_state(client_id)? {
            Some(AnyClientState::Tendermint(client_state)) => Ok(client_state),
            Some(_) => Err(CanonicalClientError::InvalidClientType(client_id.to_string())),
            None => Err(CanonicalClientError::ClientStateNotFound(
                client_id.to_string(),
            )),
        }
    }

    /// The consensus height of `client_id` for a rollapp height
    pub(crate) fn consensus_height(
        &self,
        client_id: &str,
        height: u64,
    ) -> Result<Height, CanonicalClientError> {
        let client_state = self.tendermint_client_state(client_id)?;
        Ok(Height::new(client_state.latest_height.revision_number, height))
    }

    pub(crate) fn sequencer_pub_key(&self, address: &str) -> Result<PublicKey, CanonicalClientError> {
        self.sequencers
            .sequencer_pub_key(address)
            .ok_or_else(|| CanonicalClientError::SequencerNotFound(address.to_string()))
    }

    /// The sequencer of `rollapp_id` whose single-member validator set hashes to `validators_hash`
    pub(crate) fn sequencer_by_validators_hash(
        &self,
        rollapp_id: &str,
        validators_hash: &[u8],
    ) -> Option<Sequencer> {
        self.sequencers
            .sequencers_by_rollapp(rollapp_id)
            .into_iter()
            .find(|sequencer| validator_set_hash(&sequencer.pub_key) == validators_hash)
    }

    /// The rollapp's view of `height`, taken from the state infos covering `height` and `height + 1`
    pub(crate) fn rollapp_state(
        &self,
        state_info: &StateInfo,
        next_state_info: &StateInfo,
        height: u64,
    ) -> Result<RollappState, CanonicalClientError> {
        let block_descriptor = state_info.block_descriptor(height).cloned().ok_or_else(|| {
            CanonicalClientError::BlockDescriptorNotFound {
                rollapp_id: state_info.rollapp_id.clone(),
                height,
            }
        })?;

        Ok(RollappState {
            block_sequencer: self.sequencer_pub_key(&state_info.sequencer)?,
            block_descriptor,
            next_block_sequencer: self.sequencer_pub_key(&next_state_info.sequencer)?,
            next_block_descriptor: height
                .checked_add(1)
                .and_then(|next_height| next_state_info.block_descriptor(next_height))
                .cloned(),
        })
    }

    /// Checks that `client_state` could be the canonical client of `rollapp_id`
    /// # Errors
    /// Returns the reason the client does not qualify
    pub fn validate_canonical_client_params(
        &self,
        client_id: &str,
        client_state: &AnyClientState,
        rollapp_id: &str,
    ) -> Result<(), CanonicalClientError> {
        let client_state = client_state
            .as_tendermint()
            .ok_or_else(|| CanonicalClientError::InvalidClientType(client_id.to_string()))?;

        if client_state.chain_id != rollapp_id {
            return Err(CanonicalClientError::ChainIdMismatch {
                chain_id: client_state.chain_id.clone(),
                rollapp_id: rollapp_id.to_string(),
            });
        }

        Ok(self.config.expected_client.validate(client_state)?)
    }

    /// Checks a candidate client against every state update it can be compared with, up to `max_height`.
    ///
    /// At least one consensus state must be comparable, and all comparable ones must agree.
    /// # Errors
    /// Returns the reason the client does not qualify
    pub fn validate_candidate(
        &self,
        client_id: &str,
        client_state: &AnyClientState,
        rollapp_id: &str,
        max_height: u64,
    ) -> Result<(), CanonicalClientError> {
        self.validate_canonical_client_params(client_id, client_state, rollapp_id)?;

        let mut matched = false;
        for consensus_height in self
            .clients
            .consensus_state_heights(client_id, Order::Ascending)?
        {
            let height = consensus_height.revision_height;
            if height > max_height {
                break;
            }
            let Some(state_info) = self.rollapps.find_state_info_by_height(rollapp_id, height)
            else {
                continue;
            };
            let Some(next_state_info) = height
                .checked_add(1)
                .and_then(|next_height| self.rollapps.find_state_info_by_height(rollapp_id, next_height))
            else {
                continue;
            };
            let Some(consensus_state) = self.clients.consensus_state(client_id, consensus_height)?
            else {
                continue;
            };

            let rollapp_state = self.rollapp_state(&state_info, &next_state_info, height)?;
            check_compatibility(&IbcState::from(&consensus_state), &rollapp_state).map_err(
                |source| CanonicalClientError::IncompatibleConsensusState {
                    client_id: client_id.to_string(),
                    height,
                    source,
                },
            )?;
            matched = true;
        }

        if matched {
            Ok(())
        } else {
            Err(CanonicalClientError::NoMatchingConsensusState(
                client_id.to_string(),
            ))
        }
    }

    /// The first client, in store order, that qualifies as canonical client of `rollapp_id`
    /// # Errors
    /// Returns an error if the client store cannot be read
    pub fn get_prospective_canonical_client(
        &self,
        rollapp_id: &str,
        max_height: u64,
    ) -> Result<Option<String>, CanonicalClientError> {
        for (client_id, client_state) in self.clients.client_states()? {
            if client_state.client_type() != TENDERMINT_CLIENT_TYPE {
                continue;
            }
            match self.validate_candidate(&client_id, &client_state, rollapp_id, max_height) {
                Ok(()) => return Ok(Some(client_id)),
                Err(reason) => tracing::debug!(
                    rollapp_id,
                    client_id = %client_id,
                    %reason,
                    "client does not qualify as canonical client"
                ),
            }
        }
        Ok(None)
    }
}
