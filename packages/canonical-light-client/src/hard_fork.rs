//! Rollback of a canonical client when its rollapp hard forks, and its re-anchoring afterwards

use cosmwasm_std::Order;
use rollapp_light_client::{
    sequencer::validator_set_hash, AnyClientState, ConsensusState, Height, StateInfo, StateStatus,
};

use crate::{
    error::CanonicalClientError,
    expected::{BlockEnv, ConsensusMetadata, Host, LightClientStore, RollappDirectory, SequencerDirectory},
    keeper::Keeper,
    state,
};

impl<H: Host> Keeper<H> {
    /// Freezes the canonical client of `rollapp_id` at `rollback_height` and purges everything above.
    ///
    /// Ordinary updates of the client are rejected until the fork is resolved.
    /// A rollapp without canonical client has nothing to roll back.
    /// # Errors
    /// Returns an error if the canonical client is missing from the client store
    pub fn rollback_canonical_client(
        &mut self,
        rollapp_id: &str,
        rollback_height: u64,
    ) -> Result<(), CanonicalClientError> {
        let Some(client_id) = self.get_canonical_client(rollapp_id) else {
            tracing::info!(rollapp_id, rollback_height, "hard fork without canonical client");
            return Ok(());
        };
        let mut client_state = self.tendermint_client_state(&client_id)?;

        let heights = self
            .clients
            .consensus_state_heights(&client_id, Order::Ascending)?;
        let (kept, purged): (Vec<Height>, Vec<Height>) = heights
            .into_iter()
            .partition(|height| height.revision_height < rollback_height);

        for height in &purged {
            self.clients.delete_consensus_state(&client_id, *height);
            self.clients.delete_consensus_metadata(&client_id, *height);
            state::remove_signer(&mut self.storage, &client_id, height.revision_height);
        }
        state::remove_signer(&mut self.storage, &client_id, rollback_height);

        let revision_number = client_state.latest_height.revision_number;
        client_state.frozen_height = Height::new(revision_number, rollback_height);
        client_state.latest_height = kept
            .last()
            .copied()
            .unwrap_or_else(|| Height::new(revision_number, 0));
        self.clients
            .set_client_state(&client_id, &AnyClientState::Tendermint(client_state))?;

        state::set_hard_fork_in_progress(&mut self.storage, rollapp_id);
        tracing::info!(
            rollapp_id,
            client_id = %client_id,
            rollback_height,
            purged = purged.len(),
            "canonical client rolled back"
        );
        Ok(())
    }

    /// Re-anchors the canonical client on the rollapp's latest finalized state and ends the hard fork
    /// # Errors
    /// Returns an error if the latest state info is not finalized, if no proposer is
    /// designated or if the latest block descriptor carries no timestamp
    pub fn resolve_hard_fork(
        &mut self,
        rollapp_id: &str,
        env: &BlockEnv,
    ) -> Result<(), CanonicalClientError> {
        let client_id = self
            .get_canonical_client(rollapp_id)
            .ok_or_else(|| CanonicalClientError::CanonicalClientNotFound(rollapp_id.to_string()))?;
        let state_info = self
            .rollapps
            .get_latest_state_info(rollapp_id)
            .filter(|state_info| state_info.status == StateStatus::Finalized)
            .ok_or_else(|| CanonicalClientError::NoFinalizedStateInfo(rollapp_id.to_string()))?;

        self.resolve_with(rollapp_id, &client_id, &state_info, env)
    }

    /// Resolves the fork once a finalized state info reaches the rollback height
    pub(crate) fn resolve_hard_fork_on_finalization(
        &mut self,
        rollapp_id: &str,
        client_id: &str,
        state_info: &StateInfo,
        env: &BlockEnv,
    ) -> Result<(), CanonicalClientError> {
        let client_state = self.tendermint_client_state(client_id)?;
        if state_info.latest_height() < client_state.frozen_height.revision_height {
            tracing::debug!(
                rollapp_id,
                latest_height = state_info.latest_height(),
                rollback_height = client_state.frozen_height.revision_height,
                "hard fork not yet resolvable"
            );
            return Ok(());
        }

        match self.resolve_with(rollapp_id, client_id, state_info, env) {
            Err(
                err @ (CanonicalClientError::NoActiveProposer(_)
                | CanonicalClientError::MissingTimestamp { .. }
                | CanonicalClientError::SequencerNotFound(_)
                | CanonicalClientError::BlockDescriptorNotFound { .. }),
            ) => {
                tracing::warn!(rollapp_id, %err, "hard fork resolution postponed");
                Ok(())
            }
            result => result,
        }
    }

    fn resolve_with(
        &mut self,
        rollapp_id: &str,
        client_id: &str,
        state_info: &StateInfo,
        env: &BlockEnv,
    ) -> Result<(), CanonicalClientError> {
        let block_descriptor = state_info.last_block_descriptor().ok_or_else(|| {
            CanonicalClientError::BlockDescriptorNotFound {
                rollapp_id: rollapp_id.to_string(),
                height: state_info.latest_height(),
            }
        })?;
        let timestamp =
            block_descriptor
                .timestamp
                .ok_or_else(|| CanonicalClientError::MissingTimestamp {
                    rollapp_id: rollapp_id.to_string(),
                    height: block_descriptor.height,
                })?;
        let proposer = self
            .sequencers
            .proposer(rollapp_id)
            .ok_or_else(|| CanonicalClientError::NoActiveProposer(rollapp_id.to_string()))?;
        let signer = self.sequencer_pub_key(&state_info.sequencer)?;

        let mut client_state = self.tendermint_client_state(client_id)?;
        let height = Height::new(
            client_state.latest_height.revision_number,
            block_descriptor.height,
        );
        client_state.frozen_height = Height::zero();
        client_state.latest_height = height;

        let consensus_state = ConsensusState {
            timestamp,
            root: block_descriptor.state_root.clone(),
            validators_hash: validator_set_hash(&signer),
            next_validators_hash: validator_set_hash(&proposer.pub_key),
        };
        let metadata = ConsensusMetadata {
            processed_time: env.time,
            processed_height: Height::new(0, env.height),
        };

        self.clients
            .set_client_state(client_id, &AnyClientState::Tendermint(client_state))?;
        self.clients
            .set_consensus_state(client_id, height, &consensus_state)?;
        self.clients
            .set_consensus_metadata(client_id, height, &metadata)?;
        state::clear_hard_fork(&mut self.storage, rollapp_id);

        tracing::info!(
            rollapp_id,
            client_id,
            height = block_descriptor.height,
            proposer = %proposer.address,
            "hard fork resolved"
        );
        Ok(())
    }
}
