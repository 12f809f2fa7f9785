//! Two-phase registration of a canonical client at client creation time.
//!
//! Before a client creation executes, [`Keeper::begin_canonical_registration`]
//! decides whether the client about to be created qualifies and remembers the
//! identifier it will receive. After the creation,
//! [`Keeper::confirm_canonical_registration`] writes the registry entry if the
//! creation went through.

use std::collections::BTreeMap;

use rollapp_light_client::{
    check_compatibility, client_state::TENDERMINT_CLIENT_TYPE, IbcState,
};

use crate::{
    error::CanonicalClientError,
    expected::{Host, LightClientStore, RollappDirectory},
    keeper::Keeper,
    msgs::CreateClientMsg,
};

/// Candidate client identifiers of the current transaction, keyed by rollapp
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PendingRegistrations {
    candidates: BTreeMap<String, String>,
}

impl PendingRegistrations {
    /// No pending registration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The candidate client id of `rollapp_id`
    #[must_use]
    pub fn get(&self, rollapp_id: &str) -> Option<&str> {
        self.candidates.get(rollapp_id).map(String::as_str)
    }

    /// Whether nothing is pending
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    fn insert(&mut self, rollapp_id: String, client_id: String) {
        self.candidates.insert(rollapp_id, client_id);
    }

    fn remove(&mut self, rollapp_id: &str) -> Option<String> {
        self.candidates.remove(rollapp_id)
    }
}

impl<H: Host> Keeper<H> {
    /// Records the identifier of the client `msg` will create if that client qualifies as canonical.
    ///
    /// A client that does not qualify is not an error, the creation itself goes ahead.
    pub fn begin_canonical_registration(
        &self,
        pending: &mut PendingRegistrations,
        msg: &CreateClientMsg,
    ) {
        if !self.config.enabled {
            return;
        }

        match self.prospective_registration(msg) {
            Ok((rollapp_id, client_id)) => {
                tracing::debug!(
                    rollapp_id = %rollapp_id,
                    client_id = %client_id,
                    "created client is a canonical client candidate"
                );
                pending.insert(rollapp_id, client_id);
            }
            Err(reason) => {
                tracing::debug!(%reason, "created client is not a canonical client candidate");
            }
        }
    }

    fn prospective_registration(
        &self,
        msg: &CreateClientMsg,
    ) -> Result<(String, String), CanonicalClientError> {
        let client_id = self.clients.next_client_id(msg.client_state.client_type());
        let client_state = msg
            .client_state
            .as_tendermint()
            .ok_or_else(|| CanonicalClientError::InvalidClientType(client_id.clone()))?;
        let rollapp_id = client_state.chain_id.clone();

        if self.rollapps.get_rollapp(&rollapp_id).is_none() {
            return Err(CanonicalClientError::RollappNotFound(rollapp_id));
        }
        if self.get_canonical_client(&rollapp_id).is_some() {
            return Err(CanonicalClientError::CanonicalClientExists(rollapp_id));
        }

        self.validate_canonical_client_params(&client_id, &msg.client_state, &rollapp_id)?;

        let height = client_state.latest_height.revision_height;
        let state_info = self
            .rollapps
            .find_state_info_by_height(&rollapp_id, height)
            .ok_or_else(|| CanonicalClientError::StateInfoNotFound {
                rollapp_id: rollapp_id.clone(),
                height,
            })?;
        let next_height = height
            .checked_add(1)
            .ok_or(CanonicalClientError::HeightOverflow(height))?;
        let next_state_info = self
            .rollapps
            .find_state_info_by_height(&rollapp_id, next_height)
            .ok_or_else(|| CanonicalClientError::StateInfoNotFound {
                rollapp_id: rollapp_id.clone(),
                height: next_height,
            })?;

        let rollapp_state = self.rollapp_state(&state_info, &next_state_info, height)?;
        check_compatibility(&IbcState::from(&msg.consensus_state), &rollapp_state).map_err(
            |source| CanonicalClientError::IncompatibleConsensusState {
                client_id: client_id.clone(),
                height,
                source,
            },
        )?;

        Ok((rollapp_id, client_id))
    }

    /// Registers the candidate recorded for `msg` once the client creation has run.
    ///
    /// The pending entry is consumed whatever the outcome, so a second call is a no-op.
    /// # Errors
    /// Returns an error if the client store cannot be read
    pub fn confirm_canonical_registration(
        &mut self,
        pending: &mut PendingRegistrations,
        msg: &CreateClientMsg,
        created: bool,
    ) -> Result<(), CanonicalClientError> {
        let Some(client_state) = msg.client_state.as_tendermint() else {
            return Ok(());
        };
        let rollapp_id = client_state.chain_id.as_str();
        let Some(client_id) = pending.remove(rollapp_id) else {
            return Ok(());
        };

        if !created {
            tracing::debug!(rollapp_id, client_id = %client_id, "client creation failed, candidate dropped");
            return Ok(());
        }
        match self.clients.client_state(&client_id)? {
            Some(created) if created.client_type() == TENDERMINT_CLIENT_TYPE => {}
            _ => {
                tracing::warn!(rollapp_id, client_id = %client_id, "candidate client was not created");
                return Ok(());
            }
        }
        if let Some(existing) = self.get_canonical_client(rollapp_id) {
            tracing::debug!(rollapp_id, existing = %existing, "canonical client already set");
            return Ok(());
        }

        self.set_canonical_client(rollapp_id, &client_id);
        tracing::info!(rollapp_id, client_id = %client_id, "canonical client set at creation");
        Ok(())
    }
}
