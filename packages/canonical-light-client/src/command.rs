//! The explicit canonical client assignment command

use crate::{
    error::CanonicalClientError,
    expected::{Host, LightClientStore, RollappDirectory},
    keeper::Keeper,
    msgs::SetCanonicalClientMsg,
};

impl<H: Host> Keeper<H> {
    /// Makes a client canonical without looking at its consensus history.
    ///
    /// Only the configured authority may issue the command, and the client must
    /// still carry the canonical parameters.
    /// # Errors
    /// Returns an error if the signer is not the authority, or if either side of
    /// the assignment is unknown, already assigned or ineligible
    pub fn handle_set_canonical_client(
        &mut self,
        msg: &SetCanonicalClientMsg,
    ) -> Result<(), CanonicalClientError> {
        if msg.signer != self.config.authority {
            return Err(CanonicalClientError::Unauthorized);
        }
        if self.rollapps.get_rollapp(&msg.rollapp_id).is_none() {
            return Err(CanonicalClientError::RollappNotFound(msg.rollapp_id.clone()));
        }
        if self.get_canonical_client(&msg.rollapp_id).is_some() {
            return Err(CanonicalClientError::CanonicalClientExists(
                msg.rollapp_id.clone(),
            ));
        }
        if let Some(rollapp_id) = self.get_rollapp_for_client(&msg.client_id) {
            return Err(CanonicalClientError::ClientAlreadyCanonical {
                client_id: msg.client_id.clone(),
                rollapp_id,
            });
        }

        let client_state = self
            .clients
            .client_state(&msg.client_id)?
            .ok_or_else(|| CanonicalClientError::ClientStateNotFound(msg.client_id.clone()))?;
        self.validate_canonical_client_params(&msg.client_id, &client_state, &msg.rollapp_id)?;

        self.set_canonical_client(&msg.rollapp_id, &msg.client_id);
        tracing::info!(
            rollapp_id = %msg.rollapp_id,
            client_id = %msg.client_id,
            "canonical client set by command"
        );
        Ok(())
    }
}
