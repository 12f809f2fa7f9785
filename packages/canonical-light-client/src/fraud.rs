//! Reconciliation of optimistically accepted headers once the rollapp state they claim is finalized

use rollapp_light_client::{check_compatibility, CompatibilityError, IbcState, StateInfo};

use crate::{
    error::CanonicalClientError,
    expected::{BlockEnv, Host, LightClientStore, RollappDirectory},
    keeper::Keeper,
};

impl<H: Host> Keeper<H> {
    /// Promotes a canonical client if the rollapp has none yet, otherwise checks
    /// every optimistic header the finalized `state_info` makes verifiable and reports fraud.
    pub(crate) fn reconcile_finalized_state(
        &mut self,
        state_info: &StateInfo,
        env: &BlockEnv,
    ) -> Result<(), CanonicalClientError> {
        if !self.config.enabled {
            return Ok(());
        }
        let rollapp_id = state_info.rollapp_id.as_str();

        let Some(client_id) = self.get_canonical_client(rollapp_id) else {
            self.promote_canonical_client(rollapp_id, state_info.latest_height().saturating_sub(1));
            return Ok(());
        };

        self.reconcile_signers(rollapp_id, &client_id, state_info)?;

        // records at and above the rollback height are purged, the ones below are settled first
        if self.is_hard_forking(rollapp_id) {
            self.resolve_hard_fork_on_finalization(rollapp_id, &client_id, state_info, env)?;
        }

        Ok(())
    }

    /// Reconciles every height `state_info` makes verifiable, including the last height of the previous range
    fn reconcile_signers(
        &mut self,
        rollapp_id: &str,
        client_id: &str,
        state_info: &StateInfo,
    ) -> Result<(), CanonicalClientError> {
        let latest_height = state_info.latest_height();
        for height in state_info.start_height..latest_height {
            self.reconcile_signer(rollapp_id, client_id, height, state_info, state_info);
        }

        if state_info.start_height > 1 {
            let height = state_info.start_height - 1;
            let previous = self
                .rollapps
                .find_state_info_by_height(rollapp_id, height)
                .ok_or_else(|| CanonicalClientError::StateInfoNotFound {
                    rollapp_id: rollapp_id.to_string(),
                    height,
                })?;
            self.reconcile_signer(rollapp_id, client_id, height, &previous, state_info);
        }

        Ok(())
    }

    fn promote_canonical_client(&mut self, rollapp_id: &str, max_height: u64) {
        match self.get_prospective_canonical_client(rollapp_id, max_height) {
            Ok(Some(client_id)) => {
                self.set_canonical_client(rollapp_id, &client_id);
                tracing::info!(rollapp_id, client_id = %client_id, "canonical client set retroactively");
            }
            Ok(None) => {
                tracing::debug!(rollapp_id, max_height, "no canonical client candidate");
            }
            Err(err) => {
                tracing::warn!(rollapp_id, %err, "canonical client discovery failed");
            }
        }
    }

    /// Checks the header recorded at `height`, if any, and deletes the record
    fn reconcile_signer(
        &mut self,
        rollapp_id: &str,
        client_id: &str,
        height: u64,
        state_info: &StateInfo,
        next_state_info: &StateInfo,
    ) {
        let Some(signer_hash) = self.get_signer(client_id, height) else {
            return;
        };

        let verdict = self.verify_recorded_header(client_id, height, state_info, next_state_info);
        self.remove_signer(client_id, height);

        match verdict {
            Ok(None) => {}
            Ok(Some(mismatch)) => {
                self.report_fraud(rollapp_id, client_id, height, &signer_hash, &mismatch.to_string());
            }
            Err(err) => {
                tracing::error!(rollapp_id, client_id, height, %err, "optimistic update could not be verified");
            }
        }
    }

    fn verify_recorded_header(
        &self,
        client_id: &str,
        height: u64,
        state_info: &StateInfo,
        next_state_info: &StateInfo,
    ) -> Result<Option<CompatibilityError>, CanonicalClientError> {
        let consensus_height = self.consensus_height(client_id, height)?;
        let Some(consensus_state) = self.clients.consensus_state(client_id, consensus_height)?
        else {
            return Ok(None);
        };
        let rollapp_state = self.rollapp_state(state_info, next_state_info, height)?;
        Ok(check_compatibility(&IbcState::from(&consensus_state), &rollapp_state).err())
    }

    fn report_fraud(
        &mut self,
        rollapp_id: &str,
        client_id: &str,
        height: u64,
        signer_hash: &[u8],
        reason: &str,
    ) {
        let Some(signer) = self.sequencer_by_validators_hash(rollapp_id, signer_hash) else {
            tracing::error!(
                rollapp_id,
                client_id,
                height,
                signer = %hex::encode(signer_hash),
                reason,
                "fraud detected but signer is not a sequencer of the rollapp"
            );
            return;
        };

        tracing::info!(
            rollapp_id,
            client_id,
            height,
            signer = %signer.address,
            reason,
            "fraud detected on canonical client"
        );
        if let Err(err) = self
            .rollapps
            .handle_fraud(rollapp_id, client_id, height, &signer.address)
        {
            tracing::error!(rollapp_id, client_id, height, %err, "handle fraud");
        }
    }
}
