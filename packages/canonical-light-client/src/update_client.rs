//! Guard run before every client update.
//!
//! Updates of clients that are not canonical pass through untouched. A header
//! for a canonical client is either checked against the rollapp's state right
//! away or, when that state is not known yet, accepted optimistically with its
//! signer recorded for later reconciliation.

use rollapp_light_client::{check_compatibility, IbcState};

use crate::{
    error::CanonicalClientError,
    expected::{Host, RollappDirectory},
    keeper::Keeper,
    msgs::{ClientMessage, UpdateClientMsg},
};

/// What the guard decided about a client update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Not a canonical client update, nothing was checked
    Ignored,
    /// The header agrees with the rollapp's state
    Accepted,
    /// The rollapp's state is not known yet, the signer was recorded
    Optimistic,
}

impl<H: Host> Keeper<H> {
    /// Checks an update of a canonical client against the rollapp's state
    /// # Errors
    /// Returns an error if the update must be rejected
    pub fn handle_update_client(
        &mut self,
        msg: &UpdateClientMsg,
    ) -> Result<UpdateOutcome, CanonicalClientError> {
        if !self.config.enabled {
            return Ok(UpdateOutcome::Ignored);
        }
        let Some(rollapp_id) = self.get_rollapp_for_client(&msg.client_id) else {
            return Ok(UpdateOutcome::Ignored);
        };

        let header = match &msg.client_message {
            ClientMessage::Header(header) => header,
            ClientMessage::Misbehaviour { .. } => {
                return Err(CanonicalClientError::MisbehaviourDisabled)
            }
            ClientMessage::Other => return Ok(UpdateOutcome::Ignored),
        };

        if self.is_hard_forking(&rollapp_id) {
            return Err(CanonicalClientError::HardForkInProgress { rollapp_id });
        }

        let rollapp = self
            .rollapps
            .get_rollapp(&rollapp_id)
            .ok_or_else(|| CanonicalClientError::RollappNotFound(rollapp_id.clone()))?;
        if header.app_revision != rollapp.revision_number {
            return Err(CanonicalClientError::RevisionMismatch {
                expected: rollapp.revision_number,
                actual: header.app_revision,
            });
        }

        let sequencer = self
            .sequencer_by_validators_hash(&rollapp_id, &header.validators_hash)
            .ok_or(CanonicalClientError::NotSequencerHeader)?;
        if !sequencer.bonded {
            return Err(CanonicalClientError::UnbondedSequencer(sequencer.address));
        }

        let height = header.height.revision_height;
        let next_height = height
            .checked_add(1)
            .ok_or(CanonicalClientError::HeightOverflow(height))?;
        let state_info = self.rollapps.find_state_info_by_height(&rollapp_id, height);
        let next_state_info = self
            .rollapps
            .find_state_info_by_height(&rollapp_id, next_height);
        let (Some(state_info), Some(next_state_info)) = (state_info, next_state_info) else {
            self.save_signer(&msg.client_id, height, &header.validators_hash);
            tracing::debug!(
                rollapp_id = %rollapp_id,
                client_id = %msg.client_id,
                height,
                signer = %sequencer.address,
                "canonical client update accepted optimistically"
            );
            return Ok(UpdateOutcome::Optimistic);
        };

        let rollapp_state = self.rollapp_state(&state_info, &next_state_info, height)?;
        check_compatibility(&IbcState::from(&header.consensus_state()), &rollapp_state).map_err(
            |source| CanonicalClientError::IncompatibleUpdate {
                client_id: msg.client_id.clone(),
                height,
                source,
            },
        )?;

        Ok(UpdateOutcome::Accepted)
    }
}
