//! Entry points called by the transaction pipeline and by the rollapp module.
//!
//! [`Keeper::pre_execute`] and [`Keeper::post_execute`] wrap the execution of
//! each message of a transaction and share a [`PendingRegistrations`] that
//! must not outlive the transaction.

use rollapp_light_client::StateInfo;

use crate::{
    error::CanonicalClientError,
    expected::{BlockEnv, Host},
    keeper::Keeper,
    msgs::Msg,
    registration::PendingRegistrations,
};

impl<H: Host> Keeper<H> {
    /// Runs before `msg` executes
    /// # Errors
    /// Returns an error if `msg` must not execute
    pub fn pre_execute(
        &mut self,
        pending: &mut PendingRegistrations,
        msg: &Msg,
    ) -> Result<(), CanonicalClientError> {
        match msg {
            Msg::CreateClient(create) => {
                self.begin_canonical_registration(pending, create);
                Ok(())
            }
            Msg::UpdateClient(update) => {
                let outcome = self.handle_update_client(update)?;
                tracing::trace!(client_id = %update.client_id, ?outcome, "client update checked");
                Ok(())
            }
            Msg::ChannelOpenAck(ack) => self.handle_channel_open_ack(ack),
            Msg::SetCanonicalClient(_) | Msg::Other => Ok(()),
        }
    }

    /// Runs after `msg` executed, `succeeded` telling whether the execution went through
    /// # Errors
    /// Returns an error if the stores cannot be read
    pub fn post_execute(
        &mut self,
        pending: &mut PendingRegistrations,
        msg: &Msg,
        succeeded: bool,
    ) -> Result<(), CanonicalClientError> {
        match msg {
            Msg::CreateClient(create) => {
                self.confirm_canonical_registration(pending, create, succeeded)
            }
            Msg::UpdateClient(_)
            | Msg::ChannelOpenAck(_)
            | Msg::SetCanonicalClient(_)
            | Msg::Other => Ok(()),
        }
    }

    /// Called by the rollapp module when a state update is finalized.
    ///
    /// Detected fraud is reported to the rollapp module and never fails the call.
    /// # Errors
    /// Returns an error if the state info preceding `state_info` is missing,
    /// or if the stores cannot be read
    pub fn on_state_finalized(
        &mut self,
        state_info: &StateInfo,
        env: &BlockEnv,
    ) -> Result<(), CanonicalClientError> {
        self.reconcile_finalized_state(state_info, env)
    }

    /// Called by the rollapp module when it rolls back to `rollback_height`
    /// # Errors
    /// See [`Keeper::rollback_canonical_client`]
    pub fn on_hard_fork(
        &mut self,
        rollapp_id: &str,
        rollback_height: u64,
    ) -> Result<(), CanonicalClientError> {
        self.rollback_canonical_client(rollapp_id, rollback_height)
    }
}
