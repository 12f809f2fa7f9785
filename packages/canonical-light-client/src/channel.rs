//! Guard against binding a second channel to a rollapp over its canonical client

use crate::{
    error::CanonicalClientError,
    expected::{ChannelDirectory, Host, RollappDirectory},
    keeper::Keeper,
    msgs::ChannelOpenAckMsg,
};

impl<H: Host> Keeper<H> {
    /// Rejects a channel handshake over a canonical client whose rollapp already has a channel.
    ///
    /// The guard never binds a channel itself.
    /// # Errors
    /// Returns [`CanonicalClientError::ChannelAlreadyExists`] if the rollapp is already bound
    pub fn handle_channel_open_ack(&self, msg: &ChannelOpenAckMsg) -> Result<(), CanonicalClientError> {
        if !self.config.enabled {
            return Ok(());
        }
        let Some(connection) = self.channels.channel_connection(&msg.port_id, &msg.channel_id) else {
            return Ok(());
        };
        let Some(rollapp_id) = self.get_rollapp_for_client(&connection.client_id) else {
            return Ok(());
        };

        let rollapp = self
            .rollapps
            .get_rollapp(&rollapp_id)
            .ok_or_else(|| CanonicalClientError::RollappNotFound(rollapp_id.clone()))?;
        if let Some(channel_id) = rollapp.channel_id {
            tracing::debug!(
                rollapp_id = %rollapp_id,
                connection_id = %connection.connection_id,
                channel_id = %msg.channel_id,
                "second channel over canonical client rejected"
            );
            return Err(CanonicalClientError::ChannelAlreadyExists {
                rollapp_id,
                channel_id,
            });
        }
        Ok(())
    }
}
