//! Store invariants of the keeper

use crate::{error::CanonicalClientError, expected::Host, keeper::Keeper, state};

impl<H: Host> Keeper<H> {
    /// Checks that both directions of the registry describe the same bijection
    /// # Errors
    /// Returns [`CanonicalClientError::InvariantBroken`] describing the first inconsistency
    pub fn canonical_clients_invariant(&self) -> Result<(), CanonicalClientError> {
        for entry in self.get_all_canonical_clients() {
            match self.get_rollapp_for_client(&entry.client_id) {
                Some(rollapp_id) if rollapp_id == entry.rollapp_id => {}
                found => {
                    return Err(CanonicalClientError::InvariantBroken(format!(
                        "rollapp {} maps to client {} which maps back to {found:?}",
                        entry.rollapp_id, entry.client_id
                    )))
                }
            }
        }

        for entry in state::get_all_client_rollapps(&self.storage) {
            match self.get_canonical_client(&entry.rollapp_id) {
                Some(client_id) if client_id == entry.client_id => {}
                found => {
                    return Err(CanonicalClientError::InvariantBroken(format!(
                        "client {} maps to rollapp {} which maps back to {found:?}",
                        entry.client_id, entry.rollapp_id
                    )))
                }
            }
        }

        Ok(())
    }
}
