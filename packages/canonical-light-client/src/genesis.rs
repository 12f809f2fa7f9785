//! Genesis import and export of the keeper's own state

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
    error::CanonicalClientError,
    expected::Host,
    keeper::Keeper,
    state::{self, CanonicalClient, ConsensusStateSigner},
};

/// Everything the keeper persists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    /// The registry
    #[serde(default)]
    pub canonical_clients: Vec<CanonicalClient>,
    /// Signers of optimistically accepted headers not reconciled yet
    #[serde(default)]
    pub consensus_state_signers: Vec<ConsensusStateSigner>,
    /// Rollapps with a hard fork in progress
    #[serde(default)]
    pub hard_fork_rollapps: Vec<String>,
}

impl GenesisState {
    /// Checks that the registry is a bijection and that no record is duplicated
    /// # Errors
    /// Returns [`CanonicalClientError::InvalidGenesis`] naming the first offending entry
    pub fn validate(&self) -> Result<(), CanonicalClientError> {
        let mut rollapps = BTreeSet::new();
        let mut clients = BTreeSet::new();
        for entry in &self.canonical_clients {
            if entry.rollapp_id.is_empty() || entry.client_id.is_empty() {
                return Err(CanonicalClientError::InvalidGenesis(
                    "empty canonical client entry".to_string(),
                ));
            }
            if !rollapps.insert(entry.rollapp_id.as_str()) {
                return Err(CanonicalClientError::InvalidGenesis(format!(
                    "duplicate rollapp {}",
                    entry.rollapp_id
                )));
            }
            if !clients.insert(entry.client_id.as_str()) {
                return Err(CanonicalClientError::InvalidGenesis(format!(
                    "duplicate client {}",
                    entry.client_id
                )));
            }
        }

        let mut signers = BTreeSet::new();
        for record in &self.consensus_state_signers {
            if record.signer.is_empty() {
                return Err(CanonicalClientError::InvalidGenesis(format!(
                    "empty signer for client {} at height {}",
                    record.client_id, record.height
                )));
            }
            if !signers.insert((record.client_id.as_str(), record.height)) {
                return Err(CanonicalClientError::InvalidGenesis(format!(
                    "duplicate signer for client {} at height {}",
                    record.client_id, record.height
                )));
            }
        }

        let mut forks = BTreeSet::new();
        for rollapp_id in &self.hard_fork_rollapps {
            if !forks.insert(rollapp_id.as_str()) {
                return Err(CanonicalClientError::InvalidGenesis(format!(
                    "duplicate hard fork of rollapp {rollapp_id}"
                )));
            }
        }

        Ok(())
    }
}

impl<H: Host> Keeper<H> {
    /// Loads `genesis` into the keeper's store
    /// # Errors
    /// Returns an error if `genesis` does not validate
    pub fn init_genesis(&mut self, genesis: &GenesisState) -> Result<(), CanonicalClientError> {
        genesis.validate()?;

        for entry in &genesis.canonical_clients {
            state::set_canonical_client(&mut self.storage, &entry.rollapp_id, &entry.client_id);
        }
        for record in &genesis.consensus_state_signers {
            state::save_signer(
                &mut self.storage,
                &record.client_id,
                record.height,
                &record.signer,
            );
        }
        for rollapp_id in &genesis.hard_fork_rollapps {
            state::set_hard_fork_in_progress(&mut self.storage, rollapp_id);
        }
        Ok(())
    }

    /// Dumps the keeper's store
    /// # Errors
    /// Returns an error if the store is corrupted
    pub fn export_genesis(&self) -> Result<GenesisState, CanonicalClientError> {
        Ok(GenesisState {
            canonical_clients: self.get_all_canonical_clients(),
            consensus_state_signers: self.get_all_signers()?,
            hard_fork_rollapps: state::get_all_hard_forks(&self.storage),
        })
    }
}
