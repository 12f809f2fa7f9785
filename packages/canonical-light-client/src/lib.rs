#![doc = include_str!("../README.md")]
#![deny(missing_docs, clippy::nursery, clippy::pedantic, warnings)]

pub mod channel;
pub mod command;
pub mod config;
pub mod error;
pub mod expected;
pub mod fraud;
pub mod genesis;
pub mod hard_fork;
pub mod hooks;
pub mod host;
pub mod invariants;
pub mod keeper;
pub mod msgs;
pub mod registration;
pub mod state;
pub mod update_client;

pub use config::{parse_config, CanonicalClientConfig};
pub use error::{CanonicalClientError, ClientStoreError};
pub use expected::{
    BlockEnv, ChannelDirectory, ConnectionEnd, ConsensusMetadata, Host, LightClientStore,
    RollappDirectory, Sequencer, SequencerDirectory,
};
pub use genesis::GenesisState;
pub use host::HostClientStore;
pub use keeper::Keeper;
pub use registration::PendingRegistrations;
pub use update_client::UpdateOutcome;
