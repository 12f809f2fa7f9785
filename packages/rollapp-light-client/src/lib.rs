#![doc = include_str!("../README.md")]
#![deny(missing_docs, clippy::nursery, clippy::pedantic, warnings)]

pub mod client_state;
pub mod compatibility;
pub mod consensus_state;
pub mod error;
pub mod params;
pub mod rollapp;
pub mod sequencer;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use client_state::{AnyClientState, ClientState, Height, TrustThreshold};
pub use compatibility::{check_compatibility, IbcState, RollappState};
pub use consensus_state::ConsensusState;
pub use error::{CompatibilityError, ParamsError};
pub use rollapp::{BlockDescriptor, Rollapp, StateInfo, StateStatus};
