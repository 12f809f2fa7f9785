//! Error types for the rollapp light client logic

use thiserror::Error;

/// Reasons a light client consensus state disagrees with the rollapp's own state.
///
/// The checks are fail-fast: exactly one variant is reported per comparison.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompatibilityError {
    /// The consensus state root differs from the block descriptor state root
    #[error("state roots mismatch: block descriptor state root does not match tendermint header app hash")]
    StateRootMismatch,

    /// The validator set that signed the header is not the sequencer of the block
    #[error("signer mismatch: validator who signed the block header is not the sequencer who submitted the block")]
    SignerMismatch,

    /// The next validators hash is not derived from the sequencer of the next block
    #[error("next validator mismatch: next validators hash does not match the sequencer for h+1")]
    NextValidatorMismatch,

    /// Neither side carries a block timestamp
    #[error("timestamp not found: block descriptors do not contain block timestamp")]
    TimestampNotFound,

    /// The timestamps differ, or only one side carries one
    #[error("timestamp mismatch: block descriptor timestamp does not match tendermint header timestamp")]
    TimestampMismatch,
}

/// The field of a tendermint client state that deviates from the canonical requirements.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamsError {
    /// Trust level differs
    #[error("trust level")]
    TrustLevel,

    /// Trusting period differs
    #[error("trusting period")]
    TrustingPeriod,

    /// Unbonding period differs
    #[error("unbonding period")]
    UnbondingPeriod,

    /// Max clock drift differs
    #[error("max clock drift")]
    MaxClockDrift,

    /// The client is frozen
    #[error("frozen height")]
    FrozenHeight,

    /// Proof specs differ
    #[error("proof specs")]
    ProofSpecs,

    /// Upgrade path differs
    #[error("upgrade path")]
    UpgradePath,

    /// A deprecated `allow_update_after_*` flag is set
    #[error("allow update after {0}")]
    AllowUpdate(&'static str),
}
