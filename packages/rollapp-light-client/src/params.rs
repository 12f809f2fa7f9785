//! The parameters a tendermint client must carry to be a rollapp's canonical client

use std::time::Duration;

use ics23::ProofSpec;
use serde::{Deserialize, Serialize};

use crate::{
    client_state::{ClientState, Height, TrustThreshold},
    error::ParamsError,
};

/// Default trusting period (10 days)
pub const DEFAULT_TRUSTING_PERIOD: Duration = Duration::from_secs(60 * 60 * 24 * 10);
/// Default rollapp unbonding period (21 days)
pub const DEFAULT_UNBONDING_PERIOD: Duration = Duration::from_secs(60 * 60 * 24 * 21);
/// Default max clock drift (70 minutes)
pub const DEFAULT_MAX_CLOCK_DRIFT: Duration = Duration::from_secs(60 * 70);

/// The upgrade path used by chains running the default cosmos-sdk upgrade module
#[must_use]
pub fn default_upgrade_path() -> Vec<String> {
    vec!["upgrade".to_string(), "upgradedIBCState".to_string()]
}

/// The ICS-23 proof specs of a cosmos-sdk chain
#[must_use]
pub fn sdk_proof_specs() -> Vec<ProofSpec> {
    vec![ics23::iavl_spec(), ics23::tendermint_spec()]
}

/// The configurable part of the canonical client requirements.
///
/// Trust level, proof specs, upgrade path and the deprecated update flags are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedClientParams {
    /// Required trusting period
    #[serde(default = "default_trusting_period")]
    pub trusting_period: Duration,
    /// Required unbonding period, the rollapp sequencer unbonding period
    #[serde(default = "default_unbonding_period")]
    pub unbonding_period: Duration,
    /// Required max clock drift
    #[serde(default = "default_max_clock_drift")]
    pub max_clock_drift: Duration,
}

const fn default_trusting_period() -> Duration {
    DEFAULT_TRUSTING_PERIOD
}

const fn default_unbonding_period() -> Duration {
    DEFAULT_UNBONDING_PERIOD
}

const fn default_max_clock_drift() -> Duration {
    DEFAULT_MAX_CLOCK_DRIFT
}

impl Default for ExpectedClientParams {
    fn default() -> Self {
        Self {
            trusting_period: DEFAULT_TRUSTING_PERIOD,
            unbonding_period: DEFAULT_UNBONDING_PERIOD,
            max_clock_drift: DEFAULT_MAX_CLOCK_DRIFT,
        }
    }
}

impl ExpectedClientParams {
    /// A client state carrying exactly the canonical parameters
    #[must_use]
    pub fn expected_client_state(&self, chain_id: &str, latest_height: Height) -> ClientState {
        ClientState {
            chain_id: chain_id.to_string(),
            trust_level: TrustThreshold::ONE,
            trusting_period: self.trusting_period,
            unbonding_period: self.unbonding_period,
            max_clock_drift: self.max_clock_drift,
            frozen_height: Height::zero(),
            latest_height,
            proof_specs: sdk_proof_specs(),
            upgrade_path: default_upgrade_path(),
            allow_update_after_expiry: false,
            allow_update_after_misbehaviour: false,
        }
    }

    /// Checks that `got` carries the canonical parameters.
    ///
    /// Chain id and latest height are not checked, they vary per client.
    /// # Errors
    /// Returns the first parameter that deviates.
    pub fn validate(&self, got: &ClientState) -> Result<(), ParamsError> {
        if got.trust_level != TrustThreshold::ONE {
            return Err(ParamsError::TrustLevel);
        }
        if got.trusting_period != self.trusting_period {
            return Err(ParamsError::TrustingPeriod);
        }
        if got.unbonding_period != self.unbonding_period {
            return Err(ParamsError::UnbondingPeriod);
        }
        if got.max_clock_drift != self.max_clock_drift {
            return Err(ParamsError::MaxClockDrift);
        }
        if got.is_frozen() {
            return Err(ParamsError::FrozenHeight);
        }
        if got.proof_specs != sdk_proof_specs() {
            return Err(ParamsError::ProofSpecs);
        }
        if got.upgrade_path != default_upgrade_path() {
            return Err(ParamsError::UpgradePath);
        }
        if got.allow_update_after_expiry {
            return Err(ParamsError::AllowUpdate("expiry"));
        }
        if got.allow_update_after_misbehaviour {
            return Err(ParamsError::AllowUpdate("misbehaviour"));
        }
        Ok(())
    }
}
