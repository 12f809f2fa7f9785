//! Defines the keeper configuration.

use rollapp_light_client::params::ExpectedClientParams;

use crate::error::CanonicalClientError;

/// The configuration of the canonical client keeper.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[allow(clippy::module_name_repetitions)]
pub struct CanonicalClientConfig {
    /// Whether the keeper reacts to IBC messages and rollapp events.
    /// Explicit commands and queries work regardless.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// The only signer allowed to set a canonical client by command.
    pub authority: String,
    /// The parameters a canonical client must carry.
    #[serde(default)]
    pub expected_client: ExpectedClientParams,
}

/// Returns true, used as a default value for boolean fields.
const fn default_true() -> bool {
    true
}

impl CanonicalClientConfig {
    /// An enabled configuration with default client parameters.
    #[must_use]
    pub fn new(authority: impl Into<String>) -> Self {
        Self {
            enabled: true,
            authority: authority.into(),
            expected_client: ExpectedClientParams::default(),
        }
    }
}

/// Reads the keeper configuration from the host's JSON config section.
///
/// # Errors
/// Returns [`CanonicalClientError::InvalidConfig`] naming the offending field.
pub fn parse_config(value: serde_json::Value) -> Result<CanonicalClientConfig, CanonicalClientError> {
    let config: CanonicalClientConfig =
        serde_path_to_error::deserialize(value).map_err(|err| CanonicalClientError::InvalidConfig {
            path: err.path().to_string(),
            source: err.into_inner(),
        })?;
    if config.authority.is_empty() {
        return Err(CanonicalClientError::InvalidConfig {
            path: "authority".to_string(),
            source: serde::de::Error::custom("authority must not be empty"),
        });
    }
    tracing::debug!(
        enabled = config.enabled,
        authority = %config.authority,
        "canonical client keeper configured"
    );
    Ok(config)
}
