//! Token issuance configuration.
//!
//! # Example (TOML)
//!
//! ```toml
//! [oauth]
//! token_expiration = "10m"
//! refresh_token_lifetime = "90d"
//! authorization_code_lifetime = "10m"
//! grant_types = ["authorization_code", "client_credentials", "refresh_token"]
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::types::GrantType;

/// Longest lifetime accepted for any token or grant code (10 years).
pub const MAX_LIFETIME: Duration = Duration::from_secs(10 * 365 * 24 * 3600);

/// Settings the token endpoint is built with.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct IssuerConfig {
    /// Access token lifetime, reported to clients as `expires_in`.
    #[serde(with = "humantime_serde")]
    pub token_expiration: Duration,

    /// Refresh token lifetime.
    /// Can be longer since refresh tokens require client authentication.
    #[serde(with = "humantime_serde")]
    pub refresh_token_lifetime: Duration,

    /// Lifetime of grant codes minted for the authorization code flow.
    #[serde(with = "humantime_serde")]
    pub authorization_code_lifetime: Duration,

    /// Grant types the token endpoint accepts.
    pub grant_types: Vec<GrantType>,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            token_expiration: Duration::from_secs(600), // 10 minutes
            refresh_token_lifetime: Duration::from_secs(90 * 24 * 3600), // 90 days
            authorization_code_lifetime: Duration::from_secs(600), // 10 minutes
            grant_types: GrantType::ALL.to_vec(),
        }
    }
}

impl IssuerConfig {
    /// Returns `true` if the grant type is enabled.
    #[must_use]
    pub fn is_grant_enabled(&self, grant_type: GrantType) -> bool {
        self.grant_types.contains(&grant_type)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - A lifetime is zero or the access token lifetime is under a second
    /// - A lifetime exceeds [`MAX_LIFETIME`]
    /// - No grant type is enabled
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token_expiration.as_secs() == 0 {
            return Err(ConfigError::InvalidValue(
                "token_expiration must be at least one second".to_string(),
            ));
        }

        if self.refresh_token_lifetime.is_zero() {
            return Err(ConfigError::InvalidValue(
                "refresh_token_lifetime must be > 0".to_string(),
            ));
        }

        if self.authorization_code_lifetime.is_zero() {
            return Err(ConfigError::InvalidValue(
                "authorization_code_lifetime must be > 0".to_string(),
            ));
        }

        for (name, lifetime) in [
            ("token_expiration", self.token_expiration),
            ("refresh_token_lifetime", self.refresh_token_lifetime),
            ("authorization_code_lifetime", self.authorization_code_lifetime),
        ] {
            if lifetime > MAX_LIFETIME {
                return Err(ConfigError::InvalidValue(format!(
                    "{name} must not exceed 10 years"
                )));
            }
        }

        if self.grant_types.is_empty() {
            return Err(ConfigError::Missing(
                "at least one grant type must be enabled".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}
