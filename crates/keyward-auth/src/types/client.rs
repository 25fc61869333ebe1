//! OAuth 2.0 client types.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::AuthError;

// =============================================================================
// Grant Types
// =============================================================================

/// OAuth 2.0 grant types understood by the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    /// Authorization Code flow (RFC 6749 Section 4.1).
    AuthorizationCode,
    /// Resource Owner Password Credentials flow (RFC 6749 Section 4.3).
    Password,
    /// Client Credentials flow (RFC 6749 Section 4.4).
    ClientCredentials,
    /// Refresh Token flow (RFC 6749 Section 6).
    RefreshToken,
}

impl GrantType {
    /// Every grant type, in the order they are advertised.
    pub const ALL: [GrantType; 4] = [
        Self::AuthorizationCode,
        Self::Password,
        Self::ClientCredentials,
        Self::RefreshToken,
    ];

    /// Returns the OAuth 2.0 grant_type parameter value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::Password => "password",
            Self::ClientCredentials => "client_credentials",
            Self::RefreshToken => "refresh_token",
        }
    }
}

impl std::fmt::Display for GrantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GrantType {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| AuthError::unsupported_grant_type(s))
    }
}

// =============================================================================
// Client
// =============================================================================

/// A registered OAuth 2.0 client.
///
/// Clients are owned by the [`Provider`](crate::storage::Provider); the
/// token endpoint only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Unique client identifier, the user-id half of HTTP Basic credentials.
    pub id: String,

    /// Human-readable display name.
    pub name: String,

    /// Detailed description of the client application.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Logo shown on consent screens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<Url>,

    /// Client home page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage_url: Option<Url>,

    /// The single registered redirect URI.
    pub redirect_url: Url,
}

impl Client {
    /// Creates a client with only the required attributes.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, redirect_url: Url) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            profile_image_url: None,
            homepage_url: None,
            redirect_url,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the home page.
    #[must_use]
    pub fn with_homepage_url(mut self, url: Url) -> Self {
        self.homepage_url = Some(url);
        self
    }

    /// Sets the logo.
    #[must_use]
    pub fn with_profile_image_url(mut self, url: Url) -> Self {
        self.profile_image_url = Some(url);
        self
    }
}
