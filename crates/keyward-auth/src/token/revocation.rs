//! Token revocation types (RFC 7009).
//!
//! # Request Format
//!
//! ```text
//! POST /oauth2/revoke
//! Content-Type: application/x-www-form-urlencoded
//! Authorization: Basic <client_credentials>
//!
//! token=<token_to_revoke>&token_type_hint=refresh_token
//! ```
//!
//! or, with the value in the path:
//!
//! ```text
//! DELETE /oauth2/tokens/<token_to_revoke>
//! Authorization: Basic <client_credentials>
//! ```
//!
//! # References
//!
//! - [RFC 7009 - OAuth 2.0 Token Revocation](https://tools.ietf.org/html/rfc7009)

use serde::{Deserialize, Serialize};

/// A revocation request after transport decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevocationEndpointRequest<'a> {
    /// Raw `Authorization` header value.
    pub authorization: Option<&'a str>,

    /// The value to revoke.
    pub token: Option<&'a str>,

    /// Which kind of value the client believes `token` is.
    pub token_type_hint: Option<TokenTypeHint>,
}

/// Token type hint for revocation requests.
///
/// Only changes the order in which the value is looked up; a wrong hint
/// never prevents revocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenTypeHint {
    /// The token is an access token.
    AccessToken,
    /// The token is a refresh token.
    RefreshToken,
}

impl TokenTypeHint {
    /// Returns the token type hint as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccessToken => "access_token",
            Self::RefreshToken => "refresh_token",
        }
    }

    /// Parses a hint. Unknown hints are ignored, as RFC 7009 Section 2.1
    /// allows the server to extend its search past them.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "access_token" => Some(Self::AccessToken),
            "refresh_token" => Some(Self::RefreshToken),
            _ => None,
        }
    }
}

impl std::fmt::Display for TokenTypeHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
