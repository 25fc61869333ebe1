//! Outcome of a token or revocation request, before HTTP rendering.

use tracing::{debug, error};

use crate::error::AuthError;
use crate::oauth::token::AuthzError;
use crate::types::Token;

/// What the endpoint answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointResponse {
    /// A token was issued (200).
    Token(Token),
    /// The revocation request was processed (200, empty body).
    Revoked,
    /// The request failed.
    Error(AuthzError),
}

impl EndpointResponse {
    /// Converts a failure into the response the client sees.
    ///
    /// Server-side failures are logged with their cause and replaced by a
    /// generic `server_error`.
    #[must_use]
    pub fn from_error(err: AuthError) -> Self {
        if err.is_server_error() {
            error!(error = %err, "Request failed");
        } else {
            debug!(error = %err, "Request rejected");
        }
        Self::Error(err.into_authz_error())
    }

    /// HTTP status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::Token(_) | Self::Revoked => 200,
            Self::Error(e) => e.http_status(),
        }
    }

    /// Returns `true` for a successful response.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Error(_))
    }
}

impl From<AuthError> for EndpointResponse {
    fn from(err: AuthError) -> Self {
        Self::from_error(err)
    }
}
