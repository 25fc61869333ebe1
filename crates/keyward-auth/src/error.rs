//! Authorization server error types.
//!
//! Protocol failures (a bad grant, a missing parameter, an unauthenticated
//! client) travel as [`AuthError::Authz`] and are rendered verbatim to the
//! client. Everything else is a failure of the server or its storage and is
//! answered with a generic `server_error`.

use crate::oauth::token::{AuthzError, ErrorCode};

/// Errors that can occur while issuing or revoking tokens.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// An RFC 6749 protocol error, safe to show to the client.
    #[error(transparent)]
    Authz(#[from] AuthzError),

    /// An error occurred while storing or retrieving clients, codes or tokens.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// The server configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new protocol error.
    #[must_use]
    pub fn protocol(code: ErrorCode, description: impl Into<String>) -> Self {
        Self::Authz(AuthzError::with_description(code, description))
    }

    /// Creates a new `invalid_request` error.
    #[must_use]
    pub fn invalid_request(description: impl Into<String>) -> Self {
        Self::protocol(ErrorCode::InvalidRequest, description)
    }

    /// Creates a new `unauthorized_client` error.
    #[must_use]
    pub fn unauthorized_client(description: impl Into<String>) -> Self {
        Self::protocol(ErrorCode::UnauthorizedClient, description)
    }

    /// Creates a new `unsupported_grant_type` error.
    #[must_use]
    pub fn unsupported_grant_type(grant_type: impl Into<String>) -> Self {
        Self::protocol(
            ErrorCode::UnsupportedGrantType,
            format!("Grant type '{}' is not supported.", grant_type.into()),
        )
    }

    /// Creates a new `invalid_grant` error.
    #[must_use]
    pub fn invalid_grant(description: impl Into<String>) -> Self {
        Self::protocol(ErrorCode::InvalidGrant, description)
    }

    /// Creates a new `invalid_scope` error.
    #[must_use]
    pub fn invalid_scope(description: impl Into<String>) -> Self {
        Self::protocol(ErrorCode::InvalidScope, description)
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Authz(e) if e.http_status() < 500)
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }

    /// Returns the OAuth 2.0 error code for this error.
    #[must_use]
    pub fn oauth_error_code(&self) -> ErrorCode {
        match self {
            Self::Authz(e) => e.code,
            Self::Storage { .. } | Self::Configuration { .. } | Self::Internal { .. } => {
                ErrorCode::ServerError
            }
        }
    }

    /// Converts this error into the body sent to the client.
    ///
    /// Server-side failures collapse into a generic `server_error` so that
    /// storage details never leak.
    #[must_use]
    pub fn into_authz_error(self) -> AuthzError {
        match self {
            Self::Authz(e) => e,
            Self::Storage { .. } | Self::Configuration { .. } | Self::Internal { .. } => {
                AuthzError::server_error()
            }
        }
    }
}
