//! Token endpoint request and error types.
//!
//! This module holds the shapes exchanged at the OAuth 2.0 token endpoint:
//! the decoded request parameters, the RFC 6749 Section 5.2 error body and
//! its error-code vocabulary.
//!
//! # Error Body
//!
//! ```json
//! {
//!   "error": "invalid_grant",
//!   "error_description": "Grant code was generated for a different redirect URI."
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::AuthResult;
use crate::oauth::params::FormParams;

/// Token request parameters.
///
/// Different fields are required depending on the `grant_type`:
///
/// - `authorization_code`: code, redirect_uri
/// - `password`: username, password, (optional) scope
/// - `client_credentials`: (optional) scope
/// - `refresh_token`: refresh_token, (optional) scope
///
/// Client credentials never travel in this struct; they come from the
/// HTTP Basic `Authorization` header.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TokenRequest {
    /// OAuth 2.0 grant type, as sent by the client.
    pub grant_type: Option<String>,

    /// Authorization code (for authorization_code grant).
    pub code: Option<String>,

    /// Redirect URI (must match the one bound to the code).
    pub redirect_uri: Option<String>,

    /// Refresh token (for refresh_token grant).
    pub refresh_token: Option<String>,

    /// Requested scope, space-delimited.
    pub scope: Option<String>,

    /// Resource owner username (for password grant).
    pub username: Option<String>,

    /// Resource owner password (for password grant).
    pub password: Option<String>,
}

impl TokenRequest {
    /// Decodes a token request from an `application/x-www-form-urlencoded` body.
    ///
    /// # Errors
    ///
    /// Returns `invalid_request` if the body repeats a parameter.
    pub fn from_form(body: &[u8]) -> AuthResult<Self> {
        let params = FormParams::parse(body)?;
        Ok(Self {
            grant_type: params.get_owned("grant_type"),
            code: params.get_owned("code"),
            redirect_uri: params.get_owned("redirect_uri"),
            refresh_token: params.get_owned("refresh_token"),
            scope: params.get_owned("scope"),
            username: params.get_owned("username"),
            password: params.get_owned("password"),
        })
    }
}

impl fmt::Debug for TokenRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRequest")
            .field("grant_type", &self.grant_type)
            .field("code", &self.code.as_ref().map(|_| "[REDACTED]"))
            .field("redirect_uri", &self.redirect_uri)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("scope", &self.scope)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// OAuth 2.0 error codes used by the token and revocation endpoints.
///
/// Defined in RFC 6749 Section 5.2, plus `server_error` for failures of
/// the authorization server itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is missing a required parameter, includes an unsupported
    /// parameter value, includes a parameter more than once, or is otherwise
    /// malformed.
    InvalidRequest,

    /// Client authentication failed.
    InvalidClient,

    /// The client is not authorized to use the token endpoint, or did not
    /// authenticate at all.
    UnauthorizedClient,

    /// The authorization grant type is not supported by the authorization server.
    UnsupportedGrantType,

    /// The provided authorization grant or refresh token is invalid, expired,
    /// revoked, already used, or was issued to another client.
    InvalidGrant,

    /// The requested scope is invalid, unknown, malformed, or exceeds the scope
    /// granted by the resource owner.
    InvalidScope,

    /// The authorization server encountered an unexpected condition.
    ServerError,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::InvalidClient => "invalid_client",
            Self::UnauthorizedClient => "unauthorized_client",
            Self::UnsupportedGrantType => "unsupported_grant_type",
            Self::InvalidGrant => "invalid_grant",
            Self::InvalidScope => "invalid_scope",
            Self::ServerError => "server_error",
        }
    }

    /// Returns the HTTP status code for this error.
    ///
    /// Client authentication failures answer 400 rather than 401: no
    /// `WWW-Authenticate` challenge is issued by the token endpoint.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ServerError => 500,
            Self::InvalidRequest
            | Self::InvalidClient
            | Self::UnauthorizedClient
            | Self::UnsupportedGrantType
            | Self::InvalidGrant
            | Self::InvalidScope => 400,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// RFC 6749 error response body.
///
/// Serializes to exactly `error`, `error_description`, `error_uri` and
/// `state`, leaving out the optional members that are not set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthzError {
    /// OAuth 2.0 error code.
    #[serde(rename = "error")]
    pub code: ErrorCode,

    /// Human-readable error description.
    #[serde(rename = "error_description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Link to a page documenting the error.
    #[serde(rename = "error_uri", skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    /// State value echoed back to the client.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl AuthzError {
    /// Creates a new error with only a code.
    #[must_use]
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            description: None,
            uri: None,
            state: None,
        }
    }

    /// Creates a new error with a description.
    #[must_use]
    pub fn with_description(code: ErrorCode, description: impl Into<String>) -> Self {
        let description = description.into();
        Self {
            description: (!description.is_empty()).then_some(description),
            ..Self::new(code)
        }
    }

    /// Sets the documentation URI.
    #[must_use]
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        self.uri = (!uri.is_empty()).then_some(uri);
        self
    }

    /// Sets the echoed state.
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        let state = state.into();
        self.state = (!state.is_empty()).then_some(state);
        self
    }

    /// The generic error returned when the server itself fails.
    ///
    /// Never carries details of the underlying cause.
    #[must_use]
    pub fn server_error() -> Self {
        Self::with_description(
            ErrorCode::ServerError,
            "The authorization server encountered an unexpected condition.",
        )
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        self.code.http_status()
    }
}

/// Canonical form: `error="code",error_description="...",error_uri="..."`.
impl fmt::Display for AuthzError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error=\"{}\"", self.code)?;
        if let Some(ref description) = self.description {
            write!(f, ",error_description=\"{}\"", description)?;
        }
        if let Some(ref uri) = self.uri {
            write!(f, ",error_uri=\"{}\"", uri)?;
        }
        Ok(())
    }
}

impl std::error::Error for AuthzError {}
