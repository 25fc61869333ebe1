//! Grant handlers.
//!
//! The `grant_type` parameter is resolved once into a [`GrantRequest`], a
//! closed set of variants each carrying its already-validated parameters.
//! Each variant has a handler in its own module that turns an authenticated
//! client and those parameters into a [`Token`] or a protocol error.
//!
//! - [`authorization_code`] - RFC 6749 Section 4.1.3
//! - [`password`] - RFC 6749 Section 4.3
//! - [`client_credentials`] - RFC 6749 Section 4.4
//! - [`refresh_token`] - RFC 6749 Section 6

pub mod authorization_code;
pub mod client_credentials;
pub mod password;
pub mod refresh_token;

use tracing::{error, warn};

use crate::AuthResult;
use crate::config::IssuerConfig;
use crate::error::AuthError;
use crate::oauth::token::TokenRequest;
use crate::storage::Provider;
use crate::types::{Client, GrantType, Scopes, Token, TokenSpec};

pub use authorization_code::AuthorizationCodeGrant;
pub use client_credentials::ClientCredentialsGrant;
pub use password::PasswordGrant;
pub use refresh_token::RefreshTokenGrant;

/// A token request resolved to its grant type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantRequest {
    /// Exchange an authorization code.
    AuthorizationCode(AuthorizationCodeGrant),
    /// Exchange resource owner credentials.
    Password(PasswordGrant),
    /// Authenticate as the client itself.
    ClientCredentials(ClientCredentialsGrant),
    /// Rotate a refresh token.
    RefreshToken(RefreshTokenGrant),
}

impl GrantRequest {
    /// Extracts the parameters the grant type requires.
    ///
    /// # Errors
    ///
    /// Returns `invalid_request` if a required parameter is missing or
    /// malformed, and `invalid_scope` for a malformed `scope`.
    pub fn from_request(grant_type: GrantType, request: &TokenRequest) -> AuthResult<Self> {
        Ok(match grant_type {
            GrantType::AuthorizationCode => {
                Self::AuthorizationCode(AuthorizationCodeGrant::from_request(request)?)
            }
            GrantType::Password => Self::Password(PasswordGrant::from_request(request)?),
            GrantType::ClientCredentials => {
                Self::ClientCredentials(ClientCredentialsGrant::from_request(request)?)
            }
            GrantType::RefreshToken => {
                Self::RefreshToken(RefreshTokenGrant::from_request(request)?)
            }
        })
    }

    /// The grant type this request was resolved to.
    #[must_use]
    pub fn grant_type(&self) -> GrantType {
        match self {
            Self::AuthorizationCode(_) => GrantType::AuthorizationCode,
            Self::Password(_) => GrantType::Password,
            Self::ClientCredentials(_) => GrantType::ClientCredentials,
            Self::RefreshToken(_) => GrantType::RefreshToken,
        }
    }

    /// Runs the matching grant handler.
    ///
    /// # Errors
    ///
    /// Returns the handler's protocol error, or a provider failure.
    pub async fn exchange(
        self,
        client: &Client,
        provider: &dyn Provider,
        config: &IssuerConfig,
    ) -> AuthResult<Token> {
        match self {
            Self::AuthorizationCode(grant) => {
                authorization_code::exchange(client, grant, provider, config).await
            }
            Self::Password(grant) => password::exchange(client, grant, provider, config).await,
            Self::ClientCredentials(grant) => {
                client_credentials::exchange(client, grant, provider, config).await
            }
            Self::RefreshToken(grant) => {
                refresh_token::exchange(client, grant, provider, config).await
            }
        }
    }
}

/// Returns a required parameter.
fn required(value: &Option<String>, name: &str) -> AuthResult<String> {
    value
        .clone()
        .ok_or_else(|| AuthError::invalid_request(format!("Missing required parameter '{}'.", name)))
}

/// Parses the optional `scope` parameter.
fn requested_scope(request: &TokenRequest) -> AuthResult<Option<Scopes>> {
    request.scope.as_deref().map(Scopes::parse).transpose()
}

/// Builds the provider request shared by all grants.
fn token_spec(
    client: &Client,
    scope: Scopes,
    owner: Option<String>,
    include_refresh_token: bool,
    config: &IssuerConfig,
) -> TokenSpec {
    TokenSpec {
        client_id: client.id.clone(),
        scope,
        owner,
        include_refresh_token,
        expires_in: config.token_expiration,
        refresh_expires_in: config.refresh_token_lifetime,
    }
}

/// Revokes a token that was minted but lost a race, so that no usable
/// token outlives a failed exchange.
async fn discard(provider: &dyn Provider, token: &Token) {
    match provider.revoke_token(&token.value).await {
        Ok(_) => warn!(client_id = %token.client_id, "Discarded token from a failed exchange"),
        Err(e) => error!(
            client_id = %token.client_id,
            error = %e,
            "Failed to discard token from a failed exchange"
        ),
    }
}
