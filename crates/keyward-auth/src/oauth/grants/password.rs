//! Resource owner password credentials grant (RFC 6749 Section 4.3).

use std::fmt;

use tracing::debug;

use super::{required, requested_scope, token_spec};
use crate::AuthResult;
use crate::config::IssuerConfig;
use crate::error::AuthError;
use crate::oauth::token::TokenRequest;
use crate::storage::Provider;
use crate::types::{Client, Scopes, Token};

const OWNER_REJECTED: &str = "Invalid resource owner credentials.";

/// Parameters of a password grant.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordGrant {
    /// Resource owner username.
    pub username: String,
    /// Resource owner password.
    pub password: String,
    /// Requested scope, if any.
    pub scope: Option<Scopes>,
}

impl PasswordGrant {
    pub(super) fn from_request(request: &TokenRequest) -> AuthResult<Self> {
        Ok(Self {
            username: required(&request.username, "username")?,
            password: required(&request.password, "password")?,
            scope: requested_scope(request)?,
        })
    }
}

impl fmt::Debug for PasswordGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordGrant")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("scope", &self.scope)
            .finish()
    }
}

/// Exchanges resource owner credentials for an access and refresh token.
///
/// # Errors
///
/// Returns `invalid_grant` if the provider rejects the credentials, and
/// `invalid_scope` if the requested scope exceeds what the client may hold.
pub async fn exchange(
    client: &Client,
    grant: PasswordGrant,
    provider: &dyn Provider,
    config: &IssuerConfig,
) -> AuthResult<Token> {
    if !provider
        .verify_resource_owner(&grant.username, &grant.password)
        .await?
    {
        debug!(client_id = %client.id, username = %grant.username, "Resource owner rejected");
        return Err(AuthError::invalid_grant(OWNER_REJECTED));
    }

    let scope = provider
        .client_allowed_scopes(client)
        .await?
        .narrow(grant.scope.as_ref())?;

    provider
        .generate_token(token_spec(client, scope, Some(grant.username), true, config))
        .await
}
