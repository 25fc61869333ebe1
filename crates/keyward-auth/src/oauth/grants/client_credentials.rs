//! Client credentials grant (RFC 6749 Section 4.4).
//!
//! No resource owner takes part, so no refresh token is issued.

use super::{requested_scope, token_spec};
use crate::AuthResult;
use crate::config::IssuerConfig;
use crate::oauth::token::TokenRequest;
use crate::storage::Provider;
use crate::types::{Client, Scopes, Token};

/// Parameters of a client credentials grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentialsGrant {
    /// Requested scope, if any.
    pub scope: Option<Scopes>,
}

impl ClientCredentialsGrant {
    pub(super) fn from_request(request: &TokenRequest) -> AuthResult<Self> {
        Ok(Self {
            scope: requested_scope(request)?,
        })
    }
}

/// Issues an access token to the authenticated client.
///
/// # Errors
///
/// Returns `invalid_scope` if the requested scope exceeds what the client
/// may hold.
pub async fn exchange(
    client: &Client,
    grant: ClientCredentialsGrant,
    provider: &dyn Provider,
    config: &IssuerConfig,
) -> AuthResult<Token> {
    let scope = provider
        .client_allowed_scopes(client)
        .await?
        .narrow(grant.scope.as_ref())?;

    provider
        .generate_token(token_spec(client, scope, None, false, config))
        .await
}
