//! Refresh token grant (RFC 6749 Section 6).
//!
//! Refresh tokens rotate: every successful refresh revokes the presented
//! pair and issues a new one, so a refresh value is accepted at most once.

use std::fmt;

use time::OffsetDateTime;
use tracing::{debug, warn};

use super::{discard, required, requested_scope, token_spec};
use crate::AuthResult;
use crate::config::IssuerConfig;
use crate::error::AuthError;
use crate::oauth::token::TokenRequest;
use crate::storage::Provider;
use crate::types::{Client, Lifecycle, Scopes, Token};

const REFRESH_UNKNOWN: &str = "Refresh token is invalid.";
const REFRESH_OTHER_CLIENT: &str = "Refresh token was issued to a different client.";
const REFRESH_EXPIRED: &str = "Refresh token has expired.";
const REFRESH_REVOKED: &str = "Refresh token has been revoked.";

/// Parameters of a refresh token grant.
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshTokenGrant {
    /// The refresh token value.
    pub refresh_token: String,
    /// Requested scope, if any. Must not exceed the original grant.
    pub scope: Option<Scopes>,
}

impl RefreshTokenGrant {
    pub(super) fn from_request(request: &TokenRequest) -> AuthResult<Self> {
        Ok(Self {
            refresh_token: required(&request.refresh_token, "refresh_token")?,
            scope: requested_scope(request)?,
        })
    }
}

impl fmt::Debug for RefreshTokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshTokenGrant")
            .field("refresh_token", &"[REDACTED]")
            .field("scope", &self.scope)
            .finish()
    }
}

/// Rotates a refresh token.
///
/// # Errors
///
/// Returns `invalid_grant` if the refresh token is unknown, expired, revoked
/// or belongs to another client, and `invalid_scope` if the requested scope
/// exceeds the original grant.
pub async fn exchange(
    client: &Client,
    grant: RefreshTokenGrant,
    provider: &dyn Provider,
    config: &IssuerConfig,
) -> AuthResult<Token> {
    let Some(current) = provider.find_token_by_refresh(&grant.refresh_token).await? else {
        debug!(client_id = %client.id, "Unknown refresh token");
        return Err(AuthError::invalid_grant(REFRESH_UNKNOWN));
    };

    if current.client_id != client.id {
        warn!(
            client_id = %client.id,
            owner_client_id = %current.client_id,
            "Refresh token presented by a different client"
        );
        return Err(AuthError::invalid_grant(REFRESH_OTHER_CLIENT));
    }

    match current.refresh_lifecycle_at(OffsetDateTime::now_utc()) {
        Some(Lifecycle::Active) => {}
        Some(Lifecycle::Expired) => return Err(AuthError::invalid_grant(REFRESH_EXPIRED)),
        Some(Lifecycle::Revoked | Lifecycle::Used) => {
            warn!(client_id = %client.id, "Revoked refresh token presented");
            return Err(AuthError::invalid_grant(REFRESH_REVOKED));
        }
        None => return Err(AuthError::invalid_grant(REFRESH_UNKNOWN)),
    }

    let scope = current.scope.narrow(grant.scope.as_ref())?;

    let token = provider
        .generate_token(token_spec(client, scope, current.owner.clone(), true, config))
        .await?;

    match provider.revoke_token(&current.value).await {
        Ok(true) => Ok(token),
        Ok(false) => {
            warn!(client_id = %client.id, "Refresh token rotated by a concurrent request");
            discard(provider, &token).await;
            Err(AuthError::invalid_grant(REFRESH_REVOKED))
        }
        Err(e) => {
            discard(provider, &token).await;
            Err(e)
        }
    }
}
