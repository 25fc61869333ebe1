//! Authorization code grant (RFC 6749 Section 4.1.3).
//!
//! The code is checked against the authenticated client and the redirect
//! URI it was minted for, exchanged for a token, and only then consumed.
//! Consumption is a compare-and-set in the provider: when two exchanges of
//! one code race, the loser's token is revoked before it is ever returned.

use tracing::{debug, warn};

use super::{discard, required, token_spec};
use crate::AuthResult;
use crate::config::IssuerConfig;
use crate::error::AuthError;
use crate::oauth::token::TokenRequest;
use crate::storage::Provider;
use crate::types::{Client, Lifecycle, Token};

const CODE_UNKNOWN: &str = "Grant code is invalid.";
const CODE_USED: &str = "Grant code has already been used.";
const CODE_EXPIRED: &str = "Grant code has expired.";
const CODE_REVOKED: &str = "Grant code has been revoked.";

/// Shared by the client and redirect checks so that a caller cannot tell
/// whether the code belongs to another client.
const REDIRECT_MISMATCH: &str = "Grant code was generated for a different redirect URI.";

/// Parameters of an authorization code exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationCodeGrant {
    /// The grant code value.
    pub code: String,
    /// Redirect URI presented with the exchange, exactly as sent.
    pub redirect_uri: String,
}

impl AuthorizationCodeGrant {
    pub(super) fn from_request(request: &TokenRequest) -> AuthResult<Self> {
        let code = required(&request.code, "code")?;
        let redirect_uri = required(&request.redirect_uri, "redirect_uri")?;

        Ok(Self { code, redirect_uri })
    }
}

impl std::fmt::Debug for AuthorizationCodeGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationCodeGrant")
            .field("code", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

/// Exchanges a grant code for an access and refresh token.
///
/// # Errors
///
/// Returns `invalid_grant` if the code is unknown, used, expired or revoked,
/// was issued to another client, or was minted for another redirect URI.
pub async fn exchange(
    client: &Client,
    grant: AuthorizationCodeGrant,
    provider: &dyn Provider,
    config: &IssuerConfig,
) -> AuthResult<Token> {
    let Some(code) = provider.find_grant_code(&grant.code).await? else {
        debug!(client_id = %client.id, "Unknown grant code");
        return Err(AuthError::invalid_grant(CODE_UNKNOWN));
    };

    match code.lifecycle() {
        Lifecycle::Active => {}
        Lifecycle::Used => {
            warn!(client_id = %client.id, "Grant code replay attempt");
            return Err(AuthError::invalid_grant(CODE_USED));
        }
        Lifecycle::Expired => return Err(AuthError::invalid_grant(CODE_EXPIRED)),
        Lifecycle::Revoked => return Err(AuthError::invalid_grant(CODE_REVOKED)),
    }

    // RFC 6749 Section 4.1.3: the redirect URI must be identical, not equivalent.
    if code.client_id != client.id || code.redirect_url.as_str() != grant.redirect_uri {
        debug!(
            client_id = %client.id,
            redirect_uri = %grant.redirect_uri,
            "Grant code does not match client or redirect URI"
        );
        return Err(AuthError::invalid_grant(REDIRECT_MISMATCH));
    }

    let token = provider
        .generate_token(token_spec(
            client,
            code.scope.clone(),
            code.owner.clone(),
            true,
            config,
        ))
        .await?;

    match provider.mark_grant_code_used(&code.value).await {
        Ok(true) => Ok(token),
        Ok(false) => {
            warn!(client_id = %client.id, "Grant code consumed by a concurrent exchange");
            discard(provider, &token).await;
            Err(AuthError::invalid_grant(CODE_USED))
        }
        Err(e) => {
            discard(provider, &token).await;
            Err(e)
        }
    }
}
