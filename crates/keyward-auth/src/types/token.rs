//! Access and refresh tokens.
//!
//! # Response Shape
//!
//! ```json
//! {
//!   "access_token": "t2zW2d2NtXxv...",
//!   "token_type": "bearer",
//!   "expires_in": "600",
//!   "refresh_token": "Jd8hS1KqV0pA..."
//! }
//! ```
//!
//! `expires_in` is rendered as a string of whole seconds, and `refresh_token`
//! is omitted for grants that carry no resource owner. Ownership, scope and
//! lifecycle never leave the server.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Serialize, Serializer};
use time::OffsetDateTime;

use crate::types::lifecycle::{Disposition, Lifecycle, expiry};
use crate::types::scope::Scopes;

/// The only token type issued.
pub const BEARER: &str = "bearer";

/// Generates a cryptographically secure opaque value.
///
/// Returns a 256-bit random value encoded as base64url (43 characters).
#[must_use]
pub fn generate_value() -> String {
    let mut bytes = [0u8; 32];
    rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// What a grant handler asks the provider to mint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSpec {
    /// Client the token is issued to.
    pub client_id: String,
    /// Granted scope.
    pub scope: Scopes,
    /// Resource owner, if the grant involved one.
    pub owner: Option<String>,
    /// Whether to pair the access token with a refresh token.
    pub include_refresh_token: bool,
    /// Access token lifetime.
    pub expires_in: Duration,
    /// Refresh token lifetime.
    pub refresh_expires_in: Duration,
}

/// An access token, optionally paired with a refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// Client the token was issued to.
    #[serde(skip)]
    pub client_id: String,

    /// Opaque bearer value.
    #[serde(rename = "access_token")]
    pub value: String,

    /// Always [`BEARER`].
    pub token_type: String,

    /// Access token lifetime.
    #[serde(serialize_with = "serialize_seconds")]
    pub expires_in: Duration,

    /// Opaque refresh value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Granted scope.
    #[serde(skip)]
    pub scope: Scopes,

    /// Resource owner username, if the grant involved one.
    #[serde(skip)]
    pub owner: Option<String>,

    /// When the token was minted.
    #[serde(skip)]
    pub issued_at: OffsetDateTime,

    /// When the refresh token stops being accepted.
    #[serde(skip)]
    pub refresh_expires_at: Option<OffsetDateTime>,

    #[serde(skip)]
    disposition: Disposition,
}

impl Token {
    /// Mints a new token with fresh random values.
    #[must_use]
    pub fn issue(spec: TokenSpec) -> Self {
        let now = OffsetDateTime::now_utc();
        let (refresh_token, refresh_expires_at) = if spec.include_refresh_token {
            (Some(generate_value()), Some(expiry(now, spec.refresh_expires_in)))
        } else {
            (None, None)
        };

        Self {
            client_id: spec.client_id,
            value: generate_value(),
            token_type: BEARER.to_string(),
            expires_in: spec.expires_in,
            refresh_token,
            scope: spec.scope,
            owner: spec.owner,
            issued_at: now,
            refresh_expires_at,
            disposition: Disposition::Active,
        }
    }

    /// When the access token expires.
    #[must_use]
    pub fn expires_at(&self) -> OffsetDateTime {
        expiry(self.issued_at, self.expires_in)
    }

    /// Access token lifecycle now.
    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle_at(OffsetDateTime::now_utc())
    }

    /// Access token lifecycle at `now`.
    #[must_use]
    pub fn lifecycle_at(&self, now: OffsetDateTime) -> Lifecycle {
        self.disposition.resolve(self.expires_at(), now)
    }

    /// Refresh token lifecycle at `now`, or `None` without a refresh token.
    ///
    /// Revoking the pair revokes both halves; the refresh half otherwise
    /// outlives the access token.
    #[must_use]
    pub fn refresh_lifecycle_at(&self, now: OffsetDateTime) -> Option<Lifecycle> {
        self.refresh_expires_at
            .map(|expires_at| self.disposition.resolve(expires_at, now))
    }

    /// Returns `true` once the pair has been revoked.
    #[must_use]
    pub fn is_revoked(&self) -> bool {
        matches!(self.disposition, Disposition::Revoked { .. })
    }

    /// When the pair was revoked.
    #[must_use]
    pub fn revoked_at(&self) -> Option<OffsetDateTime> {
        self.disposition.changed_at()
    }

    /// Revokes the access and refresh token together.
    ///
    /// Returns `true` only for the call that performed the transition, so a
    /// store holding the token under a lock can use it as a compare-and-set.
    pub fn revoke(&mut self) -> bool {
        if self.is_revoked() {
            return false;
        }
        self.disposition = Disposition::Revoked {
            at: OffsetDateTime::now_utc(),
        };
        true
    }
}

fn serialize_seconds<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&duration.as_secs())
}
