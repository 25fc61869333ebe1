//! Authorization grant codes (RFC 6749 Section 4.1.2).

use std::time::Duration;

use time::OffsetDateTime;
use url::Url;

use crate::types::lifecycle::{Disposition, Lifecycle, expiry};
use crate::types::scope::Scopes;
use crate::types::token::generate_value;

/// A short-lived, single-use authorization grant code.
///
/// Codes are minted by the authorization endpoint and consumed exactly once
/// by the authorization code grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantCode {
    /// Opaque unguessable value.
    pub value: String,

    /// Client the code was issued to.
    pub client_id: String,

    /// Redirect URI presented in the authorization request.
    pub redirect_url: Url,

    /// Scope granted by the resource owner.
    pub scope: Scopes,

    /// Resource owner who approved the request.
    pub owner: Option<String>,

    /// When the code was minted.
    pub issued_at: OffsetDateTime,

    /// Lifetime from `issued_at`.
    pub expires_in: Duration,

    disposition: Disposition,
}

impl GrantCode {
    /// Mints a new code with a fresh random value.
    #[must_use]
    pub fn issue(
        client_id: impl Into<String>,
        redirect_url: Url,
        scope: Scopes,
        expires_in: Duration,
    ) -> Self {
        Self {
            value: generate_value(),
            client_id: client_id.into(),
            redirect_url,
            scope,
            owner: None,
            issued_at: OffsetDateTime::now_utc(),
            expires_in,
            disposition: Disposition::Active,
        }
    }

    /// Sets the resource owner.
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// When the code stops being exchangeable.
    #[must_use]
    pub fn expires_at(&self) -> OffsetDateTime {
        expiry(self.issued_at, self.expires_in)
    }

    /// Lifecycle now.
    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle_at(OffsetDateTime::now_utc())
    }

    /// Lifecycle at `now`.
    #[must_use]
    pub fn lifecycle_at(&self, now: OffsetDateTime) -> Lifecycle {
        self.disposition.resolve(self.expires_at(), now)
    }

    /// When the code was consumed or revoked.
    #[must_use]
    pub fn closed_at(&self) -> Option<OffsetDateTime> {
        self.disposition.changed_at()
    }

    /// Consumes the code.
    ///
    /// Succeeds only while the code is active; returns `true` only for the
    /// call that performed the transition.
    pub fn mark_used(&mut self) -> bool {
        let now = OffsetDateTime::now_utc();
        if !self.lifecycle_at(now).is_active() {
            return false;
        }
        self.disposition = Disposition::Used { at: now };
        true
    }

    /// Revokes the code unless it was already consumed or revoked.
    pub fn revoke(&mut self) -> bool {
        if self.disposition != Disposition::Active {
            return false;
        }
        self.disposition = Disposition::Revoked {
            at: OffsetDateTime::now_utc(),
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(expires_in: Duration) -> GrantCode {
        GrantCode::issue(
            "testclient",
            Url::parse("https://example.com/oauth2/callback").unwrap(),
            Scopes::parse("identity").unwrap(),
            expires_in,
        )
    }

    #[test]
    fn test_mark_used_once() {
        let mut code = code(Duration::from_secs(600));
        assert!(code.lifecycle().is_active());

        assert!(code.mark_used());
        assert!(!code.mark_used());
        assert_eq!(code.lifecycle(), Lifecycle::Used);
        assert!(code.closed_at().is_some());
    }

    #[test]
    fn test_expired_code_cannot_be_used() {
        let mut code = code(Duration::ZERO);
        assert_eq!(code.lifecycle(), Lifecycle::Expired);
        assert!(!code.mark_used());
    }

    #[test]
    fn test_revoke() {
        let mut code = code(Duration::from_secs(600));
        assert!(code.revoke());
        assert!(!code.revoke());
        assert!(!code.mark_used());
        assert_eq!(code.lifecycle(), Lifecycle::Revoked);
    }

    #[test]
    fn test_used_code_is_not_revoked() {
        let mut code = code(Duration::from_secs(600));
        assert!(code.mark_used());
        assert!(!code.revoke());
        assert_eq!(code.lifecycle(), Lifecycle::Used);
    }
}
