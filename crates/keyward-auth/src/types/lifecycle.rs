//! Lifecycle of grant codes and tokens.
//!
//! Only the explicit transitions (used, revoked) are stored. Expiry is
//! derived from timestamps every time it is asked for, so a stored value can
//! never be both expired and still considered active.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, PrimitiveDateTime};

/// Observable state of a grant code or token at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// Usable.
    Active,
    /// Consumed by a successful exchange.
    Used,
    /// Past its lifetime.
    Expired,
    /// Explicitly revoked or superseded.
    Revoked,
}

impl Lifecycle {
    /// Returns `true` if the value may still be exchanged.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Returns the lifecycle name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Used => "used",
            Self::Expired => "expired",
            Self::Revoked => "revoked",
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stored outcome of the explicit transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Disposition {
    Active,
    Used { at: OffsetDateTime },
    Revoked { at: OffsetDateTime },
}

impl Disposition {
    /// Resolves the lifecycle against an expiry instant.
    ///
    /// Explicit transitions win over expiry: a code that was used and has
    /// since expired still reports `Used`.
    pub(crate) fn resolve(self, expires_at: OffsetDateTime, now: OffsetDateTime) -> Lifecycle {
        match self {
            Self::Used { .. } => Lifecycle::Used,
            Self::Revoked { .. } => Lifecycle::Revoked,
            Self::Active if now >= expires_at => Lifecycle::Expired,
            Self::Active => Lifecycle::Active,
        }
    }

    /// When the explicit transition happened, if any.
    pub(crate) fn changed_at(self) -> Option<OffsetDateTime> {
        match self {
            Self::Active => None,
            Self::Used { at } | Self::Revoked { at } => Some(at),
        }
    }
}

/// Adds a lifetime to an instant, clamping at the latest representable one.
pub(crate) fn expiry(from: OffsetDateTime, lifetime: std::time::Duration) -> OffsetDateTime {
    time::Duration::try_from(lifetime)
        .ok()
        .and_then(|lifetime| from.checked_add(lifetime))
        .unwrap_or_else(|| PrimitiveDateTime::MAX.assume_utc())
}
