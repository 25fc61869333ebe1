//! Scopes (RFC 6749 Section 3.3).
//!
//! A scope set keeps the order it was built in for display, but membership
//! and subset checks only look at scope ids.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::AuthResult;
use crate::error::AuthError;

/// A named permission unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    /// Scope identifier, unique within a set.
    pub id: String,

    /// Human-readable description shown to resource owners.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Scope {
    /// Creates a scope without a description.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// An ordered set of scopes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scopes(Vec<Scope>);

impl Scopes {
    /// Creates an empty scope set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a space-delimited `scope` parameter.
    ///
    /// Repeated ids are kept once. Parsed scopes carry no description.
    ///
    /// # Errors
    ///
    /// Returns `invalid_scope` if a scope token contains characters outside
    /// the RFC 6749 `scope-token` grammar.
    pub fn parse(value: &str) -> AuthResult<Self> {
        let mut scopes = Self::new();
        for token in value.split_ascii_whitespace() {
            if !token.bytes().all(is_scope_char) {
                return Err(AuthError::invalid_scope(format!(
                    "Scope '{}' is malformed.",
                    token
                )));
            }
            scopes.insert(Scope::new(token));
        }
        Ok(scopes)
    }

    /// Adds a scope unless one with the same id is already present.
    pub fn insert(&mut self, scope: Scope) {
        if !self.contains(&scope.id) {
            self.0.push(scope);
        }
    }

    /// Returns `true` if a scope with this id is present.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|s| s.id == id)
    }

    /// Returns the scope with this id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Scope> {
        self.0.iter().find(|s| s.id == id)
    }

    /// Returns `true` if every scope here is also in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &Scopes) -> bool {
        self.0.iter().all(|s| other.contains(&s.id))
    }

    /// Narrows this set to the requested scopes.
    ///
    /// Without a request the whole set is granted. A request naming a scope
    /// outside this set is rejected. The result keeps the requested order and
    /// the descriptions held here.
    ///
    /// # Errors
    ///
    /// Returns `invalid_scope` if the request exceeds this set.
    pub fn narrow(&self, requested: Option<&Scopes>) -> AuthResult<Scopes> {
        let Some(requested) = requested else {
            return Ok(self.clone());
        };

        let mut granted = Scopes::new();
        for scope in requested.iter() {
            let held = self.get(&scope.id).ok_or_else(|| {
                AuthError::invalid_scope(format!(
                    "Scope '{}' exceeds the granted scope.",
                    scope.id
                ))
            })?;
            granted.insert(held.clone());
        }
        Ok(granted)
    }

    /// Iterates over the scopes in order.
    pub fn iter(&self) -> impl Iterator<Item = &Scope> {
        self.0.iter()
    }

    /// Returns the number of scopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Scope> for Scopes {
    fn from_iter<I: IntoIterator<Item = Scope>>(iter: I) -> Self {
        let mut scopes = Self::new();
        for scope in iter {
            scopes.insert(scope);
        }
        scopes
    }
}

/// Renders the space-delimited wire form.
impl fmt::Display for Scopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, scope) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(&scope.id)?;
        }
        Ok(())
    }
}

/// `scope-token = 1*( %x21 / %x23-5B / %x5D-7E )`
fn is_scope_char(b: u8) -> bool {
    matches!(b, 0x21 | 0x23..=0x5B | 0x5D..=0x7E)
}
