//! Provider trait.
//!
//! The provider is the storage and identity collaborator behind the token
//! endpoint: it owns clients, resource owners, grant codes and tokens. The
//! core never mutates those records itself; it asks the provider to perform
//! conditional transitions and acts on whether they happened.
//!
//! # Atomicity
//!
//! [`Provider::mark_grant_code_used`] and [`Provider::revoke_token`] must be
//! compare-and-set operations: when several requests race on the same code
//! or refresh token, exactly one call may observe `true`. Everything the
//! core guarantees about single use and rotation rests on this.
//!
//! # Example Implementation
//!
//! ```ignore
//! use keyward_auth::storage::Provider;
//! use keyward_auth::AuthResult;
//!
//! #[async_trait::async_trait]
//! impl Provider for PostgresProvider {
//!     async fn mark_grant_code_used(&self, value: &str) -> AuthResult<bool> {
//!         // UPDATE grant_codes SET used_at = NOW()
//!         // WHERE value = $1 AND used_at IS NULL AND revoked_at IS NULL
//!         //   AND issued_at + expires_in > NOW()
//!         // and report whether a row was updated.
//!     }
//!     // ... other methods
//! }
//! ```

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::{Client, GrantCode, GrantType, Scopes, Token, TokenSpec};

/// Storage and identity capability consumed by the token endpoint.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Finds a client by its identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_client(&self, client_id: &str) -> AuthResult<Option<Client>>;

    /// Verifies a client secret.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn verify_client_secret(&self, client: &Client, secret: &str) -> AuthResult<bool>;

    /// Finds a grant code by value, whatever its lifecycle.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_grant_code(&self, value: &str) -> AuthResult<Option<GrantCode>>;

    /// Atomically consumes an active grant code.
    ///
    /// Returns `false` if the code is unknown or no longer active, including
    /// when a concurrent exchange consumed it first.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn mark_grant_code_used(&self, value: &str) -> AuthResult<bool>;

    /// Revokes an active grant code.
    ///
    /// Returns `true` only if this call performed the transition.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn revoke_grant_code(&self, value: &str) -> AuthResult<bool>;

    /// Mints and stores a new token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be stored.
    async fn generate_token(&self, spec: TokenSpec) -> AuthResult<Token>;

    /// Finds a token by its access value, whatever its lifecycle.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_token(&self, value: &str) -> AuthResult<Option<Token>>;

    /// Finds a token by its refresh value, whatever its lifecycle.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_token_by_refresh(&self, refresh_value: &str) -> AuthResult<Option<Token>>;

    /// Revokes the access/refresh pair identified by its access value.
    ///
    /// Idempotent. Returns `true` only for the call that performed the
    /// transition, `false` if the token is unknown or already revoked.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn revoke_token(&self, value: &str) -> AuthResult<bool>;

    /// Returns `true` if this provider can serve the grant type.
    ///
    /// A provider without resource owners would refuse `password`.
    fn supports_grant(&self, grant_type: GrantType) -> bool;

    /// Returns the scope a client is entitled to.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn client_allowed_scopes(&self, client: &Client) -> AuthResult<Scopes>;

    /// Verifies resource owner credentials for the password grant.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn verify_resource_owner(&self, username: &str, password: &str) -> AuthResult<bool>;
}
