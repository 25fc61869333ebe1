//! In-memory provider backed by `dashmap`.
//!
//! Conditional transitions run under the shard lock of the entry they
//! touch, which makes `mark_grant_code_used` and `revoke_token` atomic with
//! respect to each other and to concurrent exchanges.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use keyward_auth::AuthResult;
use keyward_auth::error::AuthError;
use keyward_auth::storage::Provider;
use keyward_auth::types::{Client, GrantCode, GrantType, Scopes, Token, TokenSpec};
use time::OffsetDateTime;
use tracing::debug;
use url::Url;

use crate::secret::{hash_secret, verify_secret};

#[derive(Debug, Clone)]
struct ClientRecord {
    client: Client,
    secret_hash: String,
    scopes: Scopes,
}

/// Provider keeping clients, resource owners, codes and tokens in memory.
///
/// Nothing is persisted; restarting the process revokes everything.
#[derive(Debug)]
pub struct InMemoryProvider {
    clients: DashMap<String, ClientRecord>,
    /// username -> password hash
    owners: DashMap<String, String>,
    grant_codes: DashMap<String, GrantCode>,
    /// access value -> token
    tokens: DashMap<String, Token>,
    /// refresh value -> access value
    refresh_index: DashMap<String, String>,
    grants: HashSet<GrantType>,
}

impl Default for InMemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryProvider {
    /// Creates an empty provider supporting every grant type.
    #[must_use]
    pub fn new() -> Self {
        Self::with_grants(GrantType::ALL.iter().copied())
    }

    /// Creates an empty provider supporting only the given grant types.
    #[must_use]
    pub fn with_grants(grants: impl IntoIterator<Item = GrantType>) -> Self {
        Self {
            clients: DashMap::new(),
            owners: DashMap::new(),
            grant_codes: DashMap::new(),
            tokens: DashMap::new(),
            refresh_index: DashMap::new(),
            grants: grants.into_iter().collect(),
        }
    }

    /// Registers a client, replacing any client with the same id.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the secret cannot be hashed.
    pub fn register_client(&self, client: Client, secret: &str, scopes: Scopes) -> AuthResult<()> {
        let secret_hash = hash_secret(secret)
            .map_err(|e| AuthError::internal(format!("Failed to hash client secret: {e}")))?;

        debug!(client_id = %client.id, scopes = %scopes, "Client registered");
        self.clients.insert(
            client.id.clone(),
            ClientRecord {
                client,
                secret_hash,
                scopes,
            },
        );
        Ok(())
    }

    /// Registers a resource owner for the password grant.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the password cannot be hashed.
    pub fn register_resource_owner(&self, username: &str, password: &str) -> AuthResult<()> {
        let hash = hash_secret(password)
            .map_err(|e| AuthError::internal(format!("Failed to hash password: {e}")))?;

        debug!(username = %username, "Resource owner registered");
        self.owners.insert(username.to_string(), hash);
        Ok(())
    }

    /// Mints and stores a grant code, as the authorization endpoint would
    /// after the resource owner approved the request.
    ///
    /// # Errors
    ///
    /// Returns `invalid_request` if the client is unknown or the redirect
    /// URL is not the one registered for it.
    pub fn issue_grant_code(
        &self,
        client_id: &str,
        redirect_url: Url,
        scope: Scopes,
        owner: Option<&str>,
        lifetime: Duration,
    ) -> AuthResult<GrantCode> {
        let registered = self
            .clients
            .get(client_id)
            .map(|record| record.client.redirect_url.clone())
            .ok_or_else(|| AuthError::invalid_request(format!("Unknown client '{client_id}'.")))?;
        if registered != redirect_url {
            return Err(AuthError::invalid_request(
                "Redirect URL is not registered for this client.",
            ));
        }

        let mut code = GrantCode::issue(client_id, redirect_url, scope, lifetime);
        if let Some(owner) = owner {
            code = code.with_owner(owner);
        }
        self.grant_codes.insert(code.value.clone(), code.clone());
        Ok(code)
    }

    /// Number of stored tokens, revoked ones included.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Drops grant codes and tokens that can never be used again.
    ///
    /// Returns the number of records removed.
    pub fn purge_inactive(&self) -> usize {
        let now = OffsetDateTime::now_utc();
        let mut removed = 0;

        self.grant_codes.retain(|_, code| {
            let keep = code.lifecycle_at(now).is_active();
            removed += usize::from(!keep);
            keep
        });
        self.tokens.retain(|_, token| {
            let keep = token.lifecycle_at(now).is_active()
                || token
                    .refresh_lifecycle_at(now)
                    .is_some_and(|lifecycle| lifecycle.is_active());
            removed += usize::from(!keep);
            keep
        });
        // Tokens are stored before their refresh entry, so an entry whose
        // token is missing belongs to a purged pair.
        self.refresh_index.retain(|refresh, access| {
            self.tokens
                .get(access.as_str())
                .is_some_and(|token| token.refresh_token.as_deref() == Some(refresh.as_str()))
        });

        removed
    }
}

fn hash_error(e: argon2::password_hash::Error) -> AuthError {
    AuthError::storage(format!("Stored credential hash is unreadable: {e}"))
}

#[async_trait]
impl Provider for InMemoryProvider {
    async fn find_client(&self, client_id: &str) -> AuthResult<Option<Client>> {
        Ok(self.clients.get(client_id).map(|record| record.client.clone()))
    }

    async fn verify_client_secret(&self, client: &Client, secret: &str) -> AuthResult<bool> {
        let Some(hash) = self
            .clients
            .get(&client.id)
            .map(|record| record.secret_hash.clone())
        else {
            return Ok(false);
        };
        verify_secret(secret, &hash).map_err(hash_error)
    }

    async fn find_grant_code(&self, value: &str) -> AuthResult<Option<GrantCode>> {
        Ok(self.grant_codes.get(value).map(|code| code.clone()))
    }

    async fn mark_grant_code_used(&self, value: &str) -> AuthResult<bool> {
        Ok(self
            .grant_codes
            .get_mut(value)
            .is_some_and(|mut code| code.mark_used()))
    }

    async fn revoke_grant_code(&self, value: &str) -> AuthResult<bool> {
        Ok(self
            .grant_codes
            .get_mut(value)
            .is_some_and(|mut code| code.revoke()))
    }

    async fn generate_token(&self, spec: TokenSpec) -> AuthResult<Token> {
        let token = Token::issue(spec);
        self.tokens.insert(token.value.clone(), token.clone());
        if let Some(refresh) = &token.refresh_token {
            self.refresh_index
                .insert(refresh.clone(), token.value.clone());
        }
        Ok(token)
    }

    async fn find_token(&self, value: &str) -> AuthResult<Option<Token>> {
        Ok(self.tokens.get(value).map(|token| token.clone()))
    }

    async fn find_token_by_refresh(&self, refresh_value: &str) -> AuthResult<Option<Token>> {
        let Some(access) = self
            .refresh_index
            .get(refresh_value)
            .map(|access| access.clone())
        else {
            return Ok(None);
        };
        Ok(self.tokens.get(&access).map(|token| token.clone()))
    }

    async fn revoke_token(&self, value: &str) -> AuthResult<bool> {
        Ok(self
            .tokens
            .get_mut(value)
            .is_some_and(|mut token| token.revoke()))
    }

    fn supports_grant(&self, grant_type: GrantType) -> bool {
        self.grants.contains(&grant_type)
    }

    async fn client_allowed_scopes(&self, client: &Client) -> AuthResult<Scopes> {
        Ok(self
            .clients
            .get(&client.id)
            .map(|record| record.scopes.clone())
            .unwrap_or_default())
    }

    async fn verify_resource_owner(&self, username: &str, password: &str) -> AuthResult<bool> {
        let Some(hash) = self.owners.get(username).map(|hash| hash.clone()) else {
            return Ok(false);
        };
        verify_secret(password, &hash).map_err(hash_error)
    }
}
