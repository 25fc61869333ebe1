//! In-crate test doubles.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::AuthResult;
use crate::error::AuthError;
use crate::storage::Provider;
use crate::types::{Client, GrantCode, GrantType, Scope, Scopes, Token, TokenSpec};

pub(crate) const CALLBACK: &str = "https://example.com/oauth2/callback";

/// Provider backed by plain maps, seeded with two clients and one owner.
///
/// | client | secret | scopes |
/// |--------|--------|--------|
/// | `testclient` | `testclient` | `identity repo` |
/// | `boo` | `boo` | `identity` |
///
/// Resource owner `test_user` / `test_password`.
pub(crate) struct MockProvider {
    clients: RwLock<HashMap<String, (Client, String, Scopes)>>,
    owners: RwLock<HashMap<String, String>>,
    codes: RwLock<HashMap<String, GrantCode>>,
    tokens: RwLock<HashMap<String, Token>>,
    unsupported: RwLock<HashSet<GrantType>>,
    consume_codes_on_generate: AtomicBool,
    failing: AtomicBool,
}

impl MockProvider {
    pub(crate) fn new() -> Self {
        let callback = Url::parse(CALLBACK).unwrap();
        let provider = Self {
            clients: RwLock::new(HashMap::new()),
            owners: RwLock::new(HashMap::new()),
            codes: RwLock::new(HashMap::new()),
            tokens: RwLock::new(HashMap::new()),
            unsupported: RwLock::new(HashSet::new()),
            consume_codes_on_generate: AtomicBool::new(false),
            failing: AtomicBool::new(false),
        };

        provider.add_client(
            Client::new("testclient", "Test Client", callback.clone()),
            "testclient",
            &["identity", "repo"],
        );
        provider.add_client(Client::new("boo", "Boo", callback), "boo", &["identity"]);
        provider
            .owners
            .write()
            .unwrap()
            .insert("test_user".to_string(), "test_password".to_string());
        provider
    }

    fn add_client(&self, client: Client, secret: &str, scopes: &[&str]) {
        let scopes = scopes.iter().map(|id| Scope::new(*id)).collect();
        self.clients
            .write()
            .unwrap()
            .insert(client.id.clone(), (client, secret.to_string(), scopes));
    }

    pub(crate) fn client(&self, id: &str) -> Client {
        self.clients.read().unwrap()[id].0.clone()
    }

    /// Stores a code for `identity`, approved by `test_user`.
    pub(crate) fn issue_code(&self, client_id: &str, redirect_url: Url, lifetime: Duration) -> GrantCode {
        let code = GrantCode::issue(
            client_id,
            redirect_url,
            Scopes::parse("identity").unwrap(),
            lifetime,
        )
        .with_owner("test_user");
        self.codes
            .write()
            .unwrap()
            .insert(code.value.clone(), code.clone());
        code
    }

    pub(crate) fn token_count(&self) -> usize {
        self.tokens.read().unwrap().len()
    }

    pub(crate) fn active_token_count(&self) -> usize {
        self.tokens
            .read()
            .unwrap()
            .values()
            .filter(|t| t.lifecycle().is_active())
            .count()
    }

    pub(crate) fn disable_grant(&self, grant_type: GrantType) {
        self.unsupported.write().unwrap().insert(grant_type);
    }

    /// Makes every stored code used as a side effect of the next token
    /// generation, as a concurrent exchange winning the race would.
    pub(crate) fn consume_codes_on_generate(&self) {
        self.consume_codes_on_generate.store(true, Ordering::SeqCst);
    }

    /// Makes every storage call fail from now on.
    pub(crate) fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> AuthResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AuthError::storage("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn find_client(&self, client_id: &str) -> AuthResult<Option<Client>> {
        self.check()?;
        Ok(self
            .clients
            .read()
            .unwrap()
            .get(client_id)
            .map(|(client, _, _)| client.clone()))
    }

    async fn verify_client_secret(&self, client: &Client, secret: &str) -> AuthResult<bool> {
        self.check()?;
        Ok(self
            .clients
            .read()
            .unwrap()
            .get(&client.id)
            .is_some_and(|(_, stored, _)| stored == secret))
    }

    async fn find_grant_code(&self, value: &str) -> AuthResult<Option<GrantCode>> {
        self.check()?;
        Ok(self.codes.read().unwrap().get(value).cloned())
    }

    async fn mark_grant_code_used(&self, value: &str) -> AuthResult<bool> {
        self.check()?;
        Ok(self
            .codes
            .write()
            .unwrap()
            .get_mut(value)
            .is_some_and(GrantCode::mark_used))
    }

    async fn revoke_grant_code(&self, value: &str) -> AuthResult<bool> {
        self.check()?;
        Ok(self
            .codes
            .write()
            .unwrap()
            .get_mut(value)
            .is_some_and(GrantCode::revoke))
    }

    async fn generate_token(&self, spec: TokenSpec) -> AuthResult<Token> {
        self.check()?;
        if self.consume_codes_on_generate.load(Ordering::SeqCst) {
            for code in self.codes.write().unwrap().values_mut() {
                code.mark_used();
            }
        }
        let token = Token::issue(spec);
        self.tokens
            .write()
            .unwrap()
            .insert(token.value.clone(), token.clone());
        Ok(token)
    }

    async fn find_token(&self, value: &str) -> AuthResult<Option<Token>> {
        self.check()?;
        Ok(self.tokens.read().unwrap().get(value).cloned())
    }

    async fn find_token_by_refresh(&self, refresh_value: &str) -> AuthResult<Option<Token>> {
        self.check()?;
        Ok(self
            .tokens
            .read()
            .unwrap()
            .values()
            .find(|t| t.refresh_token.as_deref() == Some(refresh_value))
            .cloned())
    }

    async fn revoke_token(&self, value: &str) -> AuthResult<bool> {
        self.check()?;
        Ok(self
            .tokens
            .write()
            .unwrap()
            .get_mut(value)
            .is_some_and(Token::revoke))
    }

    fn supports_grant(&self, grant_type: GrantType) -> bool {
        !self.unsupported.read().unwrap().contains(&grant_type)
    }

    async fn client_allowed_scopes(&self, client: &Client) -> AuthResult<Scopes> {
        self.check()?;
        Ok(self
            .clients
            .read()
            .unwrap()
            .get(&client.id)
            .map(|(_, _, scopes)| scopes.clone())
            .unwrap_or_default())
    }

    async fn verify_resource_owner(&self, username: &str, password: &str) -> AuthResult<bool> {
        self.check()?;
        Ok(self
            .owners
            .read()
            .unwrap()
            .get(username)
            .is_some_and(|stored| stored == password))
    }
}
