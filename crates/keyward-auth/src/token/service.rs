//! Token service: the token and revocation endpoints without HTTP.
//!
//! # Usage
//!
//! ```ignore
//! use keyward_auth::token::{TokenEndpointRequest, TokenService};
//!
//! let service = TokenService::new(provider, Arc::new(IssuerConfig::default()));
//!
//! let response = service
//!     .issue(&TokenEndpointRequest {
//!         content_type: Some("application/x-www-form-urlencoded"),
//!         authorization: Some("Basic dGVzdGNsaWVudDp0ZXN0Y2xpZW50"),
//!         body: b"grant_type=client_credentials",
//!     })
//!     .await;
//! ```

use std::sync::Arc;

use tracing::{debug, info};

use crate::AuthResult;
use crate::config::IssuerConfig;
use crate::error::AuthError;
use crate::oauth::client_auth::authenticate_client;
use crate::oauth::grants::GrantRequest;
use crate::oauth::params::{FormParams, require_form_content_type};
use crate::oauth::token::TokenRequest;
use crate::storage::Provider;
use crate::token::response::EndpointResponse;
use crate::token::revocation::{RevocationEndpointRequest, TokenTypeHint};
use crate::types::{Client, GrantType, Token};

/// A form-encoded request after transport decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenEndpointRequest<'a> {
    /// Declared `Content-Type` header value.
    pub content_type: Option<&'a str>,

    /// Raw `Authorization` header value.
    pub authorization: Option<&'a str>,

    /// Raw request body.
    pub body: &'a [u8],
}

/// Issues and revokes tokens on behalf of authenticated clients.
///
/// Holds no mutable state of its own; clones share the provider.
#[derive(Clone)]
pub struct TokenService {
    provider: Arc<dyn Provider>,
    config: Arc<IssuerConfig>,
}

impl TokenService {
    /// Creates a new token service.
    #[must_use]
    pub fn new(provider: Arc<dyn Provider>, config: Arc<IssuerConfig>) -> Self {
        Self { provider, config }
    }

    /// The provider this service issues through.
    #[must_use]
    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// The issuance configuration.
    #[must_use]
    pub fn config(&self) -> &IssuerConfig {
        &self.config
    }

    // =========================================================================
    // Issuance
    // =========================================================================

    /// Handles a token request (RFC 6749 Section 4).
    pub async fn issue(&self, request: &TokenEndpointRequest<'_>) -> EndpointResponse {
        match self.try_issue(request).await {
            Ok(token) => EndpointResponse::Token(token),
            Err(e) => EndpointResponse::from_error(e),
        }
    }

    async fn try_issue(&self, request: &TokenEndpointRequest<'_>) -> AuthResult<Token> {
        require_form_content_type(request.content_type)?;
        let params = TokenRequest::from_form(request.body)?;

        let grant_type = params
            .grant_type
            .as_deref()
            .ok_or_else(|| AuthError::invalid_request("Missing required parameter 'grant_type'."))?
            .parse::<GrantType>()?;
        if !self.config.is_grant_enabled(grant_type) || !self.provider.supports_grant(grant_type) {
            return Err(AuthError::unsupported_grant_type(grant_type.as_str()));
        }

        let client = authenticate_client(request.authorization, self.provider.as_ref()).await?;
        debug!(client_id = %client.id, grant_type = %grant_type, "Client authenticated");

        let token = GrantRequest::from_request(grant_type, &params)?
            .exchange(&client, self.provider.as_ref(), &self.config)
            .await?;

        info!(
            client_id = %client.id,
            grant_type = %grant_type,
            scope = %token.scope,
            refresh_token = token.refresh_token.is_some(),
            "Token issued"
        );
        Ok(token)
    }

    // =========================================================================
    // Revocation
    // =========================================================================

    /// Handles a revocation request (RFC 7009).
    ///
    /// Answers 200 whether or not the value was found, and whether or not
    /// it belonged to the caller; only authentication failures, a missing
    /// value or a provider failure produce an error.
    pub async fn revoke(&self, request: &RevocationEndpointRequest<'_>) -> EndpointResponse {
        match self.try_revoke(request).await {
            Ok(()) => EndpointResponse::Revoked,
            Err(e) => EndpointResponse::from_error(e),
        }
    }

    /// Handles a form-encoded revocation request carrying `token` and an
    /// optional `token_type_hint`.
    pub async fn revoke_form(&self, request: &TokenEndpointRequest<'_>) -> EndpointResponse {
        let params = match require_form_content_type(request.content_type)
            .and_then(|()| FormParams::parse(request.body))
        {
            Ok(params) => params,
            Err(e) => return EndpointResponse::from_error(e),
        };

        self.revoke(&RevocationEndpointRequest {
            authorization: request.authorization,
            token: params.get("token"),
            token_type_hint: params.get("token_type_hint").and_then(TokenTypeHint::parse),
        })
        .await
    }

    async fn try_revoke(&self, request: &RevocationEndpointRequest<'_>) -> AuthResult<()> {
        let client = authenticate_client(request.authorization, self.provider.as_ref()).await?;

        let value = request
            .token
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AuthError::invalid_request("Missing required parameter 'token'."))?;

        if let Some(token) = self.find_token(value, request.token_type_hint).await? {
            return self.revoke_token(&client, &token).await;
        }

        if let Some(code) = self.provider.find_grant_code(value).await? {
            if code.client_id != client.id {
                debug!(client_id = %client.id, "Ignoring revocation of another client's grant code");
                return Ok(());
            }
            if self.provider.revoke_grant_code(&code.value).await? {
                info!(client_id = %client.id, "Grant code revoked");
            }
            return Ok(());
        }

        debug!(client_id = %client.id, "Revocation of an unknown value");
        Ok(())
    }

    /// Looks a value up as an access token and as a refresh token, in the
    /// order the hint suggests.
    async fn find_token(
        &self,
        value: &str,
        hint: Option<TokenTypeHint>,
    ) -> AuthResult<Option<Token>> {
        let provider = self.provider.as_ref();
        if hint == Some(TokenTypeHint::RefreshToken) {
            if let Some(token) = provider.find_token_by_refresh(value).await? {
                return Ok(Some(token));
            }
            return provider.find_token(value).await;
        }

        if let Some(token) = provider.find_token(value).await? {
            return Ok(Some(token));
        }
        provider.find_token_by_refresh(value).await
    }

    async fn revoke_token(&self, client: &Client, token: &Token) -> AuthResult<()> {
        if token.client_id != client.id {
            debug!(
                client_id = %client.id,
                "Ignoring revocation of another client's token"
            );
            return Ok(());
        }

        if self.provider.revoke_token(&token.value).await? {
            info!(client_id = %client.id, "Token revoked");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::params::FORM_CONTENT_TYPE;
    use crate::oauth::token::ErrorCode;
    use crate::testing::{CALLBACK, MockProvider};
    use crate::types::Lifecycle;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use std::time::Duration;
    use url::Url;

    fn basic(id: &str, secret: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{id}:{secret}")))
    }

    fn service_with(config: IssuerConfig) -> (TokenService, Arc<MockProvider>) {
        let provider = Arc::new(MockProvider::new());
        let service = TokenService::new(provider.clone(), Arc::new(config));
        (service, provider)
    }

    fn service() -> (TokenService, Arc<MockProvider>) {
        service_with(IssuerConfig::default())
    }

    async fn issue(service: &TokenService, authorization: Option<&str>, body: &str) -> EndpointResponse {
        service
            .issue(&TokenEndpointRequest {
                content_type: Some(FORM_CONTENT_TYPE),
                authorization,
                body: body.as_bytes(),
            })
            .await
    }

    async fn revoke(service: &TokenService, authorization: &str, token: &str) -> EndpointResponse {
        service
            .revoke(&RevocationEndpointRequest {
                authorization: Some(authorization),
                token: Some(token),
                token_type_hint: None,
            })
            .await
    }

    fn expect_token(response: EndpointResponse) -> Token {
        match response {
            EndpointResponse::Token(token) => token,
            other => panic!("expected a token, got {other:?}"),
        }
    }

    fn expect_error(response: EndpointResponse, code: ErrorCode) -> String {
        match response {
            EndpointResponse::Error(e) => {
                assert_eq!(e.code, code);
                e.description.unwrap_or_default()
            }
            other => panic!("expected {code}, got {other:?}"),
        }
    }

    fn code_body(code: &str) -> String {
        format!("grant_type=authorization_code&code={code}&redirect_uri={CALLBACK}")
    }

    // -------------------------------------------------------------------------
    // Issuance
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_authorization_code_grant() {
        let (service, provider) = service();
        let code = provider.issue_code("testclient", Url::parse(CALLBACK).unwrap(), Duration::from_secs(600));
        let auth = basic("testclient", "testclient");

        let token = expect_token(issue(&service, Some(auth.as_str()), &code_body(&code.value)).await);

        assert_eq!(token.token_type, "bearer");
        assert_eq!(token.expires_in.as_secs(), 600);
        assert!(token.refresh_token.is_some());
    }

    #[tokio::test]
    async fn test_authorization_code_wrong_client() {
        let (service, provider) = service();
        let code = provider.issue_code("testclient", Url::parse(CALLBACK).unwrap(), Duration::from_secs(600));
        let auth = basic("boo", "boo");

        let description = expect_error(
            issue(&service, Some(auth.as_str()), &code_body(&code.value)).await,
            ErrorCode::InvalidGrant,
        );
        assert_eq!(description, "Grant code was generated for a different redirect URI.");
    }

    #[tokio::test]
    async fn test_password_grant() {
        let (service, _) = service();
        let auth = basic("testclient", "testclient");

        let token = expect_token(
            issue(
                &service,
                Some(auth.as_str()),
                "grant_type=password&username=test_user&password=test_password",
            )
            .await,
        );
        assert!(token.refresh_token.is_some());
    }

    #[tokio::test]
    async fn test_client_credentials_grant() {
        let (service, _) = service();
        let auth = basic("testclient", "testclient");

        let token = expect_token(issue(&service, Some(auth.as_str()), "grant_type=client_credentials").await);
        assert!(token.refresh_token.is_none());
    }

    #[tokio::test]
    async fn test_refresh_token_grant() {
        let (service, _) = service();
        let auth = basic("testclient", "testclient");
        let first = expect_token(
            issue(
                &service,
                Some(auth.as_str()),
                "grant_type=password&username=test_user&password=test_password",
            )
            .await,
        );
        let refresh = first.refresh_token.clone().unwrap();

        let second = expect_token(
            issue(
                &service,
                Some(auth.as_str()),
                &format!("grant_type=refresh_token&refresh_token={refresh}&scope=identity"),
            )
            .await,
        );

        assert_ne!(second.value, first.value);
        assert_ne!(second.refresh_token.as_deref(), Some(refresh.as_str()));
    }

    #[tokio::test]
    async fn test_missing_authentication_for_every_grant() {
        let (service, provider) = service();
        let code = provider.issue_code(
            "testclient",
            Url::parse(CALLBACK).unwrap(),
            Duration::from_secs(600),
        );
        let auth = basic("testclient", "testclient");
        let refresh = expect_token(
            issue(
                &service,
                Some(auth.as_str()),
                "grant_type=password&username=test_user&password=test_password",
            )
            .await,
        )
        .refresh_token
        .unwrap();
        let wrong = basic("testclient", "wrong");

        for body in [
            code_body(&code.value),
            "grant_type=password&username=test_user&password=test_password".to_string(),
            "grant_type=client_credentials".to_string(),
            format!("grant_type=refresh_token&refresh_token={refresh}"),
        ] {
            for authorization in [None, Some(wrong.as_str())] {
                let description = expect_error(
                    issue(&service, authorization, &body).await,
                    ErrorCode::UnauthorizedClient,
                );
                assert!(!description.is_empty());
            }
        }

        assert_eq!(provider.token_count(), 1);
    }

    #[tokio::test]
    async fn test_wrong_content_type() {
        let (service, _) = service();
        let auth = basic("testclient", "testclient");

        let response = service
            .issue(&TokenEndpointRequest {
                content_type: Some("application/json"),
                authorization: Some(auth.as_str()),
                body: br#"{"grant_type":"client_credentials"}"#,
            })
            .await;
        expect_error(response, ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn test_repeated_parameter() {
        let (service, _) = service();
        let auth = basic("testclient", "testclient");

        expect_error(
            issue(
                &service,
                Some(auth.as_str()),
                "grant_type=client_credentials&grant_type=client_credentials",
            )
            .await,
            ErrorCode::InvalidRequest,
        );
    }

    #[tokio::test]
    async fn test_missing_grant_type() {
        let (service, _) = service();
        let auth = basic("testclient", "testclient");

        expect_error(issue(&service, Some(auth.as_str()), "scope=identity").await, ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn test_unknown_grant_type() {
        let (service, _) = service();
        let auth = basic("testclient", "testclient");

        let description = expect_error(
            issue(&service, Some(auth.as_str()), "grant_type=implicit").await,
            ErrorCode::UnsupportedGrantType,
        );
        assert!(description.contains("implicit"));
    }

    #[tokio::test]
    async fn test_grant_disabled_in_config() {
        let (service, _) = service_with(IssuerConfig {
            grant_types: vec![GrantType::AuthorizationCode, GrantType::RefreshToken],
            ..IssuerConfig::default()
        });
        let auth = basic("testclient", "testclient");

        expect_error(
            issue(&service, Some(auth.as_str()), "grant_type=client_credentials").await,
            ErrorCode::UnsupportedGrantType,
        );
    }

    #[tokio::test]
    async fn test_grant_unsupported_by_provider() {
        let (service, provider) = service();
        provider.disable_grant(GrantType::Password);
        let auth = basic("testclient", "testclient");

        expect_error(
            issue(
                &service,
                Some(auth.as_str()),
                "grant_type=password&username=test_user&password=test_password",
            )
            .await,
            ErrorCode::UnsupportedGrantType,
        );
    }

    #[tokio::test]
    async fn test_provider_failure_is_server_error() {
        let (service, provider) = service();
        provider.fail();
        let auth = basic("testclient", "testclient");

        let response = issue(&service, Some(auth.as_str()), "grant_type=client_credentials").await;
        assert_eq!(response.status(), 500);
        let description = expect_error(response, ErrorCode::ServerError);
        assert_eq!(
            description,
            "The authorization server encountered an unexpected condition."
        );
    }

    // -------------------------------------------------------------------------
    // Revocation
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_revoke_own_token() {
        let (service, provider) = service();
        let auth = basic("testclient", "testclient");
        let token = expect_token(
            issue(
                &service,
                Some(auth.as_str()),
                "grant_type=password&username=test_user&password=test_password",
            )
            .await,
        );

        assert_eq!(revoke(&service, &auth, &token.value).await, EndpointResponse::Revoked);

        let stored = provider.find_token(&token.value).await.unwrap().unwrap();
        assert_eq!(stored.lifecycle(), Lifecycle::Revoked);

        // The refresh half went with it.
        let refresh = token.refresh_token.unwrap();
        expect_error(
            issue(
                &service,
                Some(auth.as_str()),
                &format!("grant_type=refresh_token&refresh_token={refresh}"),
            )
            .await,
            ErrorCode::InvalidGrant,
        );
    }

    #[tokio::test]
    async fn test_revoke_by_refresh_value() {
        let (service, provider) = service();
        let auth = basic("testclient", "testclient");
        let token = expect_token(
            issue(
                &service,
                Some(auth.as_str()),
                "grant_type=password&username=test_user&password=test_password",
            )
            .await,
        );

        let response = service
            .revoke(&RevocationEndpointRequest {
                authorization: Some(auth.as_str()),
                token: token.refresh_token.as_deref(),
                token_type_hint: Some(TokenTypeHint::RefreshToken),
            })
            .await;
        assert_eq!(response, EndpointResponse::Revoked);

        let stored = provider.find_token(&token.value).await.unwrap().unwrap();
        assert!(stored.is_revoked());
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let (service, _) = service();
        let auth = basic("testclient", "testclient");
        let token = expect_token(issue(&service, Some(auth.as_str()), "grant_type=client_credentials").await);

        assert_eq!(revoke(&service, &auth, &token.value).await, EndpointResponse::Revoked);
        assert_eq!(revoke(&service, &auth, &token.value).await, EndpointResponse::Revoked);
    }

    #[tokio::test]
    async fn test_revoke_other_clients_token_is_ignored() {
        let (service, provider) = service();
        let owner = basic("testclient", "testclient");
        let token = expect_token(issue(&service, Some(owner.as_str()), "grant_type=client_credentials").await);

        let response = revoke(&service, &basic("boo", "boo"), &token.value).await;
        assert_eq!(response, EndpointResponse::Revoked);

        let stored = provider.find_token(&token.value).await.unwrap().unwrap();
        assert!(stored.lifecycle().is_active());
    }

    #[tokio::test]
    async fn test_revoke_unknown_value() {
        let (service, _) = service();
        let auth = basic("testclient", "testclient");

        assert_eq!(revoke(&service, &auth, "nonexistent").await, EndpointResponse::Revoked);
    }

    #[tokio::test]
    async fn test_revoke_grant_code() {
        let (service, provider) = service();
        let auth = basic("testclient", "testclient");
        let code = provider.issue_code("testclient", Url::parse(CALLBACK).unwrap(), Duration::from_secs(600));

        assert_eq!(revoke(&service, &auth, &code.value).await, EndpointResponse::Revoked);

        expect_error(
            issue(&service, Some(auth.as_str()), &code_body(&code.value)).await,
            ErrorCode::InvalidGrant,
        );
    }

    #[tokio::test]
    async fn test_revoke_requires_authentication() {
        let (service, _) = service();

        let response = service
            .revoke(&RevocationEndpointRequest {
                authorization: None,
                token: Some("anything"),
                token_type_hint: None,
            })
            .await;
        expect_error(response, ErrorCode::UnauthorizedClient);
    }

    #[tokio::test]
    async fn test_revoke_requires_token() {
        let (service, _) = service();
        let auth = basic("testclient", "testclient");

        expect_error(revoke(&service, &auth, "").await, ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn test_revoke_form() {
        let (service, provider) = service();
        let auth = basic("testclient", "testclient");
        let token = expect_token(issue(&service, Some(auth.as_str()), "grant_type=client_credentials").await);
        let body = format!("token={}&token_type_hint=access_token", token.value);

        let response = service
            .revoke_form(&TokenEndpointRequest {
                content_type: Some("application/x-www-form-urlencoded; charset=UTF-8"),
                authorization: Some(auth.as_str()),
                body: body.as_bytes(),
            })
            .await;
        assert_eq!(response, EndpointResponse::Revoked);

        let stored = provider.find_token(&token.value).await.unwrap().unwrap();
        assert!(stored.is_revoked());
    }
}
