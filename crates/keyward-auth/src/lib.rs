//! OAuth 2.0 token issuance and revocation.
//!
//! This crate is the core of the Keyward authorization server. It decides,
//! for every request reaching the token endpoint, whether a token is issued
//! and which one, and implements RFC 7009 revocation.
//!
//! # Modules
//!
//! - [`types`] - Clients, scopes, grant codes, tokens and their lifecycle
//! - [`oauth`] - Request decoding, client authentication and grant handlers
//! - [`token`] - The token service orchestrating issuance and revocation
//! - [`storage`] - The [`Provider`](storage::Provider) trait the core calls through
//! - [`http`] - Axum handlers and router
//! - [`config`] - Issuance configuration
//! - [`error`] - Error types
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use keyward_auth::{IssuerConfig, TokenService, http::oauth_router};
//!
//! let service = TokenService::new(provider, Arc::new(IssuerConfig::default()));
//! let app = axum::Router::new().merge(oauth_router(service));
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod storage;
pub mod token;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{ConfigError, IssuerConfig};
pub use error::AuthError;
pub use oauth::{AuthzError, ErrorCode};
pub use storage::Provider;
pub use token::{EndpointResponse, TokenService};

/// Result type for authorization operations.
pub type AuthResult<T> = Result<T, AuthError>;
