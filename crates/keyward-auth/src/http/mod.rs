//! HTTP handlers for the OAuth 2.0 endpoints.
//!
//! # Available Handlers
//!
//! - [`token`] - Token endpoint (RFC 6749 Section 3.2)
//! - [`revoke`] - Token revocation endpoint (RFC 7009)
//!
//! # Usage
//!
//! ```ignore
//! use keyward_auth::http::oauth_router;
//!
//! let app = Router::new().merge(oauth_router(token_service));
//! ```

pub mod revoke;
pub mod token;

use axum::{
    Router,
    routing::{delete, post},
};

use crate::token::TokenService;

pub use revoke::{revoke_handler, revoke_path_handler};
pub use token::token_handler;

/// Routes for the token and revocation endpoints.
pub fn oauth_router(service: TokenService) -> Router {
    Router::new()
        .route("/oauth2/tokens", post(token_handler))
        .route("/oauth2/tokens/{token}", delete(revoke_path_handler))
        .route("/oauth2/revoke", post(revoke_handler))
        .with_state(service)
}
