//! OAuth 2.0 token endpoint protocol.
//!
//! - [`params`] - Form decoding with RFC 6749 Section 3.2 rules
//! - [`token`] - Token request parameters and the error body
//! - [`client_auth`] - HTTP Basic client authentication
//! - [`grants`] - One handler per grant type

pub mod client_auth;
pub mod grants;
pub mod params;
pub mod token;

pub use client_auth::{authenticate_client, parse_basic_auth};
pub use grants::GrantRequest;
pub use token::{AuthzError, ErrorCode, TokenRequest};
