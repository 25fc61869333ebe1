//! Token issuance and revocation.
//!
//! - [`service`] - The token service driving both endpoints
//! - [`revocation`] - Token revocation request types (RFC 7009)
//! - [`response`] - Endpoint outcomes before HTTP rendering

pub mod response;
pub mod revocation;
pub mod service;

pub use response::EndpointResponse;
pub use revocation::{RevocationEndpointRequest, TokenTypeHint};
pub use service::{TokenEndpointRequest, TokenService};
