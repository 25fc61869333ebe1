//! Token revocation endpoint handlers (RFC 7009).
//!
//! Both routes answer 200 unless client authentication fails, the value is
//! missing, or the provider is unavailable.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
};

use super::token::header_str;
use crate::token::{RevocationEndpointRequest, TokenEndpointRequest, TokenService};

/// Axum handler for `DELETE /oauth2/tokens/{token}`.
pub async fn revoke_path_handler(
    State(service): State<TokenService>,
    headers: HeaderMap,
    Path(token): Path<String>,
) -> Response {
    service
        .revoke(&RevocationEndpointRequest {
            authorization: header_str(&headers, header::AUTHORIZATION),
            token: Some(token.as_str()),
            token_type_hint: None,
        })
        .await
        .into_response()
}

/// Axum handler for `POST /oauth2/revoke`.
pub async fn revoke_handler(
    State(service): State<TokenService>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    service
        .revoke_form(&TokenEndpointRequest {
            content_type: header_str(&headers, header::CONTENT_TYPE),
            authorization: header_str(&headers, header::AUTHORIZATION),
            body: &body,
        })
        .await
        .into_response()
}
