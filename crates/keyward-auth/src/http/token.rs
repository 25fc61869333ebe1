//! Token endpoint handler.
//!
//! # Request Format
//!
//! ```text
//! POST /oauth2/tokens
//! Content-Type: application/x-www-form-urlencoded
//! Authorization: Basic <client_credentials>
//!
//! grant_type=authorization_code&code=...&redirect_uri=...
//! ```

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::token::{EndpointResponse, TokenEndpointRequest, TokenService};

/// Axum handler for `POST /oauth2/tokens`.
pub async fn token_handler(
    State(service): State<TokenService>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    service
        .issue(&TokenEndpointRequest {
            content_type: header_str(&headers, header::CONTENT_TYPE),
            authorization: header_str(&headers, header::AUTHORIZATION),
            body: &body,
        })
        .await
        .into_response()
}

/// Returns a header value if present and valid ASCII.
pub(crate) fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Token and error bodies are never cacheable; revocation answers with an
/// empty 200.
impl IntoResponse for EndpointResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let no_store = [
            (header::CACHE_CONTROL, "no-store"),
            (header::PRAGMA, "no-cache"),
            (header::EXPIRES, "0"),
        ];

        match self {
            Self::Token(token) => (status, no_store, Json(token)).into_response(),
            Self::Error(error) => (status, no_store, Json(error)).into_response(),
            Self::Revoked => status.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;
    use crate::oauth::token::AuthzError;

    #[test]
    fn test_error_response_headers() {
        let response = EndpointResponse::Error(AuthzError::server_error()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
        assert_eq!(response.headers()[header::PRAGMA], "no-cache");
        assert_eq!(response.headers()[header::EXPIRES], "0");
    }

    #[test]
    fn test_client_error_status() {
        let response =
            EndpointResponse::from_error(AuthError::unauthorized_client("Client authentication failed."))
                .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_revoked_is_empty_ok() {
        let response = EndpointResponse::Revoked.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::CACHE_CONTROL).is_none());
    }

    #[test]
    fn test_header_str() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic Ym9vOmJvbw==".parse().unwrap());

        assert_eq!(
            header_str(&headers, header::AUTHORIZATION),
            Some("Basic Ym9vOmJvbw==")
        );
        assert_eq!(header_str(&headers, header::CONTENT_TYPE), None);
    }
}
