//! Client authentication for the token and revocation endpoints.
//!
//! Every request must carry HTTP Basic credentials
//! (`client_secret_basic`, RFC 6749 Section 2.3.1), whatever the grant
//! type. Any failure, from a missing header to a wrong secret, is answered
//! with `unauthorized_client` and HTTP 400, and the description never says
//! which check failed.

use tracing::debug;

use crate::AuthResult;
use crate::error::AuthError;
use crate::storage::Provider;
use crate::types::Client;

const CREDENTIALS_REQUIRED: &str = "Client authentication via HTTP Basic is required.";
const CREDENTIALS_REJECTED: &str = "Client authentication failed.";

/// Authenticates the client presenting an `Authorization` header.
///
/// # Errors
///
/// Returns `unauthorized_client` if the header is missing or malformed, the
/// client is unknown, or the provider rejects the secret. Provider failures
/// propagate unchanged.
pub async fn authenticate_client(
    authorization: Option<&str>,
    provider: &dyn Provider,
) -> AuthResult<Client> {
    let (client_id, client_secret) = authorization
        .and_then(parse_basic_auth)
        .ok_or_else(|| AuthError::unauthorized_client(CREDENTIALS_REQUIRED))?;

    let Some(client) = provider.find_client(&client_id).await? else {
        debug!(client_id = %client_id, "Unknown client");
        return Err(AuthError::unauthorized_client(CREDENTIALS_REJECTED));
    };

    if !provider.verify_client_secret(&client, &client_secret).await? {
        debug!(client_id = %client.id, "Client secret rejected");
        return Err(AuthError::unauthorized_client(CREDENTIALS_REJECTED));
    }

    Ok(client)
}

/// Parses HTTP Basic auth credentials from an Authorization header.
///
/// The scheme name is matched case-insensitively. The secret may contain
/// colons; only the first one separates it from the client id.
///
/// # Example
///
/// ```
/// use keyward_auth::oauth::client_auth::parse_basic_auth;
///
/// // "testclient:testclient"
/// let header = "Basic dGVzdGNsaWVudDp0ZXN0Y2xpZW50";
/// let (id, secret) = parse_basic_auth(header).unwrap();
/// assert_eq!(id, "testclient");
/// assert_eq!(secret, "testclient");
/// ```
#[must_use]
pub fn parse_basic_auth(header_value: &str) -> Option<(String, String)> {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    let (scheme, encoded) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("Basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let credentials = String::from_utf8(decoded).ok()?;

    let (client_id, client_secret) = credentials.split_once(':')?;
    if client_id.is_empty() {
        return None;
    }

    Some((client_id.to_string(), client_secret.to_string()))
}
