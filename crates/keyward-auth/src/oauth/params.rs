//! Form-encoded parameter decoding.
//!
//! Token and revocation requests arrive as `application/x-www-form-urlencoded`
//! bodies. RFC 6749 Section 3.2 forbids repeating a parameter, and Section 3.1
//! treats parameters sent without a value as omitted; both rules are applied
//! here once so the endpoints can read parameters by name.

use std::collections::HashMap;

use crate::AuthResult;
use crate::error::AuthError;

/// The only content type accepted by the token and revocation endpoints.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Decoded form parameters with duplicates rejected.
#[derive(Debug, Clone, Default)]
pub struct FormParams {
    values: HashMap<String, String>,
}

impl FormParams {
    /// Decodes a form body.
    ///
    /// # Errors
    ///
    /// Returns `invalid_request` if any parameter appears more than once.
    pub fn parse(body: &[u8]) -> AuthResult<Self> {
        let mut values = HashMap::new();
        for (name, value) in url::form_urlencoded::parse(body) {
            if values.contains_key(name.as_ref()) {
                return Err(AuthError::invalid_request(format!(
                    "Parameter '{}' was included more than once.",
                    name
                )));
            }
            values.insert(name.into_owned(), value.into_owned());
        }
        Ok(Self { values })
    }

    /// Returns a parameter value, treating empty values as absent.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Returns an owned copy of a parameter value.
    #[must_use]
    pub fn get_owned(&self, name: &str) -> Option<String> {
        self.get(name).map(str::to_string)
    }
}

/// Checks that a declared content type is form-encoded.
///
/// Media type parameters such as `charset` are ignored and the comparison
/// is case-insensitive.
///
/// # Errors
///
/// Returns `invalid_request` if the content type is missing or different.
pub fn require_form_content_type(content_type: Option<&str>) -> AuthResult<()> {
    let media_type = content_type
        .and_then(|ct| ct.split(';').next())
        .map(str::trim)
        .unwrap_or_default();

    if media_type.eq_ignore_ascii_case(FORM_CONTENT_TYPE) {
        Ok(())
    } else {
        Err(AuthError::invalid_request(format!(
            "Content-Type must be {}.",
            FORM_CONTENT_TYPE
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decodes_values() {
        let params = FormParams::parse(b"scope=read+write&redirect_uri=https%3A%2F%2Fa.b%2Fc").unwrap();
        assert_eq!(params.get("scope"), Some("read write"));
        assert_eq!(params.get("redirect_uri"), Some("https://a.b/c"));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn test_parse_rejects_duplicates() {
        assert!(FormParams::parse(b"code=a&code=a").is_err());
    }

    #[test]
    fn test_content_type_with_charset() {
        assert!(
            require_form_content_type(Some("application/x-www-form-urlencoded; charset=UTF-8"))
                .is_ok()
        );
        assert!(require_form_content_type(Some("Application/X-WWW-Form-Urlencoded")).is_ok());
    }

    #[test]
    fn test_content_type_rejected() {
        assert!(require_form_content_type(Some("application/json")).is_err());
        assert!(require_form_content_type(None).is_err());
    }
}
