//! CSRF token value type and generator.

use serde::Serialize;
use uuid::Uuid;

/// An anti-forgery token together with the names a client may echo it under.
///
/// The token carries no expiry and no binding to a user. Possession of the
/// matching cookie value is the entire trust basis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrfToken {
    /// Request header the client must send the token in.
    pub header_name: String,
    /// Form field accepted as a fallback to the header.
    pub parameter_name: String,
    /// The opaque token value.
    pub token: String,
}

impl CsrfToken {
    pub fn new(
        header_name: impl Into<String>,
        parameter_name: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            header_name: header_name.into(),
            parameter_name: parameter_name.into(),
            token: token.into(),
        }
    }

    pub fn value(&self) -> &str {
        &self.token
    }
}

/// Generate a fresh token value: a random v4 UUID in hyphenated form.
pub fn generate_value() -> String {
    Uuid::new_v4().to_string()
}
