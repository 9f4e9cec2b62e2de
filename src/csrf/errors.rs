//! CSRF rejection type.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Why a state-changing request was refused.
///
/// The reason is only logged. Clients get the same opaque 403 for every
/// variant so the response cannot be used as a token oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrfError {
    /// No token cookie, or the request did not supply a token.
    MissingToken,
    /// The supplied token does not equal the cookie value.
    TokenMismatch,
}

impl CsrfError {
    pub fn reason(&self) -> &'static str {
        match self {
            CsrfError::MissingToken => "missing token",
            CsrfError::TokenMismatch => "token mismatch",
        }
    }
}

impl std::fmt::Display for CsrfError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}

impl IntoResponse for CsrfError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: &'static str,
        }

        (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse { error: "Forbidden" }),
        )
            .into_response()
    }
}
