//! Out-of-band token retrieval.

use axum::Json;

use crate::csrf::CsrfToken;

/// Return the current token with the names it must be echoed under.
///
/// The value matches the `XSRF-TOKEN` cookie on the same response.
pub async fn get_csrf_token(token: CsrfToken) -> Json<CsrfToken> {
    Json(token)
}
