use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};

use super::CsrfToken;

impl<S> FromRequestParts<S> for CsrfToken
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<CsrfToken>().cloned().ok_or_else(|| {
            tracing::error!("CsrfToken extension missing, is csrf_protect installed?");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        })
    }
}
