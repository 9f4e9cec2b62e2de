//! Session authentication for protected routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::errors::AuthError;
use super::state::AuthState;
use crate::cookies::get_cookie;
use crate::policy::RouteClass;
use crate::session::{SESSION_COOKIE_NAME, SessionUser};

/// Middleware rejecting unauthenticated requests to protected routes.
///
/// Reads the [`RouteClass`] left by the CSRF layer. A request without one is
/// treated as protected.
pub async fn require_authentication(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let class = request
        .extensions()
        .get::<RouteClass>()
        .copied()
        .unwrap_or(RouteClass::Protected);

    let user = match get_cookie(request.headers(), SESSION_COOKIE_NAME) {
        Some(id) => state.sessions.get(&id).await,
        None => None,
    };

    match user {
        Some(user) => {
            request.extensions_mut().insert(user);
        }
        None if class.requires_authentication() => {
            debug!(path = %request.uri().path(), "Rejected unauthenticated request");
            return AuthError::NotAuthenticated.into_response();
        }
        None => {}
    }

    next.run(request).await
}

/// Extractor for the logged-in user on routes behind [`require_authentication`].
pub struct Auth(pub SessionUser);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionUser>()
            .cloned()
            .map(Auth)
            .ok_or(AuthError::NotAuthenticated)
    }
}
