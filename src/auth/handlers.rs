//! Login and logout transitions.

use std::sync::Arc;

use axum::{
    Form, Router,
    extract::State,
    http::{HeaderMap, Uri},
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::post,
};
use serde::Deserialize;
use tracing::{info, warn};

use super::errors::AuthError;
use super::state::AuthState;
use crate::cookies::{append_set_cookie, get_cookie};
use crate::csrf::CsrfTransition;
use crate::rate_limit::{RateLimitConfig, rate_limit_login};
use crate::session::{SESSION_COOKIE_NAME, clear_session_cookie, session_cookie};

/// Where a successful login lands.
pub const LOGIN_SUCCESS_PATH: &str = "/index.html";

/// Where logout lands.
pub const LOGOUT_SUCCESS_PATH: &str = "/index.html?logout";

pub fn router(state: AuthState, rate_limit: Arc<RateLimitConfig>) -> Router {
    let login_router = Router::new()
        .route("/login", post(login))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(rate_limit, rate_limit_login));

    Router::new()
        .route("/logout", post(logout))
        .with_state(state)
        .merge(login_router)
}

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

/// Exchange credentials for a fresh session and a fresh CSRF token.
///
/// Any session the client already had is destroyed so an id planted before
/// login cannot be reused.
async fn login(
    State(state): State<AuthState>,
    uri: Uri,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<Response, AuthError> {
    if !state.credentials.verify(&form.username, &form.password) {
        warn!(username = %form.username, "Failed login attempt");
        return Err(AuthError::InvalidCredentials);
    }

    if let Some(previous) = get_cookie(&headers, SESSION_COOKIE_NAME) {
        state.sessions.destroy(&previous).await;
    }

    let id = state.sessions.create(&form.username).await;
    let request = state.request_info(&uri, &headers);

    info!(username = %form.username, "User logged in");

    let mut response = Redirect::to(LOGIN_SUCCESS_PATH).into_response();
    append_set_cookie(response.headers_mut(), &session_cookie(&id, &request));
    response.extensions_mut().insert(CsrfTransition::Reissue);

    Ok(response)
}

/// End the session and clear both the session and CSRF cookies.
async fn logout(State(state): State<AuthState>, uri: Uri, headers: HeaderMap) -> Response {
    if let Some(id) = get_cookie(&headers, SESSION_COOKIE_NAME) {
        if state.sessions.destroy(&id).await {
            info!("User logged out");
        }
    }

    let request = state.request_info(&uri, &headers);

    let mut response = Redirect::to(LOGOUT_SUCCESS_PATH).into_response();
    append_set_cookie(response.headers_mut(), &clear_session_cookie(&request));
    response.extensions_mut().insert(CsrfTransition::Clear);

    response
}
