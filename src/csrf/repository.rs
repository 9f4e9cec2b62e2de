//! Token storage.

use axum::http::HeaderMap;
use cookie::{Cookie, time::Duration};

use super::token::{CsrfToken, generate_value};
use super::{DEFAULT_COOKIE_NAME, DEFAULT_HEADER_NAME, DEFAULT_PARAMETER_NAME};
use crate::cookies::{RequestInfo, append_set_cookie, get_cookies};

/// Where the current CSRF token lives between requests.
///
/// Implementations decide how a token is persisted. Generating a token never
/// persists it; callers decide when to `save_token`.
pub trait CsrfTokenRepository: Send + Sync {
    /// Mint a new token. Does not store it.
    fn generate_token(&self, request: &RequestInfo) -> CsrfToken;

    /// Load the token for the current request, if one exists.
    fn load_token(&self, headers: &HeaderMap) -> Option<CsrfToken>;

    /// Persist `token`, or clear the stored token when `None`.
    fn save_token(&self, token: Option<&CsrfToken>, request: &RequestInfo, response: &mut HeaderMap);
}

/// Stores the token in a cookie readable by page scripts.
///
/// The cookie is never `HttpOnly`: the client has to read it to echo the
/// value back in the CSRF header.
#[derive(Debug, Clone)]
pub struct CookieTokenRepository {
    cookie_name: String,
    header_name: String,
    parameter_name: String,
}

impl Default for CookieTokenRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieTokenRepository {
    pub fn new() -> Self {
        Self {
            cookie_name: DEFAULT_COOKIE_NAME.into(),
            header_name: DEFAULT_HEADER_NAME.into(),
            parameter_name: DEFAULT_PARAMETER_NAME.into(),
        }
    }

    pub fn cookie_name(mut self, cookie_name: impl Into<String>) -> Self {
        self.cookie_name = cookie_name.into();

        self
    }

    pub fn header_name(mut self, header_name: impl Into<String>) -> Self {
        self.header_name = header_name.into();

        self
    }

    pub fn parameter_name(mut self, parameter_name: impl Into<String>) -> Self {
        self.parameter_name = parameter_name.into();

        self
    }

    fn token(&self, value: impl Into<String>) -> CsrfToken {
        CsrfToken::new(&self.header_name, &self.parameter_name, value)
    }
}

impl CsrfTokenRepository for CookieTokenRepository {
    fn generate_token(&self, _request: &RequestInfo) -> CsrfToken {
        self.token(generate_value())
    }

    fn load_token(&self, headers: &HeaderMap) -> Option<CsrfToken> {
        // First non-blank value wins, blank duplicates are skipped
        get_cookies(headers, &self.cookie_name)
            .find(|value| !value.trim().is_empty())
            .map(|value| self.token(value))
    }

    fn save_token(&self, token: Option<&CsrfToken>, request: &RequestInfo, response: &mut HeaderMap) {
        let value = token.map(|t| t.token.clone()).unwrap_or_default();

        let mut cookie = Cookie::build((self.cookie_name.clone(), value))
            .path("/")
            .secure(request.secure)
            .http_only(false);

        // No Max-Age keeps it a session cookie
        if token.is_none() {
            cookie = cookie.max_age(Duration::ZERO);
        }

        append_set_cookie(response, &cookie.build());
    }
}
