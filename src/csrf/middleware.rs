//! Double-submit cookie validation middleware.
//!
//! Every request gets a token: the one already in its cookie, or a freshly
//! generated one that is written back on the response. State-changing
//! requests to non-exempt paths must echo the cookie value in the CSRF
//! header or the token parameter, otherwise they are refused before any
//! handler runs.

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use super::errors::CsrfError;
use super::repository::CsrfTokenRepository;
use super::token::CsrfToken;
use crate::cookies::RequestInfo;
use crate::policy::{RoutePolicy, is_state_changing};

/// Largest form body buffered while looking for the token field.
pub const MAX_FORM_BODY: usize = 64 * 1024;

/// Shared state for [`csrf_protect`].
#[derive(Clone)]
pub struct CsrfState {
    pub repository: Arc<dyn CsrfTokenRepository>,
    pub policy: Arc<RoutePolicy>,
    /// Honour `X-Forwarded-Proto` when deciding the cookie `Secure` flag.
    pub trust_proxy: bool,
}

/// Token change requested by a handler through a response extension.
///
/// Login attaches `Reissue` so a pre-authentication token cannot carry over
/// into the session; logout attaches `Clear`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrfTransition {
    Reissue,
    Clear,
}

/// Compare the supplied token against the expected one.
///
/// Exact equality, evaluated in constant time over the bytes.
pub fn validate(expected: Option<&CsrfToken>, supplied: Option<&str>) -> Result<(), CsrfError> {
    let expected = expected.ok_or(CsrfError::MissingToken)?;
    let supplied = supplied.ok_or(CsrfError::MissingToken)?;

    if bool::from(supplied.as_bytes().ct_eq(expected.token.as_bytes())) {
        Ok(())
    } else {
        Err(CsrfError::TokenMismatch)
    }
}

fn header_token(headers: &HeaderMap, header_name: &str) -> Option<String> {
    headers
        .get(header_name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| {
            mime.trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
}

fn param_token(encoded: &[u8], parameter_name: &str) -> Option<String> {
    url::form_urlencoded::parse(encoded)
        .find(|(key, _)| key == parameter_name)
        .map(|(_, value)| value.into_owned())
        .filter(|v| !v.is_empty())
}

/// Find the token the client supplied: header first, then the parameter in
/// the query string, then the parameter in a urlencoded form body.
///
/// A form body is buffered to read the field and handed back unchanged.
async fn supplied_token(
    parts: &Parts,
    body: Body,
    token: &CsrfToken,
) -> Result<(Option<String>, Body), Response> {
    if let Some(value) = header_token(&parts.headers, &token.header_name) {
        return Ok((Some(value), body));
    }

    let from_query = parts
        .uri
        .query()
        .and_then(|query| param_token(query.as_bytes(), &token.parameter_name));
    if from_query.is_some() {
        return Ok((from_query, body));
    }

    if !is_form(&parts.headers) {
        return Ok((None, body));
    }

    let bytes = axum::body::to_bytes(body, MAX_FORM_BODY)
        .await
        .map_err(|e| {
            debug!(error = %e, "Failed to buffer form body");
            (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response()
        })?;

    Ok((param_token(&bytes, &token.parameter_name), Body::from(bytes)))
}

/// Middleware enforcing the double-submit cookie check.
///
/// Inserts the current [`CsrfToken`] and the path's
/// [`RouteClass`](crate::policy::RouteClass) into request extensions for
/// inner layers and handlers.
pub async fn csrf_protect(State(state): State<CsrfState>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();
    let info = RequestInfo::from_parts(&parts, state.trust_proxy);
    let class = state.policy.classify(parts.uri.path());

    let loaded = state.repository.load_token(&parts.headers);
    let issued = loaded.is_none();
    let token = loaded
        .clone()
        .unwrap_or_else(|| state.repository.generate_token(&info));

    let body = if class.validates_csrf() && is_state_changing(&parts.method) {
        let (supplied, body) = match supplied_token(&parts, body, &token).await {
            Ok(found) => found,
            Err(response) => return response,
        };

        if let Err(err) = validate(loaded.as_ref(), supplied.as_deref()) {
            warn!(
                method = %parts.method,
                path = %parts.uri.path(),
                reason = %err,
                "Rejected request failing CSRF validation"
            );
            let mut response = err.into_response();
            // Hand out a token so the client can retry
            if issued {
                state
                    .repository
                    .save_token(Some(&token), &info, response.headers_mut());
            }
            return response;
        }

        body
    } else {
        body
    };

    parts.extensions.insert(class);
    parts.extensions.insert(token.clone());

    let mut response = next.run(Request::from_parts(parts, body)).await;

    let transition = response.extensions_mut().remove::<CsrfTransition>();
    let headers = response.headers_mut();
    match transition {
        Some(CsrfTransition::Reissue) => {
            let fresh = state.repository.generate_token(&info);
            debug!("Reissuing CSRF token");
            state.repository.save_token(Some(&fresh), &info, headers);
        }
        Some(CsrfTransition::Clear) => {
            debug!("Clearing CSRF token");
            state.repository.save_token(None, &info, headers);
        }
        None if issued => {
            state.repository.save_token(Some(&token), &info, headers);
        }
        None => {}
    }

    response
}
