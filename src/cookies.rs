//! Cookie parsing and serialization.
//!
//! Everything that touches raw `Cookie` / `Set-Cookie` headers goes through
//! here, so the CSRF and session logic only ever deal with plain values.

use axum::http::{HeaderMap, HeaderValue, header, request::Parts};
use cookie::Cookie;
use tracing::error;

/// Header set by reverse proxies to report the client-facing scheme.
pub const FORWARDED_PROTO_HEADER: &str = "x-forwarded-proto";

/// The parts of an inbound request that influence how cookies are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestInfo {
    /// Whether the request arrived over a secure transport.
    pub secure: bool,
}

impl RequestInfo {
    /// Derive request info from the request head.
    ///
    /// The `X-Forwarded-Proto` header is only honoured when `trust_proxy` is
    /// set, since any client can send it.
    pub fn from_parts(parts: &Parts, trust_proxy: bool) -> Self {
        Self::from_head(&parts.uri, &parts.headers, trust_proxy)
    }

    pub fn from_head(uri: &axum::http::Uri, headers: &HeaderMap, trust_proxy: bool) -> Self {
        let scheme_secure = uri.scheme_str() == Some("https");
        let proxy_secure = trust_proxy
            && headers
                .get(FORWARDED_PROTO_HEADER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .is_some_and(|proto| proto.trim().eq_ignore_ascii_case("https"));

        Self {
            secure: scheme_secure || proxy_secure,
        }
    }
}

/// Find a cookie value by name across all `Cookie` headers.
///
/// Headers that are not valid UTF-8 and pairs that fail to parse are skipped,
/// so a malformed header reads the same as an absent cookie.
pub fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    get_cookies(headers, name).next()
}

/// Every value sent under `name`, in header order.
///
/// Browsers send duplicates when cookies differ only in path or domain.
pub fn get_cookies<'a>(headers: &'a HeaderMap, name: &'a str) -> impl Iterator<Item = String> + 'a {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .filter(move |cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_owned())
}

/// Append a `Set-Cookie` header for `cookie`.
pub fn append_set_cookie(headers: &mut HeaderMap, cookie: &Cookie<'_>) {
    match HeaderValue::from_str(&cookie.to_string()) {
        Ok(value) => {
            headers.append(header::SET_COOKIE, value);
        }
        Err(e) => error!(cookie = %cookie.name(), error = %e, "Failed to encode Set-Cookie header"),
    }
}

/// Iterate the cookies a response is setting, parsed back from `Set-Cookie`.
pub fn set_cookies(headers: &HeaderMap) -> impl Iterator<Item = Cookie<'static>> + '_ {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| Cookie::parse(value.to_owned()).ok())
}
