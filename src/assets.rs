//! Embedded static UI: index page, script and stylesheet.

use axum::{
    Router,
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::get,
};
use rust_embed::Embed;

/// Public assets (no auth, no CSRF)
#[derive(Embed)]
#[folder = "static/"]
pub struct StaticAssets;

/// HTML is never cached so a fresh page always reads the current cookie.
pub const NO_CACHE: &str = "no-cache";

/// Scripts and styles may only come from this origin.
pub const CSP: &str = "default-src 'self'; script-src 'self'; style-src 'self'; object-src 'none'; frame-ancestors 'none'";

const INDEX: &str = "index.html";

pub fn router() -> Router {
    Router::new()
        .route("/", get(static_handler))
        .route("/index.html", get(static_handler))
        .route("/css/{*path}", get(static_handler))
        .route("/js/{*path}", get(static_handler))
}

/// Get MIME type from file extension. Only supports types we actually serve.
#[inline]
pub fn mime_from_path(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("js") => "text/javascript",
        Some("css") => "text/css",
        Some("html") => "text/html; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// Serve an embedded file by request path.
async fn static_handler(uri: Uri) -> Response {
    let path = match uri.path().trim_start_matches('/') {
        "" => INDEX,
        path => path,
    };

    let Some(file) = StaticAssets::get(path) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let mime = mime_from_path(path);
    if path.ends_with(".html") {
        (
            [
                (header::CONTENT_TYPE, mime),
                (header::CACHE_CONTROL, NO_CACHE),
                (header::CONTENT_SECURITY_POLICY, CSP),
            ],
            file.data.into_owned(),
        )
            .into_response()
    } else {
        (
            [(header::CONTENT_TYPE, mime), (header::CACHE_CONTROL, NO_CACHE)],
            file.data.into_owned(),
        )
            .into_response()
    }
}
