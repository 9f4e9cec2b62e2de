#![allow(dead_code)]

use std::net::SocketAddr;

use axum::{
    Router,
    body::Body,
    extract::ConnectInfo,
    http::{Request, StatusCode, header},
    response::Response,
};
use cookie::Cookie;
use tower::ServiceExt;
use xsrf_guard::auth::Credentials;
use xsrf_guard::cookies::set_cookies;
use xsrf_guard::policy::RoutePolicy;
use xsrf_guard::session::{SESSION_COOKIE_NAME, SessionStore};
use xsrf_guard::{AppConfig, create_app};

pub const TEST_USERNAME: &str = "user";
pub const TEST_PASSWORD: &str = "test-password";
pub const CSRF_COOKIE: &str = "XSRF-TOKEN";
pub const CSRF_HEADER: &str = "X-XSRF-TOKEN";

pub fn test_config() -> AppConfig {
    AppConfig {
        sessions: SessionStore::default(),
        policy: RoutePolicy::default(),
        credentials: Credentials::new(TEST_USERNAME, TEST_PASSWORD),
        trust_proxy: false,
    }
}

pub fn create_test_app() -> Router {
    create_app(&test_config())
}

/// Peer address a real server would attach; oneshot requests have none.
pub fn client_addr() -> ConnectInfo<SocketAddr> {
    ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 50000)))
}

pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// The cookie named `name` set by `response`, if any.
pub fn response_cookie(response: &Response, name: &str) -> Option<Cookie<'static>> {
    set_cookies(response.headers()).find(|c| c.name() == name)
}

/// Send a request through a clone of the app.
pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

/// Obtain a token the way a fresh client would: `GET /api/csrf-token`.
pub async fn fetch_token(app: &Router) -> String {
    let response = send(
        app,
        Request::builder()
            .uri("/api/csrf-token")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response_cookie(&response, CSRF_COOKIE).expect("token cookie issued");
    cookie.value().to_string()
}

/// Cookies held by a logged-in test client.
pub struct LoggedIn {
    pub session: String,
    pub csrf: String,
}

impl LoggedIn {
    pub fn cookie_header(&self) -> String {
        format!(
            "{}={}; {}={}",
            SESSION_COOKIE_NAME, self.session, CSRF_COOKIE, self.csrf
        )
    }
}

pub fn login_request(csrf: &str, username: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::COOKIE, format!("{}={}", CSRF_COOKIE, csrf))
        .header(CSRF_HEADER, csrf)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .extension(client_addr())
        .body(Body::from(format!(
            "username={}&password={}",
            username, password
        )))
        .unwrap()
}

/// Fetch a token, log in, and return the session and reissued token.
pub async fn login(app: &Router) -> LoggedIn {
    let csrf = fetch_token(app).await;
    let response = send(app, login_request(&csrf, TEST_USERNAME, TEST_PASSWORD)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let session = response_cookie(&response, SESSION_COOKIE_NAME).expect("session cookie");
    let csrf = response_cookie(&response, CSRF_COOKIE).expect("reissued token cookie");

    LoggedIn {
        session: session.value().to_string(),
        csrf: csrf.value().to_string(),
    }
}
