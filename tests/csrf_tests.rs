mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use common::{
    CSRF_COOKIE, CSRF_HEADER, body_string, create_test_app, fetch_token, login, response_cookie,
    send,
};
use tower::ServiceExt;

#[tokio::test]
async fn test_public_info_without_cookies() {
    let app = create_test_app();

    let response = send(
        &app,
        Request::builder()
            .uri("/api/public/info")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        body_string(response)
            .await
            .starts_with("This is public information")
    );
}

#[tokio::test]
async fn test_csrf_token_endpoint() {
    let app = create_test_app();

    let response = send(
        &app,
        Request::builder()
            .uri("/api/csrf-token")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response_cookie(&response, CSRF_COOKIE).expect("token cookie issued");
    assert_eq!(cookie.path(), Some("/"));
    assert_ne!(cookie.http_only(), Some(true));
    assert_eq!(cookie.max_age(), None);

    let body = body_string(response).await;
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["headerName"], CSRF_HEADER);
    assert_eq!(json["parameterName"], "_csrf");
    let token = json["token"].as_str().unwrap();
    assert!(!token.is_empty());
    assert_eq!(token, cookie.value());
}

#[tokio::test]
async fn test_csrf_token_endpoint_reuses_cookie() {
    let app = create_test_app();

    let response = send(
        &app,
        Request::builder()
            .uri("/api/csrf-token")
            .header(header::COOKIE, format!("{}=existing-token", CSRF_COOKIE))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response_cookie(&response, CSRF_COOKIE).is_none());
    let json: serde_json::Value =
        serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["token"], "existing-token");
}

#[tokio::test]
async fn test_post_profile_without_cookie_rejected() {
    let app = create_test_app();

    let response = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/user/profile")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"data": "x"}"#))
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    // The rejection still hands out a token for the retry
    assert!(response_cookie(&response, CSRF_COOKIE).is_some());
    assert_eq!(body_string(response).await, r#"{"error":"Forbidden"}"#);
}

#[tokio::test]
async fn test_post_profile_with_token_succeeds() {
    let app = create_test_app();
    let client = login(&app).await;

    let response = send(
        &app,
        Request::builder()
            .uri("/api/user/profile")
            .header(header::COOKIE, client.cookie_header())
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "User profile data");

    let response = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/user/profile")
            .header(header::COOKIE, client.cookie_header())
            .header(CSRF_HEADER, &client.csrf)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"data": "Updated profile data"}"#))
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Profile updated successfully");
}

#[tokio::test]
async fn test_token_not_rotated_after_use() {
    let app = create_test_app();
    let client = login(&app).await;

    for _ in 0..3 {
        let response = send(
            &app,
            Request::builder()
                .method("POST")
                .uri("/api/user/profile")
                .header(header::COOKIE, client.cookie_header())
                .header(CSRF_HEADER, &client.csrf)
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response_cookie(&response, CSRF_COOKIE).is_none());
    }
}

#[tokio::test]
async fn test_post_profile_missing_header_rejected() {
    let app = create_test_app();
    let client = login(&app).await;

    let response = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/user/profile")
            .header(header::COOKIE, client.cookie_header())
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_post_profile_mismatched_header_rejected() {
    let app = create_test_app();
    let client = login(&app).await;

    let response = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/user/profile")
            .header(header::COOKIE, client.cookie_header())
            .header(CSRF_HEADER, "forged-token")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_string(response).await, r#"{"error":"Forbidden"}"#);
}

#[tokio::test]
async fn test_empty_cookie_never_validates() {
    let app = create_test_app();
    let client = login(&app).await;

    let response = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/user/profile")
            .header(
                header::COOKIE,
                format!("SESSION={}; {}=", client.session, CSRF_COOKIE),
            )
            .header(CSRF_HEADER, "")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_blank_duplicate_cookie_ignored() {
    let app = create_test_app();
    let client = login(&app).await;

    let response = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/user/profile")
            .header(
                header::COOKIE,
                format!(
                    "SESSION={}; {}=; {}={}",
                    client.session, CSRF_COOKIE, CSRF_COOKIE, client.csrf
                ),
            )
            .header(CSRF_HEADER, &client.csrf)
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response_cookie(&response, CSRF_COOKIE).is_none());
}

#[tokio::test]
async fn test_query_parameter_fallback() {
    let app = create_test_app();
    let client = login(&app).await;

    let response = send(
        &app,
        Request::builder()
            .method("POST")
            .uri(format!("/api/user/profile?_csrf={}", client.csrf))
            .header(header::COOKIE, client.cookie_header())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"data": "x"}"#))
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Profile updated successfully");
}

#[tokio::test]
async fn test_form_field_fallback() {
    let app = create_test_app();
    let client = login(&app).await;

    let response = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/user/profile")
            .header(header::COOKIE, client.cookie_header())
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("data=new&_csrf={}", client.csrf)))
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Profile updated successfully");
}

#[tokio::test]
async fn test_other_mutating_methods_validated() {
    let app = create_test_app();
    let client = login(&app).await;

    for method in ["PUT", "PATCH", "DELETE"] {
        let response = send(
            &app,
            Request::builder()
                .method(method)
                .uri("/api/user/profile")
                .header(header::COOKIE, client.cookie_header())
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", method);
    }
}

#[tokio::test]
async fn test_csrf_checked_before_authentication() {
    let app = create_test_app();
    let token = fetch_token(&app).await;

    // Valid token but no session: reaches the auth gate
    let response = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/user/profile")
            .header(header::COOKIE, format!("{}={}", CSRF_COOKIE, token))
            .header(CSRF_HEADER, &token)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // No token and no session: refused by CSRF first
    let response = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/user/profile")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_exempt_paths_ignore_tokens() {
    let app = create_test_app();

    for uri in ["/", "/index.html", "/js/app.js", "/css/style.css", "/api/public/info"] {
        let response = send(
            &app,
            Request::builder()
                .uri(uri)
                .header(header::COOKIE, format!("{}=whatever", CSRF_COOKIE))
                .header(CSRF_HEADER, "does-not-match")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
    }
}

#[tokio::test]
async fn test_post_to_exempt_path_skips_validation() {
    let app = create_test_app();

    let response = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/public/info")
            .header(header::COOKIE, format!("{}=whatever", CSRF_COOKIE))
            .header(CSRF_HEADER, "does-not-match")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    // Reaches routing instead of being refused
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_concurrent_requests_share_token() {
    let app = create_test_app();
    let client = login(&app).await;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let app = app.clone();
            let request = Request::builder()
                .method("POST")
                .uri("/api/user/profile")
                .header(header::COOKIE, client.cookie_header())
                .header(CSRF_HEADER, &client.csrf)
                .body(Body::empty())
                .unwrap();
            tokio::spawn(async move { app.oneshot(request).await.unwrap() })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().status(), StatusCode::OK);
    }
}
