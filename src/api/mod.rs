mod csrf;
mod profile;
mod public;

use axum::{Router, routing::get};

/// Create the API router. Routes carry their full `/api/...` paths.
pub fn create_api_router() -> Router {
    Router::new()
        .route("/api/csrf-token", get(csrf::get_csrf_token))
        .route(
            "/api/user/profile",
            get(profile::get_profile).post(profile::update_profile),
        )
        .route("/api/public/info", get(public::get_info))
}
