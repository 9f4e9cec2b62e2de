pub mod api;
pub mod assets;
pub mod auth;
pub mod cleanup;
pub mod cli;
pub mod cookies;
pub mod csrf;
pub mod policy;
pub mod rate_limit;
pub mod session;

use api::create_api_router;
use auth::{AuthState, Credentials, require_authentication};
use axum::{Router, middleware};
use csrf::{CookieTokenRepository, CsrfState, csrf_protect};
use policy::RoutePolicy;
use rate_limit::RateLimitConfig;
use session::SessionStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;

pub struct AppConfig {
    /// Session storage (cloneable, shared map internally)
    pub sessions: SessionStore,
    /// Which paths are exempt, anonymous or protected
    pub policy: RoutePolicy,
    /// The login accepted by `POST /login`
    pub credentials: Credentials,
    /// Whether `X-Forwarded-Proto` / `X-Forwarded-For` come from a trusted proxy
    pub trust_proxy: bool,
}

/// Create the application router with the given configuration.
///
/// CSRF validation wraps authentication, so a forged request is refused
/// before the session is even looked at.
pub fn create_app(config: &AppConfig) -> Router {
    let csrf_state = CsrfState {
        repository: Arc::new(CookieTokenRepository::new()),
        policy: Arc::new(config.policy.clone()),
        trust_proxy: config.trust_proxy,
    };

    let auth_state = AuthState {
        sessions: config.sessions.clone(),
        credentials: Arc::new(config.credentials.clone()),
        trust_proxy: config.trust_proxy,
    };

    let rate_limit = Arc::new(RateLimitConfig::new(config.trust_proxy));

    Router::new()
        .merge(assets::router())
        .merge(create_api_router())
        .merge(auth::router(auth_state.clone(), rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn_with_state(csrf_state, csrf_protect))
                .layer(middleware::from_fn_with_state(
                    auth_state,
                    require_authentication,
                )),
        )
}

/// Run cleanup once and spawn the background scheduler.
/// Call this before starting the server.
pub async fn init_cleanup(sessions: &SessionStore) {
    cleanup::run_cleanup(sessions).await;
    cleanup::spawn_cleanup_scheduler(sessions.clone());
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: AppConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, make_service).await
}

/// Start the server on the given port in a background task. Use port 0 to let the OS choose a random port.
/// Returns the actual address the server is listening on.
pub async fn start_server(
    config: AppConfig,
    port: u16,
) -> Result<(tokio::task::JoinHandle<()>, SocketAddr), std::io::Error> {
    init_cleanup(&config.sessions).await;

    let listener = TcpListener::bind(("127.0.0.1", port)).await?;
    let local_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = run_server(config, listener).await {
            tracing::error!(error = %e, "Server error");
        }
    });

    Ok((handle, local_addr))
}
