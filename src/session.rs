//! In-memory login sessions.
//!
//! Sessions are keyed by a random id held in the `SESSION` cookie and expire
//! after a period of inactivity. Nothing survives a restart.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use cookie::{Cookie, SameSite};
use rand::RngCore;
use tokio::sync::RwLock;

use crate::cookies::RequestInfo;

/// Cookie holding the session id.
pub const SESSION_COOKIE_NAME: &str = "SESSION";

/// Idle time after which a session is discarded.
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// The authenticated user attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub username: String,
}

#[derive(Debug)]
struct Session {
    username: String,
    last_access: Instant,
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    timeout: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TIMEOUT)
    }
}

impl SessionStore {
    pub fn new(timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Start a session for `username` and return its id.
    pub async fn create(&self, username: &str) -> String {
        let id = generate_session_id();
        self.sessions.write().await.insert(
            id.clone(),
            Session {
                username: username.to_string(),
                last_access: Instant::now(),
            },
        );
        id
    }

    /// Look up a live session, refreshing its idle timer.
    pub async fn get(&self, id: &str) -> Option<SessionUser> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(id)?;

        if session.last_access.elapsed() > self.timeout {
            sessions.remove(id);
            return None;
        }

        session.last_access = Instant::now();
        Some(SessionUser {
            username: session.username.clone(),
        })
    }

    /// Remove a session. Returns whether it existed.
    pub async fn destroy(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Drop all sessions idle for longer than the timeout.
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.last_access.elapsed() <= self.timeout);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

fn generate_session_id() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Build the cookie carrying a session id.
pub fn session_cookie(id: &str, request: &RequestInfo) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(request.secure)
        .build()
}

/// Build the cookie that deletes the session id on the client.
pub fn clear_session_cookie(request: &RequestInfo) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(request.secure)
        .max_age(cookie::time::Duration::ZERO)
        .build()
}
