//! Shared state for the authentication layer and handlers.

use std::sync::Arc;

use axum::http::{HeaderMap, Uri};

use super::credentials::Credentials;
use crate::cookies::RequestInfo;
use crate::session::SessionStore;

#[derive(Clone)]
pub struct AuthState {
    pub sessions: SessionStore,
    pub credentials: Arc<Credentials>,
    /// Honour proxy headers when deciding cookie `Secure` flags.
    pub trust_proxy: bool,
}

impl AuthState {
    pub fn request_info(&self, uri: &Uri, headers: &HeaderMap) -> RequestInfo {
        RequestInfo::from_head(uri, headers, self.trust_proxy)
    }
}
