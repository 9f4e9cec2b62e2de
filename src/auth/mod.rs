//! Session-based authentication.
//!
//! One configured user logs in through a form. The session id lives in an
//! `HttpOnly` cookie; protected routes go through [`require_authentication`].

mod credentials;
mod errors;
mod extractors;
mod handlers;
mod ip;
mod state;

pub use credentials::Credentials;
pub use errors::AuthError;
pub use extractors::{Auth, require_authentication};
pub use handlers::{LOGIN_SUCCESS_PATH, LOGOUT_SUCCESS_PATH, router};
pub use ip::{FORWARDED_FOR_HEADER, HasHeadersAndExtensions, extract_client_ip};
pub use state::AuthState;
