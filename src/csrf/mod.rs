//! Double-submit cookie CSRF protection.
//!
//! The token lives only in a script-readable cookie. Clients echo it in the
//! `X-XSRF-TOKEN` header (or the `_csrf` parameter) on state-changing
//! requests, and the middleware checks the two are equal.

mod errors;
mod extract;
mod middleware;
mod repository;
mod token;

/// Cookie holding the current token.
pub const DEFAULT_COOKIE_NAME: &str = "XSRF-TOKEN";

/// Header clients echo the token in.
pub const DEFAULT_HEADER_NAME: &str = "X-XSRF-TOKEN";

/// Query or form parameter accepted when the header is absent.
pub const DEFAULT_PARAMETER_NAME: &str = "_csrf";

pub use errors::CsrfError;
pub use middleware::{CsrfState, CsrfTransition, MAX_FORM_BODY, csrf_protect, validate};
pub use repository::{CookieTokenRepository, CsrfTokenRepository};
pub use token::{CsrfToken, generate_value};
