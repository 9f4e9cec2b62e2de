//! Route classification for authentication and CSRF validation.
//!
//! The policy is built once at startup and handed to the middleware stack.

use axum::http::Method;

/// Paths served to anyone, never CSRF-validated.
pub const DEFAULT_EXEMPT_PATHS: &[&str] = &["/", "/index.html", "/css/**", "/js/**", "/api/public/**"];

/// Paths that need no session but still validate CSRF on mutating requests.
pub const DEFAULT_ANONYMOUS_PATHS: &[&str] = &["/login", "/logout", "/api/csrf-token"];

/// How a request path is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// No authentication and no CSRF validation.
    Exempt,
    /// No authentication, CSRF validation on mutating requests.
    Anonymous,
    /// Authentication required, CSRF validation on mutating requests.
    Protected,
}

impl RouteClass {
    pub fn requires_authentication(self) -> bool {
        self == RouteClass::Protected
    }

    pub fn validates_csrf(self) -> bool {
        self != RouteClass::Exempt
    }
}

/// Whether `method` can change server state and therefore needs a token.
pub fn is_state_changing(method: &Method) -> bool {
    !matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

/// A path pattern: either an exact path or `prefix/**`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    Exact(String),
    /// Matches the prefix itself and anything below it.
    Prefix(String),
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Result<Self, String> {
        if !pattern.starts_with('/') {
            return Err(format!("Path pattern must start with '/': {}", pattern));
        }

        if let Some(prefix) = pattern.strip_suffix("/**") {
            if prefix.contains('*') {
                return Err(format!("'**' is only allowed as the final segment: {}", pattern));
            }
            return Ok(Self::Prefix(prefix.to_string()));
        }

        if pattern.contains('*') {
            return Err(format!("'**' is only allowed as the final segment: {}", pattern));
        }

        Ok(Self::Exact(pattern.to_string()))
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(exact) => path == exact,
            Self::Prefix(prefix) => {
                path == prefix
                    || path
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
        }
    }
}

/// Static route tables deciding authentication and CSRF handling per path.
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    exempt: Vec<PathPattern>,
    anonymous: Vec<PathPattern>,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        // The default tables are constants and always parse
        Self {
            exempt: parse_all(DEFAULT_EXEMPT_PATHS).unwrap_or_default(),
            anonymous: parse_all(DEFAULT_ANONYMOUS_PATHS).unwrap_or_default(),
        }
    }
}

fn parse_all(patterns: &[&str]) -> Result<Vec<PathPattern>, String> {
    patterns.iter().map(|p| PathPattern::parse(p)).collect()
}

impl RoutePolicy {
    pub fn new(exempt: &[&str], anonymous: &[&str]) -> Result<Self, String> {
        Ok(Self {
            exempt: parse_all(exempt)?,
            anonymous: parse_all(anonymous)?,
        })
    }

    /// Classify a request path.
    ///
    /// Paths with dot segments or empty segments are always protected, so a
    /// path like `/css/../api/user/profile` cannot borrow an exemption.
    pub fn classify(&self, path: &str) -> RouteClass {
        if !is_canonical(path) {
            return RouteClass::Protected;
        }

        if self.exempt.iter().any(|p| p.matches(path)) {
            RouteClass::Exempt
        } else if self.anonymous.iter().any(|p| p.matches(path)) {
            RouteClass::Anonymous
        } else {
            RouteClass::Protected
        }
    }
}

fn is_canonical(path: &str) -> bool {
    if path == "/" {
        return true;
    }
    let Some(rest) = path.strip_prefix('/') else {
        return false;
    };
    // A single trailing slash is fine, "//" and dot segments are not
    let rest = rest.strip_suffix('/').unwrap_or(rest);
    rest.split('/')
        .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}
