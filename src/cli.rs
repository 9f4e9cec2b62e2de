//! CLI argument parsing, validation, and startup helpers.

use std::time::Duration;

use crate::AppConfig;
use crate::auth::Credentials;
use crate::policy::RoutePolicy;
use crate::session::SessionStore;
use clap::Parser;
use tracing::{error, warn};
use uuid::Uuid;

const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "xsrf-guard",
    about = "Double-submit cookie CSRF protection demo"
)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Username accepted by the login form
    #[arg(short, long, default_value = "user", value_parser = validate_username)]
    pub username: String,

    /// Path to file containing the login password. Prefer using APP_PASSWORD env var instead
    #[arg(long)]
    pub password_file: Option<String>,

    /// Trust X-Forwarded-Proto and X-Forwarded-For (only behind a reverse proxy)
    #[arg(long)]
    pub trust_proxy: bool,

    /// Minutes of inactivity before a session expires
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u64).range(1..))]
    pub session_timeout_minutes: u64,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

fn validate_username(s: &str) -> Result<String, String> {
    if s.is_empty() {
        return Err("Username cannot be empty".to_string());
    }

    if s.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err(format!("Username contains invalid characters: {}", s));
    }

    Ok(s.to_string())
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Load the login password from environment variable or file.
///
/// Without either, a random password is generated and printed once so a
/// local demo works out of the box. Returns None and logs an error if the
/// password cannot be loaded or is too short.
pub fn load_password(password_file: Option<&str>) -> Option<String> {
    let password = if let Ok(password) = std::env::var("APP_PASSWORD") {
        // Clear the environment variable to prevent leaking
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var("APP_PASSWORD") };
        password
    } else if let Some(path) = password_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read password file");
                return None;
            }
        }
    } else {
        let generated = Uuid::new_v4().to_string();
        warn!("No password configured, generated one for this run");
        println!();
        println!("Using generated password: {}", generated);
        println!();
        return Some(generated);
    };

    if password.len() < MIN_PASSWORD_LENGTH {
        error!(
            "Password is shorter than {} characters. Use a longer password",
            MIN_PASSWORD_LENGTH
        );
        return None;
    }

    Some(password)
}

/// Build AppConfig from validated arguments.
pub fn build_config(args: &Args, password: String) -> AppConfig {
    AppConfig {
        sessions: SessionStore::new(Duration::from_secs(args.session_timeout_minutes.saturating_mul(60))),
        policy: RoutePolicy::default(),
        credentials: Credentials::new(args.username.clone(), password),
        trust_proxy: args.trust_proxy,
    }
}
