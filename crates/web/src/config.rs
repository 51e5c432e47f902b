//! Web frontend configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `SEEKLIT_HOST` - Bind address (default: 127.0.0.1)
//! - `SEEKLIT_PORT` - Listen port (default: 3000)
//! - `SEEKLIT_SERVER_URL` - Seeklit API server base URL used for server-side
//!   calls (default: the origin of the incoming request)
//! - `SEEKLIT_PUBLIC_SERVER_URL` - Seeklit API server URL as seen by browsers
//!   (default: same origin)
//! - `SEEKLIT_ABS_URL` - Audiobookshelf media server base URL (default: the
//!   origin of the incoming request)
//! - `SESSION_SECRET` - Cookie signing secret (min 32 chars, high entropy)
//! - `SESSION_COOKIE_NAME` - Session cookie name (default: `seeklit_session`)
//! - `SESSION_COOKIE_PATH` - Session cookie path (default: `/`)
//! - `SESSION_SECURE_COOKIES` - Mark the cookie `Secure` (default: false)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//!
//! Values starting with `BAKED_` are build-time placeholders left in container
//! images and are treated as unset.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::session::SessionConfig;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Secret used when `SESSION_SECRET` is not set.
///
/// Kept so existing deployments keep their sessions; startup logs a warning.
pub(crate) const DEFAULT_SESSION_SECRET: &str = "1516f9724a85dc602555cc4f1";

/// Prefix of unset build-time placeholders.
const BAKED_PLACEHOLDER_PREFIX: &str = "BAKED_";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Web frontend configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Upstream service locations
    pub upstream: UpstreamConfig,
    /// Session cookie settings
    pub session: SessionConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Where the Seeklit API server and the media server live.
#[derive(Debug, Clone, Default)]
pub struct UpstreamConfig {
    /// Seeklit API server for server-side calls.
    pub server_url: Option<String>,
    /// Seeklit API server as reachable from the browser.
    pub public_server_url: Option<String>,
    /// Audiobookshelf media server.
    pub media_server_url: Option<String>,
}

impl WebConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable cannot be parsed or if a configured
    /// session secret fails validation (length, placeholder detection, entropy).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("SEEKLIT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SEEKLIT_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SEEKLIT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SEEKLIT_PORT".to_string(), e.to_string()))?;

        let upstream = UpstreamConfig {
            server_url: get_optional_env("SEEKLIT_SERVER_URL"),
            public_server_url: get_optional_env("SEEKLIT_PUBLIC_SERVER_URL"),
            media_server_url: get_optional_env("SEEKLIT_ABS_URL"),
        };

        let session = SessionConfig {
            cookie_name: get_env_or_default("SESSION_COOKIE_NAME", SessionConfig::DEFAULT_COOKIE_NAME),
            path: get_env_or_default("SESSION_COOKIE_PATH", "/"),
            secret: get_session_secret("SESSION_SECRET")?,
            secure: get_bool_env("SESSION_SECURE_COOKIES")?,
            ..SessionConfig::default()
        };

        Ok(Self {
            host,
            port,
            upstream,
            session,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Treat empty values and `BAKED_` placeholders as unset.
#[must_use]
pub fn usable_value(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.starts_with(BAKED_PLACEHOLDER_PREFIX))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    let value = std::env::var(key).ok();
    usable_value(value.as_deref()).map(String::from)
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse a boolean flag (`true`/`1`/`yes` or `false`/`0`/`no`), defaulting to false.
fn get_bool_env(key: &str) -> Result<bool, ConfigError> {
    get_optional_env(key).map_or(Ok(false), |value| parse_bool(key, &value))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

/// Load the session secret, falling back to the built-in default when unset.
fn get_session_secret(key: &str) -> Result<SecretString, ConfigError> {
    let Some(value) = get_optional_env(key) else {
        tracing::warn!(
            "{key} is not set; signing session cookies with the built-in default secret. \
             Set {key} to a random value of at least {MIN_SESSION_SECRET_LENGTH} characters."
        );
        return Ok(SecretString::from(DEFAULT_SESSION_SECRET));
    };

    let secret = SecretString::from(value);
    validate_session_secret(&secret, key)?;
    validate_secret_strength(secret.expose_secret(), key)?;
    Ok(secret)
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}
