//! Browser session cookie.
//!
//! The session holds exactly one value, the upstream session token, in a
//! signed, httpOnly, `SameSite=Lax` cookie. Nothing else is persisted; the
//! user and their auth source are re-resolved on every request.

use axum_extra::extract::SignedCookieJar;
use axum_extra::extract::cookie::{Cookie, Key, SameSite};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha512};

use crate::config::DEFAULT_SESSION_SECRET;

/// Session cookie settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub path: String,
    /// Signing secret. Any length; a 64-byte key is derived from it.
    pub secret: SecretString,
    pub secure: bool,
    pub max_age: time::Duration,
}

impl SessionConfig {
    pub const DEFAULT_COOKIE_NAME: &'static str = "seeklit_session";
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: Self::DEFAULT_COOKIE_NAME.to_string(),
            path: "/".to_string(),
            secret: SecretString::from(DEFAULT_SESSION_SECRET),
            secure: false,
            max_age: time::Duration::days(7),
        }
    }
}

/// Reads and writes the session cookie.
#[derive(Clone)]
pub struct SessionStore {
    config: SessionConfig,
    key: Key,
}

impl SessionStore {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        let key = derive_key(&config.secret);
        Self { config, key }
    }

    /// Key used to sign and verify cookies.
    #[must_use]
    pub const fn key(&self) -> &Key {
        &self.key
    }

    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The stored session token, if the cookie is present with a valid signature.
    #[must_use]
    pub fn token(&self, jar: &SignedCookieJar) -> Option<String> {
        jar.get(&self.config.cookie_name)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.trim().is_empty())
    }

    /// Store `token` as the session.
    #[must_use]
    pub fn create(&self, jar: SignedCookieJar, token: &str) -> SignedCookieJar {
        let cookie = Cookie::build((self.config.cookie_name.clone(), token.to_string()))
            .path(self.config.path.clone())
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.config.secure)
            .max_age(self.config.max_age);
        jar.add(cookie)
    }

    /// Remove the session cookie.
    #[must_use]
    pub fn destroy(&self, jar: SignedCookieJar) -> SignedCookieJar {
        jar.remove(Cookie::build(self.config.cookie_name.clone()).path(self.config.path.clone()))
    }
}

/// Derive a signing key from an arbitrary-length secret.
fn derive_key(secret: &SecretString) -> Key {
    let digest = Sha512::digest(secret.expose_secret().as_bytes());
    Key::from(digest.as_slice())
}
