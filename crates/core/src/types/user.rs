//! Authenticated user types.
//!
//! Upstream services disagree on the shape of a user: the Seeklit server
//! returns `token` (and a per-session `auth_source`), newer Audiobookshelf
//! releases return `accessToken`, older ones only `token`. [`WireUser`]
//! accepts all of them; [`WireUser::into_user`] is the single place a
//! [`User`] is built, and it refuses to build one without a token.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Which authentication mechanism produced the current session.
///
/// Derived per request from the code path that resolved the user; it is
/// never persisted in the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthSource {
    /// OpenID Connect login completed by the Seeklit server.
    Oidc,
    /// Username/password login against the media server.
    Direct,
}

impl AuthSource {
    /// Parse the tag used by upstream services.
    ///
    /// The Seeklit server has used several spellings for direct-credential
    /// sessions over time; all of them map to [`AuthSource::Direct`].
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "oidc" => Some(Self::Oidc),
            "direct" | "audiobookshelf" | "abs" | "local" => Some(Self::Direct),
            _ => None,
        }
    }

    /// Returns the canonical tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Oidc => "oidc",
            Self::Direct => "direct",
        }
    }
}

impl fmt::Display for AuthSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User role as reported by the media server's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Root,
    Admin,
    /// Any other account type (`user`, `guest`, ...).
    #[default]
    User,
}

impl Role {
    /// Map an upstream `type` value to a role. Unknown values are ordinary users.
    #[must_use]
    pub fn from_type(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("root") => Self::Root,
            Some("admin") => Self::Admin,
            _ => Self::User,
        }
    }

    /// Whether this role may manage server configuration.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Root | Self::Admin)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

/// Media server permission flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(clippy::struct_excessive_bools)]
pub struct UserPermissions {
    pub download: bool,
    pub update: bool,
    pub delete: bool,
    pub upload: bool,
    pub access_all_libraries: bool,
    pub access_all_tags: bool,
    pub access_explicit_content: bool,
}

/// A fully resolved user.
///
/// Always carries a non-empty access token. `Debug` redacts the token.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Role,
    pub access_token: String,
    pub permissions: UserPermissions,
    pub auth_source: AuthSource,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("role", &self.role)
            .field("access_token", &"[REDACTED]")
            .field("permissions", &self.permissions)
            .field("auth_source", &self.auth_source)
            .finish()
    }
}

impl User {
    /// The browser-safe view of this user (no token).
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
            permissions: self.permissions,
            auth_source: self.auth_source,
        }
    }

    /// Name to show in the UI: the display name when present, else the username.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

/// Serializable user view returned to the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: Role,
    pub permissions: UserPermissions,
    pub auth_source: AuthSource,
}

/// User payload as sent by upstream services.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireUser {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub user_type: Option<String>,
    #[serde(default, rename = "accessToken")]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub auth_source: Option<String>,
    #[serde(default)]
    pub permissions: Option<UserPermissions>,
}

impl WireUser {
    /// The bearer token, preferring `accessToken` over the legacy `token` field.
    ///
    /// Blank values count as missing.
    #[must_use]
    pub fn normalized_token(&self) -> Option<&str> {
        non_blank(self.access_token.as_deref()).or_else(|| non_blank(self.token.as_deref()))
    }

    /// The `auth_source` tag carried on the user object, if recognised.
    #[must_use]
    pub fn auth_source(&self) -> Option<AuthSource> {
        self.auth_source.as_deref().and_then(AuthSource::parse)
    }

    /// Lift into a [`User`].
    ///
    /// `auth_source` wins over the user's own tag; `fallback_source` is used
    /// when neither is known. Returns `None` when no token or username is
    /// present, so a partially populated user can never escape.
    #[must_use]
    pub fn into_user(
        self,
        auth_source: Option<AuthSource>,
        fallback_source: AuthSource,
    ) -> Option<User> {
        let access_token = self.normalized_token()?.to_owned();
        let username = non_blank(self.username.as_deref())?.to_owned();
        let auth_source = auth_source
            .or_else(|| self.auth_source())
            .unwrap_or(fallback_source);
        let id = match self.id {
            Some(serde_json::Value::String(s)) => s,
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => username.clone(),
        };

        Some(User {
            id,
            username,
            email: self.email.filter(|e| !e.trim().is_empty()),
            name: self.name.filter(|n| !n.trim().is_empty()),
            role: Role::from_type(self.user_type.as_deref()),
            access_token,
            permissions: self.permissions.unwrap_or_default(),
            auth_source,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn wire(json: serde_json::Value) -> WireUser {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_token_field_is_used_when_access_token_missing() {
        let user = wire(serde_json::json!({"username": "alice", "token": "abc"}))
            .into_user(None, AuthSource::Oidc)
            .unwrap();
        assert_eq!(user.access_token, "abc");
    }

    #[test]
    fn test_access_token_wins_over_token() {
        let user = wire(serde_json::json!({
            "username": "alice",
            "token": "legacy",
            "accessToken": "fresh"
        }))
        .into_user(None, AuthSource::Direct)
        .unwrap();
        assert_eq!(user.access_token, "fresh");
    }

    #[test]
    fn test_blank_access_token_falls_back_to_token() {
        let user = wire(serde_json::json!({
            "username": "alice",
            "token": "abc",
            "accessToken": "  "
        }))
        .into_user(None, AuthSource::Direct)
        .unwrap();
        assert_eq!(user.access_token, "abc");
    }

    #[test]
    fn test_missing_token_yields_no_user() {
        let lifted = wire(serde_json::json!({"username": "alice", "token": ""}))
            .into_user(None, AuthSource::Oidc);
        assert!(lifted.is_none());
    }

    #[test]
    fn test_missing_username_yields_no_user() {
        let lifted = wire(serde_json::json!({"token": "abc"})).into_user(None, AuthSource::Oidc);
        assert!(lifted.is_none());
    }

    #[test]
    fn test_auth_source_precedence() {
        let w = wire(serde_json::json!({
            "username": "bob",
            "token": "t",
            "auth_source": "audiobookshelf"
        }));
        let from_user = w.clone().into_user(None, AuthSource::Oidc).unwrap();
        assert_eq!(from_user.auth_source, AuthSource::Direct);

        let explicit = w.into_user(Some(AuthSource::Oidc), AuthSource::Direct).unwrap();
        assert_eq!(explicit.auth_source, AuthSource::Oidc);
    }

    #[test]
    fn test_numeric_id_and_role() {
        let user = wire(serde_json::json!({
            "id": 17,
            "username": "root",
            "type": "root",
            "token": "t",
            "permissions": {"download": true, "accessAllLibraries": true}
        }))
        .into_user(None, AuthSource::Direct)
        .unwrap();
        assert_eq!(user.id, "17");
        assert_eq!(user.role, Role::Root);
        assert!(user.role.is_admin());
        assert!(user.permissions.download);
        assert!(user.permissions.access_all_libraries);
        assert!(!user.permissions.upload);
    }

    #[test]
    fn test_role_from_type() {
        assert_eq!(Role::from_type(Some("admin")), Role::Admin);
        assert_eq!(Role::from_type(Some("guest")), Role::User);
        assert_eq!(Role::from_type(None), Role::User);
        assert!(!Role::User.is_admin());
    }

    #[test]
    fn test_auth_source_parse() {
        assert_eq!(AuthSource::parse("OIDC"), Some(AuthSource::Oidc));
        assert_eq!(AuthSource::parse("abs"), Some(AuthSource::Direct));
        assert_eq!(AuthSource::parse("saml"), None);
    }

    #[test]
    fn test_debug_redacts_token() {
        let user = wire(serde_json::json!({"username": "alice", "token": "super-secret-token"}))
            .into_user(None, AuthSource::Oidc)
            .unwrap();
        let debug = format!("{user:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret-token"));
    }

    #[test]
    fn test_profile_omits_token() {
        let user = wire(serde_json::json!({"username": "alice", "token": "abc", "name": "Alice"}))
            .into_user(None, AuthSource::Oidc)
            .unwrap();
        let json = serde_json::to_value(user.profile()).unwrap();
        assert_eq!(json["username"], "alice");
        assert_eq!(json["auth_source"], "oidc");
        assert!(json.get("access_token").is_none());
        assert_eq!(user.display_name(), "Alice");
    }
}
