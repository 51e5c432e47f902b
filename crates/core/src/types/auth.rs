//! Authentication configuration advertised by the Seeklit server.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Which authentication methods are currently enabled.
///
/// Read-only and fetched fresh on every login page load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthInfo {
    /// Preferred method (`oidc`, `audiobookshelf` or `both`).
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub available_methods: AvailableMethods,
    /// Send users straight to the OIDC provider instead of showing the login page.
    #[serde(default = "default_true")]
    pub auto_redirect: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oidc: Option<OidcInfo>,
}

/// Enabled flags per authentication method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailableMethods {
    /// Direct username/password login against the media server.
    pub audiobookshelf: bool,
    pub oidc: bool,
}

/// OIDC details, present only when OIDC is configured.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OidcInfo {
    pub provider_name: Option<String>,
    pub login_url: Option<String>,
    pub callback_url: Option<String>,
}

fn default_method() -> String {
    "oidc".to_string()
}

const fn default_true() -> bool {
    true
}

impl AuthInfo {
    /// Configuration assumed when the server cannot be asked.
    #[must_use]
    pub fn oidc_only() -> Self {
        Self {
            method: default_method(),
            available_methods: AvailableMethods {
                audiobookshelf: false,
                oidc: true,
            },
            auto_redirect: false,
            oidc: None,
        }
    }

    #[must_use]
    pub const fn oidc_enabled(&self) -> bool {
        self.available_methods.oidc
    }

    #[must_use]
    pub const fn direct_enabled(&self) -> bool {
        self.available_methods.audiobookshelf
    }

    /// Whether the login page should immediately hand off to the OIDC provider.
    #[must_use]
    pub fn should_auto_redirect(&self) -> bool {
        self.auto_redirect && self.oidc_enabled() && self.method == "oidc"
    }

    /// Label for the OIDC sign-in button.
    #[must_use]
    pub fn oidc_button_label(&self) -> String {
        let provider = matches!(self.method.as_str(), "oidc" | "both")
            .then(|| self.oidc.as_ref().and_then(|o| o.provider_name.as_deref()))
            .flatten()
            .filter(|name| !name.trim().is_empty());

        provider.map_or_else(
            || "Sign in with OIDC".to_string(),
            |name| format!("Sign in with {name}"),
        )
    }
}

/// Turn an auth error code or server message into text fit for the login page.
///
/// Known OIDC failures (expired state, missing authorization code, provider
/// misconfiguration) get plain-language messages. Anything else is shown
/// verbatim after URL decoding.
#[must_use]
pub fn friendly_auth_error(raw: &str) -> Cow<'_, str> {
    let decoded = urlencoding::decode(&raw.replace('+', " "))
        .map(Cow::into_owned)
        .unwrap_or_else(|_| raw.to_string());

    let friendly = match decoded.trim().to_ascii_lowercase().as_str() {
        "invalid state parameter" | "invalid_state" | "state_expired" => {
            "Your sign-in attempt expired. Please try again."
        }
        "missing authorization code" | "missing_code" => {
            "The sign-in provider did not return an authorization code. Please try again."
        }
        "oidc not configured" | "oidc not configured properly" | "oidc_not_configured" => {
            "Single sign-on is not configured correctly. Please contact your administrator."
        }
        "failed to exchange authorization code" | "token_exchange" => {
            "We could not complete sign-in with your provider. Please try again."
        }
        "session" => "We could not create your session. Please try again.",
        "access_denied" => "Sign-in was cancelled.",
        _ => return Cow::Owned(decoded),
    };

    Cow::Borrowed(friendly)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_info_defaults() {
        let info: AuthInfo = serde_json::from_str("{}").unwrap();
        assert_eq!(info.method, "oidc");
        assert!(info.auto_redirect);
        assert!(!info.oidc_enabled());
        assert!(!info.direct_enabled());
    }

    #[test]
    fn test_auth_info_from_server_payload() {
        let info: AuthInfo = serde_json::from_value(serde_json::json!({
            "method": "oidc",
            "available_methods": {"audiobookshelf": false, "oidc": true},
            "auto_redirect": false,
            "oidc": {"login_url": "/api/v1/auth/login", "callback_url": "/api/v1/auth/callback"}
        }))
        .unwrap();
        assert!(info.oidc_enabled());
        assert!(!info.should_auto_redirect());
        assert_eq!(info.oidc_button_label(), "Sign in with OIDC");
    }

    #[test]
    fn test_button_label_uses_provider_name() {
        let mut info = AuthInfo::oidc_only();
        info.oidc = Some(OidcInfo {
            provider_name: Some("Authentik".to_string()),
            ..OidcInfo::default()
        });
        assert_eq!(info.oidc_button_label(), "Sign in with Authentik");

        info.method = "audiobookshelf".to_string();
        assert_eq!(info.oidc_button_label(), "Sign in with OIDC");
    }

    #[test]
    fn test_oidc_only_fallback_does_not_auto_redirect() {
        let info = AuthInfo::oidc_only();
        assert!(info.oidc_enabled());
        assert!(!info.should_auto_redirect());
    }

    #[test]
    fn test_friendly_known_codes() {
        assert_eq!(
            friendly_auth_error("Invalid+state+parameter"),
            "Your sign-in attempt expired. Please try again."
        );
        assert!(friendly_auth_error("Missing%20authorization%20code").contains("authorization code"));
        assert!(friendly_auth_error("OIDC not configured properly").contains("administrator"));
    }

    #[test]
    fn test_friendly_unknown_is_decoded_verbatim() {
        assert_eq!(
            friendly_auth_error("Something%20odd%3A%20happened"),
            "Something odd: happened"
        );
    }
}
