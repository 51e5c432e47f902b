//! Server settings exposed to the frontend.

use serde::{Deserialize, Serialize};

use super::book::MetadataProvider;

/// Public server settings (no authentication required).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct ServerSettings {
    pub metadata_provider: MetadataProvider,
    #[serde(default)]
    pub indexer_enabled: bool,
    #[serde(default)]
    pub zlibrary_enabled: bool,
    #[serde(default)]
    pub cwa_enabled: bool,
    #[serde(default)]
    pub version: String,
}

/// A single key update to the server configuration (`section::key`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfigUpdate {
    pub key: String,
    pub value: String,
}

/// Whether a configuration key holds a credential that should be masked in the UI.
#[must_use]
pub fn is_sensitive_key(key: &str) -> bool {
    const SENSITIVE: [&str; 5] = ["key", "api", "token", "secret", "password"];
    let lower = key.to_ascii_lowercase();
    SENSITIVE.iter().any(|keyword| lower.contains(keyword))
}
