//! Provider Configuration
//!
//! Resolves the Bitrise endpoint and token once per provider invocation.
//! Values come from the provider block, then the environment, then the user
//! defaults file; a missing token is not an error at this stage.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Production API endpoint used when nothing else is configured
pub const DEFAULT_ENDPOINT: &str = "https://api.bitrise.io";

pub const ENDPOINT_ENV: &str = "BITRISE_ENDPOINT";
pub const TOKEN_ENV: &str = "BITRISE_TOKEN";

/// Provider block attributes as declared by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderModel {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

/// User defaults file (`<config_dir>/terraform-provider-bitrise/config.json`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserDefaults {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

impl UserDefaults {
    /// Get the defaults file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("terraform-provider-bitrise").join("config.json"))
    }

    /// Load defaults from the user config dir; missing or broken files yield nothing
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable defaults file {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }
}

/// Resolved, immutable provider configuration
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    endpoint: String,
    token: String,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("endpoint", &self.endpoint)
            .field("token", &if self.token.is_empty() { "<empty>" } else { "<redacted>" })
            .finish()
    }
}

impl ProviderConfig {
    /// Build a configuration from raw values, normalizing both
    pub fn new(endpoint: &str, token: &str) -> Self {
        Self {
            endpoint: normalize_endpoint(endpoint),
            token: normalize_token(token),
        }
    }

    /// Resolve against the process environment and the user defaults file
    pub fn resolve(declared: &ProviderModel) -> Self {
        Self::resolve_with(declared, |key| std::env::var(key).ok(), &UserDefaults::load())
    }

    /// Resolve with an explicit environment lookup and defaults
    ///
    /// Precedence per value: declared > environment > defaults file.
    /// The endpoint finally falls back to [`DEFAULT_ENDPOINT`].
    pub fn resolve_with<F>(declared: &ProviderModel, env: F, defaults: &UserDefaults) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = first_non_empty([
            declared.endpoint.clone(),
            env(ENDPOINT_ENV),
            defaults.endpoint.clone(),
        ])
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let token = first_non_empty([declared.token.clone(), env(TOKEN_ENV), defaults.token.clone()])
            .unwrap_or_default();

        let config = Self::new(&endpoint, &token);
        tracing::debug!(
            endpoint = %config.endpoint,
            has_token = config.has_token(),
            "resolved provider configuration"
        );
        config
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }
}

fn first_non_empty<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|v| !normalize_token(v).is_empty())
}

/// Trim whitespace and stray quotes; strip trailing slashes; default the scheme to https
pub fn normalize_endpoint(raw: &str) -> String {
    let cleaned = normalize_token(raw);
    let cleaned = cleaned.trim_end_matches('/');
    if cleaned.is_empty() {
        return String::new();
    }

    if cleaned.contains("://") {
        cleaned.to_string()
    } else {
        format!("https://{}", cleaned)
    }
}

/// Trim whitespace and stray quotes
pub fn normalize_token(raw: &str) -> String {
    raw.trim().trim_matches('"').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_normalize_endpoint_adds_scheme() {
        assert_eq!(normalize_endpoint("api.bitrise.io"), "https://api.bitrise.io");
    }

    #[test]
    fn test_normalize_endpoint_strips_quotes_and_slash() {
        assert_eq!(
            normalize_endpoint("\"https://api.bitrise.io/\""),
            "https://api.bitrise.io"
        );
    }

    #[test]
    fn test_normalize_endpoint_keeps_http() {
        assert_eq!(normalize_endpoint("http://127.0.0.1:8080"), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_normalize_token_strips_quotes() {
        assert_eq!(normalize_token(" \"secret-token\" "), "secret-token");
    }

    #[test]
    fn test_declared_values_win() {
        let declared = ProviderModel {
            endpoint: Some("https://declared.example".to_string()),
            token: Some("declared-token".to_string()),
        };
        let env = env_of(&[(ENDPOINT_ENV, "https://env.example"), (TOKEN_ENV, "env-token")]);

        let config = ProviderConfig::resolve_with(&declared, env, &UserDefaults::default());
        assert_eq!(config.endpoint(), "https://declared.example");
        assert_eq!(config.token(), "declared-token");
    }

    #[test]
    fn test_environment_beats_defaults_file() {
        let defaults = UserDefaults {
            endpoint: Some("https://file.example".to_string()),
            token: Some("file-token".to_string()),
        };
        let env = env_of(&[(TOKEN_ENV, "env-token")]);

        let config = ProviderConfig::resolve_with(&ProviderModel::default(), env, &defaults);
        assert_eq!(config.endpoint(), "https://file.example");
        assert_eq!(config.token(), "env-token");
    }

    #[test]
    fn test_empty_declared_value_falls_through() {
        let declared = ProviderModel {
            endpoint: Some("\"\"".to_string()),
            token: None,
        };

        let config =
            ProviderConfig::resolve_with(&declared, env_of(&[]), &UserDefaults::default());
        assert_eq!(config.endpoint(), DEFAULT_ENDPOINT);
        assert!(!config.has_token());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ProviderConfig::new("https://api.bitrise.io", "super-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_defaults_file_missing_is_empty() {
        let defaults = UserDefaults::load_from(Path::new("/nonexistent/bitrise/config.json"));
        assert!(defaults.endpoint.is_none());
        assert!(defaults.token.is_none());
    }
}
