//! Configuration for the registry client

use crate::error::{RegistryError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Response header carrying the upload session token
pub const DEFAULT_UPLOAD_TOKEN_HEADER: &str = "Request-Token";

pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    /// Bearer token, used when no username/password pair is set
    pub token: Option<String>,
}

impl AuthConfig {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
            token: None,
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            username: None,
            password: None,
            token: Some(token.into()),
        }
    }

    pub fn has_credentials(&self) -> bool {
        (self.username.is_some() && self.password.is_some()) || self.token.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Registry base URL, optionally with a base path (`https://host/mirror`)
    pub registry_url: String,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub skip_tls: bool,
    /// Per-request timeout; `None` or zero disables it
    #[serde(default = "default_timeout")]
    pub timeout: Option<Duration>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default = "default_upload_token_header")]
    pub upload_token_header: String,
    #[serde(default)]
    pub verbose: bool,
}

fn default_timeout() -> Option<Duration> {
    Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

fn default_upload_token_header() -> String {
    DEFAULT_UPLOAD_TOKEN_HEADER.to_string()
}

impl ClientConfig {
    pub fn new(registry_url: impl Into<String>) -> Self {
        Self {
            registry_url: registry_url.into(),
            auth: AuthConfig::default(),
            skip_tls: false,
            timeout: default_timeout(),
            user_agent: None,
            upload_token_header: default_upload_token_header(),
            verbose: false,
        }
    }

    /// Load configuration from `REGISTRY_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let registry_url = lookup("REGISTRY_ADDRESS")
            .ok_or_else(|| RegistryError::Config("REGISTRY_ADDRESS not set".to_string()))?;

        let mut config = Self::new(registry_url);
        config.auth = AuthConfig {
            username: lookup("REGISTRY_USERNAME"),
            password: lookup("REGISTRY_PASSWORD"),
            token: lookup("REGISTRY_TOKEN"),
        };
        config.skip_tls = lookup("SKIP_TLS").is_some_and(|v| v == "true" || v == "1");
        if let Some(timeout) = lookup("REGISTRY_TIMEOUT") {
            let secs: u64 = timeout.parse().map_err(|_| {
                RegistryError::Config(format!("REGISTRY_TIMEOUT is not a number: {}", timeout))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }
        if let Some(header) = lookup("REGISTRY_UPLOAD_TOKEN_HEADER") {
            config.upload_token_header = header;
        }
        Ok(config)
    }

    /// Effective timeout, `None` when disabled
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.filter(|timeout| !timeout.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_from_env_requires_address() {
        let err = ClientConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, RegistryError::Config(_)));
    }

    #[test]
    fn test_from_env_reads_all_fields() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("REGISTRY_ADDRESS", "https://registry.example.com"),
            ("REGISTRY_USERNAME", "alice"),
            ("REGISTRY_PASSWORD", "secret"),
            ("SKIP_TLS", "true"),
            ("REGISTRY_TIMEOUT", "30"),
            ("REGISTRY_UPLOAD_TOKEN_HEADER", "Upload-Token"),
        ]))
        .unwrap();

        assert_eq!(config.registry_url, "https://registry.example.com");
        assert_eq!(config.auth.username.as_deref(), Some("alice"));
        assert!(config.auth.has_credentials());
        assert!(config.skip_tls);
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.upload_token_header, "Upload-Token");
    }

    #[test]
    fn test_from_env_rejects_bad_timeout() {
        let err = ClientConfig::from_lookup(lookup_from(&[
            ("REGISTRY_ADDRESS", "http://localhost:5000"),
            ("REGISTRY_TIMEOUT", "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("REGISTRY_TIMEOUT"));
    }

    #[test]
    fn test_zero_timeout_disables_timeout() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("REGISTRY_ADDRESS", "http://localhost:5000"),
            ("REGISTRY_TIMEOUT", "0"),
        ]))
        .unwrap();
        assert_eq!(config.timeout(), None);

        let mut config = ClientConfig::new("http://localhost:5000");
        config.timeout = Some(Duration::from_millis(500));
        assert_eq!(config.timeout(), Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"registry_url": "http://localhost:5000"}"#).unwrap();
        assert_eq!(config.timeout(), Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)));
        assert_eq!(config.upload_token_header, DEFAULT_UPLOAD_TOKEN_HEADER);
        assert!(!config.auth.has_credentials());
    }
}
