//! Application configuration management.
//!
//! Configuration is layered: built-in defaults, then the optional file at
//! `~/.config/slotbook/config.json`, then environment variables.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::CredentialMode;

/// Application name used for config/data directory paths
const APP_NAME: &str = "slotbook";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// API location used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const API_URL_ENV: &str = "PUBLIC_API_URL";
pub const CREDENTIAL_MODE_ENV: &str = "SLOTBOOK_CREDENTIAL_MODE";
pub const CREDENTIAL_STORE_ENV: &str = "SLOTBOOK_CREDENTIAL_STORE";

/// Where bearer tokens are persisted between runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialStoreKind {
    #[default]
    Keyring,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub credential_mode: CredentialMode,
    pub credential_store: CredentialStoreKind,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            credential_mode: CredentialMode::default(),
            credential_store: CredentialStoreKind::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_url = url.trim().to_string();
        }

        if let Some(mode) = lookup(CREDENTIAL_MODE_ENV) {
            match mode.parse() {
                Ok(mode) => self.credential_mode = mode,
                Err(e) => warn!(error = %e, "Ignoring {}", CREDENTIAL_MODE_ENV),
            }
        }

        if let Some(kind) = lookup(CREDENTIAL_STORE_ENV) {
            match kind.trim().to_ascii_lowercase().as_str() {
                "keyring" => self.credential_store = CredentialStoreKind::Keyring,
                "file" => self.credential_store = CredentialStoreKind::File,
                other => warn!(value = other, "Ignoring {}", CREDENTIAL_STORE_ENV),
            }
        }
    }

    /// Base URL without a trailing slash, ready for path concatenation.
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the file-backed credential store.
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://localhost:3000");
        assert_eq!(config.credential_mode, CredentialMode::BearerToken);
        assert_eq!(config.credential_store, CredentialStoreKind::Keyring);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(env(&[
            (API_URL_ENV, "https://api.example.com/"),
            (CREDENTIAL_MODE_ENV, "cookie"),
            (CREDENTIAL_STORE_ENV, "file"),
        ]));
        assert_eq!(config.base_url(), "https://api.example.com");
        assert_eq!(config.credential_mode, CredentialMode::SessionCookie);
        assert_eq!(config.credential_store, CredentialStoreKind::File);
    }

    #[test]
    fn test_empty_or_invalid_env_is_ignored() {
        let mut config = Config::default();
        config.apply_env(env(&[
            (API_URL_ENV, "  "),
            (CREDENTIAL_MODE_ENV, "basic"),
            (CREDENTIAL_STORE_ENV, "vault"),
        ]));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"credential_mode": "cookie"}"#).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.credential_mode, CredentialMode::SessionCookie);
    }
}
