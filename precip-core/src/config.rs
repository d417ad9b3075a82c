use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::model::DEFAULT_ENDPOINT;

/// Environment variable holding the dClimate token.
pub const AUTH_TOKEN_ENV: &str = "AUTH_TOKEN";
/// Environment variable overriding the API base URL.
pub const BASE_URL_ENV: &str = "DCLIMATE_BASE_URL";

/// Adapter configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// auth_token = "..."
/// timeout_secs = 10
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Value sent verbatim in the `Authorization` header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Catalog path used when a job does not carry `endpoint`.
    #[serde(default = "default_endpoint")]
    pub default_endpoint: String,

    /// Per-attempt upstream timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// dClimate writes `0` for days without a record, so a zero reading is
    /// rejected unless this is turned off.
    #[serde(default = "default_treat_zero_as_missing")]
    pub treat_zero_as_missing: bool,
}

fn default_base_url() -> String {
    "https://api.dclimate.net/apiv3".to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_retry_delay_ms() -> u64 {
    1000
}

const fn default_treat_zero_as_missing() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth_token: None,
            base_url: default_base_url(),
            default_endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            treat_zero_as_missing: default_treat_zero_as_missing(),
        }
    }
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn set_auth_token(&mut self, token: String) {
        self.auth_token = Some(token);
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("net", "dclimate", "precip")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Apply `AUTH_TOKEN` / `DCLIMATE_BASE_URL` from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(token) = lookup(AUTH_TOKEN_ENV).filter(|t| !t.is_empty()) {
            self.auth_token = Some(token);
        }
        if let Some(url) = lookup(BASE_URL_ENV).filter(|u| !u.is_empty()) {
            self.base_url = url;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_upstream_contract() {
        let cfg = Config::default();

        assert_eq!(cfg.base_url, "https://api.dclimate.net/apiv3");
        assert_eq!(cfg.default_endpoint, "grid-history/cpcc_precip_us-daily");
        assert_eq!(cfg.timeout(), Duration::from_secs(10));
        assert_eq!(cfg.max_attempts, 3);
        assert!(cfg.treat_zero_as_missing);
        assert!(cfg.auth_token().is_none());
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let cfg: Config = toml::from_str("auth_token = \"SECRET\"\nmax_attempts = 5\n").unwrap();

        assert_eq!(cfg.auth_token(), Some("SECRET"));
        assert_eq!(cfg.max_attempts, 5);
        assert_eq!(cfg.retry_delay(), Duration::from_millis(1000));
    }

    #[test]
    fn empty_token_counts_as_unset() {
        let mut cfg = Config::default();
        cfg.set_auth_token(String::new());
        assert!(cfg.auth_token().is_none());
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut cfg = Config::default();
        cfg.set_auth_token("FROM_FILE".into());

        let cfg = cfg.with_overrides(|key| match key {
            AUTH_TOKEN_ENV => Some("FROM_ENV".to_string()),
            BASE_URL_ENV => Some("http://localhost:9999".to_string()),
            _ => None,
        });

        assert_eq!(cfg.auth_token(), Some("FROM_ENV"));
        assert_eq!(cfg.base_url, "http://localhost:9999");
    }

    #[test]
    fn empty_override_keeps_file_value() {
        let mut cfg = Config::default();
        cfg.set_auth_token("FROM_FILE".into());

        let cfg = cfg.with_overrides(|_| Some(String::new()));

        assert_eq!(cfg.auth_token(), Some("FROM_FILE"));
        assert_eq!(cfg.base_url, "https://api.dclimate.net/apiv3");
    }

    #[test]
    fn missing_file_loads_defaults() {
        let path = std::env::temp_dir().join("precip-core-missing-config/config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.max_attempts, 3);
    }
}
