//! Configuration management for gemini-client.
//!
//! Configuration is loaded from `~/.config/gemini-client/config.toml` and
//! merged with environment variables and command-line flags into a
//! [`ConnectionSettings`] for the current run.

use anyhow::{anyhow, bail, Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Overrides the gateway URL outright.
pub const ENV_GATEWAY_URL: &str = "GEMINI_GATEWAY_URL";
/// Selects a named environment.
pub const ENV_CLIENT_ENV: &str = "GEMINI_CLIENT_ENV";
/// Platform name shared with the gateway deployment.
pub const ENV_RUNNING_PLATFORM: &str = "RUNNING_PLATFORM";
/// Toggles TLS certificate verification.
pub const ENV_VERIFY_TLS: &str = "GEMINI_VERIFY_TLS";

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Gateway connection defaults.
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Named environments mapped to gateway URLs.
    #[serde(default = "default_environments")]
    pub environments: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            environments: default_environments(),
        }
    }
}

/// Gateway connection defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// URL used when no environment is selected.
    #[serde(default = "default_url")]
    pub url: String,
    /// Verify the gateway's TLS certificate.
    #[serde(default = "default_true")]
    pub verify_tls: bool,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Environment selected when neither flag nor env var names one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            verify_tls: true,
            timeout_secs: default_timeout_secs(),
            environment: None,
        }
    }
}

fn default_url() -> String {
    "http://gemini-gateway.local/gemini".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_environments() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("local".to_string(), "http://localhost:8080/gemini".to_string()),
        ("docker".to_string(), "http://gemini-gateway.local/gemini".to_string()),
        ("cloud".to_string(), "https://gemini-gateway.local/gemini".to_string()),
    ])
}

/// Values taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub environment: Option<String>,
    pub insecure: bool,
    pub timeout_secs: Option<u64>,
}

/// Where the resolved URL came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlSource {
    Flag,
    EnvVar,
    Environment(String),
    ConfigFile,
}

impl fmt::Display for UrlSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlSource::Flag => write!(f, "--url flag"),
            UrlSource::EnvVar => write!(f, "{}", ENV_GATEWAY_URL),
            UrlSource::Environment(name) => write!(f, "environment '{}'", name),
            UrlSource::ConfigFile => write!(f, "gateway.url"),
        }
    }
}

/// Fully resolved connection settings for one run.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub url: Url,
    pub source: UrlSource,
    pub verify_tls: bool,
    pub timeout: Duration,
}

impl Config {
    /// Get the config directory path.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("gemini-client"))
            .context("Could not determine config directory")
    }

    /// Get the config file path.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from `path` (or the default path), using defaults if not found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save configuration to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Look up an environment by name, ignoring case.
    pub fn environment_url(&self, name: &str) -> Option<&str> {
        self.environments
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, url)| url.as_str())
    }

    /// Resolve the connection settings from flags, environment variables and this config.
    ///
    /// `env` is the variable lookup, normally `std::env::var(..).ok()`.
    pub fn resolve<F>(&self, overrides: &Overrides, env: F) -> Result<ConnectionSettings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let (raw_url, source) = if let Some(url) = &overrides.url {
            (url.clone(), UrlSource::Flag)
        } else if let Some(url) = var(ENV_GATEWAY_URL) {
            (url, UrlSource::EnvVar)
        } else if let Some(name) = overrides
            .environment
            .clone()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .or_else(|| var(ENV_CLIENT_ENV))
            .or_else(|| var(ENV_RUNNING_PLATFORM))
            .or_else(|| self.gateway.environment.clone())
        {
            let url = self.environment_url(&name).ok_or_else(|| {
                let known: Vec<&str> = self.environments.keys().map(String::as_str).collect();
                anyhow!(
                    "Unknown environment '{}' (known: {})",
                    name,
                    known.join(", ")
                )
            })?;
            (url.to_string(), UrlSource::Environment(name.to_lowercase()))
        } else {
            (self.gateway.url.clone(), UrlSource::ConfigFile)
        };

        let url = parse_gateway_url(&raw_url)
            .with_context(|| format!("Invalid gateway URL from {}", source))?;

        let verify_tls = if overrides.insecure {
            false
        } else if let Some(value) = var(ENV_VERIFY_TLS) {
            parse_bool(&value)
                .with_context(|| format!("Invalid value for {}", ENV_VERIFY_TLS))?
        } else {
            self.gateway.verify_tls
        };

        if !verify_tls {
            warn!("TLS certificate verification is disabled for {}", url);
        }

        let timeout = Duration::from_secs(
            overrides
                .timeout_secs
                .unwrap_or(self.gateway.timeout_secs),
        );

        Ok(ConnectionSettings {
            url,
            source,
            verify_tls,
            timeout,
        })
    }
}

/// Parse an absolute http(s) URL.
fn parse_gateway_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("'{}' is not a valid URL", raw))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => bail!("unsupported scheme '{}' in '{}'", other, raw),
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected true/false, got '{}'", other),
    }
}
