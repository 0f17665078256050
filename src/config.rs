use crate::secret::{Secret, SecretStore};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

pub const YEXT_BASE_URL: &str = "https://api.yext.com";
pub const COGNITIVE_BASE_URL: &str = "https://api.cognitive.microsoft.com";
pub const TEXT_ANALYTICS_BASE_URL: &str = "https://westeurope.api.cognitive.microsoft.com";
pub const TRANSLATOR_BASE_URL: &str = "https://api.cognitive.microsofttranslator.com";

/// Complete connector host configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub endpoints: EndpointConfig,
    /// Named secrets, one TOML table per secret.
    #[serde(default)]
    pub secrets: HashMap<String, Secret>,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3100
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Base URLs of the fixed-host APIs.
///
/// Jira and ServiceNow hosts come from the secret (`domain`, `instance`).
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_yext")]
    pub yext: String,
    /// Bing spell check and Bing search.
    #[serde(default = "default_cognitive")]
    pub cognitive: String,
    #[serde(default = "default_text_analytics")]
    pub text_analytics: String,
    #[serde(default = "default_translator")]
    pub translator: String,
    #[serde(default = "default_cognitive")]
    pub bing: String,
}

fn default_yext() -> String {
    YEXT_BASE_URL.to_string()
}

fn default_cognitive() -> String {
    COGNITIVE_BASE_URL.to_string()
}

fn default_text_analytics() -> String {
    TEXT_ANALYTICS_BASE_URL.to_string()
}

fn default_translator() -> String {
    TRANSLATOR_BASE_URL.to_string()
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            yext: default_yext(),
            cognitive: default_cognitive(),
            text_analytics: default_text_analytics(),
            translator: default_translator(),
            bing: default_cognitive(),
        }
    }
}

impl HostConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse host configuration")
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&contents)
    }

    /// Load from `FLOWLINK_CONFIG` if set and present (defaults otherwise),
    /// then apply `FLOWLINK_HOST` / `FLOWLINK_PORT` overrides.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var("FLOWLINK_CONFIG") {
            Ok(path) if Path::new(&path).exists() => Self::load(&path)?,
            Ok(path) => {
                tracing::warn!(path = %path, "Config file not found, using defaults");
                Self::default()
            }
            Err(_) => Self::default(),
        };

        if let Ok(host) = std::env::var("FLOWLINK_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("FLOWLINK_PORT") {
            config.server.port = port
                .parse()
                .context("FLOWLINK_PORT must be a valid port number")?;
        }

        Ok(config)
    }

    /// Builds the secret provider from the `[secrets]` tables.
    pub fn secret_store(&self) -> SecretStore {
        SecretStore::new(self.secrets.clone())
    }
}
