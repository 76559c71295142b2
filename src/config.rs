//! Configuration for the WireMock admin client.
//!
//! Describes where the mock server's admin API lives, whether client-side
//! diagnostics are logged, and how long blocking calls may wait.

use crate::error::{AdminError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Connection settings for a WireMock server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WireMockConfig {
    /// URL scheme of the admin API
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Host the mock server listens on
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the mock server listens on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log errors swallowed by the lenient helpers
    #[serde(default = "default_true")]
    pub logging_enabled: bool,

    /// Bounded wait for each admin call, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for WireMockConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            host: default_host(),
            port: default_port(),
            logging_enabled: true,
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_scheme() -> String {
    "http".to_string()
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

fn default_timeout_ms() -> u64 {
    crate::bridge::DEFAULT_TIMEOUT.as_millis() as u64
}

impl WireMockConfig {
    /// Configuration for a server on `localhost:port`.
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Self::default()
        }
    }

    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.host.is_empty() {
            anyhow::bail!("Host cannot be empty");
        }
        if self.port == 0 {
            anyhow::bail!("Port cannot be 0");
        }
        if self.timeout_ms == 0 {
            anyhow::bail!("Timeout must be greater than 0");
        }
        self.base_url()?;
        Ok(())
    }

    /// Root URL of the server, with a trailing slash so admin paths join onto it.
    pub fn base_url(&self) -> Result<Url> {
        let raw = format!("{}://{}:{}/", self.scheme, self.host, self.port);
        Url::parse(&raw).map_err(|_| AdminError::invalid_url(raw))
    }

    /// Bounded wait for each admin call.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
