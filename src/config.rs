use std::path::PathBuf;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, error};

use crate::sync::EditProtocol;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Environment (dev, staging, prod)
    #[serde(default = "default_environment")]
    pub environment: String,

    /// CORS allowed origins, comma separated
    pub cors_origins: Option<String>,

    /// Directory holding collabo.html and the client assets
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Accepted shape of `updateInput` payloads
    #[serde(default)]
    pub edit_protocol: EditProtocol,

    /// Outbound events buffered per subscriber before it is considered lagging
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,

    /// Port probed on every host during peer discovery
    #[serde(default = "default_discovery_port")]
    pub discovery_port: u16,

    /// Maximum number of probes in flight at once
    #[serde(default = "default_discovery_concurrency")]
    pub discovery_concurrency: usize,

    /// Per-probe connect timeout in milliseconds
    #[serde(default = "default_discovery_timeout_ms")]
    pub discovery_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables or app.env file
    pub fn load() -> Result<Self, ConfigError> {
        // Try to load from app.env file first
        if std::path::Path::new("app.env").exists() {
            dotenvy::from_filename("app.env").ok();
        } else {
            // Fallback to .env file
            dotenvy::dotenv().ok();
        }

        match envy::from_env::<Config>() {
            Ok(config) => {
                info!("✅ Configuration loaded successfully");
                Ok(config)
            }
            Err(e) => {
                error!("❌ Failed to load configuration: {}", e);
                Err(ConfigError::EnvError(e))
            }
        }
    }

    /// Get the full server address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_millis(self.discovery_timeout_ms)
    }

    /// Check if running in development mode
    pub fn is_development(&self) -> bool {
        self.environment.to_lowercase() == "dev" || self.environment.to_lowercase() == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            cors_origins: None,
            static_dir: default_static_dir(),
            edit_protocol: EditProtocol::default(),
            broadcast_capacity: default_broadcast_capacity(),
            discovery_port: default_discovery_port(),
            discovery_concurrency: default_discovery_concurrency(),
            discovery_timeout_ms: default_discovery_timeout_ms(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvError(#[from] envy::Error),
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9999
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

fn default_broadcast_capacity() -> usize {
    100
}

fn default_discovery_port() -> u16 {
    5000
}

fn default_discovery_concurrency() -> usize {
    32
}

fn default_discovery_timeout_ms() -> u64 {
    500
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_environment_yields_defaults() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.server_address(), "0.0.0.0:9999");
        assert_eq!(config.edit_protocol, EditProtocol::Mixed);
        assert_eq!(config.discovery_port, 5000);
        assert_eq!(config.discovery_timeout(), Duration::from_millis(500));
        assert!(config.is_development());
    }

    #[test]
    fn values_are_read_from_environment() {
        let vars = vec![
            ("PORT".to_string(), "8080".to_string()),
            ("EDIT_PROTOCOL".to_string(), "full_text".to_string()),
            ("DISCOVERY_CONCURRENCY".to_string(), "4".to_string()),
            ("STATIC_DIR".to_string(), "/srv/collabo".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.edit_protocol, EditProtocol::FullText);
        assert_eq!(config.discovery_concurrency, 4);
        assert_eq!(config.static_dir, PathBuf::from("/srv/collabo"));
    }

    #[test]
    fn unknown_edit_protocol_is_an_error() {
        let vars = vec![("EDIT_PROTOCOL".to_string(), "crdt".to_string())];
        assert!(envy::from_iter::<_, Config>(vars).is_err());
    }
}
