use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Address the HTTP server binds to.
    #[serde(default = "Config::default_bind_addr")]
    pub bind_addr: String,
    /// SQLite connection string.
    #[serde(default = "Config::default_database_url")]
    pub database_url: String,
    /// Allowed CORS origins. Required unless cors_permissive is true.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Explicitly allow all origins (development only). Defaults to false.
    #[serde(default)]
    pub cors_permissive: bool,
    /// Ticket notification configuration
    #[serde(default)]
    pub notification: NotificationConfig,
}

/// Configuration for the outbound ticket-confirmation channel
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationConfig {
    /// Webhook URL ticket confirmations are POSTed to. When unset,
    /// confirmations are logged instead of delivered.
    #[serde(default)]
    pub webhook_url: Option<String>,
}

impl Config {
    fn default_bind_addr() -> String {
        "0.0.0.0:3000".to_string()
    }

    fn default_database_url() -> String {
        "sqlite:database/railconnect.db?mode=rwc".to_string()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;

        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse config: {0}")]
    ParseError(String),
}
