//! Configuration loading from TOML files.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{ConfigError, Result};

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sensor: SensorConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub enrollment: EnrollmentConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which transport carries sensor commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorTransport {
    Serial,
    Http,
}

/// Sensor transport configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub transport: SensorTransport,
    /// Serial device path. When absent the serial adapter probes for one.
    pub port: Option<String>,
    pub baud_rate: u32,
    /// Base URL for the HTTP binding.
    pub base_url: Option<String>,
    /// Timeout for short command/response exchanges (polls, status).
    pub read_timeout_ms: u64,
    /// Timeout for a live verify scan, which waits on a finger placement.
    pub verify_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnrollmentConfig {
    /// Sessions with no poll within this window are reclaimed.
    pub session_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Aggregator endpoint for bulk attendance hand-off.
    pub endpoint: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.database.url.is_empty() {
            return Err(ConfigError::MissingField {
                field: "database.url",
            }
            .into());
        }

        match self.sensor.transport {
            SensorTransport::Http => {
                let base_url =
                    self.sensor
                        .base_url
                        .as_deref()
                        .ok_or(ConfigError::MissingField {
                            field: "sensor.base_url",
                        })?;
                url::Url::parse(base_url).map_err(|e| ConfigError::InvalidValue {
                    field: "sensor.base_url",
                    reason: e.to_string(),
                })?;
            }
            SensorTransport::Serial => {
                if self.sensor.baud_rate == 0 {
                    return Err(ConfigError::InvalidValue {
                        field: "sensor.baud_rate",
                        reason: "must be greater than 0".into(),
                    }
                    .into());
                }
            }
        }

        if let Some(endpoint) = self.sync.endpoint.as_deref() {
            url::Url::parse(endpoint).map_err(|e| ConfigError::InvalidValue {
                field: "sync.endpoint",
                reason: e.to_string(),
            })?;
        }

        if self.enrollment.session_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "enrollment.session_ttl_secs",
                reason: "must be greater than 0".into(),
            }
            .into());
        }

        Ok(())
    }
}

impl SensorConfig {
    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    #[must_use]
    pub fn verify_timeout(&self) -> Duration {
        Duration::from_secs(self.verify_timeout_secs)
    }
}

impl EnrollmentConfig {
    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

impl LoggingConfig {
    /// Initialize the tracing subscriber with this logging configuration.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sensor: SensorConfig::default(),
            database: DatabaseConfig::default(),
            enrollment: EnrollmentConfig::default(),
            sync: SyncConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            transport: SensorTransport::Serial,
            port: None,
            baud_rate: 115_200,
            base_url: None,
            read_timeout_ms: 1_000,
            verify_timeout_secs: 30,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "rollcall.db".into(),
        }
    }
}

impl Default for EnrollmentConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: 60,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { endpoint: None }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn http_transport_requires_base_url() {
        let mut config = Config::default();
        config.sensor.transport = SensorTransport::Http;
        assert!(config.validate().is_err());

        config.sensor.base_url = Some("http://192.168.1.40".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_malformed_sync_endpoint() {
        let mut config = Config::default();
        config.sync.endpoint = Some("not a url".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn parses_full_toml() {
        let toml = r#"
            [sensor]
            transport = "http"
            base_url = "http://10.0.0.5"
            baud_rate = 115200
            read_timeout_ms = 500
            verify_timeout_secs = 20

            [database]
            url = "attendance.db"

            [enrollment]
            session_ttl_secs = 90

            [sync]
            endpoint = "https://aggregator.example.edu/attendance"

            [logging]
            level = "debug"
            format = "json"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.sensor.transport, SensorTransport::Http);
        assert_eq!(config.enrollment.session_ttl_secs, 90);
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let mut config = Config::default();
        config.enrollment.session_ttl_secs = 0;
        assert!(config.validate().is_err());
    }
}
