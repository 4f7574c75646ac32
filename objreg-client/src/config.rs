//! Client configuration
//!
//! Layered the usual way: compiled defaults, then an optional TOML
//! file, then `OBJREG__*` environment variables. Everything is fixed
//! at startup; nothing here is mutated afterwards.

use std::path::Path;
use std::time::Duration;

use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::session::Identity;

/// Top-level client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub registry: RegistryConfig,
    pub heartbeat: HeartbeatConfig,
    pub identity: Identity,
    pub logging: LoggingConfig,
}

/// Candidate server addresses and per-channel timeouts.
///
/// Address order is failover priority. The ping list is parallel in
/// spirit (one probe port per replica) but is not required to name the
/// same machines as the business list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub business_addresses: Vec<String>,
    pub ping_addresses: Vec<String>,
    pub business_timeout_ms: u64,
    pub ping_timeout_ms: u64,
    pub connect_timeout_ms: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            business_addresses: vec!["127.0.0.1:50051".to_string()],
            ping_addresses: vec!["127.0.0.1:50052".to_string()],
            business_timeout_ms: 1500,
            ping_timeout_ms: 1000,
            connect_timeout_ms: 2000,
        }
    }
}

impl RegistryConfig {
    #[must_use]
    pub const fn business_timeout(&self) -> Duration {
        Duration::from_millis(self.business_timeout_ms)
    }

    #[must_use]
    pub const fn ping_timeout(&self) -> Duration {
        Duration::from_millis(self.ping_timeout_ms)
    }

    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartbeatConfig {
    pub tick_interval_secs: u64,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: 3,
        }
    }
}

impl HeartbeatConfig {
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from an optional file plus environment
    /// variables (`OBJREG__REGISTRY__BUSINESS_TIMEOUT_MS=...`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(Environment::with_prefix("OBJREG").separator("__"));

        builder
            .build()
            .and_then(ConfigBuilder::try_deserialize)
            .map_err(|e| Error::Configuration(e.to_string()))
    }

    /// Validate the configuration, returning every problem at once.
    pub fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.registry.business_addresses.is_empty() {
            errors.push("registry.business_addresses must not be empty".to_string());
        }
        if self.registry.ping_addresses.is_empty() {
            errors.push("registry.ping_addresses must not be empty".to_string());
        }
        if self.registry.business_timeout_ms == 0 {
            errors.push("registry.business_timeout_ms must be greater than zero".to_string());
        }
        if self.registry.ping_timeout_ms == 0 {
            errors.push("registry.ping_timeout_ms must be greater than zero".to_string());
        }
        if self.heartbeat.tick_interval_secs == 0 {
            errors.push("heartbeat.tick_interval_secs must be greater than zero".to_string());
        }
        if self.identity.name.is_empty() {
            errors.push("identity.name must not be empty".to_string());
        }
        if self.identity.address.is_empty() {
            errors.push("identity.address must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.registry.business_timeout(), Duration::from_millis(1500));
        assert_eq!(config.registry.ping_timeout(), Duration::from_millis(1000));
        assert_eq!(config.heartbeat.tick_interval(), Duration::from_secs(3));
    }

    #[test]
    fn validate_collects_all_errors() {
        let mut config = ClientConfig::default();
        config.registry.business_addresses.clear();
        config.registry.ping_timeout_ms = 0;
        config.identity.name = String::new();

        let errors = config.validate().expect_err("invalid config");
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.contains("business_addresses")));
        assert!(errors.iter().any(|e| e.contains("ping_timeout_ms")));
        assert!(errors.iter().any(|e| e.contains("identity.name")));
    }

    #[test]
    fn file_overrides_defaults() {
        let toml = r#"
            [registry]
            business_addresses = ["10.0.0.1:50051", "10.0.0.2:50051"]
            ping_addresses = ["10.0.0.1:50052", "10.0.0.2:50052"]
            business_timeout_ms = 800

            [identity]
            name = "rust_calculator"
        "#;

        let config: ClientConfig = ConfigBuilder::builder()
            .add_source(File::from_str(toml, config::FileFormat::Toml))
            .build()
            .and_then(ConfigBuilder::try_deserialize)
            .expect("valid toml");

        assert_eq!(config.registry.business_addresses.len(), 2);
        assert_eq!(config.registry.business_timeout_ms, 800);
        // Untouched sections keep their defaults.
        assert_eq!(config.registry.ping_timeout_ms, 1000);
        assert_eq!(config.identity.name, "rust_calculator");
        assert_eq!(config.identity.version, "1.0");
    }
}
