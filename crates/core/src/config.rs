//! Application configuration.
//!
//! Loaded once from a TOML file at startup; the service-lifecycle section
//! additionally lives in a [`ConfigHolder`] so the eviction sweep and the
//! discovery scheduler re-read it on every run, allowing live
//! reconfiguration of retention and intervals.

use std::path::Path;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::errors::{ComposerError, ComposerResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost:5432/composer".to_string(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceLifecycleConfig {
    /// Reachability poll interval per service (seconds).
    pub poll_interval_seconds: u64,
    /// Interval between eviction sweep runs (seconds).
    pub sweep_interval_seconds: u64,
    /// How long a service may go without successful contact before it is
    /// evicted (seconds).
    pub service_retention_seconds: i64,
}

impl Default for ServiceLifecycleConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 30,
            sweep_interval_seconds: 60,
            service_retention_seconds: 300, // 5 minutes
        }
    }
}

impl ServiceLifecycleConfig {
    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.service_retention_seconds)
    }

    pub fn validate(&self) -> ComposerResult<()> {
        if self.poll_interval_seconds == 0 {
            return Err(ComposerError::Configuration(
                "poll_interval_seconds must be greater than 0".to_string(),
            ));
        }
        if self.sweep_interval_seconds == 0 {
            return Err(ComposerError::Configuration(
                "sweep_interval_seconds must be greater than 0".to_string(),
            ));
        }
        if self.service_retention_seconds <= 0 {
            return Err(ComposerError::Configuration(
                "service_retention_seconds must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: String,
    pub format: String, // "pretty" or "json"
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub service_lifecycle: ServiceLifecycleConfig,
    pub log: LogConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file. A missing file yields the
    /// defaults; a malformed one is a hard error.
    pub fn load(path: &str) -> ComposerResult<Self> {
        if !Path::new(path).exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            ComposerError::Configuration(format!("failed to read config file {path}: {e}"))
        })?;

        let config: AppConfig = toml::from_str(&content).map_err(|e| {
            ComposerError::Configuration(format!("failed to parse config file {path}: {e}"))
        })?;

        config.service_lifecycle.validate()?;
        Ok(config)
    }
}

/// Shared holder for a config section that may be replaced at runtime.
///
/// Readers call [`ConfigHolder::get`] on every use rather than caching the
/// value, so a `replace` takes effect on the next run of whatever consumes
/// it.
pub struct ConfigHolder<T: Clone> {
    inner: RwLock<T>,
}

impl<T: Clone> ConfigHolder<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: RwLock::new(value),
        }
    }

    pub fn get(&self) -> T {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn replace(&self, value: T) {
        *self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = value;
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.service_lifecycle.poll_interval_seconds, 30);
        assert_eq!(config.service_lifecycle.sweep_interval_seconds, 60);
        assert_eq!(config.service_lifecycle.service_retention_seconds, 300);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let config = AppConfig::load("/nonexistent/composer.toml").unwrap();
        assert_eq!(config.database.max_connections, 10);
    }

    #[test]
    fn test_load_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[database]
url = "postgresql://db:5432/composer"
max_connections = 5

[service_lifecycle]
poll_interval_seconds = 10
sweep_interval_seconds = 20
service_retention_seconds = 120
"#
        )
        .unwrap();

        let config = AppConfig::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.service_lifecycle.service_retention_seconds, 120);
        // section not present in the file falls back to defaults
        assert_eq!(config.log.format, "pretty");
    }

    #[test]
    fn test_invalid_retention_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[service_lifecycle]
poll_interval_seconds = 10
sweep_interval_seconds = 20
service_retention_seconds = 0
"#
        )
        .unwrap();

        let result = AppConfig::load(file.path().to_str().unwrap());
        assert!(result.is_err());
    }

    #[test]
    fn test_holder_replace_visible_to_next_get() {
        let holder = ConfigHolder::new(ServiceLifecycleConfig::default());
        assert_eq!(holder.get().service_retention_seconds, 300);

        holder.replace(ServiceLifecycleConfig {
            service_retention_seconds: 60,
            ..ServiceLifecycleConfig::default()
        });
        assert_eq!(holder.get().service_retention_seconds, 60);
    }
}
