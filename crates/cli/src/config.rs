//! Configuration file for the `autodial` binary
//!
//! ```toml
//! [manager]
//! host = "10.0.0.5"
//! port = 5038
//! username = "dialer"
//! secret = "s3cret"
//!
//! [engine]
//! caller_id = "03001234567"
//! concurrent_calls = 5
//! agents = ["bilnet", "survey"]
//!
//! [store]
//! url = "sqlite://autodial.db"
//!
//! [logging]
//! level = "info"
//! ```

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;

use autodial_call_engine::database::{CallStore, MemoryCallStore, SqliteCallStore};
use autodial_call_engine::CallEngineConfig;
use autodial_manager_client::AmiConfig;

use crate::logging::LoggingConfig;

/// Store URL that selects the in-memory store
pub const MEMORY_STORE: &str = "memory";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub manager: AmiConfig,
    pub engine: CallEngineConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// sqlx sqlite URL, or `memory`
    pub url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://autodial.db".to_string(),
        }
    }
}

impl StoreConfig {
    pub async fn open(&self) -> Result<Arc<dyn CallStore>> {
        if self.url == MEMORY_STORE {
            return Ok(Arc::new(MemoryCallStore::new()));
        }
        let store = SqliteCallStore::new(&self.url)
            .await
            .with_context(|| format!("failed to open call store at {}", self.url))?;
        Ok(Arc::new(store))
    }
}

impl AppConfig {
    /// Read the config file, or fall back to defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [manager]
            host = "10.0.0.5"
            secret = "s3cret"

            [engine]
            caller_id = "03001234567"
            agents = ["bilnet", "survey"]
            "#,
        )
        .unwrap();

        assert_eq!(config.manager.host, "10.0.0.5");
        assert_eq!(config.manager.port, 5038);
        assert_eq!(config.engine.concurrent_calls, 5);
        assert_eq!(config.engine.agents, vec!["bilnet", "survey"]);
        assert_eq!(config.store.url, "sqlite://autodial.db");
        assert_eq!(config.logging.level, "info");
        assert!(config.engine.validate().is_ok());
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autodial.toml");
        std::fs::write(&path, "[store]\nurl = \"memory\"\n").unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.store.url, MEMORY_STORE);

        assert!(AppConfig::load(Some(&dir.path().join("missing.toml"))).is_err());
        assert_eq!(AppConfig::load(None).unwrap().store.url, "sqlite://autodial.db");
    }

    #[test]
    fn test_unknown_field_type_is_rejected() {
        assert!(AppConfig::from_toml("[engine]\nconcurrent_calls = \"many\"\n").is_err());
    }
}
