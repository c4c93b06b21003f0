//! Configuration management for scan settings.
//!
//! Stores configuration in JSON format at `~/.portscope/config.json`.
//! Every key is optional; missing keys take their defaults.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::{Field, FilterSpec, ScanFlag, ScanOptions};
use crate::error::{Error, Result};

/// Configuration data stored in JSON format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Period between scans, in milliseconds.
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    /// Time a single scan may take, in milliseconds.
    #[serde(default = "default_scan_timeout_ms")]
    pub scan_timeout_ms: u64,

    /// Connection-listing utility to run.
    #[serde(default = "default_netstat_path")]
    pub netstat_path: String,

    /// Allow-listed extra flags appended to every scan.
    #[serde(default)]
    pub scan_flags: Vec<ScanFlag>,

    /// Column a query is matched against when none is given.
    #[serde(default)]
    pub default_filter_field: Field,
}

fn default_refresh_interval_ms() -> u64 {
    3000
}

fn default_scan_timeout_ms() -> u64 {
    10_000
}

fn default_netstat_path() -> String {
    crate::adapters::netstat::DEFAULT_PROGRAM.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_interval_ms: default_refresh_interval_ms(),
            scan_timeout_ms: default_scan_timeout_ms(),
            netstat_path: default_netstat_path(),
            scan_flags: Vec::new(),
            default_filter_field: Field::default(),
        }
    }
}

impl Config {
    /// Check values that would make the poll loop or scanner unusable.
    pub fn validate(&self) -> Result<()> {
        if self.refresh_interval_ms == 0 {
            return Err(Error::Config(
                "refreshIntervalMs must be greater than zero".to_string(),
            ));
        }
        if self.scan_timeout_ms == 0 {
            return Err(Error::Config(
                "scanTimeoutMs must be greater than zero".to_string(),
            ));
        }
        if self.netstat_path.trim().is_empty() {
            return Err(Error::Config("netstatPath must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_millis(self.scan_timeout_ms)
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions::new(self.scan_flags.iter().copied())
    }

    /// An empty filter on the configured default column.
    pub fn default_filter(&self) -> FilterSpec {
        FilterSpec::on(self.default_filter_field, "")
    }
}

/// Configuration store for managing app settings.
///
/// Handles reading and writing configuration to `~/.portscope/config.json`.
pub struct ConfigStore {
    /// Path to the configuration file.
    config_path: PathBuf,
}

impl ConfigStore {
    /// Create a new config store with the default path.
    ///
    /// Default path: `~/.portscope/config.json`
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

        let config_path = home.join(".portscope").join("config.json");

        Ok(Self { config_path })
    }

    /// Create a config store with a custom path.
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load configuration from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub async fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub async fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;

        if let Some(config_dir) = self.config_path.parent() {
            fs::create_dir_all(config_dir)
                .await
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(config)?;

        // Write atomically by writing to temp file then renaming
        let temp_path = self.config_path.with_extension("json.tmp");

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to create temp config file: {}", e)))?;

        file.write_all(content.as_bytes())
            .await
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;

        file.sync_all()
            .await
            .map_err(|e| Error::Config(format!("Failed to sync config: {}", e)))?;

        fs::rename(&temp_path, &self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to rename config file: {}", e)))?;

        Ok(())
    }

    /// Set the refresh interval in milliseconds.
    pub async fn set_refresh_interval(&self, interval_ms: u64) -> Result<()> {
        let mut config = self.load().await?;
        config.refresh_interval_ms = interval_ms;
        self.save(&config).await
    }

    /// Replace the extra scan flags.
    pub async fn set_scan_flags(&self, options: &ScanOptions) -> Result<()> {
        let mut config = self.load().await?;
        config.scan_flags = options.flags().to_vec();
        self.save(&config).await
    }

    /// Set the default filter column.
    pub async fn set_default_filter_field(&self, field: Field) -> Result<()> {
        let mut config = self.load().await?;
        config.default_filter_field = field;
        self.save(&config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_store() -> (ConfigStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        (ConfigStore::with_path(path), dir)
    }

    #[tokio::test]
    async fn test_load_nonexistent() {
        let (store, _dir) = test_store();
        let config = store.load().await.unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.refresh_interval(), Duration::from_secs(3));
        assert_eq!(config.default_filter_field, Field::LocalAddress);
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let (store, _dir) = test_store();

        let config = Config {
            refresh_interval_ms: 1500,
            scan_flags: vec![ScanFlag::Listening, ScanFlag::Numeric],
            default_filter_field: Field::State,
            ..Config::default()
        };
        store.save(&config).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.scan_options().args(), vec!["-l", "-n"]);
    }

    #[tokio::test]
    async fn test_missing_keys_take_defaults() {
        let (store, _dir) = test_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), r#"{ "scanFlags": ["listening"] }"#).unwrap();

        let config = store.load().await.unwrap();
        assert_eq!(config.refresh_interval_ms, 3000);
        assert_eq!(config.netstat_path, "netstat");
        assert_eq!(config.scan_flags, vec![ScanFlag::Listening]);
    }

    #[tokio::test]
    async fn test_unknown_flag_is_rejected() {
        let (store, _dir) = test_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), r#"{ "scanFlags": ["extend"] }"#).unwrap();

        assert!(matches!(store.load().await, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_setters() {
        let (store, _dir) = test_store();

        store.set_refresh_interval(5000).await.unwrap();
        store
            .set_scan_flags(&ScanOptions::from_extra_args("a").unwrap())
            .await
            .unwrap();
        store.set_default_filter_field(Field::Owner).await.unwrap();

        let config = store.load().await.unwrap();
        assert_eq!(config.refresh_interval_ms, 5000);
        assert_eq!(config.scan_flags, vec![ScanFlag::All]);
        assert_eq!(config.default_filter_field, Field::Owner);
    }

    #[tokio::test]
    async fn test_zero_interval_is_invalid() {
        let (store, _dir) = test_store();
        assert!(store.set_refresh_interval(0).await.is_err());
    }
}
