// Configuration loaded from config.yaml

use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::paginate::DEFAULT_PAGE_SIZE;
use crate::source::DEFAULT_BASE_URL;
use crate::storage::{FileStorage, KeyValueStore, MemoryStorage, SqliteStorage};

const APP_DIR: &str = "catalogview";
const CONFIG_FILE: &str = "config.yaml";

/// Where favorites are persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Sqlite,
    File,
    Memory,
}

/// Application settings.
///
/// Looked up at `<config_dir>/catalogview/config.yaml` unless a path is given.
/// A missing file yields [`Config::default`]; a present but invalid file is an
/// error.
///
/// ```yaml
/// api_base_url: https://dummyjson.com
/// page_size: 10
/// storage: sqlite        # sqlite | file | memory
/// data_dir: /home/me/.local/share/catalogview
/// request_timeout_secs: 30
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub page_size: usize,
    pub storage: StorageKind,
    pub data_dir: PathBuf,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            storage: StorageKind::default(),
            data_dir: default_data_dir(),
            request_timeout_secs: 30,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// `<config_dir>/catalogview/config.yaml`, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE))
}

impl Config {
    /// Load from `path`, or from the default location when `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path.map(Path::to_path_buf).or_else(default_config_path) {
            Some(p) => p,
            None => return Ok(Self::default()),
        };

        if !path.exists() {
            debug!(file = ?path, "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config = Self::from_yaml(&content).with_context(|| format!("Invalid config file {:?}", path))?;
        debug!(file = ?path, "Loaded config");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).context("Failed to parse YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(eyre!("page_size must be greater than 0"));
        }
        if self.api_base_url.trim().is_empty() {
            return Err(eyre!("api_base_url cannot be empty"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Open the configured favorites backend
    pub fn open_storage(&self) -> Result<Box<dyn KeyValueStore>> {
        let storage: Box<dyn KeyValueStore> = match self.storage {
            StorageKind::Sqlite => Box::new(SqliteStorage::open(&self.data_dir)?),
            StorageKind::File => Box::new(FileStorage::open(&self.data_dir)?),
            StorageKind::Memory => Box::new(MemoryStorage::new()),
        };
        Ok(storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_base_url, "https://dummyjson.com");
        assert_eq!(config.page_size, 10);
        assert_eq!(config.storage, StorageKind::Sqlite);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.data_dir.ends_with("catalogview"));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml("page_size: 24\nstorage: file\n").unwrap();
        assert_eq!(config.page_size, 24);
        assert_eq!(config.storage, StorageKind::File);
        assert_eq!(config.api_base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        assert!(Config::from_yaml("page_size: 0\n").is_err());
    }

    #[test]
    fn test_unknown_storage_rejected() {
        assert!(Config::from_yaml("storage: redis\n").is_err());
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(Some(&temp.path().join("nope.yaml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "api_base_url: http://localhost:9000\nrequest_timeout_secs: 5\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:9000");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_load_invalid_file_errors() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "page_size: [not, a, number]\n").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_open_storage_backends() {
        let temp = TempDir::new().unwrap();
        for storage in [StorageKind::Sqlite, StorageKind::File, StorageKind::Memory] {
            let config = Config {
                storage,
                data_dir: temp.path().join(format!("{:?}", storage)),
                ..Default::default()
            };
            let mut backend = config.open_storage().unwrap();
            backend.set("favorites", "[1]").unwrap();
            assert_eq!(backend.get("favorites").unwrap().as_deref(), Some("[1]"));
        }
    }
}
