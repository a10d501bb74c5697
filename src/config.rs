//! Service configuration, loaded from a JSON file with defaults for anything absent.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Env var naming the config file.
pub const CONFIG_PATH_ENV: &str = "DEC_CONFIG_PATH";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Data directory (diagnosis store)
    pub data_dir: PathBuf,
    /// Path to the frozen ONNX classifier
    pub model_path: PathBuf,
    pub classifier: ClassifierConfig,
    pub store: StoreConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Output width the artifact must produce; `None` accepts any
    pub expected_classes: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite file name inside `data_dir`
    pub file_name: String,
    /// Env var holding the payload encryption secret
    pub secret_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".dec"),
            model_path: PathBuf::from("modeloDEC.onnx"),
            classifier: ClassifierConfig::default(),
            store: StoreConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            expected_classes: Some(3),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            file_name: "diagnoses.db".to_string(),
            secret_env: "DEC_STORE_SECRET".to_string(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

impl ServiceConfig {
    /// `Ok(None)` when the file does not exist; read and parse failures are errors.
    pub fn try_load(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str::<ServiceConfig>(&data)?))
    }

    /// Load from JSON file if present; otherwise return default. An unreadable
    /// or malformed file is logged and replaced by defaults.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(Some(c)) => c,
            Ok(None) => Self::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "config ignored, using defaults");
                Self::default()
            }
        }
    }

    /// Path from `DEC_CONFIG_PATH`, else `config.json` in the working directory.
    pub fn path_from_env() -> PathBuf {
        std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.json"))
    }

    pub fn load_from_env() -> Self {
        Self::load(&Self::path_from_env())
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(&self.store.file_name)
    }

    /// Store secret from the configured env var, if set and non-empty.
    pub fn store_secret(&self) -> Option<String> {
        std::env::var(&self.store.secret_env)
            .ok()
            .filter(|s| !s.is_empty())
    }
}
