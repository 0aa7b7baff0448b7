//! Application configuration loaded from YAML.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

fn default_dataset() -> PathBuf {
    PathBuf::from("data/tiles.json")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Top-level configuration for the catalog server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Tile dataset, relative to the config base directory.
    #[serde(default = "default_dataset")]
    pub dataset: PathBuf,
    /// Optional replacement for the embedded resource-chain table.
    #[serde(default)]
    pub chains: Option<PathBuf>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dataset: default_dataset(),
            chains: None,
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Reads YAML files relative to a base directory.
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn resolve(&self, file: impl AsRef<Path>) -> PathBuf {
        self.base_dir.join(file)
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
        self.load_yaml(file)
    }

    pub fn load_yaml<T: DeserializeOwned>(&self, file: impl AsRef<Path>) -> Result<T, ConfigError> {
        let path = self.resolve(file);
        let data = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        serde_yaml::from_str(&data).map_err(|source| ConfigError::Yaml { path, source })
    }
}
