//! Storage configuration
//!
//! Values come from explicit construction or from the environment (with an
//! optional `.env` file). The default root is a transient directory; callers
//! that need durable storage must point `KIN_STORAGE_ROOT` at one.

use dotenv::dotenv;
use std::env;
use std::path::PathBuf;

use crate::shared::constants::*;
use crate::shared::types::Network;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub root_dir: PathBuf,
    pub network: Network,
    pub settings_path: PathBuf,
    pub key_store_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(root_dir: impl Into<PathBuf>, network: Network) -> Self {
        Self {
            root_dir: root_dir.into(),
            network,
            settings_path: default_settings_path(),
            key_store_dir: default_key_store_dir(),
        }
    }

    /// Storage rooted in the system temp directory
    pub fn ephemeral(network: Network) -> Self {
        Self::new(env::temp_dir(), network)
    }

    /// Load configuration from `.env` and the process environment
    pub fn from_env() -> Self {
        dotenv().ok();

        let root_dir = env::var(ENV_STORAGE_ROOT)
            .map(PathBuf::from)
            .unwrap_or_else(|_| env::temp_dir());
        let network = env::var(ENV_STORAGE_NETWORK)
            .map(|value| Network::from_config_value(&value))
            .unwrap_or_default();
        let settings_path = env::var(ENV_SETTINGS_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_settings_path());
        let key_store_dir = env::var(ENV_KEYSTORE_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_key_store_dir());

        Self {
            root_dir,
            network,
            settings_path,
            key_store_dir,
        }
    }

    pub fn with_settings_path(mut self, settings_path: impl Into<PathBuf>) -> Self {
        self.settings_path = settings_path.into();
        self
    }

    pub fn with_key_store_dir(mut self, key_store_dir: impl Into<PathBuf>) -> Self {
        self.key_store_dir = key_store_dir.into();
        self
    }
}

fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(env::temp_dir)
        .join(APP_DIR)
        .join(SETTINGS_FILE)
}

fn default_key_store_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(env::temp_dir)
        .join(APP_DIR)
        .join(KEYSTORE_DIR)
}
