//! Host configuration types

use ampled_core::PluginConfig;
use ampled_gpio::BoardConfig;
use ampled_quotes::QuoteConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub plugin: PluginConfig,
    #[serde(default)]
    pub quotes: QuoteConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// Settings store location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding one `<key>.json` per settings record
    #[serde(default = "default_store_dir")]
    pub dir: PathBuf,
}

fn default_store_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: default_store_dir(),
        }
    }
}
