//! Configuration management for the watcher.
//!
//! Loads configuration from TOML files and provides runtime defaults that
//! match the original deployment: 20s polling, 20px blocks, threshold 8.0.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use crate::types::Target;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub diff: DiffConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub targets: Vec<Target>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Whether the watcher is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Fixed delay between polling cycles, per target
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,

    /// Timeout for a single fetch, render or screenshot call
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_seconds: u64,

    /// Attempts for the visual commit pipeline
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Fixed delay between visual pipeline attempts
    #[serde(default = "default_retry_delay")]
    pub retry_delay_seconds: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 20,
            fetch_timeout_seconds: 30,
            retry_attempts: 3,
            retry_delay_seconds: 1,
        }
    }
}

impl TimingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffConfig {
    /// Comparison grid cell size in pixels
    #[serde(default = "default_block_size")]
    pub block_size: u32,

    /// Mean per-pixel L1 distance (0-765) at which a cell counts as changed
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Pixels to grow each region by before drawing its border
    #[serde(default = "default_expand_px")]
    pub expand_px: u32,

    /// Border thickness in pixels
    #[serde(default = "default_stroke_width")]
    pub stroke_width: u32,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            block_size: 20,
            threshold: 8.0,
            expand_px: 6,
            stroke_width: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Hash store JSON file
    #[serde(default = "default_hash_store_path")]
    pub hash_store_path: PathBuf,

    /// Append-only change log
    #[serde(default = "default_change_log_path")]
    pub change_log_path: PathBuf,

    /// Root directory for per-target image artifacts
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            hash_store_path: default_hash_store_path(),
            change_log_path: default_change_log_path(),
            artifact_dir: default_artifact_dir(),
        }
    }
}

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_poll_interval() -> u64 {
    20
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    1
}

fn default_block_size() -> u32 {
    20
}

fn default_threshold() -> f64 {
    8.0
}

fn default_expand_px() -> u32 {
    6
}

fn default_stroke_width() -> u32 {
    3
}

fn default_hash_store_path() -> PathBuf {
    PathBuf::from("hash_store.json")
}

fn default_change_log_path() -> PathBuf {
    PathBuf::from("update.txt")
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Config {
    /// Load configuration from `./sitewatch.toml` when present, otherwise
    /// from the platform config directory.
    pub fn load() -> Self {
        let local = PathBuf::from("sitewatch.toml");
        if local.exists() {
            Self::load_from_path(local)
        } else {
            Self::load_from_path(Self::default_config_path())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: PathBuf) -> Self {
        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    info!("Loaded configuration from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("Failed to parse config file: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(_) => {
                info!("No config file found at {:?}, using defaults", path);
                Self::default()
            }
        }
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sitewatch")
            .join("config.toml")
    }
}
