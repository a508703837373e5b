use super::types::*;
use crate::error_handling::types::ConfigError;
use clap::Parser;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Command-line arguments of the `envlog` binary.
///
/// Everything except the configuration file path is optional and, when given,
/// overrides the value read from the file.
///
/// # Fields Overview
///
/// - `config_file`: TOML file to load; defaults apply when omitted
/// - `storage_path`: directory for the per-session CSV logs
/// - `port`: port of the HTTP transport
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "envlog")]
#[command(version)]
#[command(about = "Session-oriented environmental sample ingestion service")]
pub struct CliArgs {
    /// Path of the TOML configuration file.
    ///
    /// # Command Line
    /// Use `--config <PATH>` or the `ENVLOG_CONFIG` environment variable
    #[arg(long = "config", env = "ENVLOG_CONFIG")]
    pub config_file: Option<PathBuf>,

    /// Directory receiving `measurements_<session>.csv` and `rejects_<session>.csv`.
    ///
    /// The directory is created on startup if it does not exist.
    ///
    /// # Command Line
    /// Use `--storage-path <PATH>` or the `ENVLOG_STORAGE_DIR` environment variable
    #[arg(long, env = "ENVLOG_STORAGE_DIR")]
    pub storage_path: Option<PathBuf>,

    /// TCP port the HTTP transport listens on.
    ///
    /// # Command Line
    /// Use `--port <PORT>` to set this value from the CLI
    #[arg(long)]
    pub port: Option<u16>,
}

/// Application configuration.
///
/// Read from a TOML file with three optional sections:
///
/// ```toml
/// [server]
/// bind_address = "127.0.0.1"
/// port = 4000
///
/// [storage]
/// path = "data"
///
/// [thresholds]
/// light_level_delta = 10000.0
/// relative_humidity_delta = 5.0
/// air_quality_delta = 5000.0
/// deviation_percent = 25.0
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub thresholds: ThresholdSnapshot,
}

impl Config {
    /// Builds the configuration from parsed arguments: file first (or defaults),
    /// then command-line overrides, then validation.
    pub fn load(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = match &args.config_file {
            Some(path) => Self::from_file(path)?,
            None => {
                info!("No configuration file given, using defaults");
                Self::default()
            }
        };
        if let Some(path) = &args.storage_path {
            config.storage.path = path.clone();
        }
        if let Some(port) = args.port {
            config.server.port = port;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!("Reading configuration from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::TomlError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind_address.trim().is_empty() {
            return Err(ConfigError::NotInRange(
                "server.bind_address must not be empty".to_string(),
            ));
        }
        self.thresholds.validate()
    }

    /// Logs the threshold banner shown at startup.
    pub fn log_thresholds(&self) {
        let t = &self.thresholds;
        info!("=== Threshold configuration ===");
        info!("Light level delta: {:.0} Ω", t.light_level_delta);
        info!("Relative humidity delta: {:.1} %", t.relative_humidity_delta);
        info!("Air quality delta: {:.0} Ω", t.air_quality_delta);
        info!("Deviation band: ±{:.0} %", t.deviation_percent);
    }
}
