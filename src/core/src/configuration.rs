//! Configuration subsystem.
//!
//! - `config`: TOML file loading and command-line overrides.
//! - `types`: server, storage and threshold sections.
//! - `thresholds`: live threshold access for the analytics engine.

pub mod config;
pub mod thresholds;
pub mod types;

pub use config::{CliArgs, Config};
pub use thresholds::{SharedThresholds, ThresholdSource};
pub use types::{ServerConfig, StorageConfig, ThresholdSnapshot};
