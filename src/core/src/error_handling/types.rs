use std::fmt;
use std::path::PathBuf;

use crate::protocol::SampleField;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    NotInRange(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::NotInRange(e) => write!(f, "Value out of range: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

/// Failures of the per-session log destinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// A log for this session id is already on disk and is left untouched.
    AlreadyExists { path: PathBuf },
    /// No log exists for the id, or the id is not one this service generates.
    NotFound { path: PathBuf },
    OpenFailed { path: PathBuf, reason: String },
    WriteFailed { path: PathBuf, reason: String },
    ReadFailed { path: PathBuf, reason: String },
    CloseFailed { path: PathBuf, reason: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::AlreadyExists { path } => {
                write!(f, "Storage log already exists: {}", path.display())
            }
            StorageError::NotFound { path } => {
                write!(f, "Storage log not found: {}", path.display())
            }
            StorageError::OpenFailed { path, reason } => {
                write!(f, "Storage open failed for {}: {}", path.display(), reason)
            }
            StorageError::WriteFailed { path, reason } => {
                write!(f, "Storage write failed for {}: {}", path.display(), reason)
            }
            StorageError::ReadFailed { path, reason } => {
                write!(f, "Storage read failed for {}: {}", path.display(), reason)
            }
            StorageError::CloseFailed { path, reason } => {
                write!(f, "Storage close failed for {}: {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for StorageError {}

/// Outcome of a session operation that did not succeed.
///
/// Closed set: a caller can always tell a usage-contract violation
/// (`SessionNotActive`) from a physical range rejection (`ValidationFailed`),
/// a structurally broken payload (`MalformedSample`) and a log failure
/// (`ResourceFailure`).
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    SessionNotActive,
    ValidationFailed {
        field: SampleField,
        invalid_value: f64,
        expected_range: &'static str,
    },
    MalformedSample {
        field: SampleField,
        details: String,
    },
    ResourceFailure(StorageError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::SessionNotActive => {
                write!(f, "No active session, call StartSession first")
            }
            SessionError::ValidationFailed {
                field,
                invalid_value,
                expected_range,
            } => write!(
                f,
                "Validation failed for {}: {} is outside {}",
                field, invalid_value, expected_range
            ),
            SessionError::MalformedSample { field, details } => {
                write!(f, "Malformed sample ({}): {}", field, details)
            }
            SessionError::ResourceFailure(e) => write!(f, "Resource failure: {}", e),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<StorageError> for SessionError {
    fn from(err: StorageError) -> Self {
        SessionError::ResourceFailure(err)
    }
}

#[derive(Debug)]
pub enum WebError {
    InvalidAddress(String),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::InvalidAddress(e) => write!(f, "Invalid listen address: {}", e),
        }
    }
}

impl std::error::Error for WebError {}

#[derive(Debug)]
pub enum ControllerError {
    ConfigurationError(ConfigError),
    StorageError(StorageError),
    WebError(WebError),
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::ConfigurationError(e) => write!(f, "Configuration error: {}", e),
            ControllerError::StorageError(e) => write!(f, "Storage error: {}", e),
            ControllerError::WebError(e) => write!(f, "Web error: {}", e),
        }
    }
}

impl std::error::Error for ControllerError {}

impl From<ConfigError> for ControllerError {
    fn from(err: ConfigError) -> Self {
        ControllerError::ConfigurationError(err)
    }
}

impl From<StorageError> for ControllerError {
    fn from(err: StorageError) -> Self {
        ControllerError::StorageError(err)
    }
}

impl From<WebError> for ControllerError {
    fn from(err: WebError) -> Self {
        ControllerError::WebError(err)
    }
}
