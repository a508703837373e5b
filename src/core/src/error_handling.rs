//! Error types for every subsystem, kept in one place.

pub mod types;

pub use types::{ConfigError, ControllerError, SessionError, StorageError, WebError};
