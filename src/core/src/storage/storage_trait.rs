//! Storage Traits
//!
//! `SampleStore` is the long-lived backend handed to the session manager.
//! Every session start asks it for a fresh `SessionLog`, which owns the two
//! open destinations of that session until it is closed.
//!
//! All methods return a `Result` so a failing disk never panics the service.

use crate::error_handling::types::StorageError;
use crate::protocol::SensorSample;
use crate::storage::types::RejectedRecord;

/// Backend creating and reading per-session logs.
pub trait SampleStore: Send + Sync {
    /// Creates both logs of `session_id` and writes their headers.
    ///
    /// Fails if either destination cannot be created.
    fn open_session(&self, session_id: &str) -> Result<Box<dyn SessionLog>, StorageError>;

    /// Ids of every session that has an accepted log, oldest first.
    fn list_sessions(&self) -> Result<Vec<String>, StorageError>;

    /// Reads back the accepted samples of a session.
    fn read_accepted(&self, session_id: &str) -> Result<Vec<SensorSample>, StorageError>;

    /// Reads back the rejected samples of a session with their reasons.
    fn read_rejected(&self, session_id: &str) -> Result<Vec<RejectedRecord>, StorageError>;
}

/// The open logs of one session.
///
/// Each append is durable once it returns: implementations flush per row.
pub trait SessionLog: Send {
    fn append_accepted(&mut self, sample: &SensorSample) -> Result<(), StorageError>;

    fn append_rejected(&mut self, sample: &SensorSample, reason: &str) -> Result<(), StorageError>;

    /// Flushes and releases both destinations. Both are attempted even when the
    /// first one fails; the first failure is returned.
    fn close(self: Box<Self>) -> Result<(), StorageError>;
}
