//! Storage subsystem
//!
//! Persists the accepted and rejected samples of each session to two
//! append-only logs and reads them back for inspection.
//!
//! Components:
//! - `storage_trait`: the `SampleStore` and `SessionLog` traits.
//! - `types`: row layouts and shared record types.
//! - `file_storage`: CSV implementation writing into one directory.

pub mod file_storage;
pub mod storage_trait;
pub mod types;

pub use file_storage::FileStorage;
pub use storage_trait::{SampleStore, SessionLog};
pub use types::RejectedRecord;
