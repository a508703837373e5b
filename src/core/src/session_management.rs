//! Session management core module.
//!
//! This module provides the session lifecycle: the session record, the state
//! owned by a running session and the manager serializing the three session
//! operations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Submodule for the state owned by a running session.
pub mod active_session;
/// Submodule for the session record and status snapshot.
pub mod session;
/// Submodule for the session manager implementation.
pub mod session_manager;

pub use session::{Session, SessionSnapshot};
pub use session_manager::SessionManager;

/// Represents the current status of the session slot.
///
/// Variants:
/// - `Inactive`: no session has been started yet.
/// - `Active`: a session is accepting samples.
/// - `Closed`: the last session ended; no session is accepting samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Inactive,
    Active,
    Closed,
}

impl SessionStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, SessionStatus::Active)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStatus::Inactive => "inactive",
            SessionStatus::Active => "active",
            SessionStatus::Closed => "closed",
        };
        f.write_str(name)
    }
}
