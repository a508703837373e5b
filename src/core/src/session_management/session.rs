use chrono::{DateTime, Local};
use serde::Serialize;

use crate::session_management::SessionStatus;

/// Record of one session, kept after it closes for status queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub id: String,
    pub start_time: DateTime<Local>,
    pub end_time: Option<DateTime<Local>>,
    /// Accepted samples only.
    pub sample_count: u64,
    pub status: SessionStatus,
}

impl Session {
    pub fn start(id: String) -> Self {
        Self {
            id,
            start_time: Local::now(),
            end_time: None,
            sample_count: 0,
            status: SessionStatus::Active,
        }
    }

    pub fn close(&mut self) {
        self.end_time = Some(Local::now());
        self.status = SessionStatus::Closed;
    }
}

/// Point-in-time view of the session slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub session_id: Option<String>,
    pub sample_count: u64,
}

impl SessionSnapshot {
    pub fn inactive() -> Self {
        Self {
            status: SessionStatus::Inactive,
            session_id: None,
            sample_count: 0,
        }
    }
}

impl From<&Session> for SessionSnapshot {
    fn from(session: &Session) -> Self {
        Self {
            status: session.status,
            session_id: Some(session.id.clone()),
            sample_count: session.sample_count,
        }
    }
}
