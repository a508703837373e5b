use crate::analytics::AnalyticsEngine;
use crate::protocol::SessionMetadata;
use crate::session_management::session::Session;
use crate::storage::SessionLog;

/// Everything owned by the running session. Replaced wholesale when a new
/// session starts, so no statistics or previous sample leak across sessions.
pub struct ActiveSession {
    /// The session record and its accepted sample count.
    pub session: Session,
    /// Open accepted and rejected logs.
    pub log: Box<dyn SessionLog>,
    /// Running statistics and previous accepted sample.
    pub analytics: AnalyticsEngine,
    /// Seed data sent with the start request.
    pub metadata: SessionMetadata,
}
