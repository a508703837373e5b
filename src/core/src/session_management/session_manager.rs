use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local};
use log::{debug, error, info, warn};

use crate::analytics::AnalyticsEngine;
use crate::configuration::ThresholdSource;
use crate::error_handling::types::{SessionError, StorageError};
use crate::events::{EventKind, EventSink, SensorEvent};
use crate::protocol::{ResponseStatus, SampleField, SensorSample, ServiceResponse, SessionMetadata};
use crate::session_management::active_session::ActiveSession;
use crate::session_management::session::{Session, SessionSnapshot};
use crate::storage::SampleStore;
use crate::validation::{validate, Rejection, ValidationOutcome};

const SESSION_ID_FORMAT: &str = "%Y%m%d_%H%M%S";
/// Suffixes tried when logs for the generated id are already on disk.
const MAX_SESSION_ID_ATTEMPTS: u32 = 100;

/// The structure related to session management
///
/// Owns the single session slot and serializes `start_session`, `push_sample`
/// and `end_session` on one lock, so logs, counters and statistics are always
/// updated together.
///
/// # Fields Overview
///
/// - `slot`: the running session, if any, and the record of the last one
/// - `storage`: opens the per-session logs
/// - `thresholds`: read fresh for every analytics evaluation
/// - `events`: receives every notification the manager raises
pub struct SessionManager {
    slot: Mutex<SessionSlot>,
    storage: Arc<dyn SampleStore>,
    thresholds: Arc<dyn ThresholdSource>,
    events: Arc<dyn EventSink>,
}

#[derive(Default)]
struct SessionSlot {
    active: Option<ActiveSession>,
    last: Option<Session>,
    last_id: Option<String>,
}

impl SessionManager {
    pub fn new(
        storage: Arc<dyn SampleStore>,
        thresholds: Arc<dyn ThresholdSource>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            slot: Mutex::new(SessionSlot::default()),
            storage,
            thresholds,
            events,
        }
    }

    /// Starts a new session, closing the running one first.
    ///
    /// The new session gets fresh statistics, no previous sample and a zero
    /// sample count. If either log cannot be opened no session is active
    /// afterwards and `ResourceFailure` is returned.
    pub fn start_session(&self, metadata: SessionMetadata) -> Result<ServiceResponse, SessionError> {
        let mut slot = self.lock();

        if slot.active.is_some() {
            info!("StartSession while a session is active, closing it first");
            let response = self.close_active(&mut slot);
            if !response.is_ack() {
                warn!("Previous session closed with errors: {}", response.message);
            }
        }

        let now = Local::now();
        let mut id = next_session_id(slot.last_id.as_deref(), now);
        let mut attempts = 1;
        let log = loop {
            match self.storage.open_session(&id) {
                Ok(log) => break log,
                Err(StorageError::AlreadyExists { .. }) if attempts < MAX_SESSION_ID_ATTEMPTS => {
                    debug!("Logs for session {} already exist, trying the next suffix", id);
                    id = next_session_id(Some(&id), now);
                    attempts += 1;
                }
                Err(e) => {
                    error!("Could not open logs for session {}: {}", id, e);
                    return Err(SessionError::ResourceFailure(e));
                }
            }
        };
        slot.last_id = Some(id.clone());

        info!(
            "Session {} started (seed: V={} mV, RH={} %, AQ={} Ω, L={} Ω, at {})",
            id,
            metadata.volume,
            metadata.relative_humidity,
            metadata.air_quality,
            metadata.light_level,
            metadata.timestamp
        );
        slot.active = Some(ActiveSession {
            session: Session::start(id.clone()),
            log,
            analytics: AnalyticsEngine::new(),
            metadata,
        });

        let message = format!("Session {} started", id);
        self.publish(EventKind::TransferStarted {
            session_id: id,
            message: message.clone(),
        });
        Ok(ServiceResponse::ack(ResponseStatus::InProgress, message))
    }

    /// Validates and records one sample of the running session.
    ///
    /// Rejected samples are written to the reject log (except an absent one),
    /// announced with `SampleRejected` and returned as an error; they never
    /// reach the analytics. Accepted samples are logged, counted, announced and
    /// then evaluated, each alert becoming its own event.
    pub fn push_sample(&self, sample: Option<SensorSample>) -> Result<ServiceResponse, SessionError> {
        let mut slot = self.lock();
        let Some(active) = slot.active.as_mut() else {
            warn!("PushSample without an active session");
            return Err(SessionError::SessionNotActive);
        };

        let sample = match (validate(sample.as_ref()), sample) {
            (ValidationOutcome::Accepted, Some(sample)) => sample,
            (ValidationOutcome::Rejected(rejection), sample) => {
                return Err(self.reject(active, rejection, sample.as_ref()));
            }
            (ValidationOutcome::Accepted, None) => {
                return Err(SessionError::MalformedSample {
                    field: SampleField::Sample,
                    details: "sample is missing".to_string(),
                });
            }
        };

        active.log.append_accepted(&sample)?;
        active.session.sample_count += 1;
        let sample_count = active.session.sample_count;
        self.publish(EventKind::SampleReceived {
            sample,
            sample_count,
        });

        let thresholds = self.thresholds.snapshot();
        for alert in active.analytics.evaluate(&sample, &thresholds) {
            self.publish(alert.into());
        }

        Ok(ServiceResponse::ack(
            ResponseStatus::InProgress,
            format!("Sample {} accepted", sample_count),
        ))
    }

    /// Closes the running session. Always reports `COMPLETED`; the response is
    /// a `NACK` when a log could not be flushed, but the session is closed
    /// either way. Without a running session nothing is written and no event
    /// is raised.
    pub fn end_session(&self) -> ServiceResponse {
        let mut slot = self.lock();
        if slot.active.is_none() {
            debug!("EndSession without an active session");
            return ServiceResponse::ack(ResponseStatus::Completed, "No active session");
        }
        self.close_active(&mut slot)
    }

    pub fn status(&self) -> SessionSnapshot {
        let slot = self.lock();
        match (&slot.active, &slot.last) {
            (Some(active), _) => SessionSnapshot::from(&active.session),
            (None, Some(last)) => SessionSnapshot::from(last),
            (None, None) => SessionSnapshot::inactive(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, kind: EventKind) {
        self.events.publish(&SensorEvent::now(kind));
    }

    fn reject(
        &self,
        active: &mut ActiveSession,
        rejection: Rejection,
        sample: Option<&SensorSample>,
    ) -> SessionError {
        let reason = rejection.reason();
        debug!("Session {}: rejected sample, {}", active.session.id, reason);
        if let Some(sample) = sample.filter(|_| rejection.is_persistable()) {
            if let Err(e) = active.log.append_rejected(sample, &reason) {
                return SessionError::ResourceFailure(e);
            }
        }
        self.publish(EventKind::SampleRejected {
            field: rejection.field(),
            reason,
        });
        rejection.into()
    }

    fn close_active(&self, slot: &mut SessionSlot) -> ServiceResponse {
        let Some(active) = slot.active.take() else {
            return ServiceResponse::ack(ResponseStatus::Completed, "No active session");
        };
        let ActiveSession {
            mut session,
            log,
            analytics,
            metadata,
        } = active;

        let closed = log.close();
        session.close();
        debug!(
            "Session {} (seeded at {}) final means: L={:?} RH={:?} AQ={:?}",
            session.id,
            metadata.timestamp,
            analytics.statistics().mean(SampleField::LightLevel),
            analytics.statistics().mean(SampleField::RelativeHumidity),
            analytics.statistics().mean(SampleField::AirQuality)
        );
        let message = format!(
            "Session {} closed after {} accepted sample(s)",
            session.id, session.sample_count
        );
        self.publish(EventKind::TransferCompleted {
            session_id: session.id.clone(),
            message: message.clone(),
        });
        slot.last = Some(session);

        match closed {
            Ok(()) => ServiceResponse::ack(ResponseStatus::Completed, message),
            Err(e) => {
                error!("{}: {}", message, e);
                ServiceResponse::nack(ResponseStatus::Completed, format!("{}, {}", message, e))
            }
        }
    }
}

/// Session ids are the local start time to the second. A start within the
/// same second as the previous one gets a numeric suffix. Ids already taken on
/// disk are skipped by `start_session`.
fn next_session_id(last: Option<&str>, now: DateTime<Local>) -> String {
    let base = now.format(SESSION_ID_FORMAT).to_string();
    let Some(last) = last else {
        return base;
    };
    if last == base {
        return format!("{}_1", base);
    }
    match last
        .strip_prefix(&base)
        .and_then(|rest| rest.strip_prefix('_'))
        .and_then(|n| n.parse::<u32>().ok())
    {
        Some(n) => format!("{}_{}", base, n + 1),
        None => base,
    }
}
