use std::fmt;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::analytics::{Alert, OutOfBandAlert, SpikeAlert};
use crate::protocol::{SampleField, SensorSample};

/// An event together with the local time it was raised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorEvent {
    pub at: DateTime<Local>,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl SensorEvent {
    pub fn now(kind: EventKind) -> Self {
        Self {
            at: Local::now(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventKind {
    TransferStarted {
        session_id: String,
        message: String,
    },
    TransferCompleted {
        session_id: String,
        message: String,
    },
    SampleReceived {
        sample: SensorSample,
        sample_count: u64,
    },
    SampleRejected {
        field: SampleField,
        reason: String,
    },
    Spike(SpikeAlert),
    OutOfBand(OutOfBandAlert),
}

impl EventKind {
    /// Alerts need attention; everything else is routine progress.
    pub fn is_alert(&self) -> bool {
        matches!(self, EventKind::Spike(_) | EventKind::OutOfBand(_))
    }
}

impl From<Alert> for EventKind {
    fn from(alert: Alert) -> Self {
        match alert {
            Alert::Spike(spike) => EventKind::Spike(spike),
            Alert::OutOfBand(band) => EventKind::OutOfBand(band),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::TransferStarted {
                session_id,
                message,
            } => write!(f, "Transfer started [{}]: {}", session_id, message),
            EventKind::TransferCompleted {
                session_id,
                message,
            } => write!(f, "Transfer completed [{}]: {}", session_id, message),
            EventKind::SampleReceived {
                sample,
                sample_count,
            } => write!(
                f,
                "Sample #{} at {}: V={} mV, RH={} %, AQ={} Ω, L={} Ω",
                sample_count,
                sample.timestamp,
                sample.volume,
                sample.relative_humidity,
                sample.air_quality,
                sample.light_level
            ),
            EventKind::SampleRejected { field, reason } => {
                write!(f, "Sample rejected ({}): {}", field, reason)
            }
            EventKind::Spike(s) => write!(
                f,
                "{} spike {}: {} -> {} {} (delta {:.2}, threshold {})",
                s.field,
                s.direction,
                s.previous_value,
                s.current_value,
                s.field.unit(),
                s.delta,
                s.threshold
            ),
            EventKind::OutOfBand(o) => write!(
                f,
                "{} out of band {}: {} {} vs mean {:.2} ({:.1} % deviation)",
                o.field,
                o.direction,
                o.current_value,
                o.field.unit(),
                o.running_mean,
                o.deviation_percent
            ),
        }
    }
}
