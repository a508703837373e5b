//! Notifications raised while a session runs.
//!
//! The session manager publishes every state change and every analytics alert
//! as a [`SensorEvent`] to an injected [`EventSink`]. Publication is
//! fire-and-forget: a sink can never fail a session operation.
//!
//! Components:
//! - `types`: the event payloads.
//! - `sink`: the `EventSink` trait and the log, broadcast and fan-out sinks.

pub mod sink;
pub mod types;

pub use sink::{BroadcastEventSink, EventSink, FanoutSink, LogEventSink};
pub use types::{EventKind, SensorEvent};
