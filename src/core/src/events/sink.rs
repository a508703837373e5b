use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::broadcast;

use super::types::{EventKind, SensorEvent};

/// Receives every event the session manager raises.
///
/// `publish` is called while the session lock is held, so implementations must
/// not block and must not call back into the session manager.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: &SensorEvent);
}

/// Console presentation of events through the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn publish(&self, event: &SensorEvent) {
        if event.kind.is_alert() || matches!(event.kind, EventKind::SampleRejected { .. }) {
            warn!("{}", event.kind);
        } else {
            info!("{}", event.kind);
        }
        if log::log_enabled!(log::Level::Debug) {
            match serde_json::to_string(event) {
                Ok(json) => debug!("event {}", json),
                Err(e) => debug!("event could not be serialized: {}", e),
            }
        }
    }
}

/// In-process fan-out to any number of async subscribers.
///
/// Sending never waits: with no subscriber the event is dropped, and a slow
/// subscriber sees `RecvError::Lagged` instead of holding up the session.
#[derive(Debug, Clone)]
pub struct BroadcastEventSink {
    tx: broadcast::Sender<SensorEvent>,
}

impl BroadcastEventSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        info!("Event broadcaster initialized with capacity {}", capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SensorEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl EventSink for BroadcastEventSink {
    fn publish(&self, event: &SensorEvent) {
        let _ = self.tx.send(event.clone());
    }
}

/// Publishes each event to every inner sink, in order.
#[derive(Default, Clone)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl EventSink for FanoutSink {
    fn publish(&self, event: &SensorEvent) {
        for sink in &self.sinks {
            sink.publish(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::SampleField;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording(Mutex<Vec<EventKind>>);

    impl EventSink for Recording {
        fn publish(&self, event: &SensorEvent) {
            self.0.lock().unwrap().push(event.kind.clone());
        }
    }

    fn rejected() -> SensorEvent {
        SensorEvent::now(EventKind::SampleRejected {
            field: SampleField::Volume,
            reason: "Volume 1500 outside expected range 0–1000 mV".into(),
        })
    }

    #[test]
    fn fanout_reaches_every_sink() {
        let a = Arc::new(Recording::default());
        let b = Arc::new(Recording::default());
        let fanout = FanoutSink::new().with(a.clone()).with(b.clone());

        fanout.publish(&rejected());
        assert_eq!(a.0.lock().unwrap().len(), 1);
        assert_eq!(b.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn broadcast_without_subscribers_is_lossy() {
        let sink = BroadcastEventSink::new(4);
        assert_eq!(sink.subscriber_count(), 0);
        sink.publish(&rejected());
    }

    #[tokio::test]
    async fn broadcast_delivers_to_subscribers() {
        let sink = BroadcastEventSink::new(4);
        let mut rx = sink.subscribe();
        let event = rejected();
        sink.publish(&event);
        assert_eq!(rx.recv().await.unwrap(), event);
    }

    #[test]
    fn log_sink_accepts_every_kind() {
        let _ = env_logger::builder().is_test(true).try_init();
        LogEventSink.publish(&rejected());
        LogEventSink.publish(&SensorEvent::now(EventKind::TransferCompleted {
            session_id: "20160301_100000".into(),
            message: "Session closed".into(),
        }));
    }
}
