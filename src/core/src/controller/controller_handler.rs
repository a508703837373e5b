use std::sync::Arc;

use log::{error, info, warn};
use tokio::sync::broadcast;

use crate::configuration::config::Config;
use crate::configuration::SharedThresholds;
use crate::error_handling::types::ControllerError;
use crate::events::{BroadcastEventSink, FanoutSink, LogEventSink, SensorEvent};
use crate::session_management::SessionManager;
use crate::storage::{FileStorage, SampleStore};
use crate::web_interface::{AppState, WebServer};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Owns the wired service: storage, thresholds, event sinks, session manager
/// and the HTTP front end.
pub struct Controller {
    pub config: Config,
    state: AppState,
    broadcaster: BroadcastEventSink,
}

impl Controller {
    pub fn new(config: Config) -> Result<Self, ControllerError> {
        let storage: Arc<dyn SampleStore> = Arc::new(FileStorage::new(&config.storage.path)?);
        let thresholds = SharedThresholds::new(config.thresholds);
        let broadcaster = BroadcastEventSink::new(EVENT_CHANNEL_CAPACITY);
        let sinks = FanoutSink::new()
            .with(Arc::new(LogEventSink))
            .with(Arc::new(broadcaster.clone()));

        let manager = Arc::new(SessionManager::new(
            storage.clone(),
            Arc::new(thresholds.clone()),
            Arc::new(sinks),
        ));
        info!("Controller ready, logs in {}", config.storage.path.display());

        Ok(Self {
            config,
            state: AppState {
                manager,
                storage,
                thresholds,
            },
            broadcaster,
        })
    }

    pub fn session_manager(&self) -> Arc<SessionManager> {
        self.state.manager.clone()
    }

    pub fn thresholds(&self) -> &SharedThresholds {
        &self.state.thresholds
    }

    /// Every event raised from now on, for in-process observers.
    pub fn subscribe(&self) -> broadcast::Receiver<SensorEvent> {
        self.broadcaster.subscribe()
    }

    /// Serves the HTTP API until Ctrl-C, then closes any running session.
    pub async fn run(&self) -> Result<(), ControllerError> {
        let server = WebServer::new(self.state.clone(), &self.config.server)?;
        tokio::select! {
            result = server.start() => result?,
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => info!("Ctrl-C received, shutting down"),
                Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
            },
        }
        self.shutdown();
        Ok(())
    }

    /// Best-effort close of the running session so both logs are flushed.
    pub fn shutdown(&self) {
        let response = self.state.manager.end_session();
        if response.is_ack() {
            info!("Shutdown: {}", response.message);
        } else {
            warn!("Shutdown: {}", response.message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::ThresholdSource;
    use crate::events::EventKind;
    use crate::protocol::{SensorSample, SessionMetadata};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.storage.path = dir.path().join("logs");
        config
    }

    #[test]
    fn test_new_creates_storage_dir() {
        let dir = TempDir::new().unwrap();
        let controller = Controller::new(config(&dir)).unwrap();
        assert!(dir.path().join("logs").is_dir());
        assert_eq!(controller.thresholds().snapshot(), controller.config.thresholds);
    }

    #[tokio::test]
    async fn test_subscribers_see_session_events() {
        let dir = TempDir::new().unwrap();
        let controller = Controller::new(config(&dir)).unwrap();
        let mut events = controller.subscribe();

        let manager = controller.session_manager();
        manager.start_session(SessionMetadata::default()).unwrap();
        manager
            .push_sample(Some(SensorSample {
                volume: 10.0,
                relative_humidity: 50.0,
                air_quality: 50_000.0,
                light_level: 500.0,
                timestamp: NaiveDate::from_ymd_opt(2016, 3, 1)
                    .unwrap()
                    .and_hms_opt(8, 0, 0)
                    .unwrap(),
            }))
            .unwrap();
        controller.shutdown();

        let first = events.recv().await.unwrap();
        assert!(matches!(first.kind, EventKind::TransferStarted { .. }));
        let second = events.recv().await.unwrap();
        assert!(matches!(second.kind, EventKind::SampleReceived { sample_count: 1, .. }));
        let third = events.recv().await.unwrap();
        assert!(matches!(third.kind, EventKind::TransferCompleted { .. }));
        assert!(!manager.status().status.is_active());
    }
}
