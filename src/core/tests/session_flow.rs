//! Drives whole sessions through the public API against real CSV logs.

use std::fs;
use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use envlog::analytics::Direction;
use envlog::configuration::{SharedThresholds, ThresholdSnapshot};
use envlog::events::{BroadcastEventSink, EventKind};
use envlog::protocol::{ResponseStatus, SampleField, SensorSample, SessionMetadata};
use envlog::session_management::{SessionManager, SessionStatus};
use envlog::storage::{FileStorage, SampleStore};
use envlog::SessionError;
use tempfile::TempDir;

fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2016, 3, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

fn reading(minute: i64, light_level: f64, air_quality: f64) -> SensorSample {
    SensorSample {
        volume: 310.25,
        relative_humidity: 42.5,
        air_quality,
        light_level,
        timestamp: start_time() + Duration::minutes(minute),
    }
}

struct Service {
    _dir: TempDir,
    storage: Arc<FileStorage>,
    manager: SessionManager,
    events: BroadcastEventSink,
}

fn service() -> Service {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(FileStorage::new(dir.path()).unwrap());
    let events = BroadcastEventSink::new(64);
    let thresholds = SharedThresholds::new(ThresholdSnapshot {
        light_level_delta: 500.0,
        ..ThresholdSnapshot::default()
    });
    let manager = SessionManager::new(
        storage.clone(),
        Arc::new(thresholds),
        Arc::new(events.clone()),
    );
    Service {
        _dir: dir,
        storage,
        manager,
        events,
    }
}

#[test]
fn accepted_and_rejected_samples_land_in_their_logs() {
    let svc = service();
    svc.manager.start_session(SessionMetadata::default()).unwrap();
    let id = svc.manager.status().session_id.unwrap();

    let accepted = vec![
        reading(0, 1_000.0, 40_000.0),
        reading(1, 1_100.0, 40_500.0),
        reading(2, 1_050.0, 39_750.5),
    ];
    for sample in &accepted {
        svc.manager.push_sample(Some(*sample)).unwrap();
    }
    let too_loud = SensorSample {
        volume: 2_000.0,
        ..reading(3, 1_000.0, 40_000.0)
    };
    assert!(matches!(
        svc.manager.push_sample(Some(too_loud)),
        Err(SessionError::ValidationFailed {
            field: SampleField::Volume,
            ..
        })
    ));

    let end = svc.manager.end_session();
    assert!(end.is_ack());
    assert_eq!(end.status, ResponseStatus::Completed);

    assert_eq!(svc.storage.read_accepted(&id).unwrap(), accepted);
    let rejects = svc.storage.read_rejected(&id).unwrap();
    assert_eq!(rejects.len(), 1);
    assert_eq!(rejects[0].sample, too_loud);

    let raw = fs::read_to_string(svc.storage.measurements_path(&id)).unwrap();
    let mut lines = raw.lines();
    assert_eq!(
        lines.next(),
        Some("Volume,RelativeHumidity,AirQuality,LightLevel,DateTime")
    );
    assert!(lines.next().unwrap().ends_with(",2016-03-01 09:00:00"));
    assert_eq!(lines.count(), 2);

    assert_eq!(svc.storage.list_sessions().unwrap(), vec![id]);
    assert_eq!(svc.manager.status().status, SessionStatus::Closed);
}

#[tokio::test]
async fn analytics_events_reach_subscribers_in_order() {
    let svc = service();
    let mut rx = svc.events.subscribe();

    svc.manager.start_session(SessionMetadata::default()).unwrap();
    svc.manager.push_sample(Some(reading(0, 1_000.0, 40_000.0))).unwrap();
    svc.manager.push_sample(Some(reading(1, 1_000.0, 40_000.0))).unwrap();
    svc.manager.push_sample(Some(reading(2, 1_600.0, 80_000.0))).unwrap();
    svc.manager.end_session();

    let mut kinds = Vec::new();
    while let Ok(event) = rx.try_recv() {
        kinds.push(event.kind);
    }

    assert!(matches!(kinds.first(), Some(EventKind::TransferStarted { .. })));
    assert!(matches!(kinds.last(), Some(EventKind::TransferCompleted { .. })));

    let light_spikes: Vec<_> = kinds
        .iter()
        .filter_map(|k| match k {
            EventKind::Spike(s) if s.field == SampleField::LightLevel => Some(s),
            _ => None,
        })
        .collect();
    assert_eq!(light_spikes.len(), 1);
    assert_eq!(light_spikes[0].direction, Direction::Above);

    let air_quality_band: Vec<_> = kinds
        .iter()
        .filter_map(|k| match k {
            EventKind::OutOfBand(o) if o.field == SampleField::AirQuality => Some(o),
            _ => None,
        })
        .collect();
    assert_eq!(air_quality_band.len(), 1);
    assert_eq!(air_quality_band[0].direction, Direction::Above);
}

#[test]
fn operations_outside_a_session_write_nothing() {
    let svc = service();
    assert_eq!(
        svc.manager.push_sample(Some(reading(0, 1_000.0, 40_000.0))),
        Err(SessionError::SessionNotActive)
    );
    let end = svc.manager.end_session();
    assert!(end.is_ack());
    assert_eq!(end.status, ResponseStatus::Completed);
    assert!(svc.storage.list_sessions().unwrap().is_empty());
}

#[test]
fn a_restarted_service_keeps_earlier_logs() {
    let svc = service();
    svc.manager.start_session(SessionMetadata::default()).unwrap();
    let first_id = svc.manager.status().session_id.unwrap();
    let kept = reading(0, 1_000.0, 40_000.0);
    svc.manager.push_sample(Some(kept)).unwrap();
    svc.manager.end_session();

    // a fresh process has no memory of the ids already written
    let restarted = SessionManager::new(
        svc.storage.clone(),
        Arc::new(SharedThresholds::new(ThresholdSnapshot::default())),
        Arc::new(svc.events.clone()),
    );
    restarted.start_session(SessionMetadata::default()).unwrap();
    let second_id = restarted.status().session_id.unwrap();
    restarted.end_session();

    assert_ne!(first_id, second_id);
    assert_eq!(svc.storage.read_accepted(&first_id).unwrap(), vec![kept]);
    assert!(svc.storage.read_accepted(&second_id).unwrap().is_empty());
    assert_eq!(svc.storage.list_sessions().unwrap().len(), 2);
}
