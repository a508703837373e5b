use std::convert::Infallible;
use std::sync::Arc;

use log::{debug, error, warn};
use serde::Serialize;
use warp::{http::StatusCode, reply, Filter, Rejection, Reply};

use super::types::{ApiError, DataFormatFault, ValidationFault};
use crate::configuration::{SharedThresholds, ThresholdSnapshot, ThresholdSource};
use crate::error_handling::types::{SessionError, StorageError};
use crate::protocol::{SensorSample, SessionMetadata};
use crate::session_management::SessionManager;
use crate::storage::SampleStore;

/// Shared dependencies of every handler.
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<SessionManager>,
    pub storage: Arc<dyn SampleStore>,
    pub thresholds: SharedThresholds,
}

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn json_with_status<T: Serialize>(body: &T, status: StatusCode) -> reply::Response {
    reply::with_status(reply::json(body), status).into_response()
}

/// Status code and fault body for a failed session operation.
pub fn session_error_response(err: &SessionError) -> reply::Response {
    match err {
        SessionError::SessionNotActive => {
            json_with_status(&ApiError::new(err.to_string()), StatusCode::CONFLICT)
        }
        SessionError::ValidationFailed { .. } => match ValidationFault::from_error(err) {
            Some(fault) => json_with_status(&fault, StatusCode::UNPROCESSABLE_ENTITY),
            None => json_with_status(&ApiError::new(err.to_string()), StatusCode::UNPROCESSABLE_ENTITY),
        },
        SessionError::MalformedSample { .. } => match DataFormatFault::from_error(err) {
            Some(fault) => json_with_status(&fault, StatusCode::BAD_REQUEST),
            None => json_with_status(&ApiError::new(err.to_string()), StatusCode::BAD_REQUEST),
        },
        SessionError::ResourceFailure(_) => json_with_status(
            &ApiError::new(err.to_string()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    }
}

/// A missing or malformed session id is 404; anything else went wrong reading
/// a log that exists and is 500.
fn storage_error_response(err: &StorageError, not_found: &str) -> reply::Response {
    match err {
        StorageError::NotFound { .. } => {
            json_with_status(&ApiError::new(not_found), StatusCode::NOT_FOUND)
        }
        _ => {
            error!("Session read-back failed: {}", err);
            json_with_status(
                &ApiError::new(err.to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            )
        }
    }
}

/// POST /session/start
pub async fn start_session(
    state: AppState,
    metadata: SessionMetadata,
) -> Result<reply::Response, Rejection> {
    Ok(match state.manager.start_session(metadata) {
        Ok(response) => json_with_status(&response, StatusCode::OK),
        Err(e) => session_error_response(&e),
    })
}

/// POST /session/sample
pub async fn push_sample(
    state: AppState,
    sample: Option<SensorSample>,
) -> Result<reply::Response, Rejection> {
    Ok(match state.manager.push_sample(sample) {
        Ok(response) => json_with_status(&response, StatusCode::OK),
        Err(e) => {
            debug!("PushSample refused: {}", e);
            session_error_response(&e)
        }
    })
}

/// POST /session/end
pub async fn end_session(state: AppState) -> Result<reply::Response, Rejection> {
    let response = state.manager.end_session();
    Ok(json_with_status(&response, StatusCode::OK))
}

/// GET /session
pub async fn session_status(state: AppState) -> Result<reply::Response, Rejection> {
    Ok(json_with_status(&state.manager.status(), StatusCode::OK))
}

/// GET /thresholds
pub async fn get_thresholds(state: AppState) -> Result<reply::Response, Rejection> {
    Ok(json_with_status(&state.thresholds.snapshot(), StatusCode::OK))
}

/// PUT /thresholds
pub async fn put_thresholds(
    state: AppState,
    thresholds: ThresholdSnapshot,
) -> Result<reply::Response, Rejection> {
    Ok(match state.thresholds.update(thresholds) {
        Ok(()) => json_with_status(&state.thresholds.snapshot(), StatusCode::OK),
        Err(e) => {
            warn!("Threshold update refused: {}", e);
            json_with_status(&ApiError::new(e.to_string()), StatusCode::BAD_REQUEST)
        }
    })
}

/// GET /sessions
pub async fn list_sessions(state: AppState) -> Result<reply::Response, Rejection> {
    Ok(match state.storage.list_sessions() {
        Ok(ids) => json_with_status(&ids, StatusCode::OK),
        Err(_) => json_with_status(
            &ApiError::new("Failed to load sessions"),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    })
}

/// GET /sessions/:id/measurements
pub async fn session_measurements(
    id: String,
    state: AppState,
) -> Result<reply::Response, Rejection> {
    Ok(match state.storage.read_accepted(&id) {
        Ok(samples) => json_with_status(&samples, StatusCode::OK),
        Err(e) => storage_error_response(&e, "Session measurements not found"),
    })
}

/// GET /sessions/:id/rejects
pub async fn session_rejects(id: String, state: AppState) -> Result<reply::Response, Rejection> {
    Ok(match state.storage.read_rejected(&id) {
        Ok(records) => json_with_status(&records, StatusCode::OK),
        Err(e) => storage_error_response(&e, "Session rejects not found"),
    })
}

/// The complete filter tree served by [`super::WebServer`].
pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let start = warp::path!("session" / "start")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(warp::body::json())
        .and_then(start_session);

    let sample = warp::path!("session" / "sample")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(warp::body::json())
        .and_then(push_sample);

    let end = warp::path!("session" / "end")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and_then(end_session);

    let status = warp::path!("session")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(session_status);

    let read_thresholds = warp::path!("thresholds")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(get_thresholds);

    let write_thresholds = warp::path!("thresholds")
        .and(warp::put())
        .and(with_state(state.clone()))
        .and(warp::body::json())
        .and_then(put_thresholds);

    let sessions = warp::path!("sessions")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(list_sessions);

    let measurements = warp::path!("sessions" / String / "measurements")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(session_measurements);

    let rejects = warp::path!("sessions" / String / "rejects")
        .and(warp::get())
        .and(with_state(state))
        .and_then(session_rejects);

    start
        .or(sample)
        .or(end)
        .or(status)
        .or(read_thresholds)
        .or(write_thresholds)
        .or(sessions)
        .or(measurements)
        .or(rejects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::LogEventSink;
    use crate::storage::FileStorage;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn state(dir: &TempDir) -> AppState {
        let _ = env_logger::builder().is_test(true).try_init();
        let storage: Arc<dyn SampleStore> = Arc::new(FileStorage::new(dir.path()).unwrap());
        let thresholds = SharedThresholds::new(ThresholdSnapshot::default());
        let manager = Arc::new(SessionManager::new(
            storage.clone(),
            Arc::new(thresholds.clone()),
            Arc::new(LogEventSink),
        ));
        AppState {
            manager,
            storage,
            thresholds,
        }
    }

    fn sample() -> SensorSample {
        SensorSample {
            volume: 250.0,
            relative_humidity: 38.5,
            air_quality: 31_000.0,
            light_level: 2_200.0,
            timestamp: NaiveDate::from_ymd_opt(2016, 3, 1)
                .unwrap()
                .and_hms_opt(11, 30, 0)
                .unwrap(),
        }
    }

    #[tokio::test]
    async fn test_sample_without_session_is_conflict() {
        let dir = TempDir::new().unwrap();
        let res = push_sample(state(&dir), Some(sample())).await.unwrap();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_session_flow_status_codes() {
        let dir = TempDir::new().unwrap();
        let state = state(&dir);

        let res = start_session(state.clone(), SessionMetadata::default())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = push_sample(state.clone(), Some(sample())).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let out_of_range = SensorSample {
            relative_humidity: 0.0,
            ..sample()
        };
        let res = push_sample(state.clone(), Some(out_of_range)).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let res = push_sample(state.clone(), None).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = end_session(state.clone()).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let ids = state.storage.list_sessions().unwrap();
        assert_eq!(ids.len(), 1);
        let res = session_measurements(ids[0].clone(), state.clone()).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let res = session_rejects(ids[0].clone(), state.clone()).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(state.storage.read_rejected(&ids[0]).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let dir = TempDir::new().unwrap();
        let state = state(&dir);
        let res = session_measurements("19990101_000000".into(), state.clone())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let res = session_rejects("not-an-id".into(), state).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unreadable_log_is_server_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("measurements_20160301_100000.csv"),
            "Volume,RelativeHumidity,AirQuality,LightLevel,DateTime\nloud,1,2,3,yesterday\n",
        )
        .unwrap();
        let res = session_measurements("20160301_100000".into(), state(&dir))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_invalid_thresholds_are_refused() {
        let dir = TempDir::new().unwrap();
        let state = state(&dir);
        let bad = ThresholdSnapshot {
            deviation_percent: 150.0,
            ..ThresholdSnapshot::default()
        };
        let res = put_thresholds(state.clone(), bad).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.thresholds.snapshot(), ThresholdSnapshot::default());

        let good = ThresholdSnapshot {
            air_quality_delta: 100.0,
            ..ThresholdSnapshot::default()
        };
        let res = put_thresholds(state.clone(), good).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(state.thresholds.snapshot(), good);
    }

    #[test]
    fn test_resource_failure_maps_to_500() {
        let err = SessionError::ResourceFailure(StorageError::OpenFailed {
            path: "/x".into(),
            reason: "denied".into(),
        });
        assert_eq!(
            session_error_response(&err).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
