use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use log::{debug, error, info, warn};
use regex::Regex;

use crate::error_handling::types::StorageError;
use crate::protocol::SensorSample;
use crate::storage::storage_trait::{SampleStore, SessionLog};
use crate::storage::types::{
    MeasurementRow, RejectRow, RejectedRecord, MEASUREMENT_HEADER, REJECT_HEADER,
};

fn session_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{8}_\d{6}(?:_\d+)?$").expect("valid session id regex"))
}

fn measurement_file_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^measurements_(\d{8}_\d{6}(?:_\d+)?)\.csv$").expect("valid file name regex")
    })
}

/// Writes `measurements_<id>.csv` and `rejects_<id>.csv` into one directory.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, StorageError> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).map_err(|e| {
            error!("Failed to create storage dir {}: {}", base_path.display(), e);
            StorageError::OpenFailed {
                path: base_path.clone(),
                reason: e.to_string(),
            }
        })?;
        info!("FileStorage initialized at {}", base_path.display());
        Ok(Self { base_path })
    }

    pub fn measurements_path(&self, session_id: &str) -> PathBuf {
        self.base_path.join(format!("measurements_{}.csv", session_id))
    }

    pub fn rejects_path(&self, session_id: &str) -> PathBuf {
        self.base_path.join(format!("rejects_{}.csv", session_id))
    }

    /// Session ids become file names, so only the generated shape is allowed.
    fn checked_id<'a>(&self, session_id: &'a str) -> Result<&'a str, StorageError> {
        if session_id_pattern().is_match(session_id) {
            Ok(session_id)
        } else {
            warn!("Refusing malformed session id {:?}", session_id);
            Err(StorageError::NotFound {
                path: self.base_path.join(session_id),
            })
        }
    }

    fn read_rows<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, StorageError> {
        let read_failed = |reason: String| {
            error!("Read failed {}: {}", path.display(), reason);
            StorageError::ReadFailed {
                path: path.to_path_buf(),
                reason,
            }
        };
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                debug!("No log at {}", path.display());
                StorageError::NotFound {
                    path: path.to_path_buf(),
                }
            }
            _ => read_failed(e.to_string()),
        })?;
        let mut reader = csv::Reader::from_reader(file);
        reader
            .deserialize()
            .collect::<Result<Vec<T>, _>>()
            .map_err(|e| read_failed(e.to_string()))
    }
}

impl SampleStore for FileStorage {
    fn open_session(&self, session_id: &str) -> Result<Box<dyn SessionLog>, StorageError> {
        let session_id = self.checked_id(session_id).map_err(|e| match e {
            StorageError::NotFound { path } => StorageError::OpenFailed {
                path,
                reason: "malformed session id".to_string(),
            },
            other => other,
        })?;
        let accepted = CsvLog::create(self.measurements_path(session_id), &MEASUREMENT_HEADER)?;
        let rejected = match CsvLog::create(self.rejects_path(session_id), &REJECT_HEADER) {
            Ok(rejected) => rejected,
            Err(e) => {
                // a half-opened session must not show up in the listing
                let orphan = accepted.path.clone();
                drop(accepted);
                if let Err(remove) = fs::remove_file(&orphan) {
                    warn!("Failed to remove {}: {}", orphan.display(), remove);
                }
                return Err(e);
            }
        };
        info!(
            "Opened logs for session {}: {}, {}",
            session_id,
            accepted.path.display(),
            rejected.path.display()
        );
        Ok(Box::new(CsvSessionLog { accepted, rejected }))
    }

    fn list_sessions(&self) -> Result<Vec<String>, StorageError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            error!("Failed to read storage dir {}: {}", self.base_path.display(), e);
            StorageError::ReadFailed {
                path: self.base_path.clone(),
                reason: e.to_string(),
            }
        })?;
        let mut ids: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name();
                let captures = measurement_file_pattern().captures(name.to_str()?)?;
                Some(captures[1].to_string())
            })
            .collect();
        ids.sort();
        debug!("Found {} session log(s) in {}", ids.len(), self.base_path.display());
        Ok(ids)
    }

    fn read_accepted(&self, session_id: &str) -> Result<Vec<SensorSample>, StorageError> {
        let path = self.measurements_path(self.checked_id(session_id)?);
        let rows: Vec<MeasurementRow> = Self::read_rows(&path)?;
        rows.into_iter()
            .map(|row| {
                row.into_sample().map_err(|e| StorageError::ReadFailed {
                    path: path.clone(),
                    reason: e.to_string(),
                })
            })
            .collect()
    }

    fn read_rejected(&self, session_id: &str) -> Result<Vec<RejectedRecord>, StorageError> {
        let path = self.rejects_path(self.checked_id(session_id)?);
        let rows: Vec<RejectRow> = Self::read_rows(&path)?;
        rows.into_iter()
            .map(|row| {
                row.into_record().map_err(|e| StorageError::ReadFailed {
                    path: path.clone(),
                    reason: e.to_string(),
                })
            })
            .collect()
    }
}

/// One CSV destination. The header is written explicitly so an empty log still
/// carries it; every row is flushed before the append returns. An existing file
/// is never reopened, so a repeated session id cannot truncate earlier rows.
struct CsvLog {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl CsvLog {
    fn create(path: PathBuf, header: &[&str]) -> Result<Self, StorageError> {
        let open_failed = |reason: String| {
            error!("Failed to create log {}: {}", path.display(), reason);
            StorageError::OpenFailed {
                path: path.clone(),
                reason,
            }
        };
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => {
                    warn!("Log {} already exists, leaving it untouched", path.display());
                    StorageError::AlreadyExists { path: path.clone() }
                }
                _ => open_failed(e.to_string()),
            })?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer
            .write_record(header)
            .map_err(|e| open_failed(e.to_string()))?;
        writer.flush().map_err(|e| open_failed(e.to_string()))?;
        Ok(Self { path, writer })
    }

    fn append<T: serde::Serialize>(&mut self, row: &T) -> Result<(), StorageError> {
        let result = self
            .writer
            .serialize(row)
            .map_err(|e| e.to_string())
            .and_then(|_| self.writer.flush().map_err(|e| e.to_string()));
        result.map_err(|reason| {
            error!("Write failed {}: {}", self.path.display(), reason);
            StorageError::WriteFailed {
                path: self.path.clone(),
                reason,
            }
        })
    }

    fn close(mut self) -> Result<(), StorageError> {
        self.writer.flush().map_err(|e| {
            error!("Close failed {}: {}", self.path.display(), e);
            StorageError::CloseFailed {
                path: self.path.clone(),
                reason: e.to_string(),
            }
        })?;
        debug!("Closed {}", self.path.display());
        Ok(())
    }
}

struct CsvSessionLog {
    accepted: CsvLog,
    rejected: CsvLog,
}

impl SessionLog for CsvSessionLog {
    fn append_accepted(&mut self, sample: &SensorSample) -> Result<(), StorageError> {
        self.accepted.append(&MeasurementRow::from(sample))
    }

    fn append_rejected(&mut self, sample: &SensorSample, reason: &str) -> Result<(), StorageError> {
        self.rejected.append(&RejectRow::new(sample, reason))
    }

    fn close(self: Box<Self>) -> Result<(), StorageError> {
        let CsvSessionLog { accepted, rejected } = *self;
        let accepted = accepted.close();
        let rejected = rejected.close();
        accepted.and(rejected)
    }
}
