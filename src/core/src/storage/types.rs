use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::protocol::SensorSample;

/// Timestamp layout used in both logs, second precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const MEASUREMENT_HEADER: [&str; 5] = [
    "Volume",
    "RelativeHumidity",
    "AirQuality",
    "LightLevel",
    "DateTime",
];

pub const REJECT_HEADER: [&str; 6] = [
    "Volume",
    "RelativeHumidity",
    "AirQuality",
    "LightLevel",
    "DateTime",
    "RejectReason",
];

/// A rejected sample as read back from a reject log.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedRecord {
    pub sample: SensorSample,
    pub reason: String,
}

/// One line of `measurements_<session>.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MeasurementRow {
    pub volume: f64,
    pub relative_humidity: f64,
    pub air_quality: f64,
    pub light_level: f64,
    pub date_time: String,
}

impl From<&SensorSample> for MeasurementRow {
    fn from(sample: &SensorSample) -> Self {
        Self {
            volume: sample.volume,
            relative_humidity: sample.relative_humidity,
            air_quality: sample.air_quality,
            light_level: sample.light_level,
            date_time: sample.timestamp.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

impl MeasurementRow {
    pub fn into_sample(self) -> Result<SensorSample, chrono::ParseError> {
        Ok(SensorSample {
            volume: self.volume,
            relative_humidity: self.relative_humidity,
            air_quality: self.air_quality,
            light_level: self.light_level,
            timestamp: NaiveDateTime::parse_from_str(&self.date_time, TIMESTAMP_FORMAT)?,
        })
    }
}

/// One line of `rejects_<session>.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RejectRow {
    pub volume: f64,
    pub relative_humidity: f64,
    pub air_quality: f64,
    pub light_level: f64,
    pub date_time: String,
    pub reject_reason: String,
}

impl RejectRow {
    pub fn new(sample: &SensorSample, reason: &str) -> Self {
        let row = MeasurementRow::from(sample);
        Self {
            volume: row.volume,
            relative_humidity: row.relative_humidity,
            air_quality: row.air_quality,
            light_level: row.light_level,
            date_time: row.date_time,
            reject_reason: reason.to_string(),
        }
    }

    pub fn into_record(self) -> Result<RejectedRecord, chrono::ParseError> {
        let sample = MeasurementRow {
            volume: self.volume,
            relative_humidity: self.relative_humidity,
            air_quality: self.air_quality,
            light_level: self.light_level,
            date_time: self.date_time,
        }
        .into_sample()?;
        Ok(RejectedRecord {
            sample,
            reason: self.reject_reason,
        })
    }
}
