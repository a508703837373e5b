//! Data types exchanged between the producer and the ingestion service.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One environmental reading pushed by the producer.
///
/// Values are taken as-is from the sensor export: `volume` in mV, `relative_humidity`
/// in %, `air_quality` and `light_level` as sensor resistance in Ω.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorSample {
    pub volume: f64,
    pub relative_humidity: f64,
    pub air_quality: f64,
    pub light_level: f64,
    pub timestamp: NaiveDateTime,
}

impl SensorSample {
    /// Returns the numeric value carried by `field`, or `None` for the
    /// non-numeric fields (`Sample`, `DateTime`).
    pub fn value(&self, field: SampleField) -> Option<f64> {
        match field {
            SampleField::Volume => Some(self.volume),
            SampleField::RelativeHumidity => Some(self.relative_humidity),
            SampleField::AirQuality => Some(self.air_quality),
            SampleField::LightLevel => Some(self.light_level),
            SampleField::Sample | SampleField::DateTime => None,
        }
    }
}

/// Seed data sent along with `StartSession`.
///
/// Accepted permissively: nothing here is validated, it only feeds logs and the
/// transfer-started event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionMetadata {
    pub volume: f64,
    pub relative_humidity: f64,
    pub air_quality: f64,
    pub light_level: f64,
    pub timestamp: NaiveDateTime,
}

/// Names a field of a [`SensorSample`], or the sample as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleField {
    Sample,
    Volume,
    LightLevel,
    RelativeHumidity,
    AirQuality,
    DateTime,
}

impl SampleField {
    pub const fn name(&self) -> &'static str {
        match self {
            SampleField::Sample => "Sample",
            SampleField::Volume => "Volume",
            SampleField::LightLevel => "LightLevel",
            SampleField::RelativeHumidity => "RelativeHumidity",
            SampleField::AirQuality => "AirQuality",
            SampleField::DateTime => "DateTime",
        }
    }

    /// Unit suffix used in human-readable log lines.
    pub const fn unit(&self) -> &'static str {
        match self {
            SampleField::Volume => "mV",
            SampleField::LightLevel | SampleField::AirQuality => "Ω",
            SampleField::RelativeHumidity => "%",
            SampleField::Sample | SampleField::DateTime => "",
        }
    }
}

impl fmt::Display for SampleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseType {
    #[serde(rename = "ACK")]
    Ack,
    #[serde(rename = "NACK")]
    Nack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseStatus {
    #[serde(rename = "IN_PROGRESS")]
    InProgress,
    #[serde(rename = "COMPLETED")]
    Completed,
}

/// Response envelope returned by the three session operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub status: ResponseStatus,
    pub message: String,
}

impl ServiceResponse {
    pub fn ack(status: ResponseStatus, message: impl Into<String>) -> Self {
        Self {
            response_type: ResponseType::Ack,
            status,
            message: message.into(),
        }
    }

    pub fn nack(status: ResponseStatus, message: impl Into<String>) -> Self {
        Self {
            response_type: ResponseType::Nack,
            status,
            message: message.into(),
        }
    }

    pub fn is_ack(&self) -> bool {
        self.response_type == ResponseType::Ack
    }
}
