//! Fixed-order validation rules.
//!
//! Rules run in this order and stop at the first violation:
//!
//! 1. sample present
//! 2. `volume` in `[0, 1000]` mV
//! 3. `light_level` in `[100, 50 000 000]` Ω
//! 4. `relative_humidity` in `(0, 100]` %
//! 5. `air_quality` in `[10 000, 100 000]` Ω
//! 6. timestamp is not the default value
//! 7. numeric fields are finite (volume first)
//!
//! Range checks are written as `value < min || value > max`, so a NaN passes
//! them and is caught by rule 7 while an infinity is reported as a range
//! failure by the earlier rule.

use chrono::NaiveDateTime;

use super::types::{Rejection, ValidationOutcome};
use crate::protocol::{SampleField, SensorSample};

pub const VOLUME_MIN_MV: f64 = 0.0;
pub const VOLUME_MAX_MV: f64 = 1_000.0;
pub const VOLUME_RANGE: &str = "0–1000 mV";

pub const LIGHT_LEVEL_MIN_OHM: f64 = 100.0;
pub const LIGHT_LEVEL_MAX_OHM: f64 = 50_000_000.0;
pub const LIGHT_LEVEL_RANGE: &str = "100–50,000,000 Ω";

/// Lower bound is exclusive.
pub const RELATIVE_HUMIDITY_MIN_PCT: f64 = 0.0;
pub const RELATIVE_HUMIDITY_MAX_PCT: f64 = 100.0;
pub const RELATIVE_HUMIDITY_RANGE: &str = "(0–100] %";

pub const AIR_QUALITY_MIN_OHM: f64 = 10_000.0;
pub const AIR_QUALITY_MAX_OHM: f64 = 100_000.0;
pub const AIR_QUALITY_RANGE: &str = "10,000–100,000 Ω";

/// Order in which rule 7 looks for non-finite values.
const FINITE_CHECK_ORDER: [SampleField; 4] = [
    SampleField::Volume,
    SampleField::LightLevel,
    SampleField::RelativeHumidity,
    SampleField::AirQuality,
];

/// Validates `sample` against the rule set.
pub fn validate(sample: Option<&SensorSample>) -> ValidationOutcome {
    match first_violation(sample) {
        Some(rejection) => ValidationOutcome::Rejected(rejection),
        None => ValidationOutcome::Accepted,
    }
}

fn first_violation(sample: Option<&SensorSample>) -> Option<Rejection> {
    let Some(sample) = sample else {
        return Some(Rejection::Malformed {
            field: SampleField::Sample,
            details: "sample is missing".to_string(),
        });
    };

    if sample.volume < VOLUME_MIN_MV || sample.volume > VOLUME_MAX_MV {
        return Some(out_of_range(SampleField::Volume, sample.volume, VOLUME_RANGE));
    }

    if sample.light_level < LIGHT_LEVEL_MIN_OHM || sample.light_level > LIGHT_LEVEL_MAX_OHM {
        return Some(out_of_range(
            SampleField::LightLevel,
            sample.light_level,
            LIGHT_LEVEL_RANGE,
        ));
    }

    if sample.relative_humidity <= RELATIVE_HUMIDITY_MIN_PCT
        || sample.relative_humidity > RELATIVE_HUMIDITY_MAX_PCT
    {
        return Some(out_of_range(
            SampleField::RelativeHumidity,
            sample.relative_humidity,
            RELATIVE_HUMIDITY_RANGE,
        ));
    }

    if sample.air_quality < AIR_QUALITY_MIN_OHM || sample.air_quality > AIR_QUALITY_MAX_OHM {
        return Some(out_of_range(
            SampleField::AirQuality,
            sample.air_quality,
            AIR_QUALITY_RANGE,
        ));
    }

    if sample.timestamp == NaiveDateTime::default() {
        return Some(Rejection::Malformed {
            field: SampleField::DateTime,
            details: "timestamp is missing or has the default value".to_string(),
        });
    }

    FINITE_CHECK_ORDER.iter().find_map(|field| {
        let value = sample.value(*field)?;
        if value.is_finite() {
            None
        } else {
            Some(Rejection::Malformed {
                field: *field,
                details: format!("value {} is not a finite number", value),
            })
        }
    })
}

fn out_of_range(field: SampleField, value: f64, expected_range: &'static str) -> Rejection {
    Rejection::OutOfRange {
        field,
        invalid_value: value,
        expected_range,
    }
}
