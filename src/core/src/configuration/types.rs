use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error_handling::types::ConfigError;
use crate::protocol::SampleField;

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: String::from("127.0.0.1"),
            port: 4000,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory receiving the per-session measurement and reject logs.
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data"),
        }
    }
}

/// Analytics thresholds in effect for one evaluation.
///
/// The three deltas are absolute values in the field's unit; `deviation_percent`
/// is the half-width of the band around the running mean.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdSnapshot {
    pub light_level_delta: f64,
    pub relative_humidity_delta: f64,
    pub air_quality_delta: f64,
    pub deviation_percent: f64,
}

impl Default for ThresholdSnapshot {
    fn default() -> Self {
        Self {
            light_level_delta: 10_000.0,
            relative_humidity_delta: 5.0,
            air_quality_delta: 5_000.0,
            deviation_percent: 25.0,
        }
    }
}

impl ThresholdSnapshot {
    /// Spike threshold for a monitored field, `None` for fields that are not monitored.
    pub fn delta_for(&self, field: SampleField) -> Option<f64> {
        match field {
            SampleField::LightLevel => Some(self.light_level_delta),
            SampleField::RelativeHumidity => Some(self.relative_humidity_delta),
            SampleField::AirQuality => Some(self.air_quality_delta),
            _ => None,
        }
    }

    /// All four values must be finite and non-negative; the deviation must stay
    /// below 100 % so the lower band edge remains positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let named = [
            ("light_level_delta", self.light_level_delta),
            ("relative_humidity_delta", self.relative_humidity_delta),
            ("air_quality_delta", self.air_quality_delta),
            ("deviation_percent", self.deviation_percent),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::NotInRange(format!(
                    "threshold `{}` must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.deviation_percent >= 100.0 {
            return Err(ConfigError::NotInRange(format!(
                "threshold `deviation_percent` must be below 100, got {}",
                self.deviation_percent
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds_are_valid() {
        assert!(ThresholdSnapshot::default().validate().is_ok());
    }

    #[test]
    fn negative_or_nan_thresholds_are_rejected() {
        let negative = ThresholdSnapshot {
            air_quality_delta: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            negative.validate(),
            Err(ConfigError::NotInRange(msg)) if msg.contains("air_quality_delta")
        ));

        let nan = ThresholdSnapshot {
            light_level_delta: f64::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn deviation_of_one_hundred_percent_is_rejected() {
        let wide = ThresholdSnapshot {
            deviation_percent: 100.0,
            ..Default::default()
        };
        assert!(wide.validate().is_err());
    }

    #[test]
    fn delta_for_covers_monitored_fields_only() {
        let t = ThresholdSnapshot::default();
        assert_eq!(t.delta_for(SampleField::LightLevel), Some(10_000.0));
        assert_eq!(t.delta_for(SampleField::RelativeHumidity), Some(5.0));
        assert_eq!(t.delta_for(SampleField::AirQuality), Some(5_000.0));
        assert_eq!(t.delta_for(SampleField::Volume), None);
    }
}
