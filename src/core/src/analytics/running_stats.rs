//! Incremental per-field sums used for the running mean.

use serde::Serialize;

use crate::protocol::{SampleField, SensorSample};

/// Sum and count of one field over the accepted samples of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FieldAccumulator {
    sum: f64,
    count: u64,
}

impl FieldAccumulator {
    pub fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Arithmetic mean, defined only once at least one value was added.
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// One accumulator per monitored field.
///
/// Every accumulator sees exactly the same samples, so their counts always
/// agree and equal the number of accepted samples folded in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunningStatistics {
    light_level: FieldAccumulator,
    relative_humidity: FieldAccumulator,
    air_quality: FieldAccumulator,
}

impl RunningStatistics {
    pub fn fold(&mut self, sample: &SensorSample) {
        self.light_level.add(sample.light_level);
        self.relative_humidity.add(sample.relative_humidity);
        self.air_quality.add(sample.air_quality);
    }

    /// Number of samples folded so far.
    pub fn count(&self) -> u64 {
        self.light_level.count()
    }

    pub fn field(&self, field: SampleField) -> Option<&FieldAccumulator> {
        match field {
            SampleField::LightLevel => Some(&self.light_level),
            SampleField::RelativeHumidity => Some(&self.relative_humidity),
            SampleField::AirQuality => Some(&self.air_quality),
            _ => None,
        }
    }

    pub fn mean(&self, field: SampleField) -> Option<f64> {
        self.field(field).and_then(FieldAccumulator::mean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn sample(light_level: f64, relative_humidity: f64, air_quality: f64) -> SensorSample {
        SensorSample {
            volume: 1.0,
            relative_humidity,
            air_quality,
            light_level,
            timestamp: NaiveDateTime::default(),
        }
    }

    #[test]
    fn empty_accumulator_has_no_mean() {
        let acc = FieldAccumulator::default();
        assert_eq!(acc.mean(), None);
        assert_eq!(RunningStatistics::default().mean(SampleField::AirQuality), None);
    }

    #[test]
    fn fold_tracks_each_field_independently() {
        let mut stats = RunningStatistics::default();
        stats.fold(&sample(100.0, 40.0, 20_000.0));
        stats.fold(&sample(300.0, 60.0, 40_000.0));

        assert_eq!(stats.count(), 2);
        assert_eq!(stats.mean(SampleField::LightLevel), Some(200.0));
        assert_eq!(stats.mean(SampleField::RelativeHumidity), Some(50.0));
        assert_eq!(stats.mean(SampleField::AirQuality), Some(30_000.0));
        assert_eq!(stats.field(SampleField::AirQuality).map(|a| a.sum()), Some(60_000.0));
    }

    #[test]
    fn volume_is_not_tracked() {
        assert!(RunningStatistics::default().field(SampleField::Volume).is_none());
    }
}
