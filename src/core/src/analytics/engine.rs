//! Stateful spike and out-of-band detection for one session.
//!
//! Per accepted sample, in order:
//!
//! 1. spike check against the previous accepted sample (skipped for the first one)
//! 2. fold the sample into the running statistics
//! 3. out-of-band check against means that already include the sample, run only
//!    when more than one sample had been folded before this one
//! 4. remember the sample as the new previous sample
//!
//! Step 3 runs after step 2, so a sample takes part in its own mean. The gate
//! skips the first two samples of a session, where that mean would be mostly
//! the sample itself.

use log::debug;

use super::running_stats::RunningStatistics;
use super::types::{Alert, Direction, OutOfBandAlert, SpikeAlert, MONITORED_FIELDS};
use crate::configuration::types::ThresholdSnapshot;
use crate::protocol::SensorSample;

#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    statistics: RunningStatistics,
    previous: Option<SensorSample>,
}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluates one accepted sample and returns the alerts it raised, spikes
    /// first, each group in [`MONITORED_FIELDS`] order.
    pub fn evaluate(
        &mut self,
        sample: &SensorSample,
        thresholds: &ThresholdSnapshot,
    ) -> Vec<Alert> {
        let mut alerts = Vec::new();

        if let Some(previous) = self.previous {
            alerts.extend(detect_spikes(&previous, sample, thresholds).map(Alert::Spike));
        }

        let folded_before = self.statistics.count();
        self.statistics.fold(sample);

        if folded_before > 1 {
            alerts.extend(
                self.detect_out_of_band(sample, thresholds.deviation_percent)
                    .map(Alert::OutOfBand),
            );
        }

        self.previous = Some(*sample);
        debug!(
            "Analytics evaluated sample #{}: {} alert(s)",
            self.statistics.count(),
            alerts.len()
        );
        alerts
    }

    pub fn statistics(&self) -> &RunningStatistics {
        &self.statistics
    }

    pub fn previous(&self) -> Option<&SensorSample> {
        self.previous.as_ref()
    }

    fn detect_out_of_band<'a>(
        &'a self,
        sample: &'a SensorSample,
        deviation_percent: f64,
    ) -> impl Iterator<Item = OutOfBandAlert> + 'a {
        MONITORED_FIELDS.into_iter().filter_map(move |field| {
            let current = sample.value(field)?;
            let mean = self.statistics.mean(field)?;
            if mean <= 0.0 {
                return None;
            }
            let lower = mean * (100.0 - deviation_percent) / 100.0;
            let upper = mean * (100.0 + deviation_percent) / 100.0;
            if current < lower || current > upper {
                Some(OutOfBandAlert {
                    field,
                    direction: Direction::of(current, mean),
                    current_value: current,
                    running_mean: mean,
                    deviation_percent: (current - mean).abs() / mean * 100.0,
                })
            } else {
                None
            }
        })
    }
}

fn detect_spikes<'a>(
    previous: &'a SensorSample,
    current: &'a SensorSample,
    thresholds: &'a ThresholdSnapshot,
) -> impl Iterator<Item = SpikeAlert> + 'a {
    MONITORED_FIELDS.into_iter().filter_map(move |field| {
        let previous_value = previous.value(field)?;
        let current_value = current.value(field)?;
        let threshold = thresholds.delta_for(field)?;
        let delta = (current_value - previous_value).abs();
        (delta > threshold).then_some(SpikeAlert {
            field,
            direction: Direction::of(current_value, previous_value),
            delta,
            previous_value,
            current_value,
            threshold,
        })
    })
}
