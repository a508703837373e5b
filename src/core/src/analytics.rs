//! Streaming analytics over accepted samples.
//!
//! Two detectors run for every accepted sample of a session:
//!
//! - **Spike**: the absolute delta between two consecutive accepted samples
//!   exceeds a per-field threshold.
//! - **Out-of-band**: the current value leaves the ±`deviation_percent` band
//!   around the session's running mean for that field.
//!
//! Only `LightLevel`, `RelativeHumidity` and `AirQuality` are monitored.
//!
//! Components:
//! - `running_stats`: per-field sum/count accumulators.
//! - `types`: alert payloads and the monitored field list.
//! - `engine`: the stateful `AnalyticsEngine`.

pub mod engine;
pub mod running_stats;
pub mod types;

pub use engine::AnalyticsEngine;
pub use running_stats::{FieldAccumulator, RunningStatistics};
pub use types::{Alert, Direction, OutOfBandAlert, SpikeAlert, MONITORED_FIELDS};
