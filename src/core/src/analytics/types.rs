use std::fmt;

use serde::{Deserialize, Serialize};

use crate::protocol::SampleField;

/// Fields tracked by the analytics engine, in evaluation order.
pub const MONITORED_FIELDS: [SampleField; 3] = [
    SampleField::LightLevel,
    SampleField::RelativeHumidity,
    SampleField::AirQuality,
];

/// Position of the current value relative to its reference (previous sample or mean).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Above,
    Below,
}

impl Direction {
    /// `Above` only when `current` is strictly greater than `reference`.
    pub fn of(current: f64, reference: f64) -> Self {
        if current > reference {
            Direction::Above
        } else {
            Direction::Below
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Direction::Above => "above",
            Direction::Below => "below",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Consecutive-delta spike on one field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpikeAlert {
    pub field: SampleField,
    pub direction: Direction,
    pub delta: f64,
    pub previous_value: f64,
    pub current_value: f64,
    pub threshold: f64,
}

/// Deviation of one field from its running mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutOfBandAlert {
    pub field: SampleField,
    pub direction: Direction,
    pub current_value: f64,
    pub running_mean: f64,
    pub deviation_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Alert {
    Spike(SpikeAlert),
    OutOfBand(OutOfBandAlert),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_compares_values_not_delta_sign() {
        assert_eq!(Direction::of(12.0, 10.0), Direction::Above);
        assert_eq!(Direction::of(8.0, 10.0), Direction::Below);
        assert_eq!(Direction::of(10.0, 10.0), Direction::Below);
        assert_eq!(Direction::Above.to_string(), "above");
    }
}
