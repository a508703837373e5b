//! Runtime access to the analytics thresholds.
//!
//! The analytics engine never caches thresholds: it asks a [`ThresholdSource`]
//! for a fresh [`ThresholdSnapshot`] before every evaluation.

use std::sync::{Arc, PoisonError, RwLock};

use log::info;

use super::types::ThresholdSnapshot;
use crate::error_handling::types::ConfigError;

/// Supplies the thresholds in effect right now.
pub trait ThresholdSource: Send + Sync {
    fn snapshot(&self) -> ThresholdSnapshot;
}

impl ThresholdSource for ThresholdSnapshot {
    fn snapshot(&self) -> ThresholdSnapshot {
        *self
    }
}

/// Thresholds shared between the session manager and the web interface, which
/// may replace them while a session is running.
#[derive(Debug, Clone)]
pub struct SharedThresholds {
    inner: Arc<RwLock<ThresholdSnapshot>>,
}

impl SharedThresholds {
    pub fn new(initial: ThresholdSnapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    /// Replaces the live thresholds after validating them.
    pub fn update(&self, thresholds: ThresholdSnapshot) -> Result<(), ConfigError> {
        thresholds.validate()?;
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = thresholds;
        info!(
            "Thresholds updated: light={} rh={} aq={} deviation={}%",
            thresholds.light_level_delta,
            thresholds.relative_humidity_delta,
            thresholds.air_quality_delta,
            thresholds.deviation_percent
        );
        Ok(())
    }
}

impl ThresholdSource for SharedThresholds {
    fn snapshot(&self) -> ThresholdSnapshot {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_is_visible_through_every_clone() {
        let shared = SharedThresholds::new(ThresholdSnapshot::default());
        let reader = shared.clone();
        let tighter = ThresholdSnapshot {
            light_level_delta: 1.0,
            ..Default::default()
        };
        shared.update(tighter).unwrap();
        assert_eq!(reader.snapshot(), tighter);
    }

    #[test]
    fn invalid_update_keeps_previous_values() {
        let shared = SharedThresholds::new(ThresholdSnapshot::default());
        let bad = ThresholdSnapshot {
            deviation_percent: -5.0,
            ..Default::default()
        };
        assert!(shared.update(bad).is_err());
        assert_eq!(shared.snapshot(), ThresholdSnapshot::default());
    }
}
