//! Runtime configuration types for the scanning core.
//!
//! These are separate from the TOML-deserialized config in `surface_config`;
//! see `conversions` for the mapping.

use std::time::Duration;

/// Sampling and pacing parameters.
#[derive(Debug, Clone)]
pub struct SamplingCfg {
    /// Raw reads per stable reading.
    pub batch_size: usize,
    /// Settle time before each raw read.
    pub sample_interval: Duration,
    /// Delay between successive stable readings of a scan.
    pub pacing: Duration,
    /// Repetitions used when a request does not name one.
    pub default_repetitions: u32,
    /// Requests are clamped to `1..=max_repetitions`.
    pub max_repetitions: u32,
}

impl Default for SamplingCfg {
    fn default() -> Self {
        Self {
            batch_size: 10,
            sample_interval: Duration::from_millis(10),
            pacing: Duration::from_millis(50),
            default_repetitions: 20,
            max_repetitions: 100,
        }
    }
}

/// Sigma thresholds translating dispersion into labels (cm).
///
/// Immutable once built; shared by every scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationTable {
    /// `sigma < flat_max_sigma` is a flat surface.
    pub flat_max_sigma: f64,
    /// `flat_max_sigma <= sigma < slightly_curved_max_sigma` is slightly curved.
    pub slightly_curved_max_sigma: f64,
    /// `sigma > absorption_threshold` suggests an absorbing material.
    pub absorption_threshold: f64,
}

impl Default for CalibrationTable {
    fn default() -> Self {
        Self {
            flat_max_sigma: 0.175,
            slightly_curved_max_sigma: 0.204,
            absorption_threshold: 0.096,
        }
    }
}

impl CalibrationTable {
    pub fn validate(&self) -> Result<(), &'static str> {
        let finite_pos = |v: f64| v.is_finite() && v > 0.0;
        if !finite_pos(self.flat_max_sigma) || !finite_pos(self.slightly_curved_max_sigma) {
            return Err("shape thresholds must be finite and > 0");
        }
        if self.flat_max_sigma >= self.slightly_curved_max_sigma {
            return Err("flat_max_sigma must be < slightly_curved_max_sigma");
        }
        if !finite_pos(self.absorption_threshold) {
            return Err("absorption_threshold must be finite and > 0");
        }
        Ok(())
    }
}

/// Display/buzzer side channel.
#[derive(Debug, Clone)]
pub struct NotifierCfg {
    /// Pending notifications kept before new ones are dropped.
    pub queue_capacity: usize,
    /// On-time of the standalone beep.
    pub beep: Duration,
}

impl Default for NotifierCfg {
    fn default() -> Self {
        Self {
            queue_capacity: 4,
            beep: Duration::from_millis(50),
        }
    }
}
