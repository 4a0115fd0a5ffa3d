//! `From` implementations bridging `surface_config` types to `surface_core` types.

use std::time::Duration;

use crate::config::{CalibrationTable, NotifierCfg, SamplingCfg};

// ── SamplingCfg ──────────────────────────────────────────────────────────────

impl From<&surface_config::Sampling> for SamplingCfg {
    fn from(c: &surface_config::Sampling) -> Self {
        Self {
            batch_size: c.batch_size,
            sample_interval: Duration::from_millis(c.sample_interval_ms),
            pacing: Duration::from_millis(c.pacing_ms),
            default_repetitions: c.default_repetitions,
            max_repetitions: c.max_repetitions,
        }
    }
}

// ── CalibrationTable ─────────────────────────────────────────────────────────

impl From<&surface_config::CalibrationCfg> for CalibrationTable {
    fn from(c: &surface_config::CalibrationCfg) -> Self {
        Self {
            flat_max_sigma: c.flat_max_sigma,
            slightly_curved_max_sigma: c.slightly_curved_max_sigma,
            absorption_threshold: c.absorption_threshold,
        }
    }
}

// ── NotifierCfg ──────────────────────────────────────────────────────────────

impl From<&surface_config::Notifier> for NotifierCfg {
    fn from(c: &surface_config::Notifier) -> Self {
        Self {
            queue_capacity: c.queue_capacity,
            beep: Duration::from_millis(c.beep_ms),
        }
    }
}
