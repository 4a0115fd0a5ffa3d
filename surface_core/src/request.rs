//! Scan requests as they arrive from a caller.

use crate::config::SamplingCfg;

/// A caller's scan request after clamping to `1..=max_repetitions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanRequest {
    repetitions: u32,
}

impl ScanRequest {
    /// Clamp a raw (possibly missing or negative) repetitions count.
    pub fn from_caller(requested: Option<i64>, cfg: &SamplingCfg) -> Self {
        let max = i64::from(cfg.max_repetitions.max(1));
        let r = requested
            .unwrap_or(i64::from(cfg.default_repetitions))
            .clamp(1, max);
        Self {
            repetitions: r as u32,
        }
    }

    pub fn repetitions(&self) -> u32 {
        self.repetitions
    }
}

impl Default for ScanRequest {
    fn default() -> Self {
        Self::from_caller(None, &SamplingCfg::default())
    }
}
