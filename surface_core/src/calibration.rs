//! Offline calibration: measuring reference objects and deriving thresholds.
//!
//! A shape run collects per-reading dispersions for one object; a material
//! run reduces one flat object to a single overall sigma. The suggestion
//! functions turn labelled sample sets into a `CalibrationTable`.
use std::time::Duration;

use surface_config::CalibrationSamples;
use surface_traits::RangeSensor;
use surface_traits::clock::Clock;
use thiserror::Error;

use crate::config::CalibrationTable;
use crate::error::{Result, SurfaceError};
use crate::sampler::RangeSampler;
use crate::stats::{round_to, sample_std_dev};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CalibrationError {
    #[error("no flat-surface samples; measure at least one flat object")]
    NoFlatSamples,
    #[error("{0} sigma is zero; re-measure that object")]
    ZeroSigma(&'static str),
}

/// Parameters of one calibration pass over a single object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationRun {
    /// Stable readings taken.
    pub readings: u32,
    /// Raw reads per stable reading.
    pub batch_size: usize,
    /// Pause between stable readings.
    pub pacing: Duration,
}

impl CalibrationRun {
    /// Many short batches; each batch's dispersion is one shape sample.
    pub fn shape() -> Self {
        Self {
            readings: 50,
            batch_size: 2,
            pacing: Duration::from_millis(100),
        }
    }

    /// Full batches; the spread of their means is the material sample.
    pub fn material() -> Self {
        Self {
            readings: 50,
            batch_size: 10,
            pacing: Duration::from_millis(50),
        }
    }

    pub fn with_readings(mut self, readings: u32) -> Self {
        self.readings = readings;
        self
    }

    fn means_and_dispersions<S, C, K>(
        &self,
        sampler: &RangeSampler<C>,
        clock: &K,
        sensor: &mut S,
    ) -> Result<Vec<(f64, f64)>>
    where
        S: RangeSensor + ?Sized,
        C: Clock,
        K: Clock + ?Sized,
    {
        let mut out = Vec::with_capacity(self.readings as usize);
        for i in 0..self.readings {
            if i > 0 {
                clock.sleep(self.pacing);
            }
            let r = sampler.sample(sensor, self.batch_size)?;
            if r.is_valid() {
                out.push((r.mean, r.dispersion));
            } else {
                tracing::debug!(reading = i + 1, "calibration reading skipped (no data)");
            }
        }
        Ok(out)
    }

    /// Dispersion of every valid stable reading.
    pub fn collect_dispersions<S, C, K>(
        &self,
        sampler: &RangeSampler<C>,
        clock: &K,
        sensor: &mut S,
    ) -> Result<Vec<f64>>
    where
        S: RangeSensor + ?Sized,
        C: Clock,
        K: Clock + ?Sized,
    {
        let sigmas: Vec<f64> = self
            .means_and_dispersions(sampler, clock, sensor)?
            .into_iter()
            .map(|(_, d)| d)
            .collect();
        tracing::info!(samples = sigmas.len(), "shape calibration run complete");
        Ok(sigmas)
    }

    /// Sample standard deviation of the valid means, rounded to 3 dp.
    pub fn overall_sigma<S, C, K>(
        &self,
        sampler: &RangeSampler<C>,
        clock: &K,
        sensor: &mut S,
    ) -> Result<f64>
    where
        S: RangeSensor + ?Sized,
        C: Clock,
        K: Clock + ?Sized,
    {
        let means: Vec<f64> = self
            .means_and_dispersions(sampler, clock, sensor)?
            .into_iter()
            .map(|(m, _)| m)
            .collect();
        let Some(sigma) = sample_std_dev(&means) else {
            return Err(eyre::Report::new(SurfaceError::InsufficientData {
                valid: means.len(),
                attempts: self.readings,
            }));
        };
        let sigma = round_to(sigma, 3);
        tracing::info!(valid = means.len(), sigma_cm = sigma, "material calibration run complete");
        Ok(sigma)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeThresholds {
    pub flat_max_sigma: f64,
    pub slightly_curved_max_sigma: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbsorptionSuggestion {
    pub threshold: f64,
    /// The reflective sample was not less dispersed than the absorbent one;
    /// the threshold is unlikely to separate them.
    pub inverted: bool,
}

fn max_of(xs: &[f64]) -> Option<f64> {
    xs.iter().copied().reduce(f64::max)
}

fn min_of(xs: &[f64]) -> Option<f64> {
    xs.iter().copied().reduce(f64::min)
}

/// Midpoints between neighbouring classes, extrapolating when a class is missing.
pub fn suggest_shape_thresholds(
    flat: &[f64],
    slightly_curved: &[f64],
    curved_irregular: &[f64],
) -> Result<ShapeThresholds> {
    let max_flat = max_of(flat).ok_or_else(|| eyre::Report::new(CalibrationError::NoFlatSamples))?;

    let (t1, t2) = match (max_of(slightly_curved), min_of(slightly_curved)) {
        (Some(max_slight), Some(min_slight)) => {
            let t1 = round_to((max_flat + min_slight) / 2.0, 2);
            let t2 = match min_of(curved_irregular) {
                Some(min_irr) => round_to((max_slight + min_irr) / 2.0, 2),
                None => round_to(max_slight * 2.5, 2),
            };
            (t1, t2)
        }
        _ => {
            let t1 = round_to(max_flat * 2.5, 2);
            (t1, round_to(t1 * 3.0, 2))
        }
    };
    if t1 >= t2 {
        tracing::warn!(t1, t2, "suggested shape thresholds overlap; samples are not separable");
    }
    Ok(ShapeThresholds {
        flat_max_sigma: t1,
        slightly_curved_max_sigma: t2,
    })
}

/// Midpoint between the reflective and absorbent overall sigmas.
pub fn suggest_absorption_threshold(reflective: f64, absorbent: f64) -> Result<AbsorptionSuggestion> {
    if reflective == 0.0 {
        return Err(eyre::Report::new(CalibrationError::ZeroSigma("reflective")));
    }
    if absorbent == 0.0 {
        return Err(eyre::Report::new(CalibrationError::ZeroSigma("absorbent")));
    }
    let inverted = reflective >= absorbent;
    if inverted {
        tracing::warn!(
            reflective,
            absorbent,
            "reflective sample is as dispersed as the absorbent one"
        );
    }
    Ok(AbsorptionSuggestion {
        threshold: round_to((reflective + absorbent) / 2.0, 3),
        inverted,
    })
}

/// Everything a sample set supports, applied over `base`.
///
/// Shape thresholds need flat samples; the absorption threshold needs both a
/// reflective and an absorbent sample (the latest of each is used). Parts the
/// samples cannot support keep their `base` value.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub table: CalibrationTable,
    pub shape: Option<ShapeThresholds>,
    pub absorption: Option<AbsorptionSuggestion>,
}

pub fn suggest_from_samples(
    samples: &CalibrationSamples,
    base: CalibrationTable,
) -> Result<Suggestion> {
    let shape = if samples.flat.is_empty() {
        None
    } else {
        Some(suggest_shape_thresholds(
            &samples.flat,
            &samples.slightly_curved,
            &samples.curved_irregular,
        )?)
    };
    let absorption = match (samples.reflective.last(), samples.absorbent.last()) {
        (Some(&r), Some(&a)) => Some(suggest_absorption_threshold(r, a)?),
        _ => None,
    };
    if shape.is_none() && absorption.is_none() {
        return Err(eyre::Report::new(CalibrationError::NoFlatSamples));
    }

    let mut table = base;
    if let Some(s) = shape {
        table.flat_max_sigma = s.flat_max_sigma;
        table.slightly_curved_max_sigma = s.slightly_curved_max_sigma;
    }
    if let Some(a) = absorption {
        table.absorption_threshold = a.threshold;
    }
    Ok(Suggestion {
        table,
        shape,
        absorption,
    })
}
