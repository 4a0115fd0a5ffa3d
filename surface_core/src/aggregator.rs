//! Repeated stable readings collected into a scan series.
use std::time::Duration;

use surface_traits::RangeSensor;
use surface_traits::clock::Clock;

use crate::error::{Result, SurfaceError};
use crate::sampler::{RangeSampler, is_valid_distance};

/// Chronological sequence of finite, positive stable-reading means (cm).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanSeries {
    means: Vec<f64>,
}

impl ScanSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `mean` if it is a valid (finite, positive) reading; returns whether it was kept.
    pub fn push_valid(&mut self, mean: f64) -> bool {
        if is_valid_distance(mean) {
            self.means.push(mean);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.means.len()
    }

    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.means
    }

    /// `(1-based reading number, mean)` pairs in collection order.
    pub fn readings(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.means.iter().enumerate().map(|(i, &d)| (i + 1, d))
    }
}

impl FromIterator<f64> for ScanSeries {
    /// Collects only the finite, positive values.
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut s = ScanSeries::new();
        for v in iter {
            s.push_valid(v);
        }
        s
    }
}

pub struct ScanAggregator<C: Clock> {
    sampler: RangeSampler<C>,
    clock: C,
    batch_size: usize,
    pacing: Duration,
}

impl<C: Clock + Clone> ScanAggregator<C> {
    pub fn new(clock: C, batch_size: usize, sample_interval: Duration, pacing: Duration) -> Self {
        Self {
            sampler: RangeSampler::new(clock.clone(), sample_interval),
            clock,
            batch_size,
            pacing,
        }
    }
}

impl<C: Clock> ScanAggregator<C> {
    pub fn sampler(&self) -> &RangeSampler<C> {
        &self.sampler
    }

    /// Take exactly `repetitions` stable readings, keeping the valid means.
    ///
    /// Skipped readings are not retried, so the series may be shorter than
    /// `repetitions`. Fewer than two kept means is `InsufficientData`.
    pub fn aggregate<S: RangeSensor + ?Sized>(
        &self,
        sensor: &mut S,
        repetitions: u32,
    ) -> Result<ScanSeries> {
        let mut series = ScanSeries::new();
        for i in 0..repetitions {
            if i > 0 {
                self.clock.sleep(self.pacing);
            }
            let reading = self.sampler.sample(sensor, self.batch_size)?;
            if !series.push_valid(reading.mean) {
                tracing::debug!(repetition = i + 1, "stable reading skipped (no data)");
            }
        }

        if series.len() < 2 {
            tracing::warn!(
                valid = series.len(),
                attempts = repetitions,
                "scan collected too few valid readings"
            );
            return Err(eyre::Report::new(SurfaceError::InsufficientData {
                valid: series.len(),
                attempts: repetitions,
            }));
        }
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::SeqSensor;
    use surface_traits::ManualClock;

    const BATCH: usize = 3;

    fn aggregator(clock: &ManualClock) -> ScanAggregator<ManualClock> {
        ScanAggregator::new(
            clock.clone(),
            BATCH,
            Duration::ZERO,
            Duration::from_millis(50),
        )
    }

    #[test]
    fn collects_one_mean_per_repetition() {
        let clock = ManualClock::new();
        let mut sensor = SeqSensor::batches(&[10.0, 10.5, 11.0], BATCH);
        let series = aggregator(&clock).aggregate(&mut sensor, 3).unwrap();
        assert_eq!(series.as_slice(), &[10.0, 10.5, 11.0]);
        assert_eq!(sensor.reads(), 9);
    }

    #[test]
    fn empty_batches_are_skipped_not_retried() {
        let clock = ManualClock::new();
        let mut sensor = SeqSensor::batches(&[10.0, 0.0, 12.0, 0.0], BATCH);
        let series = aggregator(&clock).aggregate(&mut sensor, 4).unwrap();
        assert_eq!(series.as_slice(), &[10.0, 12.0]);
        assert_eq!(sensor.reads(), 4 * BATCH);
    }

    #[test]
    fn paces_between_readings_only() {
        let clock = ManualClock::new();
        let mut sensor = SeqSensor::batches(&[10.0; 5], BATCH);
        aggregator(&clock).aggregate(&mut sensor, 5).unwrap();
        let pauses = clock
            .sleeps()
            .into_iter()
            .filter(|d| *d == Duration::from_millis(50))
            .count();
        assert_eq!(pauses, 4);
    }

    #[test]
    fn one_valid_reading_is_insufficient() {
        let clock = ManualClock::new();
        let mut sensor = SeqSensor::batches(&[10.0, 0.0, 0.0], BATCH);
        let err = aggregator(&clock)
            .aggregate(&mut sensor, 3)
            .expect_err("insufficient");
        assert_eq!(
            err.downcast_ref::<SurfaceError>(),
            Some(&SurfaceError::InsufficientData {
                valid: 1,
                attempts: 3
            })
        );
    }

    #[test]
    fn zero_repetitions_is_insufficient() {
        let clock = ManualClock::new();
        let mut sensor = SeqSensor::new([10.0]);
        let err = aggregator(&clock)
            .aggregate(&mut sensor, 0)
            .expect_err("insufficient");
        assert!(matches!(
            err.downcast_ref::<SurfaceError>(),
            Some(SurfaceError::InsufficientData { valid: 0, .. })
        ));
        assert_eq!(sensor.reads(), 0);
    }

    #[test]
    fn series_from_iter_keeps_finite_positive_values() {
        let s: ScanSeries = [1.0, 0.0, -3.0, f64::INFINITY, f64::NAN, 2.0]
            .into_iter()
            .collect();
        assert_eq!(s.as_slice(), &[1.0, 2.0]);
        let numbered: Vec<_> = s.readings().collect();
        assert_eq!(numbered, vec![(1, 1.0), (2, 2.0)]);
    }
}
