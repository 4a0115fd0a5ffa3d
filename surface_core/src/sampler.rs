//! Stable readings from a noisy ranging sensor.
//!
//! A `RangeSampler` takes a fixed batch of raw reads, drops the invalid ones
//! (`<= 0`, i.e. no echo) and reduces the rest to a mean and a dispersion.
use std::time::Duration;

use surface_traits::RangeSensor;
use surface_traits::clock::Clock;

use crate::error::Result;
use crate::hw_error::map_hw_error;
use crate::stats::{mean, round_to, sample_std_dev};

/// One aggregated (mean, dispersion) pair over a batch of raw reads, in cm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StableReading {
    pub mean: f64,
    /// Sample standard deviation of the valid reads; 0 with fewer than two.
    pub dispersion: f64,
    /// Valid reads that contributed.
    pub valid: usize,
    /// Raw reads taken.
    pub attempted: usize,
}

impl StableReading {
    /// Sentinel for a batch without a single valid read.
    pub fn no_data(attempted: usize) -> Self {
        Self {
            mean: 0.0,
            dispersion: 0.0,
            valid: 0,
            attempted,
        }
    }

    /// A reading is usable only when its mean is finite and positive.
    #[inline]
    pub fn is_valid(&self) -> bool {
        is_valid_distance(self.mean)
    }

    /// Mean and dispersion rounded to 2 decimal places for presentation.
    pub fn rounded(&self) -> Self {
        Self {
            mean: round_to(self.mean, 2),
            dispersion: round_to(self.dispersion, 2),
            ..*self
        }
    }
}

/// Raw and aggregated distances count only when finite and positive.
#[inline]
pub fn is_valid_distance(d: f64) -> bool {
    d.is_finite() && d > 0.0
}

pub struct RangeSampler<C: Clock> {
    clock: C,
    sample_interval: Duration,
}

impl<C: Clock> RangeSampler<C> {
    pub fn new(clock: C, sample_interval: Duration) -> Self {
        Self {
            clock,
            sample_interval,
        }
    }

    /// Take `batch_size` raw reads (at least one) and reduce them.
    ///
    /// Invalid reads (non-finite or `<= 0`) are excluded; a batch without any valid read yields
    /// `StableReading::no_data`. Only a driver error aborts the batch.
    pub fn sample<S: RangeSensor + ?Sized>(
        &self,
        sensor: &mut S,
        batch_size: usize,
    ) -> Result<StableReading> {
        let n = batch_size.max(1);
        let mut valid = Vec::with_capacity(n);
        for _ in 0..n {
            self.clock.sleep(self.sample_interval);
            let d = sensor
                .read_once()
                .map_err(|e| eyre::Report::new(map_hw_error(&*e)))?;
            if is_valid_distance(d) {
                valid.push(d);
            } else {
                tracing::trace!(raw_cm = d, "invalid reading dropped");
            }
        }

        let Some(m) = mean(&valid) else {
            tracing::debug!(attempted = n, "no valid reading in batch");
            return Ok(StableReading::no_data(n));
        };
        let reading = StableReading {
            mean: m,
            dispersion: sample_std_dev(&valid).unwrap_or(0.0),
            valid: valid.len(),
            attempted: n,
        };
        tracing::debug!(
            mean_cm = reading.mean,
            dispersion_cm = reading.dispersion,
            valid = reading.valid,
            "stable reading"
        );
        Ok(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SurfaceError;
    use crate::mocks::SeqSensor;
    use surface_traits::ManualClock;

    fn sampler() -> (RangeSampler<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        (
            RangeSampler::new(clock.clone(), Duration::from_millis(10)),
            clock,
        )
    }

    #[test]
    fn mean_ignores_invalid_reads() {
        let (s, _) = sampler();
        let mut sensor = SeqSensor::new([10.0, 0.0, 12.0, -1.0, 11.0]);
        let r = s.sample(&mut sensor, 5).unwrap();
        assert_eq!(r.mean, 11.0);
        assert_eq!(r.valid, 3);
        assert_eq!(r.attempted, 5);
        assert!((r.dispersion - 1.0).abs() < 1e-12);
    }

    #[test]
    fn non_finite_reads_are_dropped() {
        let (s, _) = sampler();
        let mut sensor = SeqSensor::new([10.0, f64::INFINITY, 12.0, f64::NAN, f64::NEG_INFINITY]);
        let r = s.sample(&mut sensor, 5).unwrap();
        assert_eq!(r.mean, 11.0);
        assert_eq!(r.valid, 2);
        assert!(r.dispersion.is_finite());
    }

    #[test]
    fn all_invalid_is_sentinel() {
        let (s, _) = sampler();
        let mut sensor = SeqSensor::new([0.0, -2.0, 0.0]);
        let r = s.sample(&mut sensor, 3).unwrap();
        assert_eq!(r, StableReading::no_data(3));
        assert!(!r.is_valid());
    }

    #[test]
    fn single_valid_read_has_zero_dispersion() {
        let (s, _) = sampler();
        let mut sensor = SeqSensor::new([0.0, 9.5, 0.0]);
        let r = s.sample(&mut sensor, 3).unwrap();
        assert_eq!(r.mean, 9.5);
        assert_eq!(r.dispersion, 0.0);
    }

    #[test]
    fn settles_before_every_read() {
        let (s, clock) = sampler();
        let mut sensor = SeqSensor::new([5.0]);
        s.sample(&mut sensor, 4).unwrap();
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(10); 4]);
        assert_eq!(sensor.reads(), 4);
    }

    #[test]
    fn zero_batch_takes_one_read() {
        let (s, _) = sampler();
        let mut sensor = SeqSensor::new([7.0]);
        let r = s.sample(&mut sensor, 0).unwrap();
        assert_eq!(r.attempted, 1);
        assert_eq!(sensor.reads(), 1);
    }

    #[test]
    fn driver_failure_propagates() {
        let (s, _) = sampler();
        let mut sensor = SeqSensor::new([5.0]).failing_after(1);
        let err = s.sample(&mut sensor, 3).expect_err("driver failure");
        assert!(matches!(
            err.downcast_ref::<SurfaceError>(),
            Some(SurfaceError::Hardware(_))
        ));
    }

    #[test]
    fn rounded_for_presentation() {
        let r = StableReading {
            mean: 25.126,
            dispersion: 0.0449,
            valid: 10,
            attempted: 10,
        };
        let p = r.rounded();
        assert_eq!(p.mean, 25.13);
        assert_eq!(p.dispersion, 0.04);
        assert_eq!(p.valid, 10);
    }
}
