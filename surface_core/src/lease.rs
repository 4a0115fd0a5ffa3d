//! Exclusive, scoped access to the ranging sensor.
//!
//! The sensor channel is not reentrant: two scans must never interleave
//! their raw reads. A `SensorLease` is held for a whole scan, so concurrent
//! callers queue on the mutex instead.
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard};

use surface_traits::RangeSensor;

use crate::error::{Result, SurfaceError};

type BoxedSensor = Box<dyn RangeSensor + Send>;

#[derive(Clone)]
pub struct SharedSensor {
    inner: Arc<Mutex<BoxedSensor>>,
}

impl SharedSensor {
    pub fn new(sensor: impl RangeSensor + Send + 'static) -> Self {
        Self::from_boxed(Box::new(sensor))
    }

    pub fn from_boxed(sensor: BoxedSensor) -> Self {
        Self {
            inner: Arc::new(Mutex::new(sensor)),
        }
    }

    /// Block until the sensor is free, then hold it until the lease drops.
    pub fn lease(&self) -> Result<SensorLease<'_>> {
        let guard = self.inner.lock().map_err(|_| {
            eyre::Report::new(SurfaceError::State(
                "ranging sensor lock poisoned by a panicked scan".into(),
            ))
        })?;
        Ok(SensorLease { guard })
    }
}

pub struct SensorLease<'a> {
    guard: MutexGuard<'a, BoxedSensor>,
}

impl Deref for SensorLease<'_> {
    type Target = dyn RangeSensor + Send;

    fn deref(&self) -> &Self::Target {
        &**self.guard
    }
}

impl DerefMut for SensorLease<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut **self.guard
    }
}
