//! Test and helper doubles for surface_core

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A sensor that replays a fixed sequence of raw readings, then repeats the
/// last one. Optionally fails with a driver error after `n` reads.
pub struct SeqSensor {
    seq: Vec<f64>,
    idx: usize,
    reads: Arc<AtomicUsize>,
    fail_after: Option<usize>,
}

impl SeqSensor {
    pub fn new(seq: impl Into<Vec<f64>>) -> Self {
        Self {
            seq: seq.into(),
            idx: 0,
            reads: Arc::new(AtomicUsize::new(0)),
            fail_after: None,
        }
    }

    /// Each value repeated `batch` times: one stable reading per value when
    /// sampled with the same batch size.
    pub fn batches(means: &[f64], batch: usize) -> Self {
        let seq: Vec<f64> = means
            .iter()
            .flat_map(|&m| std::iter::repeat_n(m, batch))
            .collect();
        Self::new(seq)
    }

    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    /// Raw reads taken so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    /// Shared read counter that stays valid after the sensor is moved.
    pub fn read_counter(&self) -> Arc<AtomicUsize> {
        self.reads.clone()
    }
}

impl surface_traits::RangeSensor for SeqSensor {
    fn read_once(&mut self) -> Result<f64, Box<dyn std::error::Error + Send + Sync>> {
        let n = self.reads.fetch_add(1, Ordering::Relaxed);
        if let Some(limit) = self.fail_after
            && n >= limit
        {
            return Err("sensor bus error".into());
        }
        let v = if self.idx < self.seq.len() {
            let x = self.seq[self.idx];
            self.idx += 1;
            x
        } else {
            self.seq.last().copied().unwrap_or(0.0)
        };
        Ok(v)
    }
}

/// A display that accepts and discards every frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDisplay;

impl surface_traits::Display for NullDisplay {
    fn show(
        &mut self,
        _primary: &str,
        _shape: &str,
        _material: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}

/// A buzzer that stays silent.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBuzzer;

impl surface_traits::Buzzer for NullBuzzer {
    fn beep(
        &mut self,
        _duration: std::time::Duration,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}
