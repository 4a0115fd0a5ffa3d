#[cfg(feature = "hardware")]
pub mod gpio_buzzer;

pub mod error;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use surface_traits::{Buzzer, Display, EnvironmentSensor, RangeSensor, Temperatures};

use crate::error::HwError;

/// Readings outside this open interval (cm) are reported as "no echo".
pub const MIN_RANGE_CM: f64 = 2.0;
pub const MAX_RANGE_CM: f64 = 400.0;

/// Simulated ranging sensor: a fixed target distance plus uniform noise.
///
/// A fraction of reads can be made to drop out (reported as 0.0, i.e. no
/// echo), and the sensor can be marked disconnected to exercise the fault
/// path.
pub struct SimulatedRangeSensor {
    distance_cm: f64,
    noise_cm: f64,
    dropout_ratio: f64,
    state: u64,
    disconnected: bool,
}

impl SimulatedRangeSensor {
    pub fn new(distance_cm: f64) -> Self {
        SimulatedRangeSensor {
            distance_cm,
            noise_cm: 0.0,
            dropout_ratio: 0.0,
            state: 0x9E37_79B9_7F4A_7C15,
            disconnected: false,
        }
    }

    /// Peak noise amplitude; each read is offset by a value in `[-noise, +noise]`.
    pub fn with_noise(mut self, noise_cm: f64) -> Self {
        self.noise_cm = noise_cm.abs();
        self
    }

    /// Fraction of reads (0.0..=1.0) that return no echo.
    pub fn with_dropout(mut self, ratio: f64) -> Self {
        self.dropout_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.state = seed.max(1);
        self
    }

    pub fn disconnected(mut self) -> Self {
        self.disconnected = true;
        self
    }

    // xorshift64*, uniform in [0, 1)
    fn next_unit(&mut self) -> f64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        let v = x.wrapping_mul(0x2545_F491_4F6C_DD1D);
        (v >> 11) as f64 / (1u64 << 53) as f64
    }
}

impl Default for SimulatedRangeSensor {
    fn default() -> Self {
        Self::new(25.0)
    }
}

impl RangeSensor for SimulatedRangeSensor {
    fn read_once(&mut self) -> Result<f64, Box<dyn std::error::Error + Send + Sync>> {
        if self.disconnected {
            return Err(Box::new(HwError::Disconnected));
        }
        if self.dropout_ratio > 0.0 && self.next_unit() < self.dropout_ratio {
            tracing::trace!("simulated echo dropout");
            return Ok(0.0);
        }
        let noise = (self.next_unit() * 2.0 - 1.0) * self.noise_cm;
        let d = self.distance_cm + noise;
        if d > MIN_RANGE_CM && d < MAX_RANGE_CM {
            Ok(d)
        } else {
            Ok(0.0)
        }
    }
}

/// One rendered display frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub primary: String,
    pub shape: String,
    pub material: String,
}

/// Display stand-in that logs each frame and keeps a shared history.
#[derive(Clone, Default)]
pub struct SimulatedDisplay {
    frames: Arc<Mutex<Vec<Frame>>>,
}

impl SimulatedDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames shown so far, oldest first.
    pub fn frames(&self) -> Vec<Frame> {
        self.frames.lock().map(|f| f.clone()).unwrap_or_default()
    }
}

impl Display for SimulatedDisplay {
    fn show(
        &mut self,
        primary: &str,
        shape: &str,
        material: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!(
            target: "display",
            dist = primary,
            shape,
            mat = material,
            "display (simulated)"
        );
        let mut frames = self
            .frames
            .lock()
            .map_err(|_| HwError::DisplayUnreachable("frame log poisoned".into()))?;
        frames.push(Frame {
            primary: primary.to_string(),
            shape: shape.to_string(),
            material: material.to_string(),
        });
        Ok(())
    }
}

/// Buzzer stand-in that counts beeps.
#[derive(Clone, Default)]
pub struct SimulatedBuzzer {
    beeps: Arc<AtomicUsize>,
}

impl SimulatedBuzzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn beeps(&self) -> usize {
        self.beeps.load(Ordering::Relaxed)
    }
}

impl Buzzer for SimulatedBuzzer {
    fn beep(&mut self, duration: Duration) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!(duration_ms = duration.as_millis() as u64, "beep (simulated)");
        self.beeps.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Thermometer and color sensor stand-in with fixed readings.
#[derive(Debug, Clone)]
pub struct SimulatedEnvironment {
    temperatures: Temperatures,
    rgb: [u8; 3],
    failing: bool,
}

impl SimulatedEnvironment {
    pub fn new(ambient_c: f64, object_c: f64, rgb: [u8; 3]) -> Self {
        Self {
            temperatures: Temperatures {
                ambient: ambient_c,
                object: object_c,
            },
            rgb,
            failing: false,
        }
    }

    /// Every read fails, as a sensor that dropped off the bus would.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }
}

impl EnvironmentSensor for SimulatedEnvironment {
    fn read_temperature(&mut self) -> Result<Temperatures, Box<dyn std::error::Error + Send + Sync>> {
        if self.failing {
            return Err(Box::new(HwError::EnvironmentUnavailable));
        }
        Ok(self.temperatures)
    }

    fn read_color(&mut self) -> Result<[u8; 3], Box<dyn std::error::Error + Send + Sync>> {
        if self.failing {
            return Err(Box::new(HwError::EnvironmentUnavailable));
        }
        Ok(self.rgb)
    }
}
