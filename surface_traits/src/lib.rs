//! Capability traits the scanning core calls into.
//!
//! Drivers for the ranging sensor, the display, the buzzer and the optional
//! environment sensors live outside the core; they only need to implement
//! these traits.
pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// A distance-ranging sensor (ultrasonic echo or similar).
pub trait RangeSensor {
    /// Take one raw distance reading in centimeters.
    ///
    /// A value `<= 0.0` or a non-finite value means the sensor produced no
    /// usable echo (timeout or out of range). `Err` is reserved for
    /// driver-level failures.
    fn read_once(&mut self) -> Result<f64, Box<dyn std::error::Error + Send + Sync>>;
}

/// A small text display with three lines.
pub trait Display {
    fn show(
        &mut self,
        primary: &str,
        shape: &str,
        material: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

pub trait Buzzer {
    fn beep(
        &mut self,
        duration: std::time::Duration,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Ambient and target-surface temperatures in degrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Temperatures {
    pub ambient: f64,
    pub object: f64,
}

/// Auxiliary sensors read once per scan: an IR thermometer and an RGB
/// color sensor. Scans work without one.
pub trait EnvironmentSensor {
    fn read_temperature(&mut self) -> Result<Temperatures, Box<dyn std::error::Error + Send + Sync>>;

    /// Raw `[r, g, b]` channel levels, 0-255 each.
    fn read_color(&mut self) -> Result<[u8; 3], Box<dyn std::error::Error + Send + Sync>>;
}

/// Coarse absorption strength of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsorptionLevel {
    High,
    Low,
}

/// Physical-layer calibration mapping dispersion to absorption strength.
pub trait AbsorptionModel {
    fn absorption_level(&self, sigma: f64) -> AbsorptionLevel;
}

impl<T: RangeSensor + ?Sized> RangeSensor for Box<T> {
    fn read_once(&mut self) -> Result<f64, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read_once()
    }
}

impl<T: Display + ?Sized> Display for Box<T> {
    fn show(
        &mut self,
        primary: &str,
        shape: &str,
        material: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).show(primary, shape, material)
    }
}

impl<T: Buzzer + ?Sized> Buzzer for Box<T> {
    fn beep(
        &mut self,
        duration: std::time::Duration,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).beep(duration)
    }
}

impl<T: EnvironmentSensor + ?Sized> EnvironmentSensor for Box<T> {
    fn read_temperature(&mut self) -> Result<Temperatures, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read_temperature()
    }

    fn read_color(&mut self) -> Result<[u8; 3], Box<dyn std::error::Error + Send + Sync>> {
        (**self).read_color()
    }
}
