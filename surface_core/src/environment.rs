//! Environment block attached to each scan: surface color, temperature
//! difference between the surface and the air, and the speed of sound at the
//! ambient temperature.
use surface_traits::{EnvironmentSensor, Temperatures};

use crate::report::NOT_APPLICABLE;
use crate::stats::round_to;

/// Temperatures assumed when no thermometer is fitted.
pub const NO_SENSOR_TEMPERATURE_C: f64 = 25.0;

/// Color label used when the color sensor fails mid-read.
pub const COLOR_READ_ERROR: &str = "Error";

/// Coarse color name. Rules apply in order; the first match wins.
pub fn color_name([r, g, b]: [u8; 3]) -> &'static str {
    if r > 200 && g > 200 && b > 200 {
        "White"
    } else if r < 30 && g < 30 && b < 30 {
        "Black"
    } else if r > g && r > b {
        "Red"
    } else if g > r && g > b {
        "Green"
    } else if b > r && b > g {
        "Blue"
    } else if r > 100 && g > 100 && b < 50 {
        "Yellow"
    } else {
        "Unknown"
    }
}

/// Speed of sound in air (m/s) at `ambient_c`, to one decimal place.
pub fn ultrasonic_speed(ambient_c: f64) -> f64 {
    round_to(331.3 + 0.606 * ambient_c, 1)
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentReport {
    pub color: String,
    /// Object minus ambient temperature (°C), one decimal place.
    pub temp_difference: f64,
    pub ultrasonic_speed: f64,
}

impl EnvironmentReport {
    pub fn new(temperatures: Temperatures, color: &str) -> Self {
        let ambient = round_to(temperatures.ambient, 1);
        let object = round_to(temperatures.object, 1);
        Self {
            color: color.to_string(),
            temp_difference: round_to(object - ambient, 1),
            ultrasonic_speed: ultrasonic_speed(ambient),
        }
    }

    /// Report for a scanner without environment sensors.
    pub fn unavailable() -> Self {
        Self::new(
            Temperatures {
                ambient: NO_SENSOR_TEMPERATURE_C,
                object: NO_SENSOR_TEMPERATURE_C,
            },
            NOT_APPLICABLE,
        )
    }

    /// Read both sensors. Failures never abort a scan: a failed
    /// thermometer reads as 0 °C on both channels and a failed color read
    /// is labelled `"Error"`.
    pub fn read<E: EnvironmentSensor + ?Sized>(sensor: &mut E) -> Self {
        let temperatures = sensor.read_temperature().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "temperature read failed");
            Temperatures {
                ambient: 0.0,
                object: 0.0,
            }
        });
        let color = match sensor.read_color() {
            Ok(rgb) => color_name(rgb),
            Err(e) => {
                tracing::warn!(error = %e, "color read failed");
                COLOR_READ_ERROR
            }
        };
        Self::new(temperatures, color)
    }
}

impl Default for EnvironmentReport {
    fn default() -> Self {
        Self::unavailable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use surface_hardware::SimulatedEnvironment;

    #[rstest]
    #[case([255, 255, 255], "White")]
    #[case([201, 201, 201], "White")]
    #[case([29, 29, 29], "Black")]
    #[case([30, 30, 30], "Unknown")]
    #[case([200, 50, 40], "Red")]
    #[case([30, 180, 60], "Green")]
    #[case([20, 40, 220], "Blue")]
    #[case([150, 150, 20], "Yellow")]
    #[case([128, 128, 128], "Unknown")]
    #[case([201, 201, 200], "Unknown")]
    fn color_rules(#[case] rgb: [u8; 3], #[case] name: &str) {
        assert_eq!(color_name(rgb), name);
    }

    #[rstest]
    #[case(0.0, 331.3)]
    #[case(20.0, 343.4)]
    #[case(-10.0, 325.2)]
    fn speed_of_sound(#[case] ambient: f64, #[case] speed: f64) {
        assert_eq!(ultrasonic_speed(ambient), speed);
    }

    #[test]
    fn readings_are_rounded_before_the_difference() {
        let r = EnvironmentReport::new(
            Temperatures {
                ambient: 21.46,
                object: 23.04,
            },
            "Red",
        );
        assert_eq!(r.temp_difference, 1.5);
        assert_eq!(r.ultrasonic_speed, ultrasonic_speed(21.5));
        assert_eq!(r.color, "Red");
    }

    #[test]
    fn no_sensor_fallback() {
        let r = EnvironmentReport::unavailable();
        assert_eq!(r.color, NOT_APPLICABLE);
        assert_eq!(r.temp_difference, 0.0);
        assert_eq!(r.ultrasonic_speed, ultrasonic_speed(25.0));
        assert_eq!(r, EnvironmentReport::default());
    }

    #[test]
    fn failed_reads_fall_back() {
        let mut env = SimulatedEnvironment::new(20.0, 30.0, [250, 250, 250]).failing();
        let r = EnvironmentReport::read(&mut env);
        assert_eq!(r.color, COLOR_READ_ERROR);
        assert_eq!(r.temp_difference, 0.0);
        assert_eq!(r.ultrasonic_speed, 331.3);
    }

    #[test]
    fn working_sensor_is_summarized() {
        let mut env = SimulatedEnvironment::new(20.0, 22.5, [20, 40, 220]);
        let r = EnvironmentReport::read(&mut env);
        assert_eq!(r.color, "Blue");
        assert_eq!(r.temp_difference, 2.5);
        assert_eq!(r.ultrasonic_speed, 343.4);
    }
}
