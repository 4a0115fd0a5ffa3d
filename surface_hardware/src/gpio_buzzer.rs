use std::time::Duration;
use tracing::trace;

use rppal::gpio::{Gpio, OutputPin};

use crate::error::{HwError, Result};

/// Active buzzer driven high for the duration of a beep.
pub struct GpioBuzzer {
    pin: OutputPin,
}

impl GpioBuzzer {
    pub fn new(pin: u8) -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let mut pin = gpio
            .get(pin)
            .map_err(|e| HwError::Gpio(e.to_string()))?
            .into_output();
        pin.set_low(); // idle silent
        Ok(Self { pin })
    }

    pub fn pulse(&mut self, on_time: Duration) {
        self.pin.set_high();
        std::thread::sleep(on_time);
        self.pin.set_low();
        trace!(on_ms = on_time.as_millis() as u64, "buzzer pulse");
    }
}

impl surface_traits::Buzzer for GpioBuzzer {
    fn beep(
        &mut self,
        duration: Duration,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.pulse(duration);
        Ok(())
    }
}
