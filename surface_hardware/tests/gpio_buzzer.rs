#![cfg(feature = "hardware")]

use std::time::Duration;

use surface_hardware::gpio_buzzer::GpioBuzzer;
use surface_traits::Buzzer;

// NOTE: Only meaningful on a Raspberry Pi with a buzzer on the configured pin.

#[test]
fn gpio_buzzer_beeps_or_reports_gpio_error() {
    let pin = 18u8; // adjust for your test rig
    match GpioBuzzer::new(pin) {
        Ok(mut b) => {
            b.beep(Duration::from_millis(5)).expect("beep");
        }
        Err(e) => {
            let msg = format!("{e}");
            assert!(msg.to_lowercase().contains("gpio"));
        }
    }
}
