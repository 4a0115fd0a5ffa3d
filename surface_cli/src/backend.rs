//! Config mapping and peripheral assembly.

use surface_core::error::SurfaceError;
use surface_core::{CalibrationTable, NotifierCfg, SamplingCfg, Scanner};
use surface_hardware::{
    SimulatedBuzzer, SimulatedDisplay, SimulatedEnvironment, SimulatedRangeSensor,
};
use surface_traits::Buzzer;

/// Read, parse and validate the config; defaults when no path is given.
pub fn load_config(path: Option<&std::path::Path>) -> eyre::Result<surface_config::Config> {
    use eyre::WrapErr;

    let Some(path) = path else {
        return Ok(surface_config::Config::default());
    };
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg = surface_config::load_toml(&text)
        .wrap_err_with(|| format!("parse config {}", path.display()))?;
    cfg.validate()
        .map_err(|e| eyre::Report::new(SurfaceError::Config(format!("{e:#}"))))?;
    Ok(cfg)
}

fn simulated_sensor(sim: &surface_config::Simulation) -> SimulatedRangeSensor {
    SimulatedRangeSensor::new(sim.distance_cm)
        .with_noise(sim.noise_cm)
        .with_dropout(sim.dropout_ratio)
        .with_seed(sim.seed)
}

#[cfg(feature = "hardware")]
fn make_buzzer(cfg: &surface_config::Config) -> eyre::Result<Box<dyn Buzzer + Send>> {
    match cfg.pins.buzzer {
        Some(pin) => {
            let b = surface_hardware::gpio_buzzer::GpioBuzzer::new(pin)
                .map_err(|e| eyre::eyre!("open buzzer pin {pin}: {e}"))?;
            tracing::info!(pin, "using GPIO buzzer");
            Ok(Box::new(b))
        }
        None => {
            tracing::warn!("pins.buzzer not set; buzzer is simulated");
            Ok(Box::new(SimulatedBuzzer::new()))
        }
    }
}

#[cfg(not(feature = "hardware"))]
fn make_buzzer(_cfg: &surface_config::Config) -> eyre::Result<Box<dyn Buzzer + Send>> {
    Ok(Box::new(SimulatedBuzzer::new()))
}

/// Assemble a scanner over the configured peripherals.
///
/// The ranging sensor, the display and the environment sensors are always
/// simulated; only the buzzer has a GPIO driver (feature `hardware`).
pub fn build_scanner(cfg: &surface_config::Config) -> eyre::Result<Scanner> {
    let sampling: SamplingCfg = (&cfg.sampling).into();
    let table: CalibrationTable = (&cfg.calibration).into();
    let notifier: NotifierCfg = (&cfg.notifier).into();

    let mut builder = Scanner::builder()
        .with_sensor(simulated_sensor(&cfg.simulation))
        .with_display(SimulatedDisplay::new())
        .with_buzzer(make_buzzer(cfg)?)
        .with_sampling(sampling)
        .with_calibration(table)
        .with_notifier(notifier);
    let sim = &cfg.simulation;
    if sim.environment {
        builder = builder.with_environment(SimulatedEnvironment::new(
            sim.ambient_c,
            sim.object_c,
            sim.color_rgb,
        ));
    }
    builder.build()
}
