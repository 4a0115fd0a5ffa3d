//! Request-level orchestration: scan, single check, beep.
//!
//! `Scanner` ties the sensor lease, aggregation, reporting and the display
//! side channel together. It is `Send + Sync`; share it through an `Arc`
//! when requests arrive concurrently.
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use surface_traits::clock::{Clock, MonotonicClock};
use surface_traits::{AbsorptionModel, Buzzer, Display, EnvironmentSensor, RangeSensor};

use crate::aggregator::ScanAggregator;
use crate::calibration::CalibrationRun;
use crate::classify::Classifier;
use crate::config::{CalibrationTable, NotifierCfg, SamplingCfg};
use crate::environment::EnvironmentReport;
use crate::error::{BuildError, Result, SurfaceError};
use crate::lease::SharedSensor;
use crate::notifier::DisplayNotifier;
use crate::report::{DisplaySummary, ReportBuilder, ScanResult};
use crate::request::ScanRequest;
use crate::sampler::StableReading;

type SharedClock = Arc<dyn Clock + Send + Sync>;
type BoxedEnvironment = Box<dyn EnvironmentSensor + Send>;

pub struct Scanner {
    sensor: SharedSensor,
    environment: Option<Mutex<BoxedEnvironment>>,
    aggregator: ScanAggregator<SharedClock>,
    reports: ReportBuilder,
    notifier: DisplayNotifier,
    sampling: SamplingCfg,
    beep: Duration,
    clock: SharedClock,
}

impl core::fmt::Debug for Scanner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Scanner")
            .field("sampling", &self.sampling)
            .field("calibration", self.reports.classifier().table())
            .field("beep", &self.beep)
            .field("environment", &self.environment.is_some())
            .finish_non_exhaustive()
    }
}

impl Scanner {
    /// Start building a Scanner.
    pub fn builder() -> ScannerBuilder<Missing, Missing, Missing> {
        ScannerBuilder::default()
    }

    /// Clamp a caller's repetitions count against this scanner's config.
    pub fn request(&self, repetitions: Option<i64>) -> ScanRequest {
        ScanRequest::from_caller(repetitions, &self.sampling)
    }

    /// Run a full scan and classify it.
    ///
    /// The sensor is leased for the whole aggregation. The display update is
    /// queued after the result is computed and may land after this returns.
    /// Environment sensors are read once, after the ranging sensor is released.
    pub fn scan(&self, request: ScanRequest) -> Result<ScanResult> {
        let repetitions = request.repetitions();
        tracing::info!(repetitions, "scan start");
        let series = {
            let mut lease = self.sensor.lease()?;
            self.aggregator.aggregate(&mut *lease, repetitions)?
        };
        let mut result = self.reports.build(series)?;
        result.environment = self.read_environment()?;
        tracing::info!(
            valid = result.series.len(),
            average_cm = result.average,
            sigma_cm = result.sigma,
            shape = %result.shape,
            material = %result.material,
            color = %result.environment.color,
            "scan complete"
        );
        self.notifier.notify(result.display_summary());
        Ok(result)
    }

    fn read_environment(&self) -> Result<EnvironmentReport> {
        let Some(env) = &self.environment else {
            return Ok(EnvironmentReport::unavailable());
        };
        let mut env = env.lock().map_err(|_| {
            eyre::Report::new(SurfaceError::State(
                "environment sensor lock poisoned".into(),
            ))
        })?;
        Ok(EnvironmentReport::read(&mut **env))
    }

    /// One stable reading, pushed to the display without classification.
    ///
    /// Mean and dispersion are rounded to 2 decimal places.
    pub fn check_distance(&self) -> Result<StableReading> {
        let reading = {
            let mut lease = self.sensor.lease()?;
            self.aggregator
                .sampler()
                .sample(&mut *lease, self.sampling.batch_size)?
        }
        .rounded();
        tracing::info!(
            mean_cm = reading.mean,
            dispersion_cm = reading.dispersion,
            "distance check"
        );
        self.notifier
            .notify(DisplaySummary::single_reading(reading.mean));
        Ok(reading)
    }

    /// Fire-and-forget beep of the configured length.
    pub fn beep(&self) {
        self.notifier.beep(self.beep);
    }

    pub fn beep_for(&self, duration: Duration) {
        self.notifier.beep(duration);
    }

    /// Per-reading dispersions for one object (shape calibration).
    pub fn calibrate_shape(&self, run: &CalibrationRun) -> Result<Vec<f64>> {
        let mut lease = self.sensor.lease()?;
        run.collect_dispersions(self.aggregator.sampler(), &self.clock, &mut *lease)
    }

    /// Overall sigma of stable means for one object (material calibration).
    pub fn calibrate_material(&self, run: &CalibrationRun) -> Result<f64> {
        let mut lease = self.sensor.lease()?;
        run.overall_sigma(self.aggregator.sampler(), &self.clock, &mut *lease)
    }

    pub fn classifier(&self) -> &Classifier {
        self.reports.classifier()
    }

    pub fn sampling(&self) -> &SamplingCfg {
        &self.sampling
    }

    pub fn notifier(&self) -> &DisplayNotifier {
        &self.notifier
    }
}

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `Scanner`. Sensor, display and buzzer are required.
pub struct ScannerBuilder<S, D, B> {
    sensor: Option<Box<dyn RangeSensor + Send>>,
    display: Option<Box<dyn Display + Send>>,
    buzzer: Option<Box<dyn Buzzer + Send>>,
    environment: Option<BoxedEnvironment>,
    sampling: Option<SamplingCfg>,
    calibration: Option<CalibrationTable>,
    absorption: Option<Arc<dyn AbsorptionModel + Send + Sync>>,
    notifier: Option<NotifierCfg>,
    clock: Option<SharedClock>,
    _s: PhantomData<S>,
    _d: PhantomData<D>,
    _b: PhantomData<B>,
}

impl Default for ScannerBuilder<Missing, Missing, Missing> {
    fn default() -> Self {
        Self {
            sensor: None,
            display: None,
            buzzer: None,
            environment: None,
            sampling: None,
            calibration: None,
            absorption: None,
            notifier: None,
            clock: None,
            _s: PhantomData,
            _d: PhantomData,
            _b: PhantomData,
        }
    }
}

impl<S, D, B> ScannerBuilder<S, D, B> {
    /// Fallible build available in any type-state; returns detailed error for missing pieces.
    pub fn try_build(self) -> Result<Scanner> {
        let sensor = self
            .sensor
            .ok_or_else(|| eyre::Report::new(BuildError::MissingSensor))?;
        let display = self
            .display
            .ok_or_else(|| eyre::Report::new(BuildError::MissingDisplay))?;
        let buzzer = self
            .buzzer
            .ok_or_else(|| eyre::Report::new(BuildError::MissingBuzzer))?;

        let sampling = self.sampling.unwrap_or_default();
        let table = self.calibration.unwrap_or_default();
        let notifier_cfg = self.notifier.unwrap_or_default();

        // ── Validation ───────────────────────────────────────────────────────
        if sampling.batch_size == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "batch_size must be >= 1",
            )));
        }
        if sampling.max_repetitions == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "max_repetitions must be >= 1",
            )));
        }
        if notifier_cfg.queue_capacity == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "queue_capacity must be >= 1",
            )));
        }
        table
            .validate()
            .map_err(|msg| eyre::Report::new(BuildError::InvalidConfig(msg)))?;

        let clock: SharedClock = self
            .clock
            .unwrap_or_else(|| Arc::new(MonotonicClock::new()));
        let classifier = match self.absorption {
            Some(model) => Classifier::with_absorption(table, model),
            None => Classifier::new(table),
        };

        Ok(Scanner {
            sensor: SharedSensor::from_boxed(sensor),
            environment: self.environment.map(Mutex::new),
            aggregator: ScanAggregator::new(
                clock.clone(),
                sampling.batch_size,
                sampling.sample_interval,
                sampling.pacing,
            ),
            reports: ReportBuilder::new(classifier),
            notifier: DisplayNotifier::spawn(display, buzzer, notifier_cfg.queue_capacity),
            beep: notifier_cfg.beep,
            sampling,
            clock,
        })
    }

    pub fn with_sampling(mut self, sampling: SamplingCfg) -> Self {
        self.sampling = Some(sampling);
        self
    }
    pub fn with_calibration(mut self, table: CalibrationTable) -> Self {
        self.calibration = Some(table);
        self
    }
    /// Replace the default threshold absorption model.
    pub fn with_absorption(mut self, model: Arc<dyn AbsorptionModel + Send + Sync>) -> Self {
        self.absorption = Some(model);
        self
    }
    /// Optional thermometer and color sensor; scans report fallbacks without one.
    pub fn with_environment(mut self, sensor: impl EnvironmentSensor + Send + 'static) -> Self {
        self.environment = Some(Box::new(sensor));
        self
    }
    pub fn with_notifier(mut self, notifier: NotifierCfg) -> Self {
        self.notifier = Some(notifier);
        self
    }
    /// Provide a custom clock implementation; defaults to `MonotonicClock` when not provided.
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }

    fn retype<S2, D2, B2>(self) -> ScannerBuilder<S2, D2, B2> {
        ScannerBuilder {
            sensor: self.sensor,
            display: self.display,
            buzzer: self.buzzer,
            environment: self.environment,
            sampling: self.sampling,
            calibration: self.calibration,
            absorption: self.absorption,
            notifier: self.notifier,
            clock: self.clock,
            _s: PhantomData,
            _d: PhantomData,
            _b: PhantomData,
        }
    }
}

// Setters that advance type-state
impl<D, B> ScannerBuilder<Missing, D, B> {
    pub fn with_sensor(
        mut self,
        sensor: impl RangeSensor + Send + 'static,
    ) -> ScannerBuilder<Set, D, B> {
        self.sensor = Some(Box::new(sensor));
        self.retype()
    }
}

impl<S, B> ScannerBuilder<S, Missing, B> {
    pub fn with_display(
        mut self,
        display: impl Display + Send + 'static,
    ) -> ScannerBuilder<S, Set, B> {
        self.display = Some(Box::new(display));
        self.retype()
    }
}

impl<S, D> ScannerBuilder<S, D, Missing> {
    pub fn with_buzzer(mut self, buzzer: impl Buzzer + Send + 'static) -> ScannerBuilder<S, D, Set> {
        self.buzzer = Some(Box::new(buzzer));
        self.retype()
    }
}

impl ScannerBuilder<Set, Set, Set> {
    /// Validate and build the Scanner. Only available when sensor, display and buzzer are set.
    pub fn build(self) -> Result<Scanner> {
        self.try_build()
    }
}
