#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Surface scanning core (hardware-agnostic).
//!
//! Infers the shape and material of a target surface from repeated distance
//! readings. All hardware interactions go through the `surface_traits`
//! capability traits (`RangeSensor`, `Display`, `Buzzer`, `AbsorptionModel`).
//!
//! ## Pipeline
//!
//! - **Sampling**: a batch of raw reads becomes one stable reading (`sampler`)
//! - **Aggregation**: repeated stable readings form a scan series (`aggregator`)
//! - **Classification**: the series' sigma maps to shape and material labels
//!   through an injected `CalibrationTable` (`classify`)
//! - **Reporting**: average, sigma and labels in one result (`report`), plus
//!   color and temperature readings when an environment sensor is fitted
//!   (`environment`)
//! - **Notification**: display/buzzer updates off the request path (`notifier`)
//!
//! `Scanner` wires these together and holds the sensor lease for a scan.
//!
//! ## Example
//!
//! ```
//! use surface_core::{Scanner, mocks::{NullBuzzer, NullDisplay, SeqSensor}};
//! use surface_core::config::SamplingCfg;
//! use std::time::Duration;
//!
//! let sampling = SamplingCfg {
//!     sample_interval: Duration::ZERO,
//!     pacing: Duration::ZERO,
//!     ..SamplingCfg::default()
//! };
//! let scanner = Scanner::builder()
//!     .with_sensor(SeqSensor::new([10.0, 10.02, 9.98, 10.01]))
//!     .with_display(NullDisplay)
//!     .with_buzzer(NullBuzzer)
//!     .with_sampling(SamplingCfg { batch_size: 1, ..sampling })
//!     .build()
//!     .unwrap();
//! let result = scanner.scan(scanner.request(Some(4))).unwrap();
//! assert_eq!(result.shape.to_string(), "Flat Surface");
//! ```

pub mod aggregator;
pub mod calibration;
pub mod classify;
pub mod config;
pub mod conversions;
pub mod environment;
pub mod error;
pub mod hw_error;
pub mod lease;
pub mod mocks;
pub mod notifier;
pub mod report;
pub mod request;
pub mod sampler;
pub mod scanner;
pub mod stats;

pub use aggregator::{ScanAggregator, ScanSeries};
pub use calibration::{
    AbsorptionSuggestion, CalibrationError, CalibrationRun, ShapeThresholds, Suggestion,
};
pub use classify::{Classifier, MaterialLabel, ShapeLabel, ThresholdAbsorption};
pub use config::{CalibrationTable, NotifierCfg, SamplingCfg};
pub use environment::{EnvironmentReport, color_name, ultrasonic_speed};
pub use error::{BuildError, Result, SurfaceError};
pub use lease::{SensorLease, SharedSensor};
pub use notifier::{DisplayNotifier, Notification};
pub use report::{DisplaySummary, NOT_APPLICABLE, ReportBuilder, ScanResult};
pub use request::ScanRequest;
pub use sampler::{RangeSampler, StableReading};
pub use scanner::{Scanner, ScannerBuilder};
