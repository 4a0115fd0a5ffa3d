//! Scan results and their compact display form.
use crate::aggregator::ScanSeries;
use crate::classify::{Classifier, MaterialLabel, ShapeLabel};
use crate::environment::EnvironmentReport;
use crate::error::{Result, SurfaceError};
use crate::stats::{mean, round_to, sample_std_dev};

/// Label shown on the display when a reading is not classified.
pub const NOT_APPLICABLE: &str = "N/A";

/// Distance line for the display; whole values keep one decimal ("10.0 cm").
fn distance_line(distance_cm: f64) -> String {
    format!("{distance_cm:?} cm")
}

/// Three display lines: distance, shape, material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySummary {
    pub primary: String,
    pub shape: String,
    pub material: String,
}

impl DisplaySummary {
    /// Summary for an unclassified single reading.
    pub fn single_reading(distance_cm: f64) -> Self {
        Self {
            primary: distance_line(distance_cm),
            shape: NOT_APPLICABLE.to_string(),
            material: NOT_APPLICABLE.to_string(),
        }
    }
}

/// Outcome of one scan. `average` and `sigma` are rounded for presentation
/// (2 and 3 decimal places); labels were derived from `exact_sigma`.
/// `environment` holds the no-sensor fallback until a sensor reading replaces it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    pub series: ScanSeries,
    pub average: f64,
    pub sigma: f64,
    pub exact_sigma: f64,
    pub shape: ShapeLabel,
    pub material: MaterialLabel,
    pub environment: EnvironmentReport,
}

impl ScanResult {
    pub fn display_summary(&self) -> DisplaySummary {
        DisplaySummary {
            primary: distance_line(self.average),
            shape: self.shape.to_string(),
            material: self.material.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    classifier: Classifier,
}

impl ReportBuilder {
    pub fn new(classifier: Classifier) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Reduce a series to a classified result; needs at least two entries.
    pub fn build(&self, series: ScanSeries) -> Result<ScanResult> {
        let xs = series.as_slice();
        let (Some(avg), Some(exact_sigma)) = (mean(xs), sample_std_dev(xs)) else {
            return Err(eyre::Report::new(SurfaceError::InsufficientData {
                valid: series.len(),
                attempts: series.len() as u32,
            }));
        };

        // Classify on the unrounded sigma; rounding can push a value across a band edge.
        let shape = self.classifier.classify_shape(exact_sigma);
        let material = self.classifier.classify_material(exact_sigma);

        Ok(ScanResult {
            average: round_to(avg, 2),
            sigma: round_to(exact_sigma, 3),
            exact_sigma,
            shape,
            material,
            series,
            environment: EnvironmentReport::unavailable(),
        })
    }
}
