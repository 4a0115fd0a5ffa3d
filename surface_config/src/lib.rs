#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and calibration-sample files for the surface scanner.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Calibration sample CSVs hold the per-object sigmas recorded by the
//!   calibration utility, so thresholds can be re-derived offline.
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Pins {
    /// Buzzer GPIO (BCM numbering); only used by the `hardware` backend
    pub buzzer: Option<u8>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Sampling {
    /// Raw reads per stable reading
    pub batch_size: usize,
    /// Settle time before each raw read (ms)
    pub sample_interval_ms: u64,
    /// Delay between successive stable readings of a scan (ms)
    pub pacing_ms: u64,
    /// Repetitions used when a scan request does not specify one
    pub default_repetitions: u32,
    /// Upper clamp for requested repetitions
    pub max_repetitions: u32,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            batch_size: 10,
            sample_interval_ms: 10,
            pacing_ms: 50,
            default_repetitions: 20,
            max_repetitions: 100,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct CalibrationCfg {
    /// sigma below this is a flat surface (cm)
    pub flat_max_sigma: f64,
    /// sigma below this (and >= flat_max_sigma) is slightly curved (cm)
    pub slightly_curved_max_sigma: f64,
    /// sigma above this suggests an absorbing material (cm)
    pub absorption_threshold: f64,
}

impl Default for CalibrationCfg {
    fn default() -> Self {
        Self {
            flat_max_sigma: 0.175,
            slightly_curved_max_sigma: 0.204,
            absorption_threshold: 0.096,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Notifier {
    /// Pending display/buzzer updates kept before new ones are dropped
    pub queue_capacity: usize,
    /// Buzzer on-time for the standalone beep (ms)
    pub beep_ms: u64,
}

impl Default for Notifier {
    fn default() -> Self {
        Self {
            queue_capacity: 4,
            beep_ms: 50,
        }
    }
}

/// Knobs for the simulated sensor backend.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Simulation {
    pub distance_cm: f64,
    pub noise_cm: f64,
    /// Fraction of raw reads that return no echo
    pub dropout_ratio: f64,
    pub seed: u64,
    /// Fit a simulated thermometer and color sensor
    pub environment: bool,
    pub ambient_c: f64,
    pub object_c: f64,
    /// `[r, g, b]`, 0-255 each
    pub color_rgb: [u8; 3],
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            distance_cm: 25.0,
            noise_cm: 0.05,
            dropout_ratio: 0.0,
            seed: 1,
            environment: true,
            ambient_c: 22.0,
            object_c: 22.0,
            color_rgb: [220, 220, 220],
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub pins: Pins,
    pub sampling: Sampling,
    pub calibration: CalibrationCfg,
    pub notifier: Notifier,
    pub simulation: Simulation,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Sampling
        if self.sampling.batch_size == 0 {
            eyre::bail!("sampling.batch_size must be >= 1");
        }
        if self.sampling.max_repetitions == 0 {
            eyre::bail!("sampling.max_repetitions must be >= 1");
        }
        if self.sampling.max_repetitions > 1000 {
            eyre::bail!("sampling.max_repetitions is unreasonably large (>1000)");
        }
        if self.sampling.default_repetitions == 0
            || self.sampling.default_repetitions > self.sampling.max_repetitions
        {
            eyre::bail!("sampling.default_repetitions must be in [1, max_repetitions]");
        }
        if self.sampling.pacing_ms > 10_000 {
            eyre::bail!("sampling.pacing_ms is unreasonably large (>10s)");
        }

        // Calibration
        let c = &self.calibration;
        for (name, v) in [
            ("calibration.flat_max_sigma", c.flat_max_sigma),
            (
                "calibration.slightly_curved_max_sigma",
                c.slightly_curved_max_sigma,
            ),
            ("calibration.absorption_threshold", c.absorption_threshold),
        ] {
            if !v.is_finite() || v <= 0.0 {
                eyre::bail!("{name} must be a finite value > 0");
            }
        }
        if c.flat_max_sigma >= c.slightly_curved_max_sigma {
            eyre::bail!("calibration.flat_max_sigma must be < calibration.slightly_curved_max_sigma");
        }

        // Notifier
        if self.notifier.queue_capacity == 0 {
            eyre::bail!("notifier.queue_capacity must be >= 1");
        }

        // Simulation
        if !(0.0..=1.0).contains(&self.simulation.dropout_ratio) {
            eyre::bail!("simulation.dropout_ratio must be in [0.0, 1.0]");
        }
        if !self.simulation.noise_cm.is_finite() || self.simulation.noise_cm < 0.0 {
            eyre::bail!("simulation.noise_cm must be >= 0");
        }
        if !self.simulation.distance_cm.is_finite() {
            eyre::bail!("simulation.distance_cm must be finite");
        }
        for (name, v) in [
            ("simulation.ambient_c", self.simulation.ambient_c),
            ("simulation.object_c", self.simulation.object_c),
        ] {
            if !v.is_finite() {
                eyre::bail!("{name} must be finite");
            }
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {r:?}");
        }

        Ok(())
    }
}

/// Object class a calibration sigma was recorded against.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SampleLabel {
    Flat,
    SlightlyCurved,
    CurvedIrregular,
    Reflective,
    Absorbent,
}

/// Calibration CSV schema.
///
/// Expected headers:
/// label,sigma
///
/// Example:
/// label,sigma
/// flat,0.08
/// slightly_curved,0.19
/// reflective,0.071
#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub struct CalibrationRow {
    pub label: SampleLabel,
    pub sigma: f64,
}

/// Sigmas grouped by object class.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CalibrationSamples {
    pub flat: Vec<f64>,
    pub slightly_curved: Vec<f64>,
    pub curved_irregular: Vec<f64>,
    pub reflective: Vec<f64>,
    pub absorbent: Vec<f64>,
}

impl CalibrationSamples {
    pub fn push(&mut self, label: SampleLabel, sigma: f64) {
        self.bucket_mut(label).push(sigma);
    }

    pub fn get(&self, label: SampleLabel) -> &[f64] {
        match label {
            SampleLabel::Flat => &self.flat,
            SampleLabel::SlightlyCurved => &self.slightly_curved,
            SampleLabel::CurvedIrregular => &self.curved_irregular,
            SampleLabel::Reflective => &self.reflective,
            SampleLabel::Absorbent => &self.absorbent,
        }
    }

    fn bucket_mut(&mut self, label: SampleLabel) -> &mut Vec<f64> {
        match label {
            SampleLabel::Flat => &mut self.flat,
            SampleLabel::SlightlyCurved => &mut self.slightly_curved,
            SampleLabel::CurvedIrregular => &mut self.curved_irregular,
            SampleLabel::Reflective => &mut self.reflective,
            SampleLabel::Absorbent => &mut self.absorbent,
        }
    }

    pub fn rows(&self) -> Vec<CalibrationRow> {
        [
            SampleLabel::Flat,
            SampleLabel::SlightlyCurved,
            SampleLabel::CurvedIrregular,
            SampleLabel::Reflective,
            SampleLabel::Absorbent,
        ]
        .into_iter()
        .flat_map(|label| {
            self.get(label)
                .iter()
                .map(move |&sigma| CalibrationRow { label, sigma })
        })
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }
}

impl TryFrom<Vec<CalibrationRow>> for CalibrationSamples {
    type Error = eyre::Report;
    fn try_from(rows: Vec<CalibrationRow>) -> Result<Self, Self::Error> {
        let mut out = CalibrationSamples::default();
        for (idx, row) in rows.into_iter().enumerate() {
            if !row.sigma.is_finite() || row.sigma < 0.0 {
                eyre::bail!("calibration row {} has invalid sigma {}", idx + 2, row.sigma);
            }
            out.push(row.label, row.sigma);
        }
        Ok(out)
    }
}

pub fn load_calibration_csv(path: &Path) -> eyre::Result<CalibrationSamples> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open calibration CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["label", "sigma"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "calibration CSV must have headers 'label,sigma', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<CalibrationRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }

    CalibrationSamples::try_from(rows)
}

/// Write samples as `label,sigma` CSV, replacing `path` atomically.
pub fn save_calibration_csv(path: &Path, samples: &CalibrationSamples) -> eyre::Result<()> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["label", "sigma"])?;
    for row in samples.rows() {
        wtr.serialize((row.label, row.sigma))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| eyre::eyre!("flush calibration CSV: {}", e))?;

    let tmp = path.with_extension("new");
    {
        let mut f = std::fs::File::create(&tmp)
            .map_err(|e| eyre::eyre!("create {:?}: {}", tmp, e))?;
        f.write_all(&bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(&tmp, path).map_err(|e| eyre::eyre!("replace {:?}: {}", path, e))?;
    Ok(())
}
