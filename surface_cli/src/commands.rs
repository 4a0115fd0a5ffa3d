//! Command execution and result rendering.

use std::io::BufRead;
use std::path::Path;
use std::time::Duration;

use serde_json::json;
use surface_config::{CalibrationSamples, SampleLabel};
use surface_core::calibration::{self, CalibrationRun, Suggestion};
use surface_core::{CalibrationTable, ScanResult, Scanner, StableReading};

/// Beep marking the end of each calibration object.
const OBJECT_DONE_BEEP: Duration = Duration::from_millis(200);

pub fn scan(scanner: &Scanner, repetitions: Option<i64>, json: bool) -> eyre::Result<()> {
    let result = scanner.scan(scanner.request(repetitions))?;
    print_scan(&result, json);
    Ok(())
}

fn print_scan(r: &ScanResult, json: bool) {
    if json {
        let scan_data: Vec<_> = r
            .series
            .readings()
            .map(|(i, d)| json!({ "reading": i, "distance": d }))
            .collect();
        let obj = json!({
            "scan_data": scan_data,
            "statistics": { "average": r.average, "sigma": r.sigma },
            "shape_analysis": r.shape.as_str(),
            "material_analysis": r.material.as_str(),
            "environment": {
                "color": r.environment.color,
                "temp_difference": r.environment.temp_difference,
                "ultrasonic_speed": r.environment.ultrasonic_speed,
            },
        });
        println!("{obj}");
        return;
    }
    for (i, d) in r.series.readings() {
        println!("Reading {i:>3}: {d:.2} cm");
    }
    println!("Average:  {} cm", r.average);
    println!("Sigma:    {} cm", r.sigma);
    println!("Shape:    {}", r.shape);
    println!("Material: {}", r.material);
    println!("Color:    {}", r.environment.color);
    println!("Temp diff: {} C", r.environment.temp_difference);
    println!("Sound:    {} m/s", r.environment.ultrasonic_speed);
}

pub fn measure(scanner: &Scanner, json: bool) -> eyre::Result<()> {
    let reading = scanner.check_distance()?;
    print_reading(&reading, json);
    Ok(())
}

fn print_reading(r: &StableReading, json: bool) {
    if json {
        println!("{}", json!({ "distance": r.mean, "sigma": r.dispersion }));
    } else if r.is_valid() {
        println!("Distance: {} cm (sigma {} cm)", r.mean, r.dispersion);
    } else {
        println!("Distance: no echo ({} reads)", r.attempted);
    }
}

pub fn beep(scanner: &Scanner, json: bool) {
    scanner.beep();
    if json {
        println!("{}", json!({ "status": "ok" }));
    } else {
        println!("ok");
    }
}

/// Config, assembly and one reading. A reading without echo is reported, not failed.
pub fn self_check(scanner: &Scanner, json: bool) -> eyre::Result<()> {
    let reading = scanner.check_distance()?;
    if json {
        println!(
            "{}",
            json!({ "status": "ok", "distance": reading.mean, "valid_reads": reading.valid })
        );
    } else {
        println!("OK");
        print_reading(&reading, false);
    }
    Ok(())
}

// ── Calibration ──────────────────────────────────────────────────────────────

fn label_name(label: SampleLabel) -> &'static str {
    match label {
        SampleLabel::Flat => "flat",
        SampleLabel::SlightlyCurved => "slightly curved",
        SampleLabel::CurvedIrregular => "curved/irregular",
        SampleLabel::Reflective => "reflective",
        SampleLabel::Absorbent => "absorbent",
    }
}

fn instructions(label: SampleLabel) -> &'static str {
    match label {
        SampleLabel::Flat => "Place a hard, flat object (a large book, a board) 20-30 cm from the sensor.",
        SampleLabel::SlightlyCurved => "Place a gently curved object (a large can, a bottle, a pipe) in front of the sensor.",
        SampleLabel::CurvedIrregular => "Place a strongly curved or irregular object (a ball, crumpled paper, a hand) in front of the sensor.",
        SampleLabel::Reflective => "Place a hard, flat, reflective object (a book, a tile) 20-30 cm from the sensor.",
        SampleLabel::Absorbent => "Place a flat, sound-absorbing object (a folded towel, foam, a sponge) at the same distance.",
    }
}

/// Prompts go to stderr so stdout stays clean for results. EOF continues.
fn wait_for_enter(label: SampleLabel) -> eyre::Result<()> {
    eprintln!("\n== {} object ==", label_name(label).to_uppercase());
    eprintln!("{}", instructions(label));
    eprintln!(">>> Press Enter when ready...");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(())
}

pub fn calibrate_shape(
    scanner: &Scanner,
    readings: u32,
    save: Option<&Path>,
    json: bool,
) -> eyre::Result<()> {
    let run = CalibrationRun::shape().with_readings(readings);
    let mut samples = CalibrationSamples::default();
    for label in [
        SampleLabel::Flat,
        SampleLabel::SlightlyCurved,
        SampleLabel::CurvedIrregular,
    ] {
        wait_for_enter(label)?;
        let sigmas = scanner.calibrate_shape(&run)?;
        scanner.beep_for(OBJECT_DONE_BEEP);
        eprintln!("{} valid readings", sigmas.len());
        for s in sigmas {
            samples.push(label, s);
        }
    }
    finish_calibration(scanner, &samples, save, json)
}

pub fn calibrate_material(
    scanner: &Scanner,
    readings: u32,
    save: Option<&Path>,
    json: bool,
) -> eyre::Result<()> {
    let run = CalibrationRun::material().with_readings(readings);
    let mut samples = CalibrationSamples::default();
    for label in [SampleLabel::Reflective, SampleLabel::Absorbent] {
        wait_for_enter(label)?;
        let sigma = scanner.calibrate_material(&run)?;
        scanner.beep_for(OBJECT_DONE_BEEP);
        eprintln!("overall sigma {sigma} cm");
        samples.push(label, sigma);
    }
    finish_calibration(scanner, &samples, save, json)
}

fn finish_calibration(
    scanner: &Scanner,
    samples: &CalibrationSamples,
    save: Option<&Path>,
    json: bool,
) -> eyre::Result<()> {
    if let Some(path) = save {
        surface_config::save_calibration_csv(path, samples)?;
        tracing::info!(path = %path.display(), "calibration samples saved");
    }
    let suggestion = calibration::suggest_from_samples(samples, *scanner.classifier().table())?;
    print_suggestion(&suggestion, json)
}

pub fn suggest(from: &Path, base: CalibrationTable, json: bool) -> eyre::Result<()> {
    let samples = surface_config::load_calibration_csv(from)?;
    let suggestion = calibration::suggest_from_samples(&samples, base)?;
    print_suggestion(&suggestion, json)
}

/// `[calibration]` section ready to paste into the config file.
fn calibration_toml(table: &CalibrationTable) -> eyre::Result<String> {
    let mut section = toml::Table::new();
    section.insert("flat_max_sigma".into(), table.flat_max_sigma.into());
    section.insert(
        "slightly_curved_max_sigma".into(),
        table.slightly_curved_max_sigma.into(),
    );
    section.insert(
        "absorption_threshold".into(),
        table.absorption_threshold.into(),
    );
    let mut doc = toml::Table::new();
    doc.insert("calibration".into(), toml::Value::Table(section));
    Ok(toml::to_string(&doc)?)
}

fn print_suggestion(s: &Suggestion, json: bool) -> eyre::Result<()> {
    let inverted = s.absorption.is_some_and(|a| a.inverted);
    if json {
        let obj = json!({
            "calibration": {
                "flat_max_sigma": s.table.flat_max_sigma,
                "slightly_curved_max_sigma": s.table.slightly_curved_max_sigma,
                "absorption_threshold": s.table.absorption_threshold,
            },
            "shape_suggested": s.shape.is_some(),
            "absorption_suggested": s.absorption.is_some(),
            "inverted_materials": inverted,
        });
        println!("{obj}");
        return Ok(());
    }
    if inverted {
        println!(
            "WARNING: the reflective object was at least as dispersed as the absorbent one; \
             re-check both objects before using this threshold."
        );
    }
    println!("Suggested calibration (paste into your config):\n");
    print!("{}", calibration_toml(&s.table)?);
    Ok(())
}
