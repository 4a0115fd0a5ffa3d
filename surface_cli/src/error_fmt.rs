//! Human-readable error descriptions and structured JSON error formatting.

use surface_core::calibration::CalibrationError;
use surface_core::error::{BuildError, SurfaceError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(se) = err.downcast_ref::<SurfaceError>() {
        return match se {
            SurfaceError::InsufficientData { valid, attempts } => format!(
                "What happened: Failed to get enough valid readings ({valid} of {attempts}).\nLikely causes: Nothing in range (2-400 cm), the object absorbs the echo completely, or the sensor is misaligned.\nHow to fix: Move the object 20-30 cm in front of the sensor and scan again."
            ),
            SurfaceError::HardwareFault(msg) => format!(
                "What happened: The ranging sensor failed ({msg}).\nLikely causes: Loose wiring, no power, or the sensor is disconnected.\nHow to fix: Check the sensor wiring and power, then run `surface self-check`."
            ),
            SurfaceError::Hardware(msg) => format!(
                "What happened: A peripheral driver reported an error ({msg}).\nLikely causes: Bus glitch or a driver that is not initialized.\nHow to fix: Re-run with --log-level=debug and check the wiring."
            ),
            SurfaceError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
            SurfaceError::State(msg) => format!(
                "What happened: Scanner is in an unusable state ({msg}).\nLikely causes: An earlier scan panicked.\nHow to fix: Restart the process."
            ),
        };
    }

    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingSensor | BuildError::MissingDisplay | BuildError::MissingBuzzer => format!(
                "What happened: Scanner could not be assembled ({be}).\nLikely causes: A peripheral failed to initialize.\nHow to fix: Check the [pins] section and hardware wiring."
            ),
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(ce) = err.downcast_ref::<CalibrationError>() {
        return match ce {
            CalibrationError::NoFlatSamples => "What happened: No flat-surface samples to derive thresholds from.\nLikely causes: The flat object produced no valid readings, or the CSV has no `flat` rows.\nHow to fix: Re-run `surface calibrate shape` with the flat object in range.".to_string(),
            CalibrationError::ZeroSigma(which) => format!(
                "What happened: The {which} sample has zero dispersion.\nLikely causes: Too few readings or a sensor that returns a constant value.\nHow to fix: Re-measure the {which} object with more readings."
            ),
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("open buzzer pin") {
        return "What happened: Failed to initialize the buzzer pin.\nLikely causes: Incorrect pin number or insufficient GPIO permissions.\nHow to fix: Fix pins.buzzer in the config; ensure the process has permission to access GPIO.".to_string();
    }

    if lower.contains("parse config") {
        let mut cause = String::new();
        if let Some(src) = err.source() {
            cause = format!(" ({src})");
        }
        return format!(
            "What happened: Configuration is invalid{cause}.\nLikely causes: Typos, wrong value types, or out-of-range values.\nHow to fix: Edit the TOML config and try again."
        );
    }

    // Calibration CSV header special-case
    if lower.contains("calibration csv must have headers") {
        return "Invalid headers in calibration CSV. Expected 'label,sigma'.".to_string();
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 3 insufficient data, 4 hardware fault, 1 otherwise.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<SurfaceError>() {
        Some(SurfaceError::InsufficientData { .. }) => 3,
        Some(SurfaceError::HardwareFault(_) | SurfaceError::Hardware(_)) => 4,
        _ => 1,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(se) = err.downcast_ref::<SurfaceError>() {
        return match se {
            SurfaceError::InsufficientData { .. } => "InsufficientData",
            SurfaceError::HardwareFault(_) => "HardwareFault",
            SurfaceError::Hardware(_) => "Hardware",
            SurfaceError::Config(_) => "Config",
            SurfaceError::State(_) => "State",
        };
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return "Build";
    }
    if err.downcast_ref::<CalibrationError>().is_some() {
        return "Calibration";
    }
    "Error"
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let msg = humanize(err);
    if let Some(SurfaceError::InsufficientData { valid, attempts }) =
        err.downcast_ref::<SurfaceError>()
    {
        return json!({
            "reason": reason_name(err),
            "error": "Failed to get enough valid readings.",
            "details": { "valid": valid, "attempts": attempts },
            "message": msg,
        })
        .to_string();
    }
    json!({ "reason": reason_name(err), "message": msg }).to_string()
}
