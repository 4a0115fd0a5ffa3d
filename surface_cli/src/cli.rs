//! CLI argument definitions and the output-mode flag.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "surface", version, about = "Surface shape and material scanner")]
pub struct Cli {
    /// Path to config TOML; built-in defaults when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print results and logs as JSON instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG takes precedence
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Take a full scan and classify the surface
    Scan {
        /// Stable readings to take; clamped to 1..=sampling.max_repetitions
        #[arg(long, value_name = "N", allow_negative_numbers = true)]
        repetitions: Option<i64>,
    },
    /// Take one stable distance reading and show it on the display
    Measure,
    /// Sound the buzzer once
    Beep,
    /// Measure reference objects and suggest calibration thresholds
    Calibrate {
        #[command(subcommand)]
        action: CalibrateCmd,
    },
    /// Quick health check: config, scanner assembly and one reading
    SelfCheck,
}

#[derive(Subcommand, Debug)]
pub enum CalibrateCmd {
    /// Flat, slightly curved and irregular objects; suggests shape thresholds
    Shape {
        /// Stable readings per object
        #[arg(long, value_name = "N", default_value_t = 50)]
        readings: u32,
        /// Also write the collected samples to this CSV
        #[arg(long, value_name = "FILE")]
        save: Option<PathBuf>,
    },
    /// Reflective and absorbent flat objects; suggests the absorption threshold
    Material {
        /// Stable readings per object
        #[arg(long, value_name = "N", default_value_t = 50)]
        readings: u32,
        /// Also write the collected samples to this CSV
        #[arg(long, value_name = "FILE")]
        save: Option<PathBuf>,
    },
    /// Suggest thresholds from a previously saved sample CSV
    Suggest {
        /// Calibration sample CSV (strict `label,sigma` header)
        #[arg(long, value_name = "FILE")]
        from: PathBuf,
    },
}
