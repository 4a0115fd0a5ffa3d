#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! `surface` command-line front end.

mod backend;
mod cli;
mod commands;
mod error_fmt;
mod logging;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;

use crate::cli::{CalibrateCmd, Cli, Commands, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

/// `log_guard` is filled once logging is up so the caller can flush the file
/// sink after reporting a failure.
fn run(cli: Cli, log_guard: &mut Option<WorkerGuard>) -> eyre::Result<()> {
    let cfg = backend::load_config(cli.config.as_deref())?;
    *log_guard = logging::init(cli.json, cli.log_level.as_deref(), &cfg.logging)?;
    if !cli.json {
        let _ = color_eyre::install();
    }
    tracing::debug!(config = ?cli.config, "configuration loaded");

    if let Commands::Calibrate {
        action: CalibrateCmd::Suggest { from },
    } = &cli.cmd
    {
        return commands::suggest(from, (&cfg.calibration).into(), cli.json);
    }

    let scanner = backend::build_scanner(&cfg)?;
    match cli.cmd {
        Commands::Scan { repetitions } => commands::scan(&scanner, repetitions, cli.json),
        Commands::Measure => commands::measure(&scanner, cli.json),
        Commands::Beep => {
            commands::beep(&scanner, cli.json);
            Ok(())
        }
        Commands::SelfCheck => commands::self_check(&scanner, cli.json),
        Commands::Calibrate { action } => match action {
            CalibrateCmd::Shape { readings, save } => {
                commands::calibrate_shape(&scanner, readings, save.as_deref(), cli.json)
            }
            CalibrateCmd::Material { readings, save } => {
                commands::calibrate_material(&scanner, readings, save.as_deref(), cli.json)
            }
            CalibrateCmd::Suggest { .. } => Ok(()),
        },
    }
    // scanner drops here: pending display/buzzer updates are flushed
}

fn main() {
    // clap prints usage errors itself and exits with 2
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    let mut log_guard = None;
    if let Err(e) = run(cli, &mut log_guard) {
        tracing::error!(error = %e, "command failed");
        if JSON_MODE.get().copied().unwrap_or(false) {
            println!("{}", format_error_json(&e));
        } else {
            println!("{}", humanize(&e));
        }
        // process::exit skips destructors
        drop(log_guard);
        std::process::exit(exit_code_for_error(&e));
    }
}
