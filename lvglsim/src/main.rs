//! # lvglsim
//!
//! Runs the widgets demo on a display backend chosen at startup.
//!
//! ## Usage
//! ```bash
//! lvglsim -B                          # list backends
//! lvglsim -b Headless -W 320 -H 240   # run without a visible display
//! LV_SIM_CONFIG=/etc/lvglsim.yaml lvglsim
//! ```

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use lvglsim::{input_overlay, Action, Args, Mode, Orchestrator, Settings};
use lvglsim_backends::{BackendOptions, BackendRegistry, ShutdownFlag};
use lvglsim_toolkit::{SoftToolkit, Toolkit};
use tracing::info;

/// Set to `json` for JSON log lines.
const LOG_FORMAT_ENV: &str = "LV_SIM_LOG_FORMAT";
const DEFAULT_LOG_LEVEL: &str = "info";

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Usage errors exit 2, -h exits 0
    let args = Args::parse();

    let mut toolkit = SoftToolkit::new();
    if args.action() == Action::PrintVersion {
        println!("{}", toolkit.version());
        return Ok(());
    }

    if args.action() == Action::ListBackends {
        // Backend names do not depend on their options
        BackendRegistry::with_builtin(&BackendOptions::default())
            .print_supported(&mut io::stdout().lock())
            .context("Failed to write backend list")?;
        return Ok(());
    }

    // Start at info so settings warnings show, then apply the configured level
    let log = if std::env::var(LOG_FORMAT_ENV).as_deref() == Ok("json") {
        lvglsim_common::init_logging_json(DEFAULT_LOG_LEVEL)?
    } else {
        lvglsim_common::init_logging(DEFAULT_LOG_LEVEL)?
    };

    let settings = Settings::from_env(&args)?;
    log.set_level(&settings.log_level)?;
    let registry = BackendRegistry::with_builtin(&settings.backends);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        backend = settings.backend.as_deref().unwrap_or("default"),
        width = settings.window_width,
        height = settings.window_height,
        "Starting lvglsim"
    );

    let shutdown = ShutdownFlag::new();
    shutdown
        .install_signal_handlers()
        .context("Failed to install signal handlers")?;

    let summary = Orchestrator::new(&registry, Mode::Interactive)
        .with_overlay(input_overlay())
        .with_shutdown(shutdown)
        .run(&settings, &mut toolkit)?;

    info!(reason = ?summary.reason, frames = summary.frames_presented, "lvglsim exited");
    Ok(())
}
