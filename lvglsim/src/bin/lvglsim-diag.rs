//! # lvglsim-diag
//!
//! Framebuffer smoke test: draws a "hello world" label at 128x64 on
//! `FBDEV`, prints the draw buffer to stdout and keeps running until
//! signalled. Takes no arguments and runs without an input overlay.

use std::process::ExitCode;

use anyhow::{Context, Result};
use lvglsim::{Mode, Orchestrator, Settings};
use lvglsim_backends::{BackendOptions, BackendRegistry, ShutdownFlag};
use lvglsim_toolkit::SoftToolkit;
use tracing::info;

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
    let mut settings = Settings::diagnostic();
    settings.backends = BackendOptions::default().with_env_overrides(|key| std::env::var(key).ok());

    let _log = lvglsim_common::init_logging(&settings.log_level)?;
    let registry = BackendRegistry::with_builtin(&settings.backends);

    let shutdown = ShutdownFlag::new();
    shutdown
        .install_signal_handlers()
        .context("Failed to install signal handlers")?;

    let mut toolkit = SoftToolkit::new();
    let summary = Orchestrator::new(&registry, Mode::Diagnostic)
        .with_shutdown(shutdown)
        .run(&settings, &mut toolkit)?;

    info!(reason = ?summary.reason, "Diagnostic finished");
    Ok(())
}
