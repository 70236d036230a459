//! The simulator's main event/render pump.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use lvglsim_toolkit::Toolkit;
use signal_hook::consts::{SIGINT, SIGTERM};
use tracing::{debug, error, info};

use crate::active::ActiveBackends;
use crate::error::Result;
use crate::traits::LoopControl;

/// Default pause between iterations (~60fps).
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Process-wide quit request, set by SIGINT/SIGTERM.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag when SIGINT or SIGTERM arrives.
    pub fn install_signal_handlers(&self) -> io::Result<()> {
        signal_hook::flag::register(SIGINT, Arc::clone(&self.0))?;
        signal_hook::flag::register(SIGTERM, Arc::clone(&self.0))?;
        debug!("Signal handlers installed");
        Ok(())
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Why the run loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    /// A backend reported its exit condition
    BackendQuit(String),
    /// A shutdown signal was received
    Signal,
}

/// What happened during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub reason: ExitReason,
    pub iterations: u64,
    pub frames_presented: u64,
}

/// Owns the active backends for the rest of the process.
pub struct RunLoop {
    active: ActiveBackends,
    frame_interval: Duration,
    shutdown: ShutdownFlag,
    iterations: u64,
    frames_presented: u64,
}

impl RunLoop {
    pub fn new(active: ActiveBackends, shutdown: ShutdownFlag) -> Self {
        Self {
            active,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            shutdown,
            iterations: 0,
            frames_presented: 0,
        }
    }

    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    pub fn active(&self) -> &ActiveBackends {
        &self.active
    }

    /// Pump until an exit condition, then shut every backend down.
    pub fn run(mut self, toolkit: &mut dyn Toolkit) -> Result<RunSummary> {
        info!(
            primary = self.active.primary().name(),
            interval_ms = self.frame_interval.as_millis() as u64,
            "Entering run loop"
        );

        let result = self.pump_until_exit(toolkit);
        self.active.shutdown();

        match result {
            Ok(reason) => {
                info!(
                    reason = ?reason,
                    iterations = self.iterations,
                    frames = self.frames_presented,
                    "Run loop finished"
                );
                Ok(RunSummary {
                    reason,
                    iterations: self.iterations,
                    frames_presented: self.frames_presented,
                })
            }
            Err(e) => {
                error!(error = %e, "Run loop aborted");
                Err(e)
            }
        }
    }

    fn pump_until_exit(&mut self, toolkit: &mut dyn Toolkit) -> Result<ExitReason> {
        loop {
            if self.shutdown.is_requested() {
                info!("Shutdown requested");
                return Ok(ExitReason::Signal);
            }

            for backend in self.active.iter_mut() {
                if backend.pump(toolkit)? == LoopControl::Quit {
                    info!(backend = backend.name(), "Backend requested exit");
                    return Ok(ExitReason::BackendQuit(backend.name().to_string()));
                }
            }

            let wait = toolkit.timer_handler();
            if let Some(frame) = toolkit.take_dirty_frame() {
                self.active.primary_mut().present(&frame)?;
                self.frames_presented += 1;
            }
            self.iterations += 1;

            thread::sleep(wait.min(self.frame_interval));
        }
    }
}
