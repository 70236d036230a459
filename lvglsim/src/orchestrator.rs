//! Startup sequence.
//!
//! ```text
//! VALIDATE ─▶ TOOLKIT-INIT ─▶ PRIMARY-INIT ─▶ SECONDARY-INIT ─▶ CONTENT ─▶ RUN
//!    │             │               │                 │              │
//!    └─────────────┴───────────────┴─────────────────┴──────────────┴─▶ StartupError
//! ```
//!
//! Every stage either succeeds or ends startup. There is no retry and no
//! fallback to another backend.

use std::fmt;
use std::io::{self, Write};

use lvglsim_backends::{
    ActiveBackends, BackendError, BackendRegistry, RunLoop, RunSummary, ShutdownFlag,
};
use lvglsim_common::TimedOperation;
use lvglsim_toolkit::{Content, Frame, Rgb888, RgbColor, Toolkit, ToolkitError};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::settings::Settings;

/// Which program is starting up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Widgets demo with slideshow
    Interactive,
    /// Hello-world label and a dump of the draw buffer
    Diagnostic,
}

impl Mode {
    pub fn content(self) -> Content {
        match self {
            Mode::Interactive => Content::WidgetsDemo,
            Mode::Diagnostic => Content::HelloLabel,
        }
    }
}

/// Startup stages, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validate,
    ToolkitInit,
    PrimaryInit,
    SecondaryInit,
    Content,
    Run,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validate => "validate",
            Stage::ToolkitInit => "toolkit-init",
            Stage::PrimaryInit => "primary-init",
            Stage::SecondaryInit => "secondary-init",
            Stage::Content => "content",
            Stage::Run => "run",
        };
        f.write_str(name)
    }
}

/// Fatal startup or run failure.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Validate(BackendError),

    #[error("toolkit initialization failed")]
    ToolkitInit(#[source] ToolkitError),

    #[error("failed to initialize display backend")]
    PrimaryInit(#[source] BackendError),

    #[error("failed to initialize input overlay {name}")]
    SecondaryInit {
        name: String,
        #[source]
        source: BackendError,
    },

    #[error("failed to create content")]
    Content(#[source] ToolkitError),

    #[error("failed to dump draw buffer")]
    Dump(#[source] io::Error),

    #[error("run loop failed")]
    Run(#[source] BackendError),
}

impl StartupError {
    /// Stage that failed.
    pub fn stage(&self) -> Stage {
        match self {
            StartupError::Validate(_) => Stage::Validate,
            StartupError::ToolkitInit(_) => Stage::ToolkitInit,
            StartupError::PrimaryInit(_) => Stage::PrimaryInit,
            StartupError::SecondaryInit { .. } => Stage::SecondaryInit,
            StartupError::Content(_) | StartupError::Dump(_) => Stage::Content,
            StartupError::Run(_) => Stage::Run,
        }
    }
}

/// Drives startup from resolved settings to the run loop.
pub struct Orchestrator<'a> {
    registry: &'a BackendRegistry,
    mode: Mode,
    overlay: Option<String>,
    shutdown: ShutdownFlag,
}

impl<'a> Orchestrator<'a> {
    pub fn new(registry: &'a BackendRegistry, mode: Mode) -> Self {
        Self {
            registry,
            mode,
            overlay: None,
            shutdown: ShutdownFlag::new(),
        }
    }

    /// Input-only backend initialized next to the primary.
    pub fn with_overlay(mut self, overlay: Option<String>) -> Self {
        self.overlay = overlay;
        self
    }

    pub fn with_shutdown(mut self, shutdown: ShutdownFlag) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Run every startup stage, then the run loop.
    pub fn run(
        &self,
        settings: &Settings,
        toolkit: &mut dyn Toolkit,
    ) -> Result<RunSummary, StartupError> {
        let run_loop = self.prepare(settings, toolkit, &mut io::stdout())?;
        let _timer = TimedOperation::new("run");
        run_loop.run(toolkit).map_err(StartupError::Run)
    }

    /// Run every startup stage and return the loop ready to enter.
    ///
    /// In diagnostic mode the draw buffer is written to `out`.
    #[instrument(skip_all, fields(mode = ?self.mode))]
    pub fn prepare<W: Write>(
        &self,
        settings: &Settings,
        toolkit: &mut dyn Toolkit,
        out: &mut W,
    ) -> Result<RunLoop, StartupError> {
        self.validate(settings)?;

        {
            let _timer = TimedOperation::new("toolkit-init");
            toolkit.init().map_err(StartupError::ToolkitInit)?;
            debug!(version = %toolkit.version(), "Toolkit ready");
        }

        let window = settings.display_settings();
        let mut primary = {
            let _timer = TimedOperation::new("primary-init");
            self.registry
                .init_backend(settings.backend.as_deref(), toolkit, &window)
                .map_err(StartupError::PrimaryInit)?
        };

        let overlay = match &self.overlay {
            Some(name) => {
                let _timer = TimedOperation::new("secondary-init");
                match self.registry.init_overlay(name, toolkit, &window) {
                    Ok(handle) => Some(handle),
                    Err(source) => {
                        primary.shutdown();
                        return Err(StartupError::SecondaryInit {
                            name: name.clone(),
                            source,
                        });
                    }
                }
            }
            None => None,
        };

        let mut active =
            ActiveBackends::new(primary, overlay).map_err(StartupError::PrimaryInit)?;

        if let Err(e) = self.create_content(toolkit, out) {
            active.shutdown();
            return Err(e);
        }

        Ok(RunLoop::new(active, self.shutdown.clone()).with_frame_interval(settings.frame_interval()))
    }

    fn create_content<W: Write>(
        &self,
        toolkit: &mut dyn Toolkit,
        out: &mut W,
    ) -> Result<(), StartupError> {
        toolkit
            .create_content(self.mode.content())
            .map_err(StartupError::Content)?;
        info!(content = ?self.mode.content(), "Content created");

        if self.mode == Mode::Diagnostic {
            if let Some(frame) = toolkit.frame() {
                dump_frame(&frame, out).map_err(StartupError::Dump)?;
            }
        }
        Ok(())
    }

    /// Check the requested backend before anything is initialized.
    fn validate(&self, settings: &Settings) -> Result<(), StartupError> {
        let Some(name) = settings.backend.as_deref() else {
            debug!("No backend requested, default will be used");
            return Ok(());
        };
        self.registry
            .resolve_display(Some(name))
            .map_err(StartupError::Validate)?;
        debug!(backend = name, "Requested backend is supported");
        Ok(())
    }
}

/// Write the frame as a grid of `*` (lit) and `-` (dark) characters.
pub fn dump_frame<W: Write>(frame: &Frame<'_>, out: &mut W) -> io::Result<()> {
    writeln!(out, "=== DRAW BUFFER ({}x{}) ===", frame.width, frame.height)?;
    for y in 0..frame.height {
        let row: String = (0..frame.width)
            .map(|x| match frame.pixel(x, y) {
                Some(pixel) if pixel != Rgb888::BLACK => '*',
                _ => '-',
            })
            .collect();
        writeln!(out, "{}", row)?;
    }
    out.flush()
}
