//! Headless display backend.
//!
//! Renders into the toolkit surface without showing it anywhere. Runs until
//! the process is signalled. Handy for CI and for profiling the toolkit.

use lvglsim_toolkit::{Frame, Toolkit};
use tracing::{debug, info};

use crate::error::Result;
use crate::traits::{ActiveBackend, Backend, BackendKind, DisplaySettings, LoopControl};

pub const HEADLESS_NAME: &str = "Headless";

/// Descriptor for the headless backend.
#[derive(Debug, Default)]
pub struct HeadlessBackend;

impl HeadlessBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Backend for HeadlessBackend {
    fn name(&self) -> &'static str {
        HEADLESS_NAME
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Display
    }

    fn init(
        &self,
        toolkit: &mut dyn Toolkit,
        window: &DisplaySettings,
    ) -> Result<Box<dyn ActiveBackend>> {
        if window.fullscreen || window.maximize {
            debug!("Fullscreen/maximize have no effect on the headless backend");
        }
        toolkit.create_display(window.width, window.height)?;
        info!(
            width = window.width,
            height = window.height,
            "Headless display ready"
        );
        Ok(Box::new(HeadlessDisplay { frames: 0 }))
    }
}

/// Initialized headless display.
pub struct HeadlessDisplay {
    frames: u64,
}

impl ActiveBackend for HeadlessDisplay {
    fn name(&self) -> &str {
        HEADLESS_NAME
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Display
    }

    fn pump(&mut self, _toolkit: &mut dyn Toolkit) -> Result<LoopControl> {
        Ok(LoopControl::Continue)
    }

    fn present(&mut self, frame: &Frame<'_>) -> Result<()> {
        self.frames += 1;
        debug!(
            frame = self.frames,
            width = frame.width,
            height = frame.height,
            "Frame rendered"
        );
        Ok(())
    }

    fn shutdown(&mut self) {
        info!(frames = self.frames, "Headless display closed");
    }
}
