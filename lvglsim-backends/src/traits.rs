//! Core backend abstraction traits.

use lvglsim_toolkit::{Frame, Toolkit};

use crate::error::Result;

/// What a backend contributes to the active set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Owns the render surface (and may also provide input)
    Display,
    /// Input only, layered over any display backend
    Input,
}

/// Window settings handed to a display backend at init.
///
/// Values are passed through exactly as configured; the toolkit rejects
/// geometry it cannot back with a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplaySettings {
    pub width: i32,
    pub height: i32,
    pub fullscreen: bool,
    pub maximize: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
            fullscreen: false,
            maximize: false,
        }
    }
}

/// Outcome of one pump of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    /// The backend hit its exit condition (window closed, quit key, ...)
    Quit,
}

/// Backend descriptor stored in the registry.
///
/// Descriptors are cheap and stateless; `init` produces the live handle.
pub trait Backend: Send + Sync {
    /// Unique registry name, matched case-sensitively.
    fn name(&self) -> &'static str;

    fn kind(&self) -> BackendKind;

    /// Whether the backend looks usable on this host.
    ///
    /// Used when picking a default; an explicitly requested backend is
    /// initialized without probing.
    fn probe(&self) -> bool {
        true
    }

    /// Initialize the backend against an initialized toolkit.
    fn init(
        &self,
        toolkit: &mut dyn Toolkit,
        window: &DisplaySettings,
    ) -> Result<Box<dyn ActiveBackend>>;
}

/// An initialized backend driven by the run loop.
pub trait ActiveBackend {
    fn name(&self) -> &str;

    fn kind(&self) -> BackendKind;

    /// Service pending events, feeding input into the toolkit.
    fn pump(&mut self, toolkit: &mut dyn Toolkit) -> Result<LoopControl>;

    /// Show a rendered frame. Only called on the primary.
    fn present(&mut self, _frame: &Frame<'_>) -> Result<()> {
        Ok(())
    }

    /// Release devices. Called once by the run loop on exit.
    fn shutdown(&mut self) {}
}
