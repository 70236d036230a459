//! Toolkit abstraction consumed by the orchestrator and the backends.

use std::time::Duration;

use crate::error::Result;
use crate::types::*;

/// Graphics toolkit interface.
///
/// The orchestrator calls `init` once before any backend is initialized and
/// `create_content` once a display exists. Backends create the display and
/// input devices during their own initialization, feed input while the run
/// loop pumps them, and present whatever `take_dirty_frame` hands back.
pub trait Toolkit {
    /// Version of the toolkit.
    fn version(&self) -> ToolkitVersion;

    /// Initialize the toolkit's global state.
    fn init(&mut self) -> Result<()>;

    /// Whether `init` has completed.
    fn is_initialized(&self) -> bool;

    /// Create the display surface.
    ///
    /// Geometry comes straight from the user's settings and is validated here.
    fn create_display(&mut self, width: i32, height: i32) -> Result<DisplayId>;

    /// Register an input device.
    fn register_input(&mut self, kind: InputKind) -> Result<InputId>;

    /// Deliver one input event from a registered device.
    fn feed_input(&mut self, input: InputId, event: InputEvent);

    /// Build content on the display.
    fn create_content(&mut self, content: Content) -> Result<()>;

    /// Advance timers and redraw invalidated content.
    ///
    /// Returns the time until the next timer is due.
    fn timer_handler(&mut self) -> Duration;

    /// The current frame if it changed since the last call.
    fn take_dirty_frame(&mut self) -> Option<Frame<'_>>;

    /// The current frame regardless of whether it changed.
    fn frame(&self) -> Option<Frame<'_>>;
}
