//! Data types shared between the toolkit and its backends.

use std::fmt;

use embedded_graphics::pixelcolor::Rgb888;

/// Toolkit release version, printed by `lvglsim -V`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolkitVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub info: &'static str,
}

impl ToolkitVersion {
    /// Version of this toolkit build.
    pub fn current() -> Self {
        Self {
            major: env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap_or(0),
            minor: env!("CARGO_PKG_VERSION_MINOR").parse().unwrap_or(0),
            patch: env!("CARGO_PKG_VERSION_PATCH").parse().unwrap_or(0),
            info: "dev",
        }
    }
}

impl fmt::Display for ToolkitVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}-{}", self.major, self.minor, self.patch, self.info)
    }
}

/// Handle to the display created by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayId(pub(crate) u32);

/// Handle to an input device registered by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputId(pub(crate) u32);

/// Kind of input device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Keyboard-style navigation
    Keypad,
    /// Mouse or touch panel
    Pointer,
}

/// Keys the demo content reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Escape,
    Tab,
    Backspace,
    Char(char),
}

/// An input event fed into the toolkit by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(Key),
    /// Absolute pointer position in display coordinates
    Pointer { x: i32, y: i32, pressed: bool },
}

/// Content the orchestrator can place on the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Content {
    /// Widgets demo with an automatic slideshow
    WidgetsDemo,
    /// Monochrome "hello world" label used for panel bring-up
    HelloLabel,
}

/// Rendered pixels handed to a display backend.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub width: u32,
    pub height: u32,
    /// Row-major, `width * height` pixels
    pub pixels: &'a [Rgb888],
}

impl<'a> Frame<'a> {
    /// Pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb888> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }
}
