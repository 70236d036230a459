//! Error types for the graphics toolkit.

use thiserror::Error;

/// Errors that can occur inside the toolkit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolkitError {
    /// An entry point was used before `init`.
    #[error("Toolkit is not initialized")]
    NotInitialized,

    /// `init` was called twice.
    #[error("Toolkit is already initialized")]
    AlreadyInitialized,

    /// Content or input needs a display, but none was created.
    #[error("No display has been created")]
    NoDisplay,

    /// Only one display surface is supported.
    #[error("A display already exists ({width}x{height})")]
    DisplayExists { width: u32, height: u32 },

    /// The requested display geometry cannot back a surface.
    #[error("Invalid display geometry: {width}x{height}")]
    InvalidGeometry { width: i32, height: i32 },
}

/// Result type alias for toolkit operations.
pub type Result<T> = std::result::Result<T, ToolkitError>;
