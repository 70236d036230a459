//! Error types for the backend layer.

use std::path::PathBuf;

use lvglsim_toolkit::ToolkitError;
use thiserror::Error;

/// Errors that can occur while resolving, initializing or running a backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The requested name is not in the registry.
    #[error("no such backend: {0}")]
    NoSuchBackend(String),

    /// An input-only backend was requested as the primary.
    #[error("backend {0} cannot drive a display")]
    NotDisplayCapable(String),

    /// A display backend was requested as the input overlay.
    #[error("backend {0} is not an input-only backend")]
    NotInputCapable(String),

    /// No name was requested and no registered display backend probed usable.
    #[error("no usable display backend available")]
    NoDisplayBackend,

    /// The backend exists but cannot run on this host.
    #[error("backend {name} is unavailable: {reason}")]
    Unavailable { name: String, reason: String },

    /// A device node could not be opened or queried.
    #[error("failed to open {}: {source}", device.display())]
    DeviceOpen {
        device: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error while running.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The toolkit rejected a request from the backend.
    #[error("toolkit error: {0}")]
    Toolkit(#[from] ToolkitError),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;
