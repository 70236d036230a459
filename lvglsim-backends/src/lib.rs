//! # lvglsim Backends
//!
//! Display and input backends for the simulator, the registry that selects
//! them and the run loop that drives them.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            BackendRegistry              │
//! │   (register, resolve, init_backend)     │
//! └─────────────────────┬───────────────────┘
//!                       │ init
//!         ┌─────────────┴─────────────┐
//!         ▼                           ▼
//! ┌───────────────────┐     ┌───────────────────┐
//! │  primary display  │     │   input overlay   │
//! │ Terminal / FBDEV  │     │      EVDEV        │
//! │     / Headless    │     │    (optional)     │
//! └─────────┬─────────┘     └─────────┬─────────┘
//!           └─────────────┬───────────┘
//!                         ▼
//!                     RunLoop
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lvglsim_backends::{ActiveBackends, BackendOptions, BackendRegistry, RunLoop, ShutdownFlag};
//!
//! let registry = BackendRegistry::with_builtin(&BackendOptions::default());
//! let primary = registry.init_backend(Some("Headless"), &mut toolkit, &display)?;
//! let summary = RunLoop::new(ActiveBackends::new(primary, None)?, ShutdownFlag::new())
//!     .run(&mut toolkit)?;
//! ```

pub mod active;
pub mod error;
pub mod headless;
pub mod mock;
pub mod options;
pub mod registry;
pub mod run_loop;
pub mod terminal;
pub mod traits;

#[cfg(feature = "evdev")]
pub mod evdev;
#[cfg(feature = "fbdev")]
pub mod fbdev;

pub use active::ActiveBackends;
pub use error::{BackendError, Result};
pub use headless::HeadlessBackend;
pub use mock::{MockBackend, MockStats};
pub use options::BackendOptions;
pub use registry::BackendRegistry;
pub use run_loop::{ExitReason, RunLoop, RunSummary, ShutdownFlag, DEFAULT_FRAME_INTERVAL};
pub use terminal::TerminalBackend;
pub use traits::{ActiveBackend, Backend, BackendKind, DisplaySettings, LoopControl};
