//! # lvglsim
//!
//! Startup and main loop of the embedded display simulator.
//!
//! - [`settings`]: layered settings (defaults, config file, environment, flags)
//! - [`orchestrator`]: staged startup from settings to the run loop
//! - [`cli`]: command-line flags

pub mod cli;
pub mod orchestrator;
pub mod settings;

pub use cli::{Action, Args};
pub use orchestrator::{dump_frame, Mode, Orchestrator, Stage, StartupError};
pub use settings::{FileConfig, Settings};

/// Name of the input overlay backend, when the `input-overlay` feature is on.
pub fn input_overlay() -> Option<String> {
    if cfg!(feature = "input-overlay") {
        Some("EVDEV".to_string())
    } else {
        None
    }
}
