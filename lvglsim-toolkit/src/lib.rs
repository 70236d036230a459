//! # lvglsim Toolkit
//!
//! The graphics toolkit collaborator of the simulator.
//!
//! The orchestrator and the backends only talk to the [`Toolkit`] trait:
//! a global `init`, display and input creation for backends, and a content
//! entry point called once a display is ready. [`SoftToolkit`] implements it
//! with a single in-memory RGB surface drawn with `embedded-graphics`.
//!
//! ```rust,ignore
//! use lvglsim_toolkit::{Content, SoftToolkit, Toolkit};
//!
//! let mut toolkit = SoftToolkit::new();
//! toolkit.init()?;
//! toolkit.create_display(800, 480)?;
//! toolkit.create_content(Content::WidgetsDemo)?;
//! let wait = toolkit.timer_handler();
//! ```

pub mod demo;
pub mod error;
pub mod soft;
pub mod surface;
pub mod traits;
pub mod types;

pub use error::ToolkitError;
pub use soft::SoftToolkit;
pub use traits::Toolkit;
pub use types::*;

pub use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
