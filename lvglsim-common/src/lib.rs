//! # lvglsim Common
//!
//! Shared utilities for the simulator crates.
//!
//! ## Logging
//!
//! ```rust,ignore
//! use lvglsim_common::{init_logging, TimedOperation};
//!
//! let log = init_logging("info").unwrap();
//! log.set_level("debug").unwrap();
//!
//! let _timer = TimedOperation::new("primary-init");
//! // ... work ...
//! ```

pub mod logging;

pub use logging::{init_logging, init_logging_json, LogLevelHandle, TimedOperation};
