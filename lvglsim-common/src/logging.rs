//! Logging initialization using tracing.
//!
//! All output goes to stderr so that informational commands (`-V`, `-B`)
//! keep stdout clean for scripts.

use std::time::Instant;

use anyhow::{anyhow, Result};
use tracing::debug;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Changes the log level of an installed subscriber.
///
/// Lets logging start before the configured level is known.
pub struct LogLevelHandle {
    handle: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
}

impl LogLevelHandle {
    /// Switch to `level`. Has no effect when `RUST_LOG` chose the filter.
    pub fn set_level(&self, level: &str) -> Result<()> {
        if self.from_env {
            return Ok(());
        }
        let filter =
            EnvFilter::try_new(level).map_err(|e| anyhow!("Invalid log level {}: {}", level, e))?;
        self.handle
            .reload(filter)
            .map_err(|e| anyhow!("Failed to change log level: {}", e))?;
        debug!(level, "Log level changed");
        Ok(())
    }
}

fn filter_layer(level: &str) -> (reload::Layer<EnvFilter, Registry>, LogLevelHandle) {
    let (filter, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::new(level), false),
    };
    let (layer, handle) = reload::Layer::new(filter);
    (layer, LogLevelHandle { handle, from_env })
}

/// Initialize the tracing subscriber with the specified log level.
///
/// `RUST_LOG` takes precedence over `level` when it is set.
///
/// # Arguments
/// * `level` - Log level string (trace, debug, info, warn, error)
///
/// # Example
/// ```
/// let log = lvglsim_common::init_logging("info").unwrap();
/// log.set_level("debug").unwrap();
/// ```
pub fn init_logging(level: &str) -> Result<LogLevelHandle> {
    let (filter, handle) = filter_layer(level);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(true),
        )
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;
    Ok(handle)
}

/// Initialize logging with JSON output format.
/// Suitable for capturing simulator runs in CI.
pub fn init_logging_json(level: &str) -> Result<LogLevelHandle> {
    let (filter, handle) = filter_layer(level);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(true),
        )
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;
    Ok(handle)
}

/// Logs how long a named operation took when dropped.
pub struct TimedOperation {
    name: &'static str,
    started: Instant,
}

impl TimedOperation {
    pub fn new(name: &'static str) -> Self {
        debug!(operation = name, "Operation started");
        Self {
            name,
            started: Instant::now(),
        }
    }

    /// Time elapsed since the operation started, in milliseconds.
    pub fn elapsed_ms(&self) -> u128 {
        self.started.elapsed().as_millis()
    }
}

impl Drop for TimedOperation {
    fn drop(&mut self) {
        debug!(
            operation = self.name,
            elapsed_ms = self.elapsed_ms() as u64,
            "Operation finished"
        );
    }
}
