//! Mock backend for testing.
//!
//! Counts every lifecycle call so tests can check what the orchestrator and
//! the run loop actually did. Useful for:
//! - Unit and integration testing
//! - Exercising failure paths without real devices

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lvglsim_toolkit::{Frame, InputEvent, InputKind, Key, Toolkit};
use tracing::info;

use crate::error::{BackendError, Result};
use crate::traits::{ActiveBackend, Backend, BackendKind, DisplaySettings, LoopControl};

/// Lifecycle counters shared between a mock descriptor and its handles.
#[derive(Debug, Default)]
pub struct MockStats {
    pub inits: AtomicUsize,
    pub pumps: AtomicUsize,
    pub presents: AtomicUsize,
    pub shutdowns: AtomicUsize,
}

impl MockStats {
    pub fn inits(&self) -> usize {
        self.inits.load(Ordering::SeqCst)
    }

    pub fn pumps(&self) -> usize {
        self.pumps.load(Ordering::SeqCst)
    }

    pub fn presents(&self) -> usize {
        self.presents.load(Ordering::SeqCst)
    }

    pub fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

/// Configurable in-memory backend.
pub struct MockBackend {
    name: &'static str,
    kind: BackendKind,
    probe: bool,
    fail_init: bool,
    quit_after: Option<usize>,
    fail_pump_after: Option<usize>,
    stats: Arc<MockStats>,
}

impl MockBackend {
    /// A display backend that creates a toolkit display at init.
    pub fn display(name: &'static str) -> Self {
        Self::new(name, BackendKind::Display)
    }

    /// An input-only backend that registers a keypad at init.
    pub fn input(name: &'static str) -> Self {
        Self::new(name, BackendKind::Input)
    }

    fn new(name: &'static str, kind: BackendKind) -> Self {
        Self {
            name,
            kind,
            probe: true,
            fail_init: false,
            quit_after: None,
            fail_pump_after: None,
            stats: Arc::new(MockStats::default()),
        }
    }

    pub fn with_probe(mut self, probe: bool) -> Self {
        self.probe = probe;
        self
    }

    /// Make `init` fail with [`BackendError::Unavailable`].
    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    /// Report [`LoopControl::Quit`] on the given pump (1-based).
    pub fn quit_after(mut self, pumps: usize) -> Self {
        self.quit_after = Some(pumps);
        self
    }

    /// Return an error on the given pump (1-based).
    pub fn fail_pump_after(mut self, pumps: usize) -> Self {
        self.fail_pump_after = Some(pumps);
        self
    }

    pub fn stats(&self) -> Arc<MockStats> {
        Arc::clone(&self.stats)
    }
}

impl Backend for MockBackend {
    fn name(&self) -> &'static str {
        self.name
    }

    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn probe(&self) -> bool {
        self.probe
    }

    fn init(
        &self,
        toolkit: &mut dyn Toolkit,
        window: &DisplaySettings,
    ) -> Result<Box<dyn ActiveBackend>> {
        self.stats.inits.fetch_add(1, Ordering::SeqCst);
        if self.fail_init {
            return Err(BackendError::Unavailable {
                name: self.name.to_string(),
                reason: "mock init failure".to_string(),
            });
        }

        let input = match self.kind {
            BackendKind::Display => {
                toolkit.create_display(window.width, window.height)?;
                None
            }
            BackendKind::Input => Some(toolkit.register_input(InputKind::Keypad)?),
        };

        info!(backend = self.name, "Mock backend initialized");
        Ok(Box::new(MockHandle {
            name: self.name,
            kind: self.kind,
            input,
            quit_after: self.quit_after,
            fail_pump_after: self.fail_pump_after,
            stats: Arc::clone(&self.stats),
        }))
    }
}

struct MockHandle {
    name: &'static str,
    kind: BackendKind,
    input: Option<lvglsim_toolkit::InputId>,
    quit_after: Option<usize>,
    fail_pump_after: Option<usize>,
    stats: Arc<MockStats>,
}

impl ActiveBackend for MockHandle {
    fn name(&self) -> &str {
        self.name
    }

    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn pump(&mut self, toolkit: &mut dyn Toolkit) -> Result<LoopControl> {
        let count = self.stats.pumps.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_pump_after == Some(count) {
            return Err(BackendError::Internal("mock pump failure".to_string()));
        }
        if let Some(input) = self.input {
            toolkit.feed_input(input, InputEvent::Key(Key::Right));
        }
        if self.quit_after == Some(count) {
            return Ok(LoopControl::Quit);
        }
        Ok(LoopControl::Continue)
    }

    fn present(&mut self, _frame: &Frame<'_>) -> Result<()> {
        self.stats.presents.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn shutdown(&mut self) {
        self.stats.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}
