//! Backend registry.
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │                BackendRegistry                 │
//! │  - append-only, unique names, insertion order  │
//! │  - resolves requested names to descriptors     │
//! └───────────────────────┬────────────────────────┘
//!          ┌──────────────┼──────────────┬──────────────┐
//!          ▼              ▼              ▼              ▼
//!     ┌──────────┐   ┌─────────┐   ┌──────────┐   ┌─────────┐
//!     │ Terminal │   │  FBDEV  │   │ Headless │   │  EVDEV  │
//!     └──────────┘   └─────────┘   └──────────┘   └─────────┘
//! ```

use std::io::{self, Write};
use std::sync::Arc;

use lvglsim_toolkit::Toolkit;
use tracing::{debug, info, instrument, warn};

use crate::error::{BackendError, Result};
use crate::headless::HeadlessBackend;
use crate::options::BackendOptions;
use crate::terminal::TerminalBackend;
use crate::traits::{ActiveBackend, Backend, BackendKind, DisplaySettings};

/// Table of available backends.
#[derive(Default)]
pub struct BackendRegistry {
    backends: Vec<Arc<dyn Backend>>,
    builtin_registered: bool,
}

impl BackendRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every compiled-in backend.
    pub fn with_builtin(options: &BackendOptions) -> Self {
        let mut registry = Self::new();
        registry.register_builtin(options);
        registry
    }

    /// Register every compiled-in backend.
    ///
    /// Calling this more than once has no effect.
    pub fn register_builtin(&mut self, options: &BackendOptions) {
        if self.builtin_registered {
            debug!("Built-in backends already registered");
            return;
        }

        self.register(Arc::new(TerminalBackend::new(options.terminal.clone())));
        #[cfg(feature = "fbdev")]
        self.register(Arc::new(crate::fbdev::FbdevBackend::new(
            options.fbdev.clone(),
        )));
        self.register(Arc::new(HeadlessBackend::new()));
        #[cfg(feature = "evdev")]
        self.register(Arc::new(crate::evdev::EvdevBackend::new(
            options.evdev.clone(),
        )));

        self.builtin_registered = true;
        info!(count = self.backends.len(), "Built-in backends registered");
    }

    /// Add a backend. Returns false if the name is already taken.
    pub fn register(&mut self, backend: Arc<dyn Backend>) -> bool {
        let name = backend.name();
        if self.is_supported(name) {
            warn!(backend = name, "Backend already registered, ignoring");
            return false;
        }
        debug!(backend = name, kind = ?backend.kind(), "Backend registered");
        self.backends.push(backend);
        true
    }

    /// Exact, case-sensitive name lookup.
    pub fn is_supported(&self, name: &str) -> bool {
        self.backends.iter().any(|b| b.name() == name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Backend>> {
        self.backends.iter().find(|b| b.name() == name).cloned()
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.backends.iter().map(|b| b.name())
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Write one backend name per line.
    pub fn print_supported<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for name in self.names() {
            writeln!(out, "{}", name)?;
        }
        Ok(())
    }

    /// Resolve the primary backend.
    ///
    /// A requested name must exist and be display capable. Without a
    /// request the first display backend whose probe succeeds is used.
    pub fn resolve_display(&self, requested: Option<&str>) -> Result<Arc<dyn Backend>> {
        match requested {
            Some(name) => {
                let backend = self
                    .get(name)
                    .ok_or_else(|| BackendError::NoSuchBackend(name.to_string()))?;
                if backend.kind() != BackendKind::Display {
                    return Err(BackendError::NotDisplayCapable(name.to_string()));
                }
                Ok(backend)
            }
            None => self
                .backends
                .iter()
                .filter(|b| b.kind() == BackendKind::Display)
                .find(|b| {
                    let usable = b.probe();
                    debug!(backend = b.name(), usable, "Probed backend");
                    usable
                })
                .cloned()
                .ok_or(BackendError::NoDisplayBackend),
        }
    }

    /// Resolve an input-only overlay backend by name.
    pub fn resolve_input(&self, name: &str) -> Result<Arc<dyn Backend>> {
        let backend = self
            .get(name)
            .ok_or_else(|| BackendError::NoSuchBackend(name.to_string()))?;
        if backend.kind() != BackendKind::Input {
            return Err(BackendError::NotInputCapable(name.to_string()));
        }
        Ok(backend)
    }

    /// Resolve and initialize the primary backend.
    #[instrument(skip(self, toolkit, window))]
    pub fn init_backend(
        &self,
        requested: Option<&str>,
        toolkit: &mut dyn Toolkit,
        window: &DisplaySettings,
    ) -> Result<Box<dyn ActiveBackend>> {
        let backend = self.resolve_display(requested)?;
        info!(backend = backend.name(), "Initializing display backend");
        backend.init(toolkit, window)
    }

    /// Resolve and initialize an input overlay.
    #[instrument(skip(self, toolkit, window))]
    pub fn init_overlay(
        &self,
        name: &str,
        toolkit: &mut dyn Toolkit,
        window: &DisplaySettings,
    ) -> Result<Box<dyn ActiveBackend>> {
        let backend = self.resolve_input(name)?;
        info!(backend = backend.name(), "Initializing input overlay");
        backend.init(toolkit, window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;
    use lvglsim_toolkit::SoftToolkit;

    fn mock_registry() -> BackendRegistry {
        let mut registry = BackendRegistry::new();
        registry.register(Arc::new(MockBackend::display("Alpha").with_probe(false)));
        registry.register(Arc::new(MockBackend::display("Beta")));
        registry.register(Arc::new(MockBackend::input("Keys")));
        registry
    }

    #[test]
    fn test_builtin_registration_is_idempotent() {
        let options = BackendOptions::default();
        let mut registry = BackendRegistry::with_builtin(&options);
        let count = registry.len();
        registry.register_builtin(&options);
        assert_eq!(registry.len(), count);
        assert!(registry.is_supported("Headless"));
        assert!(registry.is_supported("Terminal"));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = mock_registry();
        assert!(!registry.register(Arc::new(MockBackend::display("Beta"))));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let registry = mock_registry();
        assert!(registry.is_supported("Beta"));
        assert!(!registry.is_supported("beta"));
        assert!(!registry.is_supported("Bet"));
    }

    #[test]
    fn test_print_supported_in_order() {
        let registry = mock_registry();
        let mut out = Vec::new();
        registry.print_supported(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Alpha\nBeta\nKeys\n");
    }

    #[test]
    fn test_resolve_unknown_name() {
        let registry = mock_registry();
        let err = registry.resolve_display(Some("Nonexistent")).err().unwrap();
        assert_eq!(err.to_string(), "no such backend: Nonexistent");
    }

    #[test]
    fn test_resolve_rejects_input_as_primary() {
        let registry = mock_registry();
        assert!(matches!(
            registry.resolve_display(Some("Keys")),
            Err(BackendError::NotDisplayCapable(_))
        ));
        assert!(matches!(
            registry.resolve_input("Beta"),
            Err(BackendError::NotInputCapable(_))
        ));
    }

    #[test]
    fn test_default_skips_failed_probe() {
        let registry = mock_registry();
        let backend = registry.resolve_display(None).unwrap();
        assert_eq!(backend.name(), "Beta");
    }

    #[test]
    fn test_explicit_request_skips_probe() {
        let registry = mock_registry();
        let backend = registry.resolve_display(Some("Alpha")).unwrap();
        assert_eq!(backend.name(), "Alpha");
    }

    #[test]
    fn test_no_default_available() {
        let mut registry = BackendRegistry::new();
        registry.register(Arc::new(MockBackend::input("Keys")));
        assert!(matches!(
            registry.resolve_display(None),
            Err(BackendError::NoDisplayBackend)
        ));
    }

    #[test]
    fn test_init_backend() {
        let registry = mock_registry();
        let mut toolkit = SoftToolkit::new();
        toolkit.init().unwrap();
        let active = registry
            .init_backend(Some("Beta"), &mut toolkit, &DisplaySettings::default())
            .unwrap();
        assert_eq!(active.name(), "Beta");
        assert_eq!(active.kind(), BackendKind::Display);
        assert!(toolkit.frame().is_some());
    }
}
