//! The set of initialized backends driving the simulation.

use tracing::info;

use crate::error::{BackendError, Result};
use crate::traits::{ActiveBackend, BackendKind};

/// One display backend plus an optional input-only overlay.
pub struct ActiveBackends {
    primary: Box<dyn ActiveBackend>,
    overlay: Option<Box<dyn ActiveBackend>>,
}

impl ActiveBackends {
    /// Build the set, checking that each handle plays the right role.
    ///
    /// A rejected set shuts down the handles it was given.
    pub fn new(
        mut primary: Box<dyn ActiveBackend>,
        mut overlay: Option<Box<dyn ActiveBackend>>,
    ) -> Result<Self> {
        let rejected = if primary.kind() != BackendKind::Display {
            Some(BackendError::NotDisplayCapable(primary.name().to_string()))
        } else {
            overlay
                .as_ref()
                .filter(|o| o.kind() != BackendKind::Input)
                .map(|o| BackendError::NotInputCapable(o.name().to_string()))
        };
        if let Some(err) = rejected {
            if let Some(overlay) = overlay.as_mut() {
                overlay.shutdown();
            }
            primary.shutdown();
            return Err(err);
        }

        info!(
            primary = primary.name(),
            overlay = overlay.as_ref().map(|o| o.name()).unwrap_or("none"),
            "Active backend set ready"
        );
        Ok(Self { primary, overlay })
    }

    pub fn primary(&self) -> &dyn ActiveBackend {
        self.primary.as_ref()
    }

    pub fn primary_mut(&mut self) -> &mut dyn ActiveBackend {
        self.primary.as_mut()
    }

    pub fn overlay(&self) -> Option<&dyn ActiveBackend> {
        self.overlay.as_deref()
    }

    pub fn len(&self) -> usize {
        1 + usize::from(self.overlay.is_some())
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Primary first, then the overlay.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn ActiveBackend>> {
        std::iter::once(&mut self.primary).chain(self.overlay.iter_mut())
    }

    /// Shut down every backend, overlay first.
    pub fn shutdown(&mut self) {
        if let Some(overlay) = self.overlay.as_mut() {
            info!(backend = overlay.name(), "Shutting down input overlay");
            overlay.shutdown();
        }
        info!(backend = self.primary.name(), "Shutting down display backend");
        self.primary.shutdown();
    }
}
