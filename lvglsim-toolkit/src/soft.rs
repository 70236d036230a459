//! Software toolkit: one RGB surface, a timer list and the demo screens.

use std::time::{Duration, Instant};

use embedded_graphics::geometry::Size;
use tracing::{debug, info, instrument};

use crate::demo::{draw_hello_label, WidgetsDemo};
use crate::error::{Result, ToolkitError};
use crate::surface::Surface;
use crate::traits::Toolkit;
use crate::types::*;

/// Default period between slideshow steps.
pub const DEFAULT_SLIDESHOW_PERIOD: Duration = Duration::from_secs(3);

/// Returned by the timer handler when no timer is armed.
const IDLE_PERIOD: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    Slideshow,
}

#[derive(Debug)]
struct Timer {
    kind: TimerKind,
    period: Duration,
    next_due: Instant,
}

enum Screen {
    Empty,
    Widgets(WidgetsDemo),
    HelloLabel,
}

/// In-process toolkit rendering into a single [`Surface`].
pub struct SoftToolkit {
    initialized: bool,
    surface: Option<Surface>,
    inputs: Vec<InputKind>,
    screen: Screen,
    timers: Vec<Timer>,
    slideshow_period: Duration,
    invalidated: bool,
}

impl Default for SoftToolkit {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftToolkit {
    pub fn new() -> Self {
        Self {
            initialized: false,
            surface: None,
            inputs: Vec::new(),
            screen: Screen::Empty,
            timers: Vec::new(),
            slideshow_period: DEFAULT_SLIDESHOW_PERIOD,
            invalidated: false,
        }
    }

    /// Override the slideshow period.
    pub fn with_slideshow_period(mut self, period: Duration) -> Self {
        self.slideshow_period = period;
        self
    }

    /// Current widgets demo state, if the demo is on screen.
    pub fn widgets_demo(&self) -> Option<&WidgetsDemo> {
        match &self.screen {
            Screen::Widgets(demo) => Some(demo),
            _ => None,
        }
    }

    /// Number of registered input devices.
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// Timer handler with an explicit clock, used by `timer_handler`.
    pub fn timer_handler_at(&mut self, now: Instant) -> Duration {
        let mut fired = Vec::new();
        for timer in &mut self.timers {
            if now >= timer.next_due {
                fired.push(timer.kind);
                timer.next_due = now + timer.period;
            }
        }
        for kind in fired {
            self.fire(kind);
        }

        self.redraw();

        self.timers
            .iter()
            .map(|t| t.next_due.saturating_duration_since(now))
            .min()
            .unwrap_or(IDLE_PERIOD)
    }

    fn fire(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::Slideshow => {
                if let Screen::Widgets(demo) = &mut self.screen {
                    demo.next_slide();
                    debug!(slide = demo.slide(), "Slideshow advanced");
                    self.invalidated = true;
                }
            }
        }
    }

    fn redraw(&mut self) {
        if !self.invalidated {
            return;
        }
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        // Surface drawing is infallible.
        let _ = match &self.screen {
            Screen::Empty => Ok(()),
            Screen::Widgets(demo) => demo.draw(surface),
            Screen::HelloLabel => draw_hello_label(surface),
        };
        surface.mark_dirty();
        self.invalidated = false;
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(ToolkitError::NotInitialized)
        }
    }
}

impl Toolkit for SoftToolkit {
    fn version(&self) -> ToolkitVersion {
        ToolkitVersion::current()
    }

    fn init(&mut self) -> Result<()> {
        if self.initialized {
            return Err(ToolkitError::AlreadyInitialized);
        }
        self.initialized = true;
        info!(version = %self.version(), "Toolkit initialized");
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[instrument(skip(self))]
    fn create_display(&mut self, width: i32, height: i32) -> Result<DisplayId> {
        self.ensure_initialized()?;
        if let Some(surface) = &self.surface {
            return Err(ToolkitError::DisplayExists {
                width: surface.width(),
                height: surface.height(),
            });
        }
        if width <= 0 || height <= 0 {
            return Err(ToolkitError::InvalidGeometry { width, height });
        }
        let surface = Surface::try_new(width as u32, height as u32)
            .ok_or(ToolkitError::InvalidGeometry { width, height })?;

        self.surface = Some(surface);
        self.invalidated = true;
        info!("Display created");
        Ok(DisplayId(0))
    }

    fn register_input(&mut self, kind: InputKind) -> Result<InputId> {
        self.ensure_initialized()?;
        self.inputs.push(kind);
        let id = InputId(self.inputs.len() as u32 - 1);
        info!(input = id.0, kind = ?kind, "Input device registered");
        Ok(id)
    }

    fn feed_input(&mut self, input: InputId, event: InputEvent) {
        if self.inputs.get(input.0 as usize).is_none() {
            debug!(input = input.0, "Event from unknown input device dropped");
            return;
        }
        let size = match &self.surface {
            Some(surface) => Size::new(surface.width(), surface.height()),
            None => return,
        };
        if let Screen::Widgets(demo) = &mut self.screen {
            let changed = match event {
                InputEvent::Key(key) => demo.handle_key(key),
                InputEvent::Pointer { x, y, pressed } => demo.handle_pointer(x, y, pressed, size),
            };
            self.invalidated |= changed;
        }
    }

    #[instrument(skip(self))]
    fn create_content(&mut self, content: Content) -> Result<()> {
        self.ensure_initialized()?;
        if self.surface.is_none() {
            return Err(ToolkitError::NoDisplay);
        }

        self.screen = match content {
            Content::WidgetsDemo => {
                self.timers.push(Timer {
                    kind: TimerKind::Slideshow,
                    period: self.slideshow_period,
                    next_due: Instant::now() + self.slideshow_period,
                });
                Screen::Widgets(WidgetsDemo::new())
            }
            Content::HelloLabel => Screen::HelloLabel,
        };
        self.invalidated = true;
        self.redraw();
        info!("Content created");
        Ok(())
    }

    fn timer_handler(&mut self) -> Duration {
        self.timer_handler_at(Instant::now())
    }

    fn take_dirty_frame(&mut self) -> Option<Frame<'_>> {
        let surface = self.surface.as_mut()?;
        if surface.take_dirty() {
            Some(surface.frame())
        } else {
            None
        }
    }

    fn frame(&self) -> Option<Frame<'_>> {
        self.surface.as_ref().map(Surface::frame)
    }
}
