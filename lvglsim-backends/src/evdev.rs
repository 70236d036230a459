//! Evdev input backend.
//!
//! Reads a Linux input device on a background thread and feeds pointer or
//! keypad events into the toolkit. Never drives a display; it runs next to
//! a display backend as an input overlay.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use evdev::{AbsoluteAxisType, Device, InputEventKind, RelativeAxisType};
use lvglsim_toolkit::{InputEvent, InputId, InputKind, Key, Toolkit};
use tracing::{debug, error, info, warn};

use crate::error::{BackendError, Result};
use crate::options::EvdevOptions;
use crate::traits::{ActiveBackend, Backend, BackendKind, DisplaySettings, LoopControl};

pub const EVDEV_NAME: &str = "EVDEV";

const INPUT_DIR: &str = "/dev/input";

/// Descriptor for the evdev backend.
#[derive(Debug, Clone)]
pub struct EvdevBackend {
    options: EvdevOptions,
}

impl EvdevBackend {
    pub fn new(options: EvdevOptions) -> Self {
        Self { options }
    }

    /// Configured device, or the first pointer or keyboard under /dev/input.
    fn device_path(&self) -> Option<PathBuf> {
        match &self.options.device {
            Some(path) => Some(path.clone()),
            None => discover_device(Path::new(INPUT_DIR)),
        }
    }
}

impl Backend for EvdevBackend {
    fn name(&self) -> &'static str {
        EVDEV_NAME
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Input
    }

    fn probe(&self) -> bool {
        self.device_path().map(|p| p.exists()).unwrap_or(false)
    }

    fn init(
        &self,
        toolkit: &mut dyn Toolkit,
        window: &DisplaySettings,
    ) -> Result<Box<dyn ActiveBackend>> {
        let path = self.device_path().ok_or_else(|| BackendError::Unavailable {
            name: EVDEV_NAME.to_string(),
            reason: format!("no input device found under {INPUT_DIR}"),
        })?;
        let device = Device::open(&path).map_err(|source| BackendError::DeviceOpen {
            device: path.clone(),
            source,
        })?;

        let kind = if is_pointer(&device) {
            InputKind::Pointer
        } else {
            InputKind::Keypad
        };
        let input = toolkit.register_input(kind)?;

        info!(
            device = %path.display(),
            name = device.name().unwrap_or("unknown"),
            kind = ?kind,
            "Evdev input ready"
        );

        let (tx, rx) = mpsc::channel();
        let bounds = (window.width.max(1) - 1, window.height.max(1) - 1);
        let (range_x, range_y) = axis_ranges(&device);
        debug!(?range_x, ?range_y, "Absolute axis ranges");
        let pointer = PointerState::new(bounds).with_ranges(range_x, range_y);
        spawn_reader(device, pointer, tx)?;

        Ok(Box::new(EvdevInput {
            input,
            rx,
            lost: false,
        }))
    }
}

/// Initialized evdev input.
pub struct EvdevInput {
    input: InputId,
    rx: Receiver<InputEvent>,
    lost: bool,
}

impl ActiveBackend for EvdevInput {
    fn name(&self) -> &str {
        EVDEV_NAME
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Input
    }

    fn pump(&mut self, toolkit: &mut dyn Toolkit) -> Result<LoopControl> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => toolkit.feed_input(self.input, event),
                Err(TryRecvError::Empty) => return Ok(LoopControl::Continue),
                Err(TryRecvError::Disconnected) => {
                    // Losing the device only loses input; the display keeps running
                    if !self.lost {
                        warn!("Evdev device lost, continuing without input");
                        self.lost = true;
                    }
                    return Ok(LoopControl::Continue);
                }
            }
        }
    }
}

fn is_pointer(device: &Device) -> bool {
    let relative = device
        .supported_relative_axes()
        .map(|axes| axes.contains(RelativeAxisType::REL_X))
        .unwrap_or(false);
    let absolute = device
        .supported_absolute_axes()
        .map(|axes| axes.contains(AbsoluteAxisType::ABS_X))
        .unwrap_or(false);
    relative || absolute
}

fn is_keyboard(device: &Device) -> bool {
    device
        .supported_keys()
        .map(|keys| keys.contains(evdev::Key::KEY_ENTER) && keys.contains(evdev::Key::KEY_ESC))
        .unwrap_or(false)
}

/// Ranges of the X and Y axes, from ABS_X/ABS_Y or their multitouch variants.
fn axis_ranges(device: &Device) -> (Option<AxisRange>, Option<AxisRange>) {
    let Ok(state) = device.get_abs_state() else {
        return (None, None);
    };
    let range = |axis: AbsoluteAxisType| {
        state
            .get(axis.0 as usize)
            .map(|info| AxisRange {
                min: info.minimum,
                max: info.maximum,
            })
            .filter(|range| range.max > range.min)
    };
    (
        range(AbsoluteAxisType::ABS_X).or_else(|| range(AbsoluteAxisType::ABS_MT_POSITION_X)),
        range(AbsoluteAxisType::ABS_Y).or_else(|| range(AbsoluteAxisType::ABS_MT_POSITION_Y)),
    )
}

/// First pointer device under `dir`, else the first keyboard.
fn discover_device(dir: &Path) -> Option<PathBuf> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with("event"))
                .unwrap_or(false)
        })
        .collect();
    entries.sort();

    let mut keyboard = None;
    for path in entries {
        match Device::open(&path) {
            Ok(device) if is_pointer(&device) => return Some(path),
            Ok(device) if keyboard.is_none() && is_keyboard(&device) => keyboard = Some(path),
            Ok(_) => {}
            Err(e) => debug!(path = %path.display(), error = %e, "Failed to open input device"),
        }
    }
    keyboard
}

fn spawn_reader(mut device: Device, mut pointer: PointerState, tx: Sender<InputEvent>) -> Result<()> {
    thread::Builder::new()
        .name("evdev-reader".to_string())
        .spawn(move || {
            let mut failures = 0u32;

            loop {
                match device.fetch_events() {
                    Ok(events) => {
                        failures = 0;
                        for event in events {
                            let translated = match event.kind() {
                                InputEventKind::Key(key) => {
                                    if pointer.button(key, event.value()) || event.value() != 1 {
                                        None
                                    } else {
                                        map_key(key).map(InputEvent::Key)
                                    }
                                }
                                InputEventKind::RelAxis(axis) => {
                                    pointer.relative(axis, event.value());
                                    None
                                }
                                InputEventKind::AbsAxis(axis) => {
                                    pointer.absolute(axis, event.value());
                                    None
                                }
                                InputEventKind::Synchronization(_) => pointer.sync(),
                                _ => None,
                            };
                            if let Some(event) = translated {
                                if tx.send(event).is_err() {
                                    return;
                                }
                            }
                        }
                    }
                    Err(e) => {
                        failures += 1;
                        error!(error = %e, "Error reading evdev events");
                        if failures >= 10 {
                            // Dropping tx tells the pump the device is gone
                            return;
                        }
                        thread::sleep(Duration::from_millis(100));
                    }
                }
            }
        })?;
    Ok(())
}

/// Value range the device reports for one absolute axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AxisRange {
    min: i32,
    max: i32,
}

impl AxisRange {
    /// Map `value` from this range onto `0..=bound`.
    fn scale(self, value: i32, bound: i32) -> i32 {
        let span = i64::from(self.max) - i64::from(self.min);
        if span <= 0 {
            return value;
        }
        let offset = (i64::from(value) - i64::from(self.min)).clamp(0, span);
        (offset * i64::from(bound) / span) as i32
    }
}

/// Accumulates pointer motion and buttons between SYN reports.
#[derive(Debug)]
struct PointerState {
    x: i32,
    y: i32,
    pressed: bool,
    bounds: (i32, i32),
    range_x: Option<AxisRange>,
    range_y: Option<AxisRange>,
    changed: bool,
}

impl PointerState {
    fn new(bounds: (i32, i32)) -> Self {
        Self {
            x: 0,
            y: 0,
            pressed: false,
            bounds,
            range_x: None,
            range_y: None,
            changed: false,
        }
    }

    /// Absolute axes are scaled from these ranges; without one they are clamped.
    fn with_ranges(mut self, range_x: Option<AxisRange>, range_y: Option<AxisRange>) -> Self {
        self.range_x = range_x;
        self.range_y = range_y;
        self
    }

    fn relative(&mut self, axis: RelativeAxisType, value: i32) {
        match axis {
            RelativeAxisType::REL_X => self.move_to(self.x + value, self.y),
            RelativeAxisType::REL_Y => self.move_to(self.x, self.y + value),
            _ => {}
        }
    }

    fn absolute(&mut self, axis: AbsoluteAxisType, value: i32) {
        match axis {
            AbsoluteAxisType::ABS_X | AbsoluteAxisType::ABS_MT_POSITION_X => {
                let x = self.range_x.map_or(value, |r| r.scale(value, self.bounds.0));
                self.move_to(x, self.y)
            }
            AbsoluteAxisType::ABS_Y | AbsoluteAxisType::ABS_MT_POSITION_Y => {
                let y = self.range_y.map_or(value, |r| r.scale(value, self.bounds.1));
                self.move_to(self.x, y)
            }
            _ => {}
        }
    }

    /// Returns true when `key` is a pointer button.
    fn button(&mut self, key: evdev::Key, value: i32) -> bool {
        if key != evdev::Key::BTN_LEFT && key != evdev::Key::BTN_TOUCH {
            return false;
        }
        self.pressed = value != 0;
        self.changed = true;
        true
    }

    fn sync(&mut self) -> Option<InputEvent> {
        if !self.changed {
            return None;
        }
        self.changed = false;
        Some(InputEvent::Pointer {
            x: self.x,
            y: self.y,
            pressed: self.pressed,
        })
    }

    fn move_to(&mut self, x: i32, y: i32) {
        self.x = x.clamp(0, self.bounds.0);
        self.y = y.clamp(0, self.bounds.1);
        self.changed = true;
    }
}

/// Keyboard keys the toolkit understands.
fn map_key(key: evdev::Key) -> Option<Key> {
    use evdev::Key as K;
    let mapped = match key {
        K::KEY_UP => Key::Up,
        K::KEY_DOWN => Key::Down,
        K::KEY_LEFT => Key::Left,
        K::KEY_RIGHT => Key::Right,
        K::KEY_ENTER | K::KEY_KPENTER => Key::Enter,
        K::KEY_ESC => Key::Escape,
        K::KEY_TAB => Key::Tab,
        K::KEY_BACKSPACE => Key::Backspace,
        K::KEY_SPACE => Key::Char(' '),
        _ => return map_letter(key).map(Key::Char),
    };
    Some(mapped)
}

fn map_letter(key: evdev::Key) -> Option<char> {
    use evdev::Key as K;
    const LETTERS: [(evdev::Key, char); 10] = [
        (K::KEY_A, 'a'),
        (K::KEY_D, 'd'),
        (K::KEY_E, 'e'),
        (K::KEY_H, 'h'),
        (K::KEY_J, 'j'),
        (K::KEY_K, 'k'),
        (K::KEY_L, 'l'),
        (K::KEY_Q, 'q'),
        (K::KEY_S, 's'),
        (K::KEY_W, 'w'),
    ];
    LETTERS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, c)| *c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_navigation_keys() {
        assert_eq!(map_key(evdev::Key::KEY_RIGHT), Some(Key::Right));
        assert_eq!(map_key(evdev::Key::KEY_KPENTER), Some(Key::Enter));
        assert_eq!(map_key(evdev::Key::KEY_Q), Some(Key::Char('q')));
        assert_eq!(map_key(evdev::Key::KEY_F12), None);
    }

    #[test]
    fn test_pointer_reports_on_sync_only() {
        let mut pointer = PointerState::new((99, 49));
        assert_eq!(pointer.sync(), None);

        pointer.relative(RelativeAxisType::REL_X, 10);
        pointer.relative(RelativeAxisType::REL_Y, 5);
        assert!(pointer.button(evdev::Key::BTN_LEFT, 1));
        assert_eq!(
            pointer.sync(),
            Some(InputEvent::Pointer {
                x: 10,
                y: 5,
                pressed: true
            })
        );
        assert_eq!(pointer.sync(), None);
    }

    #[test]
    fn test_pointer_clamped_to_display() {
        let mut pointer = PointerState::new((99, 49));
        pointer.relative(RelativeAxisType::REL_X, -20);
        pointer.absolute(AbsoluteAxisType::ABS_Y, 500);
        assert_eq!(
            pointer.sync(),
            Some(InputEvent::Pointer {
                x: 0,
                y: 49,
                pressed: false
            })
        );
    }

    #[test]
    fn test_touchscreen_axes_scaled_to_display() {
        let range = AxisRange { min: 0, max: 4095 };
        let mut pointer = PointerState::new((799, 479)).with_ranges(Some(range), Some(range));

        pointer.absolute(AbsoluteAxisType::ABS_X, 4095);
        pointer.absolute(AbsoluteAxisType::ABS_Y, 2048);
        assert_eq!(
            pointer.sync(),
            Some(InputEvent::Pointer {
                x: 799,
                y: 239,
                pressed: false
            })
        );

        pointer.absolute(AbsoluteAxisType::ABS_MT_POSITION_X, 0);
        pointer.absolute(AbsoluteAxisType::ABS_MT_POSITION_Y, 9000);
        assert_eq!(
            pointer.sync(),
            Some(InputEvent::Pointer {
                x: 0,
                y: 479,
                pressed: false
            })
        );
    }

    #[test]
    fn test_axis_range_with_negative_minimum() {
        let range = AxisRange { min: -100, max: 100 };
        assert_eq!(range.scale(-100, 200), 0);
        assert_eq!(range.scale(0, 200), 100);
        assert_eq!(range.scale(100, 200), 200);
        assert_eq!(range.scale(-500, 200), 0);
    }

    #[test]
    fn test_keyboard_keys_do_not_touch_pointer() {
        let mut pointer = PointerState::new((99, 49));
        assert!(!pointer.button(evdev::Key::KEY_ENTER, 1));
        assert_eq!(pointer.sync(), None);
    }

    #[test]
    fn test_missing_configured_device() {
        let backend = EvdevBackend::new(EvdevOptions {
            device: Some(PathBuf::from("/nonexistent/event99")),
        });
        assert!(!backend.probe());

        let mut toolkit = lvglsim_toolkit::SoftToolkit::new();
        toolkit.init().unwrap();
        let err = backend
            .init(&mut toolkit, &DisplaySettings::default())
            .err()
            .unwrap();
        assert!(matches!(err, BackendError::DeviceOpen { .. }));
        assert_eq!(toolkit.input_count(), 0);
    }
}
