//! Terminal display backend.
//!
//! Draws the toolkit surface as ASCII shading on stdout, one character per
//! cell of `cell_width x cell_height` pixels, and reads navigation keys from
//! stdin. Stdin stays in line mode, so keys arrive when Enter is pressed.
//!
//! Exit conditions: `q`, Ctrl+C or end of input.

use std::io::{self, IsTerminal, Read, Write};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use lvglsim_toolkit::{Frame, InputEvent, InputId, InputKind, Key, Rgb888, RgbColor, Toolkit};
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::options::TerminalOptions;
use crate::traits::{ActiveBackend, Backend, BackendKind, DisplaySettings, LoopControl};

pub const TERMINAL_NAME: &str = "Terminal";

/// Darkest to brightest.
const SHADES: &[u8] = b" .:-=+*#%@";

const CLEAR_SCREEN: &str = "\x1b[2J";
const CURSOR_HOME: &str = "\x1b[H";

/// Descriptor for the terminal backend.
#[derive(Debug, Clone)]
pub struct TerminalBackend {
    options: TerminalOptions,
}

impl TerminalBackend {
    pub fn new(options: TerminalOptions) -> Self {
        Self { options }
    }
}

impl Backend for TerminalBackend {
    fn name(&self) -> &'static str {
        TERMINAL_NAME
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Display
    }

    /// Only picked by default when stdout is an interactive terminal.
    fn probe(&self) -> bool {
        io::stdout().is_terminal()
    }

    fn init(
        &self,
        toolkit: &mut dyn Toolkit,
        window: &DisplaySettings,
    ) -> Result<Box<dyn ActiveBackend>> {
        toolkit.create_display(window.width, window.height)?;
        let keypad = toolkit.register_input(InputKind::Keypad)?;

        let (tx, rx) = mpsc::channel();
        spawn_stdin_reader(tx)?;

        info!(
            columns = window.width.max(0) as u32 / self.options.cell_width.max(1),
            rows = window.height.max(0) as u32 / self.options.cell_height.max(1),
            "Terminal display ready"
        );
        Ok(Box::new(TerminalDisplay {
            options: self.options.clone(),
            keypad,
            rx,
            cleared: false,
        }))
    }
}

/// Events produced by the stdin reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StdinEvent {
    Key(Key),
    Quit,
}

/// Initialized terminal display.
pub struct TerminalDisplay {
    options: TerminalOptions,
    keypad: InputId,
    rx: Receiver<StdinEvent>,
    cleared: bool,
}

impl ActiveBackend for TerminalDisplay {
    fn name(&self) -> &str {
        TERMINAL_NAME
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Display
    }

    fn pump(&mut self, toolkit: &mut dyn Toolkit) -> Result<LoopControl> {
        loop {
            match self.rx.try_recv() {
                Ok(StdinEvent::Key(key)) => toolkit.feed_input(self.keypad, InputEvent::Key(key)),
                Ok(StdinEvent::Quit) => return Ok(LoopControl::Quit),
                Err(TryRecvError::Empty) => return Ok(LoopControl::Continue),
                Err(TryRecvError::Disconnected) => {
                    error!("Stdin reader disconnected");
                    return Ok(LoopControl::Quit);
                }
            }
        }
    }

    fn present(&mut self, frame: &Frame<'_>) -> Result<()> {
        let text = render_ascii(frame, self.options.cell_width, self.options.cell_height);
        let mut out = io::stdout().lock();
        if !self.cleared {
            out.write_all(CLEAR_SCREEN.as_bytes())?;
            self.cleared = true;
        }
        out.write_all(CURSOR_HOME.as_bytes())?;
        out.write_all(text.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    fn shutdown(&mut self) {
        let mut out = io::stdout().lock();
        if let Err(e) = out.write_all(b"\n").and_then(|_| out.flush()) {
            warn!(error = %e, "Failed to restore terminal");
        }
    }
}

/// Downsample a frame into shaded text, one line per cell row.
pub fn render_ascii(frame: &Frame<'_>, cell_width: u32, cell_height: u32) -> String {
    let cell_width = cell_width.max(1);
    let cell_height = cell_height.max(1);
    let columns = frame.width / cell_width;
    let rows = frame.height / cell_height;

    let mut text = String::with_capacity(((columns + 1) * rows) as usize);
    for row in 0..rows {
        for column in 0..columns {
            let mut sum = 0u32;
            let mut count = 0u32;
            for y in row * cell_height..(row + 1) * cell_height {
                for x in column * cell_width..(column + 1) * cell_width {
                    if let Some(pixel) = frame.pixel(x, y) {
                        sum += luma(pixel);
                        count += 1;
                    }
                }
            }
            let level = if count == 0 { 0 } else { sum / count };
            let index = (level as usize * (SHADES.len() - 1)) / 255;
            text.push(SHADES[index] as char);
        }
        text.push('\n');
    }
    text
}

/// Perceived brightness, 0..=255.
fn luma(color: Rgb888) -> u32 {
    (299 * u32::from(color.r()) + 587 * u32::from(color.g()) + 114 * u32::from(color.b())) / 1000
}

/// Spawn a thread reading stdin and translating bytes into events.
fn spawn_stdin_reader(tx: Sender<StdinEvent>) -> Result<()> {
    thread::Builder::new()
        .name("terminal-stdin".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            let mut buffer = [0u8; 64];

            loop {
                match stdin.lock().read(&mut buffer) {
                    Ok(0) => {
                        debug!("Stdin closed");
                        let _ = tx.send(StdinEvent::Quit);
                        return;
                    }
                    Ok(n) => {
                        for event in parse_stdin_input(&buffer[..n]) {
                            if tx.send(event).is_err() {
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "Error reading stdin");
                        thread::sleep(Duration::from_millis(100));
                    }
                }
            }
        })?;
    Ok(())
}

/// Translate a chunk of stdin bytes into events.
fn parse_stdin_input(bytes: &[u8]) -> Vec<StdinEvent> {
    let mut events = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        // Arrow keys: ESC [ A..D
        if bytes[i] == 0x1B && bytes.get(i + 1) == Some(&b'[') {
            let key = match bytes.get(i + 2) {
                Some(b'A') => Some(Key::Up),
                Some(b'B') => Some(Key::Down),
                Some(b'C') => Some(Key::Right),
                Some(b'D') => Some(Key::Left),
                _ => None,
            };
            if let Some(key) = key {
                events.push(StdinEvent::Key(key));
                i += 3;
                continue;
            }
        }

        let event = match bytes[i] {
            // Line endings only terminate the line in cooked mode
            0x0A => None,
            0x0D => Some(StdinEvent::Key(Key::Enter)),
            0x1B => Some(StdinEvent::Key(Key::Escape)),
            0x09 => Some(StdinEvent::Key(Key::Tab)),
            0x7F | 0x08 => Some(StdinEvent::Key(Key::Backspace)),
            0x03 | b'q' => Some(StdinEvent::Quit),
            b'e' => Some(StdinEvent::Key(Key::Enter)),
            b'h' => Some(StdinEvent::Key(Key::Left)),
            b'l' => Some(StdinEvent::Key(Key::Right)),
            b'k' => Some(StdinEvent::Key(Key::Up)),
            b'j' => Some(StdinEvent::Key(Key::Down)),
            b if b.is_ascii_graphic() || b == b' ' => Some(StdinEvent::Key(Key::Char(b as char))),
            _ => None,
        };
        events.extend(event);
        i += 1;
    }

    events
}
