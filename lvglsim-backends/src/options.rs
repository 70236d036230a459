//! Per-backend options from the config file and environment.

use std::path::PathBuf;

use serde::Deserialize;

/// Environment variable overriding the framebuffer device.
pub const FBDEV_DEVICE_ENV: &str = "LV_LINUX_FBDEV_DEVICE";

/// Environment variable selecting the evdev device.
pub const EVDEV_DEVICE_ENV: &str = "LV_LINUX_EVDEV_POINTER_DEVICE";

/// Options for all built-in backends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BackendOptions {
    pub fbdev: FbdevOptions,
    pub evdev: EvdevOptions,
    pub terminal: TerminalOptions,
}

impl BackendOptions {
    /// Apply device overrides from the environment.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(device) = lookup(FBDEV_DEVICE_ENV).filter(|v| !v.is_empty()) {
            self.fbdev.device = PathBuf::from(device);
        }
        if let Some(device) = lookup(EVDEV_DEVICE_ENV).filter(|v| !v.is_empty()) {
            self.evdev.device = Some(PathBuf::from(device));
        }
        self
    }
}

/// Framebuffer backend options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FbdevOptions {
    /// Framebuffer device node
    pub device: PathBuf,
}

impl Default for FbdevOptions {
    fn default() -> Self {
        Self {
            device: PathBuf::from("/dev/fb0"),
        }
    }
}

/// Evdev backend options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EvdevOptions {
    /// Input device node; discovered under /dev/input when unset
    pub device: Option<PathBuf>,
}

/// Terminal backend options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TerminalOptions {
    /// Pixels covered by one character cell horizontally
    pub cell_width: u32,
    /// Pixels covered by one character cell vertically
    pub cell_height: u32,
}

impl Default for TerminalOptions {
    fn default() -> Self {
        Self {
            cell_width: 8,
            cell_height: 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = BackendOptions::default();
        assert_eq!(options.fbdev.device, PathBuf::from("/dev/fb0"));
        assert_eq!(options.evdev.device, None);
        assert_eq!(options.terminal.cell_width, 8);
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = "fbdev:\n  device: /dev/fb1\n";
        let options: BackendOptions = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(options.fbdev.device, PathBuf::from("/dev/fb1"));
        assert_eq!(options.terminal, TerminalOptions::default());
    }

    #[test]
    fn test_env_overrides() {
        let options = BackendOptions::default().with_env_overrides(|key| match key {
            FBDEV_DEVICE_ENV => Some("/dev/fb2".to_string()),
            EVDEV_DEVICE_ENV => Some("/dev/input/event4".to_string()),
            _ => None,
        });
        assert_eq!(options.fbdev.device, PathBuf::from("/dev/fb2"));
        assert_eq!(options.evdev.device, Some(PathBuf::from("/dev/input/event4")));
    }

    #[test]
    fn test_empty_env_is_ignored() {
        let options =
            BackendOptions::default().with_env_overrides(|_| Some(String::new()));
        assert_eq!(options, BackendOptions::default());
    }
}
