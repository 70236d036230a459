//! Simulator settings.
//!
//! Layers, lowest to highest: compiled defaults, the YAML file named by
//! `LV_SIM_CONFIG`, environment variables, command-line flags.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use lvglsim_backends::{BackendOptions, DisplaySettings};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::cli::Args;

pub const CONFIG_ENV: &str = "LV_SIM_CONFIG";
pub const WIDTH_ENV: &str = "LV_SIM_WINDOW_WIDTH";
pub const HEIGHT_ENV: &str = "LV_SIM_WINDOW_HEIGHT";

pub const DEFAULT_WIDTH: i32 = 800;
pub const DEFAULT_HEIGHT: i32 = 480;

/// Backend and geometry used by `lvglsim-diag`.
pub const DIAGNOSTIC_BACKEND: &str = "FBDEV";
pub const DIAGNOSTIC_WIDTH: i32 = 128;
pub const DIAGNOSTIC_HEIGHT: i32 = 64;

/// Fully resolved settings. Not modified once startup begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub window_width: i32,
    pub window_height: i32,
    pub fullscreen: bool,
    pub maximize: bool,
    /// Requested backend; `None` picks the default
    pub backend: Option<String>,
    pub frame_interval_ms: u64,
    pub log_level: String,
    pub backends: BackendOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_width: DEFAULT_WIDTH,
            window_height: DEFAULT_HEIGHT,
            fullscreen: false,
            maximize: false,
            backend: None,
            frame_interval_ms: 16,
            log_level: "info".to_string(),
            backends: BackendOptions::default(),
        }
    }
}

/// Config file contents. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub window_width: Option<i32>,
    pub window_height: Option<i32>,
    pub fullscreen: Option<bool>,
    pub maximize: Option<bool>,
    pub backend: Option<String>,
    pub frame_interval_ms: Option<u64>,
    pub log_level: Option<String>,
    pub backends: Option<BackendOptions>,
}

impl FileConfig {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: FileConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }
}

impl Settings {
    /// Resolve settings from the process environment.
    pub fn from_env(args: &Args) -> Result<Self> {
        Self::resolve(args, |key| std::env::var(key).ok())
    }

    /// Resolve settings with an explicit environment lookup.
    pub fn resolve<F>(args: &Args, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(path) = env(CONFIG_ENV).filter(|p| !p.is_empty()) {
            let file = FileConfig::load(&path)?;
            info!(config_path = %path, "Configuration loaded");
            settings = settings.with_file(file);
        }

        let settings = settings.with_env(&env).with_cli_overrides(args);
        debug!(settings = ?settings, "Settings resolved");
        Ok(settings)
    }

    /// Fixed settings for the framebuffer diagnostic.
    pub fn diagnostic() -> Self {
        Self {
            window_width: DIAGNOSTIC_WIDTH,
            window_height: DIAGNOSTIC_HEIGHT,
            backend: Some(DIAGNOSTIC_BACKEND.to_string()),
            ..Self::default()
        }
    }

    /// Apply config file values.
    pub fn with_file(mut self, file: FileConfig) -> Self {
        if let Some(width) = file.window_width {
            self.window_width = width;
        }
        if let Some(height) = file.window_height {
            self.window_height = height;
        }
        if let Some(fullscreen) = file.fullscreen {
            self.fullscreen = fullscreen;
        }
        if let Some(maximize) = file.maximize {
            self.maximize = maximize;
        }
        if file.backend.is_some() {
            self.backend = file.backend;
        }
        if let Some(interval) = file.frame_interval_ms {
            self.frame_interval_ms = interval;
        }
        if let Some(level) = file.log_level {
            self.log_level = level;
        }
        if let Some(backends) = file.backends {
            self.backends = backends;
        }
        self
    }

    /// Apply environment variables. Unparsable dimensions are ignored.
    pub fn with_env<F>(mut self, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(width) = env_dimension(&env, WIDTH_ENV) {
            self.window_width = width;
        }
        if let Some(height) = env_dimension(&env, HEIGHT_ENV) {
            self.window_height = height;
        }
        self.backends = self.backends.with_env_overrides(&env);
        self
    }

    /// Apply command-line flags.
    pub fn with_cli_overrides(mut self, args: &Args) -> Self {
        if let Some(width) = args.width {
            self.window_width = width;
        }
        if let Some(height) = args.height {
            self.window_height = height;
        }
        if args.fullscreen {
            self.fullscreen = true;
        }
        if args.maximize {
            self.maximize = true;
        }
        if let Some(ref backend) = args.backend {
            self.backend = Some(backend.clone());
        }
        self
    }

    pub fn display_settings(&self) -> DisplaySettings {
        DisplaySettings {
            width: self.window_width,
            height: self.window_height,
            fullscreen: self.fullscreen,
            maximize: self.maximize,
        }
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

fn env_dimension<F>(env: &F, key: &str) -> Option<i32>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = env(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = key, value = %raw, "Ignoring non-numeric window dimension");
            None
        }
    }
}
