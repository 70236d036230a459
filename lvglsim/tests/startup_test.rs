//! Integration tests for simulator startup.
//!
//! These tests drive the orchestrator with the headless backend and mock
//! backends, so no display or input device is needed.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use lvglsim::{Args, Mode, Orchestrator, Settings, Stage, StartupError};
use lvglsim_backends::{
    BackendError, BackendOptions, BackendRegistry, ExitReason, MockBackend, ShutdownFlag,
};
use lvglsim_toolkit::{SoftToolkit, Toolkit, ToolkitError};

fn settings_from(argv: &[&str]) -> Settings {
    let args = Args::try_parse_from(std::iter::once("lvglsim").chain(argv.iter().copied())).unwrap();
    Settings::resolve(&args, |_| None).unwrap()
}

fn builtin_registry() -> BackendRegistry {
    BackendRegistry::with_builtin(&BackendOptions::default())
}

fn fast(mut settings: Settings) -> Settings {
    settings.frame_interval_ms = 1;
    settings
}

/// `lvglsim -b Headless -W 320 -H 240` starts and enters the run loop.
#[test]
fn test_headless_scenario() {
    let settings = settings_from(&["-b", "Headless", "-W", "320", "-H", "240"]);
    assert_eq!(settings.window_width, 320);
    assert_eq!(settings.window_height, 240);
    assert_eq!(settings.backend.as_deref(), Some("Headless"));

    let registry = builtin_registry();
    let mut toolkit = SoftToolkit::new();
    let run_loop = Orchestrator::new(&registry, Mode::Interactive)
        .prepare(&settings, &mut toolkit, &mut Vec::new())
        .unwrap();

    assert_eq!(run_loop.active().primary().name(), "Headless");
    assert!(run_loop.active().overlay().is_none());
    let frame = toolkit.frame().unwrap();
    assert_eq!((frame.width, frame.height), (320, 240));
    assert!(toolkit.widgets_demo().is_some());
}

/// The run loop returns once a shutdown is requested.
#[test]
fn test_headless_run_until_signal() {
    let settings = fast(settings_from(&["-b", "Headless"]));
    let registry = builtin_registry();
    let shutdown = ShutdownFlag::new();
    shutdown.request();

    let mut toolkit = SoftToolkit::new();
    let summary = Orchestrator::new(&registry, Mode::Interactive)
        .with_shutdown(shutdown)
        .run(&settings, &mut toolkit)
        .unwrap();
    assert_eq!(summary.reason, ExitReason::Signal);
}

/// `lvglsim -b Nonexistent` fails before the toolkit is touched.
#[test]
fn test_unknown_backend_is_fatal() {
    let settings = settings_from(&["-b", "Nonexistent"]);
    let registry = builtin_registry();
    let mut toolkit = SoftToolkit::new();

    let err = Orchestrator::new(&registry, Mode::Interactive)
        .prepare(&settings, &mut toolkit, &mut Vec::new())
        .err()
        .unwrap();

    assert_eq!(err.to_string(), "no such backend: Nonexistent");
    assert_eq!(err.stage(), Stage::Validate);
    assert!(!toolkit.is_initialized());
}

/// Backend names are matched exactly.
#[test]
fn test_backend_name_is_case_sensitive() {
    let settings = settings_from(&["-b", "headless"]);
    let registry = builtin_registry();
    let mut toolkit = SoftToolkit::new();

    let err = Orchestrator::new(&registry, Mode::Interactive)
        .prepare(&settings, &mut toolkit, &mut Vec::new())
        .err()
        .unwrap();
    assert_eq!(err.to_string(), "no such backend: headless");
}

#[test]
fn test_input_only_backend_cannot_be_primary() {
    let mut registry = BackendRegistry::new();
    registry.register(Arc::new(MockBackend::display("Screen")));
    registry.register(Arc::new(MockBackend::input("Keys")));

    let settings = settings_from(&["-b", "Keys"]);
    let mut toolkit = SoftToolkit::new();
    let err = Orchestrator::new(&registry, Mode::Interactive)
        .prepare(&settings, &mut toolkit, &mut Vec::new())
        .err()
        .unwrap();

    assert_eq!(err.to_string(), "backend Keys cannot drive a display");
    assert!(!toolkit.is_initialized());
}

#[test]
fn test_default_backend_uses_first_usable_display() {
    let mut registry = BackendRegistry::new();
    registry.register(Arc::new(MockBackend::input("Keys")));
    registry.register(Arc::new(MockBackend::display("Missing").with_probe(false)));
    registry.register(Arc::new(MockBackend::display("Screen")));

    let settings = settings_from(&[]);
    let mut toolkit = SoftToolkit::new();
    let run_loop = Orchestrator::new(&registry, Mode::Interactive)
        .prepare(&settings, &mut toolkit, &mut Vec::new())
        .unwrap();

    assert_eq!(run_loop.active().primary().name(), "Screen");
    let frame = toolkit.frame().unwrap();
    assert_eq!((frame.width, frame.height), (800, 480));
}

/// Every display backend accepts the input overlay.
#[test]
fn test_overlay_with_every_primary() {
    let mut registry = BackendRegistry::new();
    registry.register(Arc::new(MockBackend::display("Alpha")));
    registry.register(Arc::new(MockBackend::display("Beta")));
    registry.register(Arc::new(
        lvglsim_backends::HeadlessBackend::new(),
    ));
    registry.register(Arc::new(MockBackend::input("Keys")));

    for primary in ["Alpha", "Beta", "Headless"] {
        let settings = settings_from(&["-b", primary]);
        let mut toolkit = SoftToolkit::new();
        let run_loop = Orchestrator::new(&registry, Mode::Interactive)
            .with_overlay(Some("Keys".to_string()))
            .prepare(&settings, &mut toolkit, &mut Vec::new())
            .unwrap();

        assert_eq!(run_loop.active().primary().name(), primary);
        assert_eq!(run_loop.active().overlay().map(|o| o.name()), Some("Keys"));
        assert_eq!(run_loop.active().len(), 2);
        assert_eq!(toolkit.input_count(), 1);
    }
}

#[test]
fn test_primary_init_failure_is_fatal() {
    let screen = MockBackend::display("Screen").failing_init();
    let stats = screen.stats();
    let mut registry = BackendRegistry::new();
    registry.register(Arc::new(screen));

    let settings = settings_from(&["-b", "Screen"]);
    let mut toolkit = SoftToolkit::new();
    let err = Orchestrator::new(&registry, Mode::Interactive)
        .prepare(&settings, &mut toolkit, &mut Vec::new())
        .err()
        .unwrap();

    assert_eq!(err.stage(), Stage::PrimaryInit);
    assert_eq!(stats.inits(), 1);
    assert!(toolkit.is_initialized());
    assert!(toolkit.frame().is_none());
    assert!(toolkit.widgets_demo().is_none());
}

#[test]
fn test_invalid_geometry_fails_primary_init() {
    let settings = settings_from(&["-b", "Headless", "-W", "0"]);
    let registry = builtin_registry();
    let mut toolkit = SoftToolkit::new();

    let err = Orchestrator::new(&registry, Mode::Interactive)
        .prepare(&settings, &mut toolkit, &mut Vec::new())
        .err()
        .unwrap();

    assert!(matches!(
        err,
        StartupError::PrimaryInit(BackendError::Toolkit(ToolkitError::InvalidGeometry {
            width: 0,
            height: 480
        }))
    ));
}

#[test]
fn test_oversized_window_fails_primary_init() {
    let settings = settings_from(&["-b", "Headless", "-W", "2147483647", "-H", "2147483647"]);
    let registry = builtin_registry();
    let mut toolkit = SoftToolkit::new();

    let err = Orchestrator::new(&registry, Mode::Interactive)
        .prepare(&settings, &mut toolkit, &mut Vec::new())
        .err()
        .unwrap();

    assert!(matches!(
        err,
        StartupError::PrimaryInit(BackendError::Toolkit(ToolkitError::InvalidGeometry {
            width: i32::MAX,
            height: i32::MAX
        }))
    ));
    assert!(toolkit.frame().is_none());
}

#[test]
fn test_overlay_init_failure_is_fatal() {
    let screen = MockBackend::display("Screen");
    let screen_stats = screen.stats();
    let mut registry = BackendRegistry::new();
    registry.register(Arc::new(screen));
    registry.register(Arc::new(MockBackend::input("Keys").failing_init()));

    let settings = settings_from(&["-b", "Screen"]);
    let mut toolkit = SoftToolkit::new();
    let err = Orchestrator::new(&registry, Mode::Interactive)
        .with_overlay(Some("Keys".to_string()))
        .prepare(&settings, &mut toolkit, &mut Vec::new())
        .err()
        .unwrap();

    assert_eq!(err.stage(), Stage::SecondaryInit);
    assert!(toolkit.widgets_demo().is_none());
    assert_eq!(screen_stats.inits(), 1);
    assert_eq!(screen_stats.shutdowns(), 1);
}

#[test]
fn test_run_until_backend_quits() {
    let screen = MockBackend::display("Screen").quit_after(3);
    let keys = MockBackend::input("Keys");
    let (screen_stats, key_stats) = (screen.stats(), keys.stats());
    let mut registry = BackendRegistry::new();
    registry.register(Arc::new(screen));
    registry.register(Arc::new(keys));

    let settings = fast(settings_from(&["-b", "Screen"]));
    let mut toolkit = SoftToolkit::new().with_slideshow_period(Duration::from_secs(60));
    let summary = Orchestrator::new(&registry, Mode::Interactive)
        .with_overlay(Some("Keys".to_string()))
        .run(&settings, &mut toolkit)
        .unwrap();

    assert_eq!(summary.reason, ExitReason::BackendQuit("Screen".to_string()));
    assert!(screen_stats.presents() >= 1);
    assert_eq!(key_stats.pumps(), 2);
    assert_eq!(screen_stats.shutdowns(), 1);
    assert_eq!(key_stats.shutdowns(), 1);
    // The overlay fed Key::Right twice
    assert_eq!(toolkit.widgets_demo().unwrap().slide(), 2);
}

#[test]
fn test_diagnostic_dumps_draw_buffer() {
    let mut settings = Settings::diagnostic();
    settings.backend = Some("Headless".to_string());
    let registry = builtin_registry();
    let mut toolkit = SoftToolkit::new();
    let mut out = Vec::new();

    Orchestrator::new(&registry, Mode::Diagnostic)
        .prepare(&settings, &mut toolkit, &mut out)
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("=== DRAW BUFFER (128x64) ==="));
    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), 64);
    assert!(rows.iter().all(|row| row.len() == 128));
    assert!(rows.iter().any(|row| row.contains('*')));
    assert!(toolkit.widgets_demo().is_none());
}

#[test]
fn test_interactive_mode_writes_nothing() {
    let settings = settings_from(&["-b", "Headless"]);
    let registry = builtin_registry();
    let mut toolkit = SoftToolkit::new();
    let mut out = Vec::new();

    Orchestrator::new(&registry, Mode::Interactive)
        .prepare(&settings, &mut toolkit, &mut out)
        .unwrap();
    assert!(out.is_empty());
}
