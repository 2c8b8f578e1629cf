mod capture;
mod common;
mod config;
mod constants;
mod editor;
mod legend;
mod map;
mod paths;
pub mod theme;
mod ui;

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use constants::{DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH};

#[cfg(debug_assertions)]
const LOG_FILE_NAME: &str = "mapscribe.log";
#[cfg(debug_assertions)]
const DEFAULT_LOG_FILTER: &str = "info,mapscribe=debug";

/// Mark the start of a run in an existing log file.
#[cfg(debug_assertions)]
fn write_session_header(path: &std::path::Path) {
    use std::io::Write;

    let Ok(mut file) = std::fs::OpenOptions::new().append(true).open(path) else {
        return;
    };
    let rule = "-".repeat(72);
    let started = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    let _ = writeln!(file, "\n{rule}\nmapscribe session {started}\n{rule}");
}

/// Debug builds log to `logs/mapscribe.log` as well as stdout. `RUST_LOG`
/// replaces the default filter.
#[cfg(debug_assertions)]
fn setup_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, EnvFilter};

    let logs_dir = paths::logs_dir();
    if let Err(e) = std::fs::create_dir_all(&logs_dir) {
        eprintln!("Cannot create {}: {}", logs_dir.display(), e);
        return None;
    }
    write_session_header(&logs_dir.join(LOG_FILE_NAME));

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(&logs_dir, LOG_FILE_NAME));
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(fmt::layer().with_writer(std::io::stdout))
        .init();

    Some(guard)
}

#[cfg(not(debug_assertions))]
fn setup_logging() -> Option<()> {
    None
}

fn main() {
    if let Err(e) = paths::ensure_directories() {
        eprintln!("Failed to create app directories: {}", e);
    }

    let log_guard = setup_logging();

    let default_plugins = DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Mapscribe".into(),
            resolution: (DEFAULT_WINDOW_WIDTH as u32, DEFAULT_WINDOW_HEIGHT as u32).into(),
            ..default()
        }),
        ..default()
    });
    let default_plugins = if log_guard.is_some() {
        default_plugins.disable::<LogPlugin>()
    } else {
        default_plugins
    };

    App::new()
        .add_plugins(default_plugins)
        .add_plugins(EguiPlugin::default())
        .add_plugins(config::ConfigPlugin)
        .add_plugins(map::MapPlugin)
        .add_plugins(editor::EditorPlugin)
        .add_plugins(legend::LegendPlugin)
        .add_plugins(capture::CapturePlugin)
        .add_plugins(ui::UiPlugin)
        .run();
}
