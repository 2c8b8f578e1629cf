//! Where Mapscribe keeps its files.
//!
//! Development runs (`cargo run`, debug builds) keep everything next to the working
//! directory. Installed builds use the platform directories from `dirs`, under a
//! `mapscribe` folder.

use std::path::PathBuf;

const APP_DIR_NAME: &str = "mapscribe";
const CONFIG_FILE_NAME: &str = "config.json";

/// True under `cargo run` or in debug builds.
pub fn is_dev_mode() -> bool {
    std::env::var("CARGO").is_ok() || cfg!(debug_assertions)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppDir {
    /// `config.json` lives here (`~/.config/mapscribe` on Linux)
    Config,
    /// Application data root
    Data,
    Logs,
    /// Default destination for image exports
    Exports,
}

impl AppDir {
    fn dev_path(&self) -> PathBuf {
        match self {
            AppDir::Config | AppDir::Data => PathBuf::from("."),
            AppDir::Logs => PathBuf::from("logs"),
            AppDir::Exports => PathBuf::from("exports"),
        }
    }

    fn installed_path(&self) -> Option<PathBuf> {
        let data = || dirs::data_dir().map(|p| p.join(APP_DIR_NAME));
        match self {
            #[cfg(target_os = "linux")]
            AppDir::Config => dirs::config_dir().map(|p| p.join(APP_DIR_NAME)),
            #[cfg(not(target_os = "linux"))]
            AppDir::Config => data(),
            AppDir::Data => data(),
            AppDir::Logs => data().map(|p| p.join("logs")),
            AppDir::Exports => dirs::picture_dir().or_else(|| data().map(|p| p.join("exports"))),
        }
    }

    /// Resolve for the current run mode, falling back to the dev location.
    pub fn path(&self) -> PathBuf {
        if is_dev_mode() {
            return self.dev_path();
        }
        self.installed_path().unwrap_or_else(|| self.dev_path())
    }
}

pub fn config_file() -> PathBuf {
    AppDir::Config.path().join(CONFIG_FILE_NAME)
}

pub fn logs_dir() -> PathBuf {
    AppDir::Logs.path()
}

pub fn exports_dir() -> PathBuf {
    AppDir::Exports.path()
}

/// Create the config, data and log directories for installed builds.
pub fn ensure_directories() -> std::io::Result<()> {
    if is_dev_mode() {
        return Ok(());
    }
    for dir in [AppDir::Config, AppDir::Data, AppDir::Logs] {
        std::fs::create_dir_all(dir.path())?;
    }
    Ok(())
}
