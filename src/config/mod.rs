use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{DEFAULT_CAPTURE_DELAY_MS, DEFAULT_HISTORY_CAPACITY};
use crate::map::{BaseLayer, Style};

/// System set for config loading (other plugins can run after this)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigLoaded;

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

fn default_capture_delay_ms() -> u64 {
    DEFAULT_CAPTURE_DELAY_MS
}

fn default_base_layer() -> String {
    BaseLayer::default().id().to_string()
}

/// Application configuration persisted to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfigData {
    /// Maximum entries kept on each of the undo and redo stacks
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// How long controls stay hidden before the frame is captured for image export
    #[serde(default = "default_capture_delay_ms")]
    pub capture_delay_ms: u64,

    /// Base layer identifier shown on startup
    #[serde(default = "default_base_layer")]
    pub base_layer: String,

    /// Style applied to newly drawn features
    #[serde(default)]
    pub default_style: Style,

    /// Last imported or exported map file (remembered for the file dialogs)
    #[serde(default)]
    pub last_snapshot_path: Option<PathBuf>,

    /// Directory image exports are written to
    #[serde(default)]
    pub export_dir: Option<PathBuf>,

    /// Tool activated on startup, by display name
    #[serde(default)]
    pub startup_tool: Option<String>,
}

impl Default for AppConfigData {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            capture_delay_ms: default_capture_delay_ms(),
            base_layer: default_base_layer(),
            default_style: Style::default(),
            last_snapshot_path: None,
            export_dir: None,
            startup_tool: None,
        }
    }
}

impl AppConfigData {
    /// Replace out-of-range values with defaults, returning a note for each fix.
    pub fn sanitize(&mut self) -> Vec<String> {
        let mut fixes = Vec::new();
        if self.history_capacity == 0 {
            fixes.push(format!(
                "history_capacity must be at least 1, using {}",
                DEFAULT_HISTORY_CAPACITY
            ));
            self.history_capacity = DEFAULT_HISTORY_CAPACITY;
        }
        if BaseLayer::from_id(&self.base_layer).is_none() {
            fixes.push(format!(
                "unknown base layer '{}', using {}",
                self.base_layer,
                BaseLayer::default().id()
            ));
            self.base_layer = default_base_layer();
        }
        fixes
    }

    pub fn base_layer(&self) -> BaseLayer {
        BaseLayer::from_id(&self.base_layer).unwrap_or_default()
    }
}

/// Runtime configuration resource
#[derive(Resource)]
pub struct AppConfig {
    /// The persisted configuration data
    pub data: AppConfigData,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Whether config needs to be saved (dirty flag)
    pub dirty: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: AppConfigData::default(),
            config_path: get_config_path(),
            dirty: false,
        }
    }
}

/// Resource for the "map file missing" warning dialog
#[derive(Resource, Default)]
pub struct MissingSnapshotWarning {
    pub show: bool,
    pub path: Option<PathBuf>,
}

/// Resource to notify user when config was reset to defaults
#[derive(Resource, Default)]
pub struct ConfigResetNotification {
    /// Whether to show the notification dialog
    pub show: bool,
    /// The reason for the reset (parse error, read error, etc.)
    pub reason: Option<String>,
}

/// Message to trigger config save
#[derive(Message)]
pub struct SaveConfigRequest;

/// Message to update the last map file path in config
#[derive(Message)]
pub struct UpdateLastSnapshotPathRequest {
    pub path: PathBuf,
}

/// Get the path to the config file (platform-appropriate location)
fn get_config_path() -> PathBuf {
    crate::paths::config_file()
}

/// Result of loading config from disk
struct LoadConfigResult {
    config: AppConfig,
    /// Error message if config was reset to defaults due to an error
    reset_reason: Option<String>,
}

fn parse_config(json: &str) -> Result<(AppConfigData, Vec<String>), serde_json::Error> {
    let mut data: AppConfigData = serde_json::from_str(json)?;
    let fixes = data.sanitize();
    Ok((data, fixes))
}

/// Load configuration from disk
fn load_config() -> LoadConfigResult {
    let config_path = get_config_path();

    let (data, reset_reason) = if config_path.exists() {
        match std::fs::read_to_string(&config_path) {
            Ok(json) => match parse_config(&json) {
                Ok((data, fixes)) if fixes.is_empty() => {
                    info!("Loaded config from {:?}", config_path);
                    (data, None)
                }
                Ok((data, fixes)) => {
                    for fix in &fixes {
                        warn!("Config: {}", fix);
                    }
                    (
                        data,
                        Some(format!("Some settings were invalid: {}", fixes.join("; "))),
                    )
                }
                Err(e) => {
                    warn!("Failed to parse config file: {}", e);
                    (
                        AppConfigData::default(),
                        Some(format!("Configuration file was corrupted: {}", e)),
                    )
                }
            },
            Err(e) => {
                warn!("Failed to read config file: {}", e);
                (
                    AppConfigData::default(),
                    Some(format!("Could not read configuration file: {}", e)),
                )
            }
        }
    } else {
        info!("No config file found, using defaults");
        (AppConfigData::default(), None)
    };

    LoadConfigResult {
        config: AppConfig {
            data,
            config_path,
            dirty: false,
        },
        reset_reason,
    }
}

/// Save configuration to disk
fn save_config(config: &AppConfig) {
    match serde_json::to_string_pretty(&config.data) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&config.config_path, json) {
                error!("Failed to save config: {}", e);
            } else {
                info!("Config saved to {:?}", config.config_path);
            }
        }
        Err(e) => {
            error!("Failed to serialize config: {}", e);
        }
    }
}

/// Startup system to load config from disk into the existing resource
fn load_config_system(
    mut config: ResMut<AppConfig>,
    mut reset_notification: ResMut<ConfigResetNotification>,
) {
    let result = load_config();
    config.data = result.config.data;
    config.config_path = result.config.config_path;
    config.dirty = result.config.dirty;

    // Set notification if config was reset due to an error
    if let Some(reason) = result.reset_reason {
        reset_notification.show = true;
        reset_notification.reason = Some(reason);
    }
}

/// Startup system to check if the last map file still exists
fn check_last_snapshot_exists(
    config: Res<AppConfig>,
    mut warning: ResMut<MissingSnapshotWarning>,
) {
    if let Some(ref path) = config.data.last_snapshot_path
        && !path.exists()
    {
        warning.show = true;
        warning.path = Some(path.clone());
        info!("Last map file no longer exists: {:?}", path);
    }
}

/// System to save config when requested
fn save_config_system(
    mut events: MessageReader<SaveConfigRequest>,
    mut config: ResMut<AppConfig>,
) {
    for _ in events.read() {
        if config.dirty {
            save_config(&config);
            config.dirty = false;
        }
    }
}

/// System to update last map file path
fn update_last_snapshot_path_system(
    mut events: MessageReader<UpdateLastSnapshotPathRequest>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) {
    for event in events.read() {
        if config.data.last_snapshot_path.as_ref() == Some(&event.path) {
            continue;
        }
        config.data.last_snapshot_path = Some(event.path.clone());
        config.dirty = true;
        save_events.write(SaveConfigRequest);
    }
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AppConfig>()
            .init_resource::<MissingSnapshotWarning>()
            .init_resource::<ConfigResetNotification>()
            .add_message::<SaveConfigRequest>()
            .add_message::<UpdateLastSnapshotPathRequest>()
            .add_systems(
                Startup,
                (load_config_system, check_last_snapshot_exists)
                    .chain()
                    .in_set(ConfigLoaded),
            )
            .add_systems(
                Update,
                (
                    save_config_system.run_if(on_message::<SaveConfigRequest>),
                    update_last_snapshot_path_system
                        .run_if(on_message::<UpdateLastSnapshotPathRequest>),
                ),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_data_default() {
        let data = AppConfigData::default();
        assert_eq!(data.history_capacity, 1000);
        assert_eq!(data.capture_delay_ms, 500);
        assert_eq!(data.base_layer, "OpenStreetMap");
        assert!(data.last_snapshot_path.is_none());
        assert!(data.startup_tool.is_none());
    }

    #[test]
    fn test_app_config_data_serialization() {
        let data = AppConfigData {
            history_capacity: 50,
            last_snapshot_path: Some(PathBuf::from("/path/to/map.json")),
            startup_tool: Some("Polygon".to_string()),
            ..AppConfigData::default()
        };

        let json = serde_json::to_string(&data).unwrap();
        let parsed: AppConfigData = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, data);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let (data, fixes) = parse_config(r#"{ "capture_delay_ms": 250 }"#).unwrap();
        assert_eq!(data.capture_delay_ms, 250);
        assert_eq!(data.history_capacity, DEFAULT_HISTORY_CAPACITY);
        assert!(fixes.is_empty());
    }

    #[test]
    fn test_zero_capacity_is_fixed() {
        let (data, fixes) = parse_config(r#"{ "history_capacity": 0 }"#).unwrap();
        assert_eq!(data.history_capacity, DEFAULT_HISTORY_CAPACITY);
        assert_eq!(fixes.len(), 1);
    }

    #[test]
    fn test_unknown_base_layer_is_fixed() {
        let (data, fixes) = parse_config(r#"{ "base_layer": "Watercolor" }"#).unwrap();
        assert_eq!(data.base_layer(), BaseLayer::OpenStreetMap);
        assert_eq!(fixes.len(), 1);
    }

    #[test]
    fn test_missing_snapshot_warning_default() {
        let warning = MissingSnapshotWarning::default();
        assert!(!warning.show);
        assert!(warning.path.is_none());
    }
}
