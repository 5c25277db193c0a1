use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::DEFAULT_SNAP_DISTANCE;
use crate::editor::{CanvasSettings, OverlayColors, SnapSettings};

/// System set for config loading (other plugins can run after this)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigLoaded;

/// Canvas behavior persisted to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfigData {
    pub snapping_enabled: bool,
    /// Snap to the canvas edges
    pub screen_snapping: bool,
    /// Snap to the canvas center
    pub center_snapping: bool,
    /// Snap to the edges of other items
    pub source_snapping: bool,
    pub snap_distance: f32,

    pub overflow_hidden: bool,
    pub overflow_always_visible: bool,
    pub overflow_selection_hidden: bool,

    /// Use the packed colors below instead of the built-in outline colors
    pub override_colors: bool,
    pub select_red: i64,
    pub select_green: i64,
    pub select_blue: i64,

    pub spacing_helpers: bool,
    pub click_through_selected: bool,
}

impl Default for CanvasConfigData {
    fn default() -> Self {
        Self {
            snapping_enabled: true,
            screen_snapping: true,
            center_snapping: false,
            source_snapping: true,
            snap_distance: DEFAULT_SNAP_DISTANCE,
            overflow_hidden: false,
            overflow_always_visible: false,
            overflow_selection_hidden: false,
            override_colors: false,
            select_red: 0xFF0000FF,
            select_green: 0xFF00FF00,
            select_blue: 0xFFFF7F00,
            spacing_helpers: true,
            click_through_selected: true,
        }
    }
}

impl CanvasConfigData {
    /// Settings handed to each canvas.
    pub fn to_settings(&self) -> CanvasSettings {
        let colors = if self.override_colors {
            OverlayColors::from_packed(self.select_red, self.select_green, self.select_blue)
        } else {
            OverlayColors::default()
        };
        CanvasSettings {
            snap: SnapSettings {
                enabled: self.snapping_enabled,
                screen: self.screen_snapping,
                center: self.center_snapping,
                sources: self.source_snapping,
                distance: self.snap_distance,
            },
            click_through_selected: self.click_through_selected,
            overflow_hidden: self.overflow_hidden,
            overflow_always_visible: self.overflow_always_visible,
            overflow_selection_hidden: self.overflow_selection_hidden,
            spacing_helpers: self.spacing_helpers,
            colors,
        }
    }
}

/// Runtime configuration resource
#[derive(Resource)]
pub struct CanvasConfig {
    /// The persisted configuration data
    pub data: CanvasConfigData,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Whether config needs to be saved (dirty flag)
    pub dirty: bool,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            data: CanvasConfigData::default(),
            config_path: crate::paths::config_file(),
            dirty: false,
        }
    }
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

/// Message replacing the canvas configuration
#[derive(Message)]
pub struct UpdateCanvasConfigRequest {
    pub data: CanvasConfigData,
}

/// Result of loading config from disk
struct LoadConfigResult {
    data: CanvasConfigData,
    /// Error message if config was reset to defaults due to an error
    reset_reason: Option<String>,
}

/// Load configuration from `path`, falling back to defaults
fn load_config(path: &Path) -> LoadConfigResult {
    let (data, reset_reason) = if path.exists() {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(data) => {
                    info!("Loaded config from {:?}", path);
                    (data, None)
                }
                Err(e) => {
                    warn!("Failed to parse config file: {}", e);
                    (
                        CanvasConfigData::default(),
                        Some(format!("Configuration file was corrupted: {}", e)),
                    )
                }
            },
            Err(e) => {
                warn!("Failed to read config file: {}", e);
                (
                    CanvasConfigData::default(),
                    Some(format!("Could not read configuration file: {}", e)),
                )
            }
        }
    } else {
        info!("No config file found, using defaults");
        (CanvasConfigData::default(), None)
    };

    LoadConfigResult { data, reset_reason }
}

/// Save configuration to disk
fn save_config(config: &CanvasConfig) {
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
    mut config: ResMut<CanvasConfig>,
    mut reset_notification: ResMut<ConfigResetNotification>,
) {
    let result = load_config(&config.config_path);
    config.data = result.data;
    config.dirty = false;

    // Set notification if config was reset due to an error
    if let Some(reason) = result.reset_reason {
        reset_notification.show = true;
        reset_notification.reason = Some(reason);
    }
}

/// System to save config when requested
fn save_config_system(
    mut events: MessageReader<SaveConfigRequest>,
    mut config: ResMut<CanvasConfig>,
) {
    for _ in events.read() {
        if config.dirty {
            save_config(&config);
            config.dirty = false;
        }
    }
}

/// System to replace the configuration and persist it
fn update_canvas_config_system(
    mut events: MessageReader<UpdateCanvasConfigRequest>,
    mut config: ResMut<CanvasConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) {
    for event in events.read() {
        if config.data == event.data {
            continue;
        }
        config.data = event.data.clone();
        config.dirty = true;
        save_events.write(SaveConfigRequest);
        debug!("Canvas config updated");
    }
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CanvasConfig>()
            .init_resource::<ConfigResetNotification>()
            .add_message::<SaveConfigRequest>()
            .add_message::<UpdateCanvasConfigRequest>()
            .add_systems(Startup, load_config_system.in_set(ConfigLoaded))
            .add_systems(
                Update,
                (
                    update_canvas_config_system.run_if(on_message::<UpdateCanvasConfigRequest>),
                    save_config_system.run_if(on_message::<SaveConfigRequest>),
                )
                    .chain(),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::SELECTION_COLOR;

    fn temp_config(name: &str, contents: Option<&str>) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "scene-canvas-{}-{}.json",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        if let Some(contents) = contents {
            std::fs::write(&path, contents).unwrap();
        }
        path
    }

    #[test]
    fn test_canvas_config_data_default() {
        let data = CanvasConfigData::default();
        assert!(data.snapping_enabled);
        assert!(data.screen_snapping);
        assert!(!data.center_snapping);
        assert!(data.source_snapping);
        assert_eq!(data.snap_distance, 10.0);
        assert!(!data.override_colors);
        assert!(data.spacing_helpers);
        assert!(data.click_through_selected);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let parsed: CanvasConfigData =
            serde_json::from_str(r#"{ "snap_distance": 4.0, "center_snapping": true }"#).unwrap();
        assert_eq!(parsed.snap_distance, 4.0);
        assert!(parsed.center_snapping);
        assert!(parsed.snapping_enabled);
        assert_eq!(parsed.select_green, 0xFF00FF00);
    }

    #[test]
    fn test_to_settings_maps_snapping_and_overflow() {
        let data = CanvasConfigData {
            snapping_enabled: false,
            snap_distance: 25.0,
            overflow_always_visible: true,
            click_through_selected: false,
            ..CanvasConfigData::default()
        };
        let settings = data.to_settings();
        assert!(!settings.snap.enabled);
        assert_eq!(settings.snap.distance, 25.0);
        assert!(settings.overflow_always_visible);
        assert!(!settings.click_through_selected);
    }

    #[test]
    fn test_override_colors_only_when_enabled() {
        let mut data = CanvasConfigData {
            select_red: 0xFFFFFFFF,
            ..CanvasConfigData::default()
        };
        assert_eq!(data.to_settings().colors.selection, SELECTION_COLOR);

        data.override_colors = true;
        assert_eq!(data.to_settings().colors.selection, Color::WHITE);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let path = temp_config("missing", None);
        let result = load_config(&path);
        assert_eq!(result.data, CanvasConfigData::default());
        assert!(result.reset_reason.is_none());
    }

    #[test]
    fn test_load_corrupt_file_reports_reset() {
        let path = temp_config("corrupt", Some("{ not json"));
        let result = load_config(&path);
        assert_eq!(result.data, CanvasConfigData::default());
        assert!(
            result
                .reset_reason
                .is_some_and(|reason| reason.starts_with("Configuration file was corrupted"))
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_config("saved", None);
        let config = CanvasConfig {
            data: CanvasConfigData {
                overflow_hidden: true,
                snap_distance: 6.0,
                ..CanvasConfigData::default()
            },
            config_path: path.clone(),
            dirty: true,
        };
        save_config(&config);

        let result = load_config(&path);
        assert_eq!(result.data, config.data);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_config_reset_notification_default() {
        let notification = ConfigResetNotification::default();
        assert!(!notification.show);
        assert!(notification.reason.is_none());
    }
}
