mod camera;
pub mod conditions;
pub mod construction;
pub mod drawing;
mod grid;
pub mod history;
pub mod interaction;
pub mod params;
mod rendering;
pub mod surface;
pub mod tools;

pub use camera::EditorCamera;
pub use drawing::{ConstructionCompleted, DrawingStyle};
pub use grid::GraticuleSettings;
pub use history::{HistoryEngine, HistoryRequest};
pub use interaction::{FeatureSelection, LabelPrompt, PendingRemoval, ToolTriggerHover};
pub use surface::{CursorIndicator, DisplaySurface, MapSurface};
pub use tools::{ToolKind, ToolState, ToolStateMachine};

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

use crate::config::ConfigLoaded;

use conditions::no_dialog_open;

pub struct EditorPlugin;

impl Plugin for EditorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ToolStateMachine>()
            .init_resource::<MapSurface>()
            .init_resource::<DrawingStyle>()
            .init_resource::<FeatureSelection>()
            .init_resource::<LabelPrompt>()
            .init_resource::<PendingRemoval>()
            .init_resource::<ToolTriggerHover>()
            .init_resource::<GraticuleSettings>()
            .add_message::<HistoryRequest>()
            .add_message::<ConstructionCompleted>()
            .add_systems(Startup, camera::spawn_camera)
            .add_systems(
                Startup,
                (
                    history::init_history_engine,
                    drawing::init_drawing_style,
                    tools::activate_startup_tool,
                )
                    .after(ConfigLoaded),
            )
            .add_systems(
                Update,
                (
                    camera::fit_viewport_to_bounds,
                    camera::camera_pan,
                    camera::camera_zoom,
                    camera::apply_camera_zoom,
                    camera::update_map_viewport,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    interaction::handle_tool_cancel,
                    drawing::collect_construction_input.run_if(no_dialog_open),
                    drawing::handle_construction_completed
                        .run_if(on_message::<ConstructionCompleted>),
                    interaction::handle_map_click.run_if(no_dialog_open),
                    history::handle_history_shortcuts.run_if(no_dialog_open),
                    history::apply_history_requests.run_if(on_message::<HistoryRequest>),
                    history::capture_feature_changes,
                    interaction::prune_stale_targets,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    surface::apply_cursor_indicator,
                    grid::draw_graticule,
                    rendering::draw_features,
                    rendering::draw_construction_preview,
                ),
            )
            .add_systems(EguiPrimaryContextPass, rendering::render_feature_labels);
    }
}
