mod dialogs;
mod legend_panel;
mod status_bar;
mod style_editor;
mod toolbar;

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

use crate::common::{Alerts, ControlsVisibility};
use crate::config::{ConfigResetNotification, MissingSnapshotWarning};
use crate::editor::{LabelPrompt, PendingRemoval};
use crate::map::AsyncSnapshotOperation;

/// Resource that tracks whether any modal dialog is currently open.
/// Editor input handlers should check this to avoid processing input
/// when the user is interacting with a dialog.
#[derive(Resource, Default)]
pub struct DialogState {
    /// True when any modal dialog is open that should block editor input
    pub any_modal_open: bool,
}

/// System to aggregate all dialog open states into a single resource.
/// Runs in First schedule before input handlers.
fn update_dialog_state(
    alerts: Res<Alerts>,
    label_prompt: Res<LabelPrompt>,
    pending_removal: Res<PendingRemoval>,
    missing_snapshot: Res<MissingSnapshotWarning>,
    config_reset: Res<ConfigResetNotification>,
    async_op: Res<AsyncSnapshotOperation>,
    mut dialog_state: ResMut<DialogState>,
) {
    dialog_state.any_modal_open = !alerts.is_empty()
        || label_prompt.is_open()
        || pending_removal.target.is_some()
        || missing_snapshot.show
        || config_reset.show
        || async_op.is_busy();
}

/// Run condition: editor controls are drawn unless an image export hid them
pub fn controls_visible(controls: Res<ControlsVisibility>) -> bool {
    !controls.hidden
}

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DialogState>()
            .init_resource::<style_editor::StyleEditorState>()
            .init_resource::<legend_panel::LegendTextures>()
            .add_systems(
                Update,
                (
                    legend_panel::register_legend_textures,
                    style_editor::sync_style_editor,
                ),
            )
            // Top and bottom panels first so windows are placed inside the map area
            .add_systems(
                EguiPrimaryContextPass,
                (toolbar::toolbar_ui, status_bar::status_bar_ui)
                    .chain()
                    .run_if(controls_visible),
            )
            .add_systems(
                EguiPrimaryContextPass,
                (
                    style_editor::style_editor_ui,
                    legend_panel::legend_editor_ui,
                )
                    .run_if(controls_visible)
                    .after(status_bar::status_bar_ui),
            )
            .add_systems(
                EguiPrimaryContextPass,
                legend_panel::legend_overlay_ui.after(status_bar::status_bar_ui),
            )
            .add_systems(
                EguiPrimaryContextPass,
                (
                    // Last: dialogs
                    dialogs::label_prompt_ui,
                    dialogs::removal_confirm_ui,
                    dialogs::missing_snapshot_warning_ui,
                    dialogs::config_reset_notification_ui,
                    dialogs::async_operation_modal_ui,
                    dialogs::alerts_ui,
                )
                    .chain()
                    .after(style_editor::style_editor_ui)
                    .after(legend_panel::legend_editor_ui),
            )
            // Update dialog state at the start of each frame
            .add_systems(First, update_dialog_state);
    }
}
