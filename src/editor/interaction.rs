//! Map clicks outside of construction: placing points, opening the label prompt,
//! selecting features and requesting removals. Also the cancel triggers.

use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::common::{AlertKind, Alerts};
use crate::constants::PICK_TOLERANCE_PX;
use crate::map::{Coord, FeatureId, FeatureStore};
use crate::ui::DialogState;

use super::drawing::DrawingStyle;
use super::params::{is_cursor_over_ui, CameraParams};
use super::surface::{DisplaySurface, MapSurface};
use super::tools::{ToolKind, ToolState, ToolStateMachine};

#[derive(Resource, Default, Debug)]
pub struct FeatureSelection {
    pub selected: Option<FeatureId>,
}

/// Text prompt opened by a Label tool click.
#[derive(Resource, Default, Debug)]
pub struct LabelPrompt {
    pub at: Option<Coord>,
    pub text: String,
}

impl LabelPrompt {
    pub fn open(&mut self, at: Coord) {
        self.at = Some(at);
        self.text.clear();
    }

    pub fn close(&mut self) {
        self.at = None;
        self.text.clear();
    }

    pub fn is_open(&self) -> bool {
        self.at.is_some()
    }
}

/// Feature waiting for the user to confirm its removal.
#[derive(Resource, Default, Debug)]
pub struct PendingRemoval {
    pub target: Option<FeatureId>,
}

/// Set by the toolbar each frame while the pointer is over a tool toggle.
#[derive(Resource, Default, Debug)]
pub struct ToolTriggerHover {
    pub hovered: bool,
}

#[allow(clippy::too_many_arguments)]
pub fn handle_map_click(
    mouse_button: Res<ButtonInput<MouseButton>>,
    camera: CameraParams,
    mut contexts: EguiContexts,
    mut tools: ResMut<ToolStateMachine>,
    mut store: ResMut<FeatureStore>,
    drawing: Res<DrawingStyle>,
    mut selection: ResMut<FeatureSelection>,
    mut label_prompt: ResMut<LabelPrompt>,
    mut pending_removal: ResMut<PendingRemoval>,
    mut alerts: ResMut<Alerts>,
) {
    let left = mouse_button.just_pressed(MouseButton::Left);
    let right = mouse_button.just_pressed(MouseButton::Right);
    if !left && !right {
        return;
    }

    if is_cursor_over_ui(&mut contexts) {
        return;
    }

    let Some(at) = camera.cursor_coord() else {
        return;
    };
    let tolerance = (PICK_TOLERANCE_PX * camera.world_per_pixel()) as f64;

    if right {
        // Construction owns the map while a polygon or line is in progress
        if tools
            .active()
            .is_some_and(|kind| kind.policy().construction.is_some())
        {
            return;
        }
        if let Some(id) = store.hit_test(at, tolerance) {
            pending_removal.target = Some(id);
        }
        return;
    }

    match tools.state() {
        ToolState::Active(ToolKind::Point) => {
            let placed =
                tools.place_named_point(at, &drawing.marker_name, drawing.style.clone(), &mut store);
            match placed {
                Ok(Some(id)) => debug!("Placed point {}", id),
                Ok(None) => {}
                Err(e) => {
                    error!("Failed to place point: {}", e);
                    alerts.push(AlertKind::History, format!("Could not place the point: {}", e));
                }
            }
        }
        ToolState::Active(ToolKind::Label) => label_prompt.open(at),
        ToolState::Active(ToolKind::Polygon | ToolKind::Line) => {}
        ToolState::Idle => {
            selection.selected = store.hit_test(at, tolerance);
        }
    }
}

/// Escape, or a click on UI that is not a tool toggle, cancels the active tool
pub fn handle_tool_cancel(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    dialog_state: Res<DialogState>,
    hover: Res<ToolTriggerHover>,
    mut contexts: EguiContexts,
    mut tools: ResMut<ToolStateMachine>,
    mut surface: ResMut<MapSurface>,
    mut selection: ResMut<FeatureSelection>,
) {
    if dialog_state.any_modal_open {
        return;
    }

    if keyboard.just_pressed(KeyCode::Escape) {
        handle_escape(&mut tools, &mut *surface, &mut selection);
        return;
    }

    if tools.state() == ToolState::Idle {
        return;
    }
    let clicked = mouse_button.any_just_pressed([MouseButton::Left, MouseButton::Right]);
    if clicked && is_cursor_over_ui(&mut contexts) && !hover.hovered {
        tools.handle_outside_input(&mut *surface);
    }
}

/// Escape cancels the active tool; only with no tool active does it drop the
/// selection.
pub fn handle_escape(
    tools: &mut ToolStateMachine,
    surface: &mut dyn DisplaySurface,
    selection: &mut FeatureSelection,
) {
    if !tools.cancel(surface) {
        selection.selected = None;
    }
}

/// Drop selection and pending removal targets that no longer exist (e.g. after undo)
pub fn prune_stale_targets(
    store: Res<FeatureStore>,
    mut selection: ResMut<FeatureSelection>,
    mut pending_removal: ResMut<PendingRemoval>,
) {
    if !store.is_changed() {
        return;
    }
    retain_existing(&mut selection.selected, &store);
    retain_existing(&mut pending_removal.target, &store);
}

fn retain_existing(target: &mut Option<FeatureId>, store: &FeatureStore) {
    if target.is_some_and(|id| !store.contains(id)) {
        *target = None;
    }
}
