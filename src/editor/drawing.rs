//! Feeding pointer and keyboard input into the live construction helper.

use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::common::{AlertKind, Alerts};
use crate::config::AppConfig;
use crate::constants::{CLOSE_RING_RADIUS_PX, DOUBLE_CLICK_SECS};
use crate::map::{Coord, FeatureStore, Geometry, Style};

use super::construction::{ConstructionError, ConstructionHelper};
use super::params::{is_cursor_over_ui, CameraParams};
use super::surface::MapSurface;
use super::tools::ToolStateMachine;

/// Style applied to newly drawn features
#[derive(Resource, Debug, Clone, Default)]
pub struct DrawingStyle {
    pub style: Style,
    /// Name given to markers placed with the Point tool; blank for none
    pub marker_name: String,
}

/// A polygon or line was finished on the map surface.
#[derive(Message, Debug, Clone)]
pub struct ConstructionCompleted {
    pub geometry: Geometry,
}

/// One frame of construction input, already converted to world units.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstructionInput {
    pub click: Option<Coord>,
    pub double_click: bool,
    pub undo_vertex: bool,
    pub finish: bool,
    pub close_radius: f64,
}

/// Apply one frame of input to the helper.
///
/// Returns `None` when no finish was attempted this frame.
pub fn apply_construction_input(
    helper: &mut ConstructionHelper,
    input: ConstructionInput,
) -> Option<Result<Geometry, ConstructionError>> {
    if input.undo_vertex {
        helper.pop_vertex();
    }

    let mut finish = input.finish;
    if let Some(at) = input.click {
        if input.double_click || helper.closes_on(at, input.close_radius) {
            finish = true;
        } else if let Err(e) = helper.push_vertex(at) {
            debug!("Rejected vertex: {}", e);
        }
    }

    finish.then(|| helper.finish())
}

/// Startup system copying the configured default style
pub fn init_drawing_style(config: Res<AppConfig>, mut drawing: ResMut<DrawingStyle>) {
    drawing.style = config.data.default_style.clone();
}

pub fn collect_construction_input(
    mouse_button: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    camera: CameraParams,
    mut contexts: EguiContexts,
    mut surface: ResMut<MapSurface>,
    mut last_click: Local<Option<f64>>,
    mut completed: MessageWriter<ConstructionCompleted>,
) {
    let Some(helper) = surface.construction.as_mut() else {
        *last_click = None;
        return;
    };

    let keyboard_free = contexts
        .ctx_mut()
        .map(|ctx| !ctx.wants_keyboard_input())
        .unwrap_or(true);

    let mut input = ConstructionInput {
        undo_vertex: keyboard_free && keyboard.just_pressed(KeyCode::Backspace),
        finish: keyboard_free
            && (keyboard.just_pressed(KeyCode::Enter)
                || keyboard.just_pressed(KeyCode::NumpadEnter)),
        close_radius: (CLOSE_RING_RADIUS_PX * camera.world_per_pixel()) as f64,
        ..default()
    };

    if mouse_button.just_pressed(MouseButton::Left)
        && !is_cursor_over_ui(&mut contexts)
        && let Some(at) = camera.cursor_coord()
    {
        let now = time.elapsed_secs_f64();
        input.click = Some(at);
        input.double_click = last_click.is_some_and(|t| now - t <= DOUBLE_CLICK_SECS as f64);
        *last_click = if input.double_click { None } else { Some(now) };
    }

    match apply_construction_input(helper, input) {
        Some(Ok(geometry)) => {
            completed.write(ConstructionCompleted { geometry });
        }
        Some(Err(e)) => debug!("Cannot finish {}: {}", helper.kind().display_name(), e),
        None => {}
    }
}

/// Commit finished shapes through the tool state machine
pub fn handle_construction_completed(
    mut completed: MessageReader<ConstructionCompleted>,
    mut tools: ResMut<ToolStateMachine>,
    mut surface: ResMut<MapSurface>,
    mut store: ResMut<FeatureStore>,
    drawing: Res<DrawingStyle>,
    mut alerts: ResMut<Alerts>,
) {
    for message in completed.read() {
        let kind = message.geometry.type_name();
        match tools.complete_construction(
            message.geometry.clone(),
            drawing.style.clone(),
            &mut store,
            &mut *surface,
        ) {
            Ok(Some(id)) => info!("Added {} {}", kind, id),
            Ok(None) => {}
            Err(e) => {
                error!("Failed to add {}: {}", kind, e);
                alerts.push(AlertKind::History, format!("Could not add the {}: {}", kind, e));
            }
        }
    }
}
