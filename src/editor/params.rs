//! Common SystemParam bundles to reduce parameter counts in editor systems.
//!
//! - [`CameraParams`]: camera and window access for cursor-to-world conversion
//! - [`is_cursor_over_ui`]: whether egui owns the pointer (for input gating)

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;

use crate::map::Coord;

use super::camera::CameraZoom;
use super::EditorCamera;

/// Bundled camera and window queries for cursor-to-world calculations
#[derive(SystemParam)]
pub struct CameraParams<'w, 's> {
    pub window: Query<'w, 's, &'static Window, With<PrimaryWindow>>,
    pub camera: Query<
        'w,
        's,
        (&'static Camera, &'static GlobalTransform, &'static CameraZoom),
        With<EditorCamera>,
    >,
}

impl CameraParams<'_, '_> {
    /// Get the world position of the cursor, if available
    pub fn cursor_world_pos(&self) -> Option<Vec2> {
        let window = self.window.single().ok()?;
        let (camera, transform, _) = self.camera.single().ok()?;
        let cursor_pos = window.cursor_position()?;
        camera.viewport_to_world_2d(transform, cursor_pos).ok()
    }

    pub fn cursor_coord(&self) -> Option<Coord> {
        self.cursor_world_pos().map(Coord::from)
    }

    /// World units covered by one screen pixel
    pub fn world_per_pixel(&self) -> f32 {
        self.camera
            .single()
            .map(|(_, _, zoom)| zoom.scale)
            .unwrap_or(1.0)
    }
}

/// Check if the cursor is over egui UI
pub fn is_cursor_over_ui(contexts: &mut EguiContexts) -> bool {
    contexts
        .ctx_mut()
        .map(|ctx| ctx.is_pointer_over_area())
        .unwrap_or(false)
}
