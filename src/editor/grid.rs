use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::map::ActiveBaseLayer;

use super::camera::CameraZoom;
use super::EditorCamera;

/// Target on-screen distance between graticule lines
const TARGET_SPACING_PX: f32 = 120.0;

#[derive(Resource)]
pub struct GraticuleSettings {
    pub visible: bool,
}

impl Default for GraticuleSettings {
    fn default() -> Self {
        Self { visible: true }
    }
}

/// World spacing of graticule lines at the given zoom scale.
///
/// Snaps to 1, 2 or 5 times a power of ten so labels stay readable.
pub fn graticule_spacing(scale: f32) -> f32 {
    let raw = (TARGET_SPACING_PX * scale).max(f32::EPSILON);
    let magnitude = 10f32.powf(raw.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .into_iter()
        .find(|m| m * magnitude >= raw)
        .unwrap_or(10.0);
    step * magnitude
}

pub fn draw_graticule(
    mut gizmos: Gizmos,
    settings: Res<GraticuleSettings>,
    base_layer: Res<ActiveBaseLayer>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    camera_query: Query<(&Transform, &CameraZoom), With<EditorCamera>>,
) {
    if !settings.visible {
        return;
    }

    let Ok(window) = window_query.single() else {
        return;
    };
    let Ok((camera_transform, zoom)) = camera_query.single() else {
        return;
    };

    let spacing = graticule_spacing(zoom.scale);
    let color = base_layer.layer.graticule();

    let view_width = window.width() * zoom.scale;
    let view_height = window.height() * zoom.scale;

    let camera_pos = camera_transform.translation.truncate();

    let start_x = ((camera_pos.x - view_width / 2.0) / spacing).floor() as i32;
    let end_x = ((camera_pos.x + view_width / 2.0) / spacing).ceil() as i32;
    let start_y = ((camera_pos.y - view_height / 2.0) / spacing).floor() as i32;
    let end_y = ((camera_pos.y + view_height / 2.0) / spacing).ceil() as i32;

    for x in start_x..=end_x {
        let x_pos = x as f32 * spacing;
        gizmos.line_2d(
            Vec2::new(x_pos, start_y as f32 * spacing),
            Vec2::new(x_pos, end_y as f32 * spacing),
            color,
        );
    }

    for y in start_y..=end_y {
        let y_pos = y as f32 * spacing;
        gizmos.line_2d(
            Vec2::new(start_x as f32 * spacing, y_pos),
            Vec2::new(end_x as f32 * spacing, y_pos),
            color,
        );
    }
}
