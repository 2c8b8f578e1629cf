use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;

use crate::map::{Coord, FitViewportRequest, MapViewport, ViewportBounds};

use super::params::is_cursor_over_ui;
use super::surface::MapSurface;

const MIN_SCALE: f32 = 0.05;
const MAX_SCALE: f32 = 50.0;
/// Extra room left around fitted bounds
const FIT_PADDING: f32 = 1.1;

#[derive(Component)]
pub struct EditorCamera;

#[derive(Component)]
pub struct CameraZoom {
    pub scale: f32,
}

impl Default for CameraZoom {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

/// World rectangle shown by a window of `window_size` pixels at `scale`.
pub fn visible_bounds(center: Vec2, window_size: Vec2, scale: f32) -> ViewportBounds {
    ViewportBounds::around(
        Coord::from(center),
        (window_size.x * scale) as f64,
        (window_size.y * scale) as f64,
    )
}

/// Orthographic scale that frames `bounds` inside `window_size` pixels.
pub fn fit_scale(bounds: &ViewportBounds, window_size: Vec2) -> f32 {
    if window_size.x <= 0.0 || window_size.y <= 0.0 {
        return 1.0;
    }
    let scale_x = bounds.width() as f32 / window_size.x;
    let scale_y = bounds.height() as f32 / window_size.y;
    (scale_x.max(scale_y) * FIT_PADDING).clamp(MIN_SCALE, MAX_SCALE)
}

pub fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        EditorCamera,
        CameraZoom::default(),
        Transform::from_translation(Vec3::new(0.0, 0.0, 1000.0)),
    ));
}

/// Middle-drag panning, unless a construction helper has panning switched off
pub fn camera_pan(
    mouse_button: Res<ButtonInput<MouseButton>>,
    surface: Res<MapSurface>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut camera_query: Query<(&mut Transform, &CameraZoom), With<EditorCamera>>,
) {
    if !surface.panning_enabled || !mouse_button.pressed(MouseButton::Middle) {
        mouse_motion.clear();
        return;
    }

    let Ok((mut transform, zoom)) = camera_query.single_mut() else {
        return;
    };

    for event in mouse_motion.read() {
        let delta = event.delta * zoom.scale;
        transform.translation.x -= delta.x;
        transform.translation.y += delta.y;
    }
}

pub fn camera_zoom(
    mut scroll_events: MessageReader<MouseWheel>,
    mut contexts: EguiContexts,
    mut camera_query: Query<&mut CameraZoom, With<EditorCamera>>,
) {
    // Scrolling inside egui panels belongs to egui
    if is_cursor_over_ui(&mut contexts) {
        scroll_events.clear();
        return;
    }

    let Ok(mut zoom) = camera_query.single_mut() else {
        return;
    };

    for event in scroll_events.read() {
        let scroll_amount = match event.unit {
            MouseScrollUnit::Line => event.y * 0.1,
            MouseScrollUnit::Pixel => event.y * 0.001,
        };

        // Multiplicative so zooming feels the same at every scale
        zoom.scale = (zoom.scale * (1.0 - scroll_amount)).clamp(MIN_SCALE, MAX_SCALE);
    }
}

pub fn apply_camera_zoom(
    mut camera_query: Query<(&CameraZoom, &mut Projection), (With<EditorCamera>, Changed<CameraZoom>)>,
) {
    for (zoom, mut projection) in camera_query.iter_mut() {
        if let Projection::Orthographic(ref mut ortho) = *projection {
            ortho.scale = zoom.scale;
        }
    }
}

/// Frame the requested bounds (sent after a snapshot import)
pub fn fit_viewport_to_bounds(
    mut requests: MessageReader<FitViewportRequest>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    mut camera_query: Query<(&mut Transform, &mut CameraZoom), With<EditorCamera>>,
) {
    let Some(request) = requests.read().last() else {
        return;
    };
    let Ok(window) = window_query.single() else {
        return;
    };
    let Ok((mut transform, mut zoom)) = camera_query.single_mut() else {
        return;
    };

    let center = request.bounds.center().to_vec2();
    transform.translation.x = center.x;
    transform.translation.y = center.y;
    zoom.scale = fit_scale(&request.bounds, window.size());
    debug!(
        "Fitted viewport to {:.0}x{:.0} at scale {:.3}",
        request.bounds.width(),
        request.bounds.height(),
        zoom.scale
    );
}

/// Mirror the camera into [`MapViewport`] for export and the status bar
pub fn update_map_viewport(
    window_query: Query<&Window, With<PrimaryWindow>>,
    camera_query: Query<(&Transform, &CameraZoom), With<EditorCamera>>,
    mut viewport: ResMut<MapViewport>,
) {
    let Ok(window) = window_query.single() else {
        return;
    };
    let Ok((transform, zoom)) = camera_query.single() else {
        return;
    };

    let next = MapViewport {
        bounds: visible_bounds(transform.translation.truncate(), window.size(), zoom.scale),
        zoom: 1.0 / zoom.scale,
    };
    if *viewport != next {
        *viewport = next;
    }
}
