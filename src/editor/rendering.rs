//! Drawing the feature collection, the selection and the construction preview.
//!
//! Shapes go through gizmos; label text goes through egui so it stays crisp at
//! any zoom.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::constants::{LABEL_FONT_SIZE, MARKER_RADIUS_PX};
use crate::map::{Coord, Feature, FeatureStore, Geometry, PointSymbol};
use crate::theme;

use super::interaction::FeatureSelection;
use super::params::CameraParams;
use super::surface::MapSurface;

/// World position a feature's label is anchored at.
pub fn label_anchor(geometry: &Geometry) -> Option<Coord> {
    match geometry {
        Geometry::Point(at) => Some(*at),
        Geometry::LineString(coords) => {
            let mid = coords.len() / 2;
            match coords.len() {
                0 => None,
                n if n % 2 == 1 => Some(coords[mid]),
                _ => Some(Coord::new(
                    (coords[mid - 1].x + coords[mid].x) / 2.0,
                    (coords[mid - 1].y + coords[mid].y) / 2.0,
                )),
            }
        }
        Geometry::Polygon(_) => geometry.bounds().map(|(min, max)| {
            Coord::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0)
        }),
    }
}

fn draw_feature(gizmos: &mut Gizmos, feature: &Feature, world_per_pixel: f32) {
    let stroke = theme::hex_to_bevy(feature.style.color, feature.style.opacity);
    match &feature.geometry {
        Geometry::Point(at) => {
            if feature.symbol == PointSymbol::Text {
                return;
            }
            let fill = theme::hex_to_bevy(feature.style.fill_color, feature.style.fill_opacity);
            let radius = MARKER_RADIUS_PX * world_per_pixel;
            gizmos.circle_2d(at.to_vec2(), radius, stroke);
            gizmos.circle_2d(at.to_vec2(), radius * 0.5, fill);
        }
        Geometry::LineString(coords) => {
            gizmos.linestrip_2d(coords.iter().map(|c| c.to_vec2()), stroke);
        }
        Geometry::Polygon(rings) => {
            for ring in rings {
                gizmos.linestrip_2d(ring.iter().map(|c| c.to_vec2()), stroke);
            }
        }
    }
}

pub fn draw_features(
    mut gizmos: Gizmos,
    store: Res<FeatureStore>,
    selection: Res<FeatureSelection>,
    camera: CameraParams,
) {
    let world_per_pixel = camera.world_per_pixel();

    for feature in store.iter() {
        draw_feature(&mut gizmos, feature, world_per_pixel);
    }

    let Some(selected) = selection.selected.and_then(|id| store.get(id)) else {
        return;
    };
    let Some((min, max)) = selected.geometry.bounds() else {
        return;
    };
    let pad = MARKER_RADIUS_PX * 1.5 * world_per_pixel;
    let min = min.to_vec2() - Vec2::splat(pad);
    let max = max.to_vec2() + Vec2::splat(pad);
    gizmos.rect_2d(
        Isometry2d::from_translation((min + max) / 2.0),
        max - min,
        theme::SELECTION_COLOR,
    );
}

/// Placed vertices, the rubber-band edge to the cursor and the closing target
pub fn draw_construction_preview(
    mut gizmos: Gizmos,
    surface: Res<MapSurface>,
    camera: CameraParams,
) {
    let Some(helper) = surface.construction.as_ref() else {
        return;
    };
    let vertices = helper.vertices();
    let Some(last) = vertices.last() else {
        return;
    };

    let world_per_pixel = camera.world_per_pixel();
    let vertex_radius = 3.0 * world_per_pixel;

    gizmos.linestrip_2d(vertices.iter().map(|c| c.to_vec2()), theme::CONSTRUCTION_EDGE);
    for vertex in vertices {
        gizmos.circle_2d(vertex.to_vec2(), vertex_radius, theme::CONSTRUCTION_VERTEX);
    }

    if let Some(cursor) = camera.cursor_world_pos() {
        gizmos.line_2d(last.to_vec2(), cursor, theme::CONSTRUCTION_PREVIEW);
    }

    let closing_radius = crate::constants::CLOSE_RING_RADIUS_PX * world_per_pixel;
    if let Some(first) = vertices.first()
        && camera
            .cursor_coord()
            .is_some_and(|cursor| helper.closes_on(cursor, closing_radius as f64))
    {
        gizmos.circle_2d(first.to_vec2(), closing_radius, theme::CONSTRUCTION_CLOSE);
    }
}

/// Render feature labels using egui at their projected screen positions
pub fn render_feature_labels(
    mut contexts: EguiContexts,
    store: Res<FeatureStore>,
    camera_query: Query<(&Camera, &GlobalTransform), With<super::EditorCamera>>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };

    for feature in store.iter() {
        let Some(text) = feature.label.as_deref().filter(|t| !t.is_empty()) else {
            continue;
        };
        let Some(anchor) = label_anchor(&feature.geometry) else {
            continue;
        };

        let Ok(screen_pos) =
            camera.world_to_viewport(camera_transform, anchor.to_vec2().extend(0.0))
        else {
            continue;
        };

        // Markers carry their label beside the pin; text features are centered
        let pivot = match feature.symbol {
            PointSymbol::Text => egui::Align2::CENTER_CENTER,
            PointSymbol::Marker => egui::Align2::LEFT_BOTTOM,
        };
        let offset = match feature.symbol {
            PointSymbol::Text => egui::Vec2::ZERO,
            PointSymbol::Marker => egui::vec2(MARKER_RADIUS_PX, -MARKER_RADIUS_PX),
        };

        egui::Area::new(egui::Id::new(("feature_label", feature.id)))
            .fixed_pos(egui::pos2(screen_pos.x, screen_pos.y) + offset)
            .pivot(pivot)
            .order(egui::Order::Background)
            .interactable(false)
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new(text)
                        .color(theme::hex_to_egui(feature.style.color, feature.style.opacity))
                        .size(LABEL_FONT_SIZE)
                        .strong(),
                );
            });
    }
}
