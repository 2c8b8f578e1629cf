use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::editor::params::CameraParams;
use crate::editor::{HistoryEngine, ToolStateMachine};
use crate::map::{ActiveBaseLayer, Coord, CurrentSnapshotFile, FeatureStore, MapViewport};
use crate::theme;

fn format_coord(coord: Option<Coord>) -> String {
    match coord {
        Some(c) => format!("{:.2}, {:.2}", c.x, c.y),
        None => "-".to_string(),
    }
}

/// Bottom bar: cursor position, zoom, base layer, active tool and file
#[allow(clippy::too_many_arguments)]
pub fn status_bar_ui(
    mut contexts: EguiContexts,
    camera: CameraParams,
    viewport: Res<MapViewport>,
    base_layer: Res<ActiveBaseLayer>,
    tools: Res<ToolStateMachine>,
    store: Res<FeatureStore>,
    history: Res<HistoryEngine>,
    snapshot: Res<CurrentSnapshotFile>,
) -> Result {
    let cursor = camera.cursor_coord();

    egui::TopBottomPanel::bottom("status_bar")
        .frame(
            egui::Frame::side_top_panel(&contexts.ctx_mut()?.style())
                .fill(theme::ui::PANEL_BACKGROUND)
                .inner_margin(egui::Margin::symmetric(12, 4)),
        )
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(format_coord(cursor)).monospace())
                    .on_hover_text("Cursor position");
                ui.separator();
                ui.label(format!("Zoom {:.2}x", viewport.zoom));
                ui.separator();
                ui.label(base_layer.layer.display_name());
                ui.separator();

                match tools.active() {
                    Some(kind) => {
                        ui.label(egui::RichText::new(kind.display_name()).strong());
                        ui.label(egui::RichText::new(kind.hint()).color(theme::ui::HINT_TEXT));
                    }
                    None => {
                        ui.label(
                            egui::RichText::new("Select a tool to draw")
                                .color(theme::ui::HINT_TEXT),
                        );
                    }
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(snapshot.display_name());
                    ui.separator();
                    ui.label(format!(
                        "{} feature(s), {} undo step(s)",
                        store.len(),
                        history.undo_count()
                    ));
                });
            });
        });
    Ok(())
}
