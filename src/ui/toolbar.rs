use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::capture::{CaptureJob, ImageExportRequest};
use crate::config::AppConfig;
use crate::editor::{
    DrawingStyle, GraticuleSettings, HistoryEngine, HistoryRequest, MapSurface, ToolKind, ToolStateMachine,
    ToolTriggerHover,
};
use crate::legend::LegendState;
use crate::map::{ActiveBaseLayer, BaseLayer, ExportSnapshotRequest, ImportSnapshotRequest};

const DEFAULT_EXPORT_NAME: &str = "map-data.json";

fn snapshot_dialog(config: &AppConfig) -> rfd::FileDialog {
    let dialog = rfd::FileDialog::new().add_filter("Map data", &["json", "geojson"]);
    match config
        .data
        .last_snapshot_path
        .as_ref()
        .and_then(|p| p.parent())
    {
        Some(dir) => dialog.set_directory(dir),
        None => dialog,
    }
}

/// Main toolbar: drawing tools, undo/redo, map files, legend and view toggles
#[allow(clippy::too_many_arguments)]
pub fn toolbar_ui(
    mut contexts: EguiContexts,
    mut tools: ResMut<ToolStateMachine>,
    mut surface: ResMut<MapSurface>,
    mut hover: ResMut<ToolTriggerHover>,
    history: Res<HistoryEngine>,
    mut history_requests: MessageWriter<HistoryRequest>,
    config: Res<AppConfig>,
    mut import_requests: MessageWriter<ImportSnapshotRequest>,
    mut export_requests: MessageWriter<ExportSnapshotRequest>,
    capture: Res<CaptureJob>,
    mut image_requests: MessageWriter<ImageExportRequest>,
    mut legend: ResMut<LegendState>,
    mut base_layer: ResMut<ActiveBaseLayer>,
    mut graticule: ResMut<GraticuleSettings>,
    mut drawing: ResMut<DrawingStyle>,
) -> Result {
    let mut tool_hovered = false;

    egui::TopBottomPanel::top("main_toolbar")
        .frame(
            egui::Frame::side_top_panel(&contexts.ctx_mut()?.style())
                .inner_margin(egui::Margin::symmetric(12, 8)),
        )
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing.x = 4.0;

                for kind in ToolKind::all() {
                    let button = egui::Button::new(
                        egui::RichText::new(kind.display_name()).size(14.0).strong(),
                    )
                    .min_size(egui::vec2(0.0, 28.0))
                    .selected(tools.is_active(*kind));

                    let response = ui.add(button);
                    tool_hovered |= response.hovered();
                    if response.clicked() {
                        let state = tools.activate(*kind, &mut *surface);
                        debug!("Tool state: {:?}", state);
                    }
                    response.on_hover_text(kind.hint());
                }

                // Part of the Point tool, so clicking it does not cancel the tool
                if tools.is_active(ToolKind::Point) {
                    let response = ui
                        .add(
                            egui::TextEdit::singleline(&mut drawing.marker_name)
                                .hint_text("Marker name")
                                .desired_width(120.0),
                        )
                        .on_hover_text("Name given to the next markers; leave blank for none");
                    tool_hovered |= response.hovered();
                }

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                let undo = ui
                    .add_enabled(history.can_undo(), egui::Button::new("Undo"))
                    .on_hover_text(history.peek_undo_description())
                    .on_disabled_hover_text("Nothing to undo");
                if undo.clicked() {
                    history_requests.write(HistoryRequest::Undo);
                }

                let redo = ui
                    .add_enabled(history.can_redo(), egui::Button::new("Redo"))
                    .on_hover_text(history.peek_redo_description())
                    .on_disabled_hover_text("Nothing to redo");
                if redo.clicked() {
                    history_requests.write(HistoryRequest::Redo);
                }

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                if ui.button("Import").clicked()
                    && let Some(path) = snapshot_dialog(&config).pick_file()
                {
                    import_requests.write(ImportSnapshotRequest { path });
                }

                if ui.button("Export").clicked()
                    && let Some(path) = snapshot_dialog(&config)
                        .set_file_name(DEFAULT_EXPORT_NAME)
                        .save_file()
                {
                    export_requests.write(ExportSnapshotRequest { path });
                }

                if ui
                    .add_enabled(capture.is_idle(), egui::Button::new("Export Image"))
                    .on_hover_text("Save the current view as a PNG")
                    .clicked()
                {
                    image_requests.write(ImageExportRequest);
                }

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                if ui
                    .add(egui::Button::new("Legend").selected(legend.is_editing()))
                    .clicked()
                {
                    legend.toggle_editor();
                }

                ui.checkbox(&mut graticule.visible, "Graticule");

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    egui::ComboBox::from_id_salt("base_layer")
                        .selected_text(base_layer.layer.display_name())
                        .show_ui(ui, |ui| {
                            for layer in BaseLayer::all() {
                                ui.selectable_value(
                                    &mut base_layer.layer,
                                    *layer,
                                    layer.display_name(),
                                );
                            }
                        });
                    ui.label("Base layer:");
                });
            });
        });

    hover.hovered = tool_hovered;
    Ok(())
}
