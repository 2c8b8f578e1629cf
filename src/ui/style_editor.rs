//! Style editor window for the selected feature.
//!
//! Edits happen on a draft; Apply writes the draft through the store so the
//! change lands in history as a single restyle.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::editor::{DrawingStyle, FeatureSelection};
use crate::map::{FeatureId, FeatureStore, HexColor, Style};
use crate::theme;

#[derive(Resource, Default, Debug)]
pub struct StyleEditorState {
    target: Option<FeatureId>,
    pub draft: Style,
}

impl StyleEditorState {
    pub fn target(&self) -> Option<FeatureId> {
        self.target
    }

    /// Follow the selection, reloading the draft when it changes.
    pub fn sync(&mut self, selected: Option<FeatureId>, store: &FeatureStore) {
        if self.target == selected {
            return;
        }
        self.target = selected;
        if let Some(feature) = selected.and_then(|id| store.get(id)) {
            self.draft = feature.style.clone();
        }
    }

    /// Opacity drives both stroke and fill transparency.
    pub fn set_opacity(&mut self, opacity: f32) {
        let opacity = opacity.clamp(0.0, 1.0);
        self.draft.opacity = opacity;
        self.draft.fill_opacity = opacity;
    }

    /// Whether the draft differs from the stored style of the target.
    pub fn is_modified(&self, store: &FeatureStore) -> bool {
        self.target
            .and_then(|id| store.get(id))
            .is_some_and(|feature| feature.style != self.draft)
    }
}

fn color_row(ui: &mut egui::Ui, label: &str, color: &mut HexColor) {
    ui.horizontal(|ui| {
        ui.label(label);
        ui.color_edit_button_srgb(&mut color.0);
        ui.label(egui::RichText::new(color.to_string()).monospace().weak());
    });
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 2.0;
        for (swatch, name) in theme::swatch_palette() {
            let button = egui::Button::new("")
                .fill(theme::hex_to_egui(swatch, 1.0))
                .stroke(egui::Stroke::new(
                    1.0,
                    if *color == swatch {
                        theme::ui::SELECTED_BORDER
                    } else {
                        theme::ui::UNSELECTED_BORDER
                    },
                ))
                .min_size(egui::vec2(16.0, 16.0));
            if ui.add(button).on_hover_text(name).clicked() {
                *color = swatch;
            }
        }
    });
}

pub fn sync_style_editor(
    selection: Res<FeatureSelection>,
    store: Res<FeatureStore>,
    mut editor: ResMut<StyleEditorState>,
) {
    editor.sync(selection.selected, &store);
}

/// Renders the style editor while a feature is selected
pub fn style_editor_ui(
    mut contexts: EguiContexts,
    mut editor: ResMut<StyleEditorState>,
    mut selection: ResMut<FeatureSelection>,
    mut store: ResMut<FeatureStore>,
    mut drawing: ResMut<DrawingStyle>,
) -> Result {
    let Some(id) = editor.target() else {
        return Ok(());
    };
    let Some(feature) = store.get(id) else {
        return Ok(());
    };
    let title = match feature.label.as_deref() {
        Some(label) => format!("Style: {}", label),
        None => format!("Style: {}", feature.geometry.type_name()),
    };
    let modified = editor.is_modified(&store);

    let mut apply = false;
    let mut close = false;

    egui::Window::new(title)
        .id(egui::Id::new("style_editor"))
        .collapsible(true)
        .resizable(false)
        .anchor(egui::Align2::RIGHT_TOP, [-12.0, 60.0])
        .show(contexts.ctx_mut()?, |ui| {
            color_row(ui, "Stroke", &mut editor.draft.color);
            ui.add_space(4.0);
            color_row(ui, "Fill", &mut editor.draft.fill_color);
            ui.add_space(4.0);

            ui.add(egui::Slider::new(&mut editor.draft.weight, 1.0..=10.0).text("Weight"));

            let mut opacity = editor.draft.opacity;
            if ui
                .add(egui::Slider::new(&mut opacity, 0.0..=1.0).text("Opacity"))
                .changed()
            {
                editor.set_opacity(opacity);
            }

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.add_enabled(modified, egui::Button::new("Apply")).clicked() {
                    apply = true;
                }
                if ui
                    .button("Use as default")
                    .on_hover_text("New features are drawn with this style")
                    .clicked()
                {
                    drawing.style = editor.draft.clone();
                    info!("Default drawing style updated");
                }
                if ui.button("Close").clicked() {
                    close = true;
                }
            });
        });

    if apply {
        match store.set_style(id, editor.draft.clone()) {
            Ok(()) => debug!("Restyled {}", id),
            Err(e) => warn!("Restyle failed: {}", e),
        }
    }
    if close {
        selection.selected = None;
    }
    Ok(())
}
