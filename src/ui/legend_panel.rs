//! Legend editor window and the on-map legend overlay.

use std::collections::HashMap;

use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bevy_egui::{egui, EguiContexts, EguiTextureHandle, EguiUserTextures};

use crate::constants::LEGEND_SWATCH_SIZE;
use crate::legend::{spawn_legend_image_pick, LegendImage, LegendItem, LegendState, LegendSwatch};
use crate::theme;

/// egui textures for legend image swatches, keyed by swatch id
#[derive(Resource, Default)]
pub struct LegendTextures {
    texture_ids: HashMap<u64, egui::TextureId>,
}

impl LegendTextures {
    pub fn get(&self, id: u64) -> Option<egui::TextureId> {
        self.texture_ids.get(&id).copied()
    }
}

/// Bevy image holding the decoded swatch pixels
pub fn legend_swatch_image(image: &LegendImage) -> Image {
    Image::new(
        Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        image.rgba.as_ref().clone(),
        TextureFormat::Rgba8UnormSrgb,
        default(),
    )
}

/// Register textures for image swatches in the saved rows and the draft.
/// Runs in Update before the egui pass.
pub fn register_legend_textures(
    legend: Res<LegendState>,
    mut textures: ResMut<LegendTextures>,
    mut images: ResMut<Assets<Image>>,
    mut egui_textures: ResMut<EguiUserTextures>,
) {
    let pending: Vec<(u64, &LegendImage)> = legend
        .items()
        .iter()
        .chain(legend.draft.iter())
        .filter_map(|item| match &item.swatch {
            LegendSwatch::Image { id, image } => Some((*id, image)),
            LegendSwatch::Color(_) => None,
        })
        .filter(|(id, _)| !textures.texture_ids.contains_key(id))
        .collect();

    for (id, image) in pending {
        let handle = images.add(legend_swatch_image(image));
        let texture_id = egui_textures.add_image(EguiTextureHandle::Strong(handle));
        textures.texture_ids.insert(id, texture_id);
    }
}

fn swatch_size(image: &LegendImage) -> egui::Vec2 {
    let longest = image.width.max(image.height).max(1) as f32;
    let scale = LEGEND_SWATCH_SIZE / longest;
    egui::vec2(image.width as f32 * scale, image.height as f32 * scale)
}

fn draw_image_swatch(ui: &mut egui::Ui, id: u64, image: &LegendImage, textures: &LegendTextures) {
    let size = egui::vec2(LEGEND_SWATCH_SIZE, LEGEND_SWATCH_SIZE);
    match textures.get(id) {
        Some(texture_id) => {
            ui.add(
                egui::Image::new(egui::load::SizedTexture::new(texture_id, swatch_size(image)))
                    .fit_to_exact_size(size),
            );
        }
        None => {
            ui.allocate_exact_size(size, egui::Sense::hover());
        }
    }
}

fn draw_swatch(ui: &mut egui::Ui, item: &LegendItem, textures: &LegendTextures) {
    match &item.swatch {
        LegendSwatch::Color(color) => {
            let size = egui::vec2(LEGEND_SWATCH_SIZE, LEGEND_SWATCH_SIZE);
            let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
            ui.painter()
                .rect_filled(rect, 2.0, theme::hex_to_egui(*color, 1.0));
        }
        LegendSwatch::Image { id, image } => draw_image_swatch(ui, *id, image, textures),
    }
}

/// Legend editor window
pub fn legend_editor_ui(
    mut contexts: EguiContexts,
    mut legend: ResMut<LegendState>,
    textures: Res<LegendTextures>,
) -> Result {
    if !legend.is_editing() {
        return Ok(());
    }

    let mut remove_index = None;
    let mut add_row = false;
    let mut import_image = false;
    let mut save = false;
    let mut cancel = false;
    let image_pending = legend.is_image_pending();

    egui::Window::new("Edit Legend")
        .collapsible(false)
        .resizable(true)
        .default_width(320.0)
        .anchor(egui::Align2::RIGHT_BOTTOM, [-12.0, -40.0])
        .show(contexts.ctx_mut()?, |ui| {
            egui::ScrollArea::vertical().max_height(300.0).show(ui, |ui| {
                if legend.draft.is_empty() {
                    ui.label(egui::RichText::new("No legend items yet").color(theme::ui::HINT_TEXT));
                }
                for (index, item) in legend.draft.iter_mut().enumerate() {
                    ui.horizontal(|ui| {
                        match &mut item.swatch {
                            LegendSwatch::Color(color) => {
                                ui.color_edit_button_srgb(&mut color.0);
                            }
                            LegendSwatch::Image { id, image } => {
                                draw_image_swatch(ui, *id, image, &textures);
                            }
                        }
                        ui.add(
                            egui::TextEdit::singleline(&mut item.label)
                                .hint_text("Label")
                                .desired_width(180.0),
                        );
                        if ui.small_button("×").on_hover_text("Remove row").clicked() {
                            remove_index = Some(index);
                        }
                    });
                }
            });

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Add Item").clicked() {
                    add_row = true;
                }
                if ui
                    .add_enabled(!image_pending, egui::Button::new("Import Image"))
                    .clicked()
                {
                    import_image = true;
                }
                if image_pending {
                    ui.spinner();
                }
            });

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Save").clicked() {
                    save = true;
                }
                if ui.button("Cancel").clicked() {
                    cancel = true;
                }
            });
        });

    if let Some(index) = remove_index {
        legend.remove_row(index);
    }
    if add_row {
        legend.add_color_row();
    }
    if import_image && !legend.is_image_pending() {
        legend.pending_image = Some(spawn_legend_image_pick());
    }
    if save {
        let count = legend.save();
        info!("Legend saved with {} item(s)", count);
    } else if cancel {
        legend.close_editor();
    }
    Ok(())
}

/// On-map legend, drawn bottom-right whenever there are saved rows
pub fn legend_overlay_ui(
    mut contexts: EguiContexts,
    legend: Res<LegendState>,
    textures: Res<LegendTextures>,
) -> Result {
    if legend.items().is_empty() || legend.is_editing() {
        return Ok(());
    }

    egui::Area::new(egui::Id::new("legend_overlay"))
        .anchor(egui::Align2::RIGHT_BOTTOM, [-12.0, -40.0])
        .order(egui::Order::Middle)
        .show(contexts.ctx_mut()?, |ui| {
            egui::Frame::new()
                .fill(theme::ui::LEGEND_BACKGROUND)
                .corner_radius(4.0)
                .inner_margin(egui::Margin::same(8))
                .show(ui, |ui| {
                    ui.label(
                        egui::RichText::new("Legend")
                            .strong()
                            .color(theme::ui::LEGEND_TEXT),
                    );
                    ui.add_space(4.0);
                    for item in legend.items() {
                        ui.horizontal(|ui| {
                            draw_swatch(ui, item, &textures);
                            ui.label(
                                egui::RichText::new(&item.label).color(theme::ui::LEGEND_TEXT),
                            );
                        });
                    }
                });
        });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn wide_image() -> LegendImage {
        LegendImage {
            path: PathBuf::from("wide.png"),
            width: 4,
            height: 2,
            rgba: Arc::new(vec![128; 4 * 2 * 4]),
        }
    }

    #[test]
    fn test_swatch_image_matches_decoded_size() {
        let image = legend_swatch_image(&wide_image());
        assert_eq!(image.width(), 4);
        assert_eq!(image.height(), 2);
    }

    #[test]
    fn test_swatch_size_keeps_aspect() {
        let size = swatch_size(&wide_image());
        assert_eq!(size.x, LEGEND_SWATCH_SIZE);
        assert_eq!(size.y, LEGEND_SWATCH_SIZE / 2.0);
    }
}
