//! Map legend: rows of a color or image swatch next to a label.
//!
//! The editor works on a draft copy of the rows; saving keeps the labelled rows
//! and shows them in the on-map legend overlay.

mod picker;

pub use picker::{LegendImage, LegendImagePick};
pub(crate) use picker::spawn_legend_image_pick;

use bevy::prelude::*;
use bevy::tasks::Task;

use crate::map::HexColor;

/// Color of a freshly added legend row.
pub const DEFAULT_ROW_COLOR: HexColor = HexColor::rgb(0xff, 0x00, 0x00);

#[derive(Debug, Clone, PartialEq)]
pub enum LegendSwatch {
    Color(HexColor),
    Image { id: u64, image: LegendImage },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendItem {
    pub label: String,
    pub swatch: LegendSwatch,
}

#[derive(Resource, Default)]
pub struct LegendState {
    /// Saved rows shown on the map
    items: Vec<LegendItem>,
    /// Rows being edited
    pub draft: Vec<LegendItem>,
    editing: bool,
    next_image_id: u64,
    /// Pending async image pick
    pub pending_image: Option<Task<LegendImagePick>>,
}

impl LegendState {
    pub fn items(&self) -> &[LegendItem] {
        &self.items
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Open the editor seeded with the saved rows, or close it discarding the draft.
    pub fn toggle_editor(&mut self) {
        if self.editing {
            self.close_editor();
        } else {
            self.draft = self.items.clone();
            self.editing = true;
        }
    }

    pub fn close_editor(&mut self) {
        self.editing = false;
        self.draft.clear();
    }

    pub fn add_color_row(&mut self) {
        self.draft.push(LegendItem {
            label: String::new(),
            swatch: LegendSwatch::Color(DEFAULT_ROW_COLOR),
        });
    }

    pub fn add_image_row(&mut self, image: LegendImage) {
        let id = self.next_image_id;
        self.next_image_id += 1;
        self.draft.push(LegendItem {
            label: String::new(),
            swatch: LegendSwatch::Image { id, image },
        });
    }

    pub fn remove_row(&mut self, index: usize) -> Option<LegendItem> {
        (index < self.draft.len()).then(|| self.draft.remove(index))
    }

    /// Keep the labelled draft rows as the legend and close the editor.
    ///
    /// Returns the number of rows saved.
    pub fn save(&mut self) -> usize {
        self.items = std::mem::take(&mut self.draft)
            .into_iter()
            .filter_map(|mut item| {
                item.label = item.label.trim().to_string();
                (!item.label.is_empty()).then_some(item)
            })
            .collect();
        self.editing = false;
        self.items.len()
    }

    pub fn is_image_pending(&self) -> bool {
        self.pending_image.is_some()
    }
}

pub struct LegendPlugin;

impl Plugin for LegendPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LegendState>()
            .add_systems(Update, picker::poll_legend_image_task);
    }
}
