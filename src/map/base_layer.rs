use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Background map source. Only the identifier and a backdrop tint are handled here;
/// tile fetching belongs to the display side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BaseLayer {
    #[default]
    OpenStreetMap,
    Satellite,
    Terrain,
}

impl BaseLayer {
    pub fn all() -> &'static [BaseLayer] {
        &[BaseLayer::OpenStreetMap, BaseLayer::Satellite, BaseLayer::Terrain]
    }

    /// Identifier stored in snapshots and config.
    pub fn id(&self) -> &'static str {
        match self {
            BaseLayer::OpenStreetMap => "OpenStreetMap",
            BaseLayer::Satellite => "Satellite",
            BaseLayer::Terrain => "Terrain",
        }
    }

    pub fn from_id(id: &str) -> Option<BaseLayer> {
        Self::all().iter().copied().find(|layer| layer.id() == id)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BaseLayer::OpenStreetMap => "OpenStreetMap",
            BaseLayer::Satellite => "Satellite",
            BaseLayer::Terrain => "Terrain",
        }
    }

    pub fn backdrop(&self) -> Color {
        match self {
            BaseLayer::OpenStreetMap => Color::srgb(0.94, 0.93, 0.90),
            BaseLayer::Satellite => Color::srgb(0.10, 0.14, 0.12),
            BaseLayer::Terrain => Color::srgb(0.86, 0.89, 0.78),
        }
    }

    pub fn graticule(&self) -> Color {
        match self {
            BaseLayer::Satellite => Color::srgba(0.8, 0.8, 0.8, 0.25),
            _ => Color::srgba(0.3, 0.3, 0.3, 0.25),
        }
    }
}

#[derive(Resource, Default, Debug)]
pub struct ActiveBaseLayer {
    pub layer: BaseLayer,
}

/// Keep the window clear color in step with the active base layer.
pub fn apply_base_layer_backdrop(
    base_layer: Res<ActiveBaseLayer>,
    mut clear_color: ResMut<ClearColor>,
) {
    if base_layer.is_changed() {
        clear_color.0 = base_layer.layer.backdrop();
    }
}
