//! The display surface side effects the tool state machine drives.

use bevy::prelude::*;
use bevy::window::{CursorIcon, PrimaryWindow, SystemCursorIcon};
use bevy_egui::EguiContexts;

use super::construction::{ConstructionHelper, ConstructionKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorIndicator {
    #[default]
    Default,
    Crosshair,
}

impl CursorIndicator {
    pub fn cursor_icon(&self) -> CursorIcon {
        match self {
            CursorIndicator::Default => CursorIcon::System(SystemCursorIcon::Default),
            CursorIndicator::Crosshair => CursorIcon::System(SystemCursorIcon::Crosshair),
        }
    }
}

/// What a tool may change on the map display.
pub trait DisplaySurface {
    fn set_panning_enabled(&mut self, enabled: bool);
    fn set_cursor(&mut self, cursor: CursorIndicator);
    /// Start a fresh construction helper, replacing any previous one.
    fn start_construction(&mut self, kind: ConstructionKind);
    /// Tear down the construction helper, discarding unfinished vertices.
    fn stop_construction(&mut self);
}

/// The live map display state.
#[derive(Resource, Debug)]
pub struct MapSurface {
    pub panning_enabled: bool,
    pub cursor: CursorIndicator,
    pub construction: Option<ConstructionHelper>,
}

impl Default for MapSurface {
    fn default() -> Self {
        Self {
            panning_enabled: true,
            cursor: CursorIndicator::Default,
            construction: None,
        }
    }
}

impl DisplaySurface for MapSurface {
    fn set_panning_enabled(&mut self, enabled: bool) {
        self.panning_enabled = enabled;
    }

    fn set_cursor(&mut self, cursor: CursorIndicator) {
        self.cursor = cursor;
    }

    fn start_construction(&mut self, kind: ConstructionKind) {
        self.construction = Some(ConstructionHelper::new(kind));
    }

    fn stop_construction(&mut self) {
        if let Some(helper) = self.construction.take()
            && !helper.vertices().is_empty()
        {
            debug!(
                "Discarded unfinished {} with {} vertices",
                helper.kind().display_name(),
                helper.vertices().len()
            );
        }
    }
}

/// Show the surface cursor over the map and the default cursor over UI
pub fn apply_cursor_indicator(
    surface: Res<MapSurface>,
    window_query: Query<Entity, With<PrimaryWindow>>,
    mut commands: Commands,
    mut contexts: EguiContexts,
) {
    let Ok(entity) = window_query.single() else {
        return;
    };

    if let Ok(ctx) = contexts.ctx_mut()
        && ctx.is_pointer_over_area()
    {
        commands
            .entity(entity)
            .insert(CursorIndicator::Default.cursor_icon());
        return;
    }

    commands.entity(entity).insert(surface.cursor.cursor_icon());
}
