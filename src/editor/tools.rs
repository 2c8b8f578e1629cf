//! Exclusive tool activation.
//!
//! [`ToolStateMachine`] is the single source of truth for which tool captures map
//! input. Per-kind behavior lives in [`ToolPolicy`]: Point and Label stay active
//! across placements, Polygon and Line deactivate once their shape is committed.

use std::fmt;
use std::str::FromStr;

use bevy::prelude::*;
use thiserror::Error;

use crate::common::{AlertKind, Alerts};
use crate::config::AppConfig;
use crate::map::{Coord, Feature, FeatureId, FeatureStore, Geometry, StoreError, Style};

use super::construction::ConstructionKind;
use super::surface::{CursorIndicator, DisplaySurface, MapSurface};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Point,
    Polygon,
    Line,
    Label,
}

impl ToolKind {
    pub fn all() -> &'static [ToolKind] {
        &[
            ToolKind::Point,
            ToolKind::Line,
            ToolKind::Polygon,
            ToolKind::Label,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ToolKind::Point => "Point",
            ToolKind::Polygon => "Polygon",
            ToolKind::Line => "Line",
            ToolKind::Label => "Label",
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            ToolKind::Point => "Click the map to drop markers",
            ToolKind::Polygon => {
                "Click to add vertices; click the first vertex, double-click or Enter to finish"
            }
            ToolKind::Line => "Click to add vertices; double-click or Enter to finish",
            ToolKind::Label => "Click the map to place a text label",
        }
    }

    pub fn policy(&self) -> ToolPolicy {
        match self {
            ToolKind::Point | ToolKind::Label => ToolPolicy {
                cursor: CursorIndicator::Crosshair,
                construction: None,
                auto_deactivate: false,
            },
            ToolKind::Polygon => ToolPolicy {
                cursor: CursorIndicator::Crosshair,
                construction: Some(ConstructionKind::Polygon),
                auto_deactivate: true,
            },
            ToolKind::Line => ToolPolicy {
                cursor: CursorIndicator::Crosshair,
                construction: Some(ConstructionKind::Line),
                auto_deactivate: true,
            },
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown tool '{0}', expected one of Point, Line, Polygon, Label")]
pub struct UnknownToolKind(pub String);

impl FromStr for ToolKind {
    type Err = UnknownToolKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolKind::all()
            .iter()
            .copied()
            .find(|kind| kind.display_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownToolKind(s.to_string()))
    }
}

/// Start/stop effects and completion behavior of a tool kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolPolicy {
    pub cursor: CursorIndicator,
    /// Construction helper started on activation; panning is disabled while it is live.
    pub construction: Option<ConstructionKind>,
    /// Return to idle once a placement is committed.
    pub auto_deactivate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolState {
    #[default]
    Idle,
    Active(ToolKind),
}

#[derive(Resource, Debug, Default)]
pub struct ToolStateMachine {
    state: ToolState,
}

impl ToolStateMachine {
    pub fn state(&self) -> ToolState {
        self.state
    }

    pub fn active(&self) -> Option<ToolKind> {
        match self.state {
            ToolState::Idle => None,
            ToolState::Active(kind) => Some(kind),
        }
    }

    pub fn is_active(&self, kind: ToolKind) -> bool {
        self.state == ToolState::Active(kind)
    }

    /// Activate `kind`, or toggle it off if it is already the active tool.
    pub fn activate(&mut self, kind: ToolKind, surface: &mut dyn DisplaySurface) -> ToolState {
        if self.is_active(kind) {
            self.deactivate(surface);
            return self.state;
        }

        self.deactivate(surface);

        let policy = kind.policy();
        surface.set_cursor(policy.cursor);
        if let Some(construction) = policy.construction {
            surface.start_construction(construction);
            surface.set_panning_enabled(false);
        }
        self.state = ToolState::Active(kind);
        debug!("Tool activated: {}", kind);
        self.state
    }

    /// Return to idle: default cursor, panning on, construction helper torn down.
    pub fn deactivate(&mut self, surface: &mut dyn DisplaySurface) {
        if let ToolState::Active(kind) = self.state {
            if kind.policy().construction.is_some() {
                surface.stop_construction();
            }
            debug!("Tool deactivated: {}", kind);
        }
        surface.set_cursor(CursorIndicator::Default);
        surface.set_panning_enabled(true);
        self.state = ToolState::Idle;
    }

    /// Cancel key or outside input. Returns whether a tool was active.
    pub fn cancel(&mut self, surface: &mut dyn DisplaySurface) -> bool {
        if self.state == ToolState::Idle {
            return false;
        }
        self.deactivate(surface);
        true
    }

    /// Input outside both the map and the tool triggers.
    pub fn handle_outside_input(&mut self, surface: &mut dyn DisplaySurface) -> bool {
        self.cancel(surface)
    }

    /// Commit a marker while the Point tool is active. The tool stays active.
    pub fn place_point(
        &mut self,
        at: Coord,
        style: Style,
        store: &mut FeatureStore,
    ) -> Result<Option<FeatureId>, StoreError> {
        self.place_named_point(at, "", style, store)
    }

    /// Like [`Self::place_point`], naming the marker. A blank name places an
    /// unnamed marker.
    pub fn place_named_point(
        &mut self,
        at: Coord,
        name: &str,
        style: Style,
        store: &mut FeatureStore,
    ) -> Result<Option<FeatureId>, StoreError> {
        if !self.is_active(ToolKind::Point) {
            return Ok(None);
        }
        let marker = match name.trim() {
            "" => Feature::marker(at, style),
            name => Feature::marker(at, style).with_label(name),
        };
        store.add(marker).map(Some)
    }

    /// Commit a text label while the Label tool is active. Blank text commits nothing.
    pub fn place_label(
        &mut self,
        at: Coord,
        text: &str,
        style: Style,
        store: &mut FeatureStore,
    ) -> Result<Option<FeatureId>, StoreError> {
        let text = text.trim();
        if !self.is_active(ToolKind::Label) || text.is_empty() {
            return Ok(None);
        }
        store.add(Feature::text_label(at, text, style)).map(Some)
    }

    /// Commit a finished polygon or line and apply the tool's completion policy.
    ///
    /// Geometry that does not belong to the active tool is ignored.
    pub fn complete_construction(
        &mut self,
        geometry: Geometry,
        style: Style,
        store: &mut FeatureStore,
        surface: &mut dyn DisplaySurface,
    ) -> Result<Option<FeatureId>, StoreError> {
        let Some(kind) = self.active() else {
            return Ok(None);
        };
        let policy = kind.policy();
        let matches = matches!(
            (policy.construction, &geometry),
            (Some(ConstructionKind::Polygon), Geometry::Polygon(_))
                | (Some(ConstructionKind::Line), Geometry::LineString(_))
        );
        if !matches {
            warn!(
                "Ignoring finished {} while {} tool is active",
                geometry.type_name(),
                kind
            );
            return Ok(None);
        }

        let result = store.add(Feature::new(geometry, style));
        if policy.auto_deactivate {
            self.deactivate(surface);
        }
        result.map(Some)
    }
}

/// Startup system activating the configured tool, if any
pub fn activate_startup_tool(
    config: Res<AppConfig>,
    mut tools: ResMut<ToolStateMachine>,
    mut surface: ResMut<MapSurface>,
    mut alerts: ResMut<Alerts>,
) {
    let Some(name) = config.data.startup_tool.as_deref() else {
        return;
    };
    match name.parse::<ToolKind>() {
        Ok(kind) => {
            tools.activate(kind, &mut *surface);
            info!("Startup tool: {}", kind);
        }
        Err(e) => {
            warn!("Config: {}", e);
            alerts.push(AlertKind::Config, format!("startup_tool: {}", e));
        }
    }
}
