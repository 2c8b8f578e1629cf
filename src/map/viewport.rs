use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::feature::Coord;

/// Visible world rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportBounds {
    pub south_west: Coord,
    pub north_east: Coord,
}

impl ViewportBounds {
    pub fn new(south_west: Coord, north_east: Coord) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Rectangle of the given size centered on `center`.
    pub fn around(center: Coord, width: f64, height: f64) -> Self {
        Self::new(
            Coord::new(center.x - width / 2.0, center.y - height / 2.0),
            Coord::new(center.x + width / 2.0, center.y + height / 2.0),
        )
    }

    pub fn center(&self) -> Coord {
        Coord::new(
            (self.south_west.x + self.north_east.x) / 2.0,
            (self.south_west.y + self.north_east.y) / 2.0,
        )
    }

    pub fn width(&self) -> f64 {
        self.north_east.x - self.south_west.x
    }

    pub fn height(&self) -> f64 {
        self.north_east.y - self.south_west.y
    }

    pub fn is_valid(&self) -> bool {
        self.south_west.is_finite()
            && self.north_east.is_finite()
            && self.width() > 0.0
            && self.height() > 0.0
    }
}

/// Last known view of the map, kept current by the camera.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct MapViewport {
    pub bounds: ViewportBounds,
    pub zoom: f32,
}

impl Default for MapViewport {
    fn default() -> Self {
        Self {
            bounds: ViewportBounds::around(Coord::default(), 1600.0, 900.0),
            zoom: 1.0,
        }
    }
}

/// Ask the camera to frame the given bounds.
#[derive(Message, Debug, Clone, Copy)]
pub struct FitViewportRequest {
    pub bounds: ViewportBounds,
}
