//! Structural feature data owned by the [`FeatureStore`](super::FeatureStore).
//!
//! Everything here is plain data: geometry, style and label are stored as values so
//! that history entries and snapshots can rebuild a feature after the original is
//! gone. Rendering handles live in the display layer, never in these types.

use std::fmt;
use std::str::FromStr;

use bevy::math::Vec2;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use uuid::Uuid;

/// Opaque identifier of a feature, stable across undo/redo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(Uuid);

impl FeatureId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FeatureId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A position in map world units. Serialized as a GeoJSON `[x, y]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Coord) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }
}

impl From<[f64; 2]> for Coord {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Coord> for [f64; 2] {
    fn from(c: Coord) -> Self {
        [c.x, c.y]
    }
}

impl From<Vec2> for Coord {
    fn from(v: Vec2) -> Self {
        Self::new(v.x as f64, v.y as f64)
    }
}

/// Feature geometry, tagged the same way GeoJSON tags it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Coord),
    LineString(Vec<Coord>),
    /// Rings are closed: the first and last coordinates are equal.
    Polygon(Vec<Vec<Coord>>),
}

impl Geometry {
    /// Build a single-ring polygon from open vertices, closing the ring.
    pub fn polygon(mut vertices: Vec<Coord>) -> Self {
        if let (Some(first), Some(last)) = (vertices.first().copied(), vertices.last().copied())
            && first != last
        {
            vertices.push(first);
        }
        Geometry::Polygon(vec![vertices])
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::LineString(_) => "LineString",
            Geometry::Polygon(_) => "Polygon",
        }
    }

    /// All coordinates of the geometry, rings flattened.
    pub fn coords(&self) -> Vec<Coord> {
        match self {
            Geometry::Point(c) => vec![*c],
            Geometry::LineString(line) => line.clone(),
            Geometry::Polygon(rings) => rings.iter().flatten().copied().collect(),
        }
    }

    /// Axis-aligned bounds as (min, max).
    pub fn bounds(&self) -> Option<(Coord, Coord)> {
        let coords = self.coords();
        let first = *coords.first()?;
        Some(coords.iter().fold((first, first), |(min, max), c| {
            (
                Coord::new(min.x.min(c.x), min.y.min(c.y)),
                Coord::new(max.x.max(c.x), max.y.max(c.y)),
            )
        }))
    }

    /// Check structural rules: finite coordinates, at least two line vertices,
    /// closed polygon rings of at least four positions.
    pub fn validate(&self) -> Result<(), String> {
        if !self.coords().iter().all(Coord::is_finite) {
            return Err("coordinates must be finite numbers".to_string());
        }
        match self {
            Geometry::Point(_) => Ok(()),
            Geometry::LineString(line) if line.len() < 2 => Err(format!(
                "a LineString needs at least 2 positions, got {}",
                line.len()
            )),
            Geometry::LineString(_) => Ok(()),
            Geometry::Polygon(rings) if rings.is_empty() => {
                Err("a Polygon needs at least one ring".to_string())
            }
            Geometry::Polygon(rings) => {
                for (i, ring) in rings.iter().enumerate() {
                    if ring.len() < 4 {
                        return Err(format!(
                            "ring {} needs at least 4 positions, got {}",
                            i,
                            ring.len()
                        ));
                    }
                    if ring.first() != ring.last() {
                        return Err(format!("ring {} is not closed", i));
                    }
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid color '{0}', expected #rrggbb")]
pub struct InvalidColor(pub String);

/// An sRGB color serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexColor(pub [u8; 3]);

impl HexColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
    }
}

impl FromStr for HexColor {
    type Err = InvalidColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.is_ascii())
            .ok_or_else(|| InvalidColor(s.to_string()))?;
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| InvalidColor(s.to_string()))
        };
        Ok(Self([channel(0)?, channel(2)?, channel(4)?]))
    }
}

impl Serialize for HexColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Stroke and fill appearance of a feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    pub color: HexColor,
    pub fill_color: HexColor,
    pub weight: f32,
    pub opacity: f32,
    pub fill_opacity: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: HexColor::rgb(0x2b, 0x6c, 0xb0),
            fill_color: HexColor::rgb(0x2b, 0x6c, 0xb0),
            weight: 2.0,
            opacity: 1.0,
            fill_opacity: 0.5,
        }
    }
}

/// How a point feature is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointSymbol {
    #[default]
    Marker,
    /// Only the label text is drawn (placed by the label tool).
    Text,
}

/// A drawn map feature. Clones of this value serve as structural snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: FeatureId,
    pub geometry: Geometry,
    pub style: Style,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub symbol: PointSymbol,
}

impl Feature {
    pub fn new(geometry: Geometry, style: Style) -> Self {
        Self {
            id: FeatureId::new(),
            geometry,
            style,
            label: None,
            symbol: PointSymbol::Marker,
        }
    }

    pub fn marker(at: Coord, style: Style) -> Self {
        Self::new(Geometry::Point(at), style)
    }

    pub fn text_label(at: Coord, text: impl Into<String>, style: Style) -> Self {
        Self {
            label: Some(text.into()),
            symbol: PointSymbol::Text,
            ..Self::marker(at, style)
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_ids_are_unique() {
        assert_ne!(FeatureId::new(), FeatureId::new());
    }

    #[test]
    fn test_hex_color_parse_and_display() {
        let color: HexColor = "#2B6cb0".parse().unwrap();
        assert_eq!(color, HexColor::rgb(0x2b, 0x6c, 0xb0));
        assert_eq!(color.to_string(), "#2b6cb0");
    }

    #[test]
    fn test_hex_color_rejects_malformed() {
        assert!("2b6cb0".parse::<HexColor>().is_err());
        assert!("#2b6cb".parse::<HexColor>().is_err());
        assert!("#zzzzzz".parse::<HexColor>().is_err());
    }

    #[test]
    fn test_style_serializes_with_hex_colors() {
        let json = serde_json::to_value(Style::default()).unwrap();
        assert_eq!(json["color"], "#2b6cb0");
        assert_eq!(json["fillColor"], "#2b6cb0");
        assert_eq!(json["fillOpacity"], 0.5);
    }

    #[test]
    fn test_geometry_uses_geojson_tags() {
        let point = Geometry::Point(Coord::new(1.5, -2.0));
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json["type"], "Point");
        assert_eq!(json["coordinates"], serde_json::json!([1.5, -2.0]));
    }

    #[test]
    fn test_polygon_closes_ring() {
        let polygon = Geometry::polygon(vec![
            Coord::new(0.0, 0.0),
            Coord::new(10.0, 0.0),
            Coord::new(10.0, 10.0),
        ]);
        let Geometry::Polygon(rings) = &polygon else {
            panic!("expected polygon");
        };
        assert_eq!(rings[0].len(), 4);
        assert_eq!(rings[0].first(), rings[0].last());
        assert!(polygon.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_short_line_and_open_ring() {
        let line = Geometry::LineString(vec![Coord::new(0.0, 0.0)]);
        assert!(line.validate().is_err());

        let open = Geometry::Polygon(vec![vec![
            Coord::new(0.0, 0.0),
            Coord::new(1.0, 0.0),
            Coord::new(1.0, 1.0),
            Coord::new(0.0, 1.0),
        ]]);
        assert!(open.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let point = Geometry::Point(Coord::new(f64::NAN, 0.0));
        assert!(point.validate().is_err());
    }

    #[test]
    fn test_bounds() {
        let line = Geometry::LineString(vec![Coord::new(-1.0, 4.0), Coord::new(3.0, -2.0)]);
        let (min, max) = line.bounds().unwrap();
        assert_eq!(min, Coord::new(-1.0, -2.0));
        assert_eq!(max, Coord::new(3.0, 4.0));
    }

    #[test]
    fn test_text_label_feature() {
        let feature = Feature::text_label(Coord::new(0.0, 0.0), "Harbor", Style::default());
        assert_eq!(feature.label.as_deref(), Some("Harbor"));
        assert_eq!(feature.symbol, PointSymbol::Text);
    }
}
