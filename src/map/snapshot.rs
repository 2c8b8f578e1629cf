//! Import/export bundle: a GeoJSON `FeatureCollection` carrying per-feature style and
//! label in `properties`, plus viewport and base-layer metadata.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::feature::{Feature, FeatureId, Geometry, PointSymbol, Style};
use super::store::{FeatureStore, StoreError};
use super::viewport::ViewportBounds;

pub const SNAPSHOT_VERSION: u32 = 1;

/// Error raised when a persisted snapshot cannot be imported.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("not a valid map file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("feature {index} has invalid geometry: {reason}")]
    InvalidGeometry { index: usize, reason: String },
    #[error("unsupported map file version {0}")]
    UnsupportedVersion(u32),
}

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Metadata {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    bounds: Option<ViewportBounds>,
    #[serde(default)]
    zoom: Option<f32>,
    #[serde(default)]
    base_layer: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Properties {
    #[serde(default)]
    style: Style,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(default)]
    symbol: PointSymbol,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
enum GeoJsonFeature {
    Feature {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<FeatureId>,
        geometry: Geometry,
        #[serde(default)]
        properties: Properties,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
enum Document {
    FeatureCollection {
        features: Vec<GeoJsonFeature>,
        #[serde(default)]
        metadata: Option<Metadata>,
    },
}

/// Everything needed to restore a map view.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSnapshot {
    pub features: Vec<Feature>,
    pub bounds: Option<ViewportBounds>,
    pub zoom: Option<f32>,
    pub base_layer: Option<String>,
}

impl MapSnapshot {
    pub fn capture(
        store: &FeatureStore,
        bounds: ViewportBounds,
        zoom: f32,
        base_layer: &str,
    ) -> Self {
        Self {
            features: store.snapshots(),
            bounds: Some(bounds),
            zoom: Some(zoom),
            base_layer: Some(base_layer.to_string()),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let features = self
            .features
            .iter()
            .map(|f| GeoJsonFeature::Feature {
                id: Some(f.id),
                geometry: f.geometry.clone(),
                properties: Properties {
                    style: f.style.clone(),
                    label: f.label.clone(),
                    symbol: f.symbol,
                },
            })
            .collect();
        let document = Document::FeatureCollection {
            features,
            metadata: Some(Metadata {
                version: SNAPSHOT_VERSION,
                bounds: self.bounds,
                zoom: self.zoom,
                base_layer: self.base_layer.clone(),
            }),
        };
        serde_json::to_string_pretty(&document)
    }

    /// Parse and validate a snapshot. Missing or repeated feature ids are replaced
    /// with fresh ones so the result can always be added to an empty store.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let Document::FeatureCollection { features, metadata } = serde_json::from_str(json)?;
        let metadata = metadata.unwrap_or(Metadata {
            version: SNAPSHOT_VERSION,
            bounds: None,
            zoom: None,
            base_layer: None,
        });
        if metadata.version > SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(metadata.version));
        }

        let mut seen = HashSet::new();
        let mut parsed = Vec::with_capacity(features.len());
        for (index, GeoJsonFeature::Feature { id, geometry, properties }) in
            features.into_iter().enumerate()
        {
            geometry
                .validate()
                .map_err(|reason| SnapshotError::InvalidGeometry { index, reason })?;
            let id = id.filter(|id| seen.insert(*id)).unwrap_or_else(|| {
                let fresh = FeatureId::new();
                seen.insert(fresh);
                fresh
            });
            parsed.push(Feature {
                id,
                geometry,
                style: properties.style,
                label: properties.label,
                symbol: properties.symbol,
            });
        }

        Ok(Self {
            features: parsed,
            bounds: metadata.bounds.filter(ViewportBounds::is_valid),
            zoom: metadata.zoom,
            base_layer: metadata.base_layer,
        })
    }

    /// Replace the store contents with this snapshot's features.
    ///
    /// Existing features are cleared first, each removal and addition going through
    /// the normal notification path.
    pub fn apply_to(&self, store: &mut FeatureStore) -> Result<usize, StoreError> {
        store.clear();
        for feature in &self.features {
            store.add(feature.clone())?;
        }
        Ok(self.features.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::feature::{Coord, HexColor};

    fn sample_store() -> FeatureStore {
        let mut store = FeatureStore::default();
        let red = Style {
            color: HexColor::rgb(200, 10, 10),
            weight: 4.0,
            ..Style::default()
        };
        store
            .add(Feature::marker(Coord::new(1.0, 2.0), Style::default()).with_label("Camp"))
            .unwrap();
        store
            .add(Feature::new(
                Geometry::LineString(vec![Coord::new(0.0, 0.0), Coord::new(5.0, 5.0)]),
                red,
            ))
            .unwrap();
        store
            .add(Feature::text_label(Coord::new(3.0, 3.0), "Ridge", Style::default()))
            .unwrap();
        store
    }

    fn bounds() -> ViewportBounds {
        ViewportBounds::new(Coord::new(-100.0, -50.0), Coord::new(100.0, 50.0))
    }

    #[test]
    fn test_export_import_preserves_style_and_label() {
        let store = sample_store();
        let snapshot = MapSnapshot::capture(&store, bounds(), 1.5, "Satellite");

        let json = snapshot.to_json().unwrap();
        let restored = MapSnapshot::from_json(&json).unwrap();

        assert_eq!(restored, snapshot);
    }

    #[test]
    fn test_document_shape_is_geojson() {
        let store = sample_store();
        let json = MapSnapshot::capture(&store, bounds(), 1.0, "Terrain")
            .to_json()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"][0]["type"], "Feature");
        assert_eq!(value["features"][0]["properties"]["label"], "Camp");
        assert_eq!(value["metadata"]["baseLayer"], "Terrain");
        assert_eq!(value["metadata"]["bounds"]["southWest"], serde_json::json!([-100.0, -50.0]));
    }

    #[test]
    fn test_plain_geojson_without_metadata() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "geometry": { "type": "Point", "coordinates": [4, 5] } }
            ]
        }"#;

        let snapshot = MapSnapshot::from_json(json).unwrap();

        assert_eq!(snapshot.features.len(), 1);
        assert_eq!(snapshot.features[0].style, Style::default());
        assert!(snapshot.bounds.is_none());
        assert!(snapshot.base_layer.is_none());
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = MapSnapshot::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SnapshotError::Parse(_)));
    }

    #[test]
    fn test_wrong_document_type_is_parse_error() {
        let err = MapSnapshot::from_json(r#"{ "type": "Feature", "features": [] }"#).unwrap_err();
        assert!(matches!(err, SnapshotError::Parse(_)));
    }

    #[test]
    fn test_invalid_geometry_reports_index() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "geometry": { "type": "Point", "coordinates": [0, 0] } },
                { "type": "Feature", "geometry": { "type": "LineString", "coordinates": [[0, 0]] } }
            ]
        }"#;

        let err = MapSnapshot::from_json(json).unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidGeometry { index: 1, .. }));
    }

    #[test]
    fn test_future_version_rejected() {
        let json = r#"{ "type": "FeatureCollection", "features": [], "metadata": { "version": 99 } }"#;
        let err = MapSnapshot::from_json(json).unwrap_err();
        assert!(matches!(err, SnapshotError::UnsupportedVersion(99)));
    }

    #[test]
    fn test_duplicate_ids_are_replaced() {
        let id = FeatureId::new();
        let json = format!(
            r#"{{ "type": "FeatureCollection", "features": [
                {{ "type": "Feature", "id": "{id}", "geometry": {{ "type": "Point", "coordinates": [0, 0] }} }},
                {{ "type": "Feature", "id": "{id}", "geometry": {{ "type": "Point", "coordinates": [1, 1] }} }}
            ] }}"#
        );

        let snapshot = MapSnapshot::from_json(&json).unwrap();

        assert_eq!(snapshot.features[0].id, id);
        assert_ne!(snapshot.features[1].id, id);
    }

    #[test]
    fn test_apply_replaces_store_contents() {
        let mut store = sample_store();
        let snapshot = MapSnapshot {
            features: vec![Feature::marker(Coord::new(9.0, 9.0), Style::default())],
            bounds: None,
            zoom: None,
            base_layer: None,
        };

        let added = snapshot.apply_to(&mut store).unwrap();

        assert_eq!(added, 1);
        assert_eq!(store.snapshots(), snapshot.features);
    }

    #[test]
    fn test_degenerate_bounds_dropped() {
        let json = r#"{ "type": "FeatureCollection", "features": [],
            "metadata": { "bounds": { "southWest": [5, 5], "northEast": [5, 5] } } }"#;
        let snapshot = MapSnapshot::from_json(json).unwrap();
        assert!(snapshot.bounds.is_none());
    }
}
