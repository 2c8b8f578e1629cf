//! Unit tests for the persistence module.

use std::path::PathBuf;

use super::import::apply_snapshot;
use super::resources::CurrentSnapshotFile;
use super::results::{read_snapshot, write_snapshot, ImportError};
use crate::editor::construction::{ConstructionHelper, ConstructionKind};
use crate::editor::HistoryEngine;
use crate::map::{
    ActiveBaseLayer, BaseLayer, Coord, Feature, FeatureStore, MapSnapshot, SnapshotError, Style,
    ViewportBounds,
};

fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("mapscribe-{}-{}.json", name, std::process::id()))
}

fn snapshot_with(base_layer: Option<&str>) -> MapSnapshot {
    MapSnapshot {
        features: vec![
            Feature::marker(Coord::new(1.0, 1.0), Style::default()).with_label("Well"),
            Feature::text_label(Coord::new(4.0, 2.0), "North Gate", Style::default()),
        ],
        bounds: Some(ViewportBounds::new(
            Coord::new(0.0, 0.0),
            Coord::new(10.0, 10.0),
        )),
        zoom: Some(2.0),
        base_layer: base_layer.map(str::to_string),
    }
}

#[test]
fn test_write_then_read_file() {
    let path = scratch_path("roundtrip");
    let snapshot = snapshot_with(Some("Terrain"));

    let written = write_snapshot(&path, &snapshot).unwrap();
    let read = read_snapshot(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(written, 2);
    assert_eq!(read, snapshot);
}

#[test]
fn test_read_missing_file() {
    let err = read_snapshot(&scratch_path("does-not-exist")).unwrap_err();
    assert!(matches!(err, ImportError::Read(_)));
}

#[test]
fn test_read_malformed_file() {
    let path = scratch_path("malformed");
    std::fs::write(&path, "[1, 2, 3]").unwrap();

    let err = read_snapshot(&path).unwrap_err();
    let _ = std::fs::remove_file(&path);

    assert!(matches!(err, ImportError::Format(SnapshotError::Parse(_))));
}

#[test]
fn test_apply_replaces_features_and_base_layer() {
    let mut store = FeatureStore::default();
    store
        .add(Feature::marker(Coord::new(50.0, 50.0), Style::default()))
        .unwrap();
    let mut base_layer = ActiveBaseLayer::default();
    let snapshot = snapshot_with(Some("Satellite"));

    let added = apply_snapshot(&snapshot, &mut store, &mut base_layer).unwrap();

    assert_eq!(added, 2);
    assert_eq!(store.snapshots(), snapshot.features);
    assert_eq!(base_layer.layer, BaseLayer::Satellite);
}

#[test]
fn test_apply_keeps_base_layer_when_unknown() {
    let mut store = FeatureStore::default();
    let mut base_layer = ActiveBaseLayer {
        layer: BaseLayer::Terrain,
    };

    apply_snapshot(&snapshot_with(Some("Watercolor")), &mut store, &mut base_layer).unwrap();

    assert_eq!(base_layer.layer, BaseLayer::Terrain);
}

/// Features sorted by id; undo re-adds removed features on top of the store.
fn sorted(mut features: Vec<Feature>) -> Vec<Feature> {
    features.sort_by_key(|f| f.id);
    features
}

fn undo_all(history: &mut HistoryEngine, store: &mut FeatureStore) {
    while history.can_undo() {
        history.undo(store).unwrap();
    }
}

#[test]
fn test_apply_is_undoable() {
    let mut store = FeatureStore::default();
    let mut history = HistoryEngine::new(&mut store, 100);
    for x in [10.0, 20.0, 30.0] {
        store
            .add(Feature::marker(Coord::new(x, x), Style::default()))
            .unwrap();
    }
    history.capture();
    history.clear();
    let before = store.snapshots();
    let mut base_layer = ActiveBaseLayer::default();
    let snapshot = snapshot_with(None);

    let added = apply_snapshot(&snapshot, &mut store, &mut base_layer).unwrap();
    history.capture();

    assert_eq!(history.undo_count(), before.len() + added);
    undo_all(&mut history, &mut store);
    assert_eq!(sorted(store.snapshots()), sorted(before));
}

#[test]
fn test_reimport_with_same_ids_is_undoable() {
    let mut store = FeatureStore::default();
    let mut history = HistoryEngine::new(&mut store, 100);
    let mut base_layer = ActiveBaseLayer::default();
    let snapshot = snapshot_with(None);
    apply_snapshot(&snapshot, &mut store, &mut base_layer).unwrap();
    history.capture();
    history.clear();

    // Same ids: every feature is removed, then re-added
    let added = apply_snapshot(&snapshot, &mut store, &mut base_layer).unwrap();
    history.capture();

    assert_eq!(history.undo_count(), 2 * added);
    assert_eq!(store.snapshots(), snapshot.features);

    undo_all(&mut history, &mut store);
    assert_eq!(sorted(store.snapshots()), sorted(snapshot.features.clone()));

    while history.can_redo() {
        history.redo(&mut store).unwrap();
    }
    assert_eq!(store.snapshots(), snapshot.features);
}

#[test]
fn test_drawn_polygons_survive_export_and_import() {
    let outlines = [
        vec![(0.0, 0.0), (10.0, 0.0), (5.0, 8.0)],
        vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)],
        // Repeated first vertex and a fold-back are refused while drawing
        vec![(0.0, 0.0), (10.0, 0.0), (0.0, 0.0), (5.0, 0.0), (4.0, 6.0)],
    ];
    let mut store = FeatureStore::default();
    for outline in outlines {
        let mut helper = ConstructionHelper::new(ConstructionKind::Polygon);
        for (x, y) in outline {
            let _ = helper.push_vertex(Coord::new(x, y));
        }
        let geometry = helper.finish().unwrap();
        store.add(Feature::new(geometry, Style::default())).unwrap();
    }
    let bounds = ViewportBounds::new(Coord::new(0.0, 0.0), Coord::new(10.0, 10.0));

    let json = MapSnapshot::capture(&store, bounds, 1.0, BaseLayer::default().id())
        .to_json()
        .unwrap();
    let imported = MapSnapshot::from_json(&json).unwrap();

    assert_eq!(imported.features, store.snapshots());
}

#[test]
fn test_current_file_display_name() {
    let mut current = CurrentSnapshotFile::default();
    assert_eq!(current.display_name(), "Untitled Map");

    current.path = Some(PathBuf::from("/maps/coast-survey.json"));
    assert_eq!(current.display_name(), "coast-survey");
}
