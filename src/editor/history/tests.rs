//! Unit tests for the history module.

use chrono::{Duration, Utc};

use super::engine::{HistoryEngine, HistoryOutcome, ReplayDirection};
use super::entry::HistoryEntry;
use crate::map::{
    Coord, Feature, FeatureChange, FeatureId, FeatureStore, Geometry, HexColor, StoreError, Style,
};

fn marker(x: f64) -> Feature {
    Feature::marker(Coord::new(x, 0.0), Style::default())
}

fn red() -> Style {
    Style {
        color: HexColor::rgb(220, 20, 20),
        ..Style::default()
    }
}

fn setup(capacity: usize) -> (FeatureStore, HistoryEngine) {
    let mut store = FeatureStore::default();
    let history = HistoryEngine::new(&mut store, capacity);
    (store, history)
}

#[test]
fn test_capture_records_in_mutation_order() {
    let (mut store, mut history) = setup(10);
    let a = store.add(marker(0.0)).unwrap();
    store.set_style(a, red()).unwrap();
    store.remove(a).unwrap();

    assert_eq!(history.capture(), 3);

    let names: Vec<_> = history.undo_entries().map(|e| e.action_name()).collect();
    assert_eq!(names, vec!["addition", "style change", "deletion"]);
}

#[test]
fn test_undo_on_empty_is_noop() {
    let (mut store, mut history) = setup(10);
    assert_eq!(history.undo(&mut store), Ok(HistoryOutcome::NothingToDo));
    assert_eq!(history.redo(&mut store), Ok(HistoryOutcome::NothingToDo));
    assert!(store.is_empty());
}

#[test]
fn test_undo_inverse_law() {
    let (mut store, mut history) = setup(100);
    let mut ids = Vec::new();
    for i in 0..5 {
        ids.push(store.add(marker(i as f64)).unwrap());
    }
    store.set_style(ids[1], red()).unwrap();
    store.remove(ids[3]).unwrap();
    history.capture();
    let mutations = history.undo_count();

    for _ in 0..mutations {
        assert!(matches!(
            history.undo(&mut store),
            Ok(HistoryOutcome::Applied(_))
        ));
    }

    assert!(store.is_empty());
    assert!(!history.can_undo());
    assert_eq!(history.redo_count(), mutations);
}

#[test]
fn test_undo_redo_round_trip_for_each_kind() {
    // Addition
    let (mut store, mut history) = setup(10);
    store.add(marker(0.0)).unwrap();
    history.capture();
    let before = store.snapshots();
    history.undo(&mut store).unwrap();
    history.redo(&mut store).unwrap();
    assert_eq!(store.snapshots(), before);

    // Deletion
    let (mut store, mut history) = setup(10);
    let id = store.add(marker(0.0)).unwrap();
    store.add(marker(1.0)).unwrap();
    store.remove(id).unwrap();
    history.capture();
    let before = store.snapshots();
    history.undo(&mut store).unwrap();
    assert!(store.contains(id));
    history.redo(&mut store).unwrap();
    assert_eq!(store.snapshots(), before);

    // Style change
    let (mut store, mut history) = setup(10);
    let id = store.add(marker(0.0)).unwrap();
    store.set_style(id, red()).unwrap();
    history.capture();
    let before = store.snapshots();
    history.undo(&mut store).unwrap();
    assert_eq!(store.get(id).map(|f| f.style.clone()), Some(Style::default()));
    history.redo(&mut store).unwrap();
    assert_eq!(store.snapshots(), before);
}

#[test]
fn test_undone_removal_keeps_id_and_label() {
    let (mut store, mut history) = setup(10);
    let id = store.add(marker(2.0).with_label("Spring")).unwrap();
    store.remove(id).unwrap();
    history.capture();

    history.undo(&mut store).unwrap();

    let restored = store.get(id).unwrap();
    assert_eq!(restored.label.as_deref(), Some("Spring"));
    assert_eq!(restored.geometry, Geometry::Point(Coord::new(2.0, 0.0)));
}

#[test]
fn test_replay_is_not_recorded() {
    let (mut store, mut history) = setup(10);
    store.add(marker(0.0)).unwrap();
    history.capture();

    history.undo(&mut store).unwrap();
    assert_eq!(history.capture(), 0);
    history.redo(&mut store).unwrap();
    assert_eq!(history.capture(), 0);

    assert_eq!(history.undo_count(), 1);
    assert_eq!(history.redo_count(), 0);
}

#[test]
fn test_new_mutation_invalidates_redo() {
    let (mut store, mut history) = setup(10);
    for i in 0..3 {
        store.add(marker(i as f64)).unwrap();
    }
    history.capture();
    history.undo(&mut store).unwrap();
    history.undo(&mut store).unwrap();
    assert_eq!(history.redo_count(), 2);

    store.add(marker(9.0)).unwrap();
    history.capture();

    assert!(!history.can_redo());
    assert_eq!(history.redo(&mut store), Ok(HistoryOutcome::NothingToDo));
    assert_eq!(store.len(), 2);
}

#[test]
fn test_uncaptured_changes_precede_undo() {
    let (mut store, mut history) = setup(10);
    store.add(marker(0.0)).unwrap();
    history.capture();
    let late = store.add(marker(1.0)).unwrap();

    // Undo without an explicit capture still undoes the latest change
    history.undo(&mut store).unwrap();

    assert!(!store.contains(late));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_capacity_evicts_exactly_oldest() {
    let capacity = 5;
    let (mut store, mut history) = setup(capacity);
    let first = store.add(marker(0.0)).unwrap();
    for i in 1..=capacity {
        store.add(marker(i as f64)).unwrap();
    }
    history.capture();

    assert_eq!(history.undo_count(), capacity);

    while history.can_undo() {
        history.undo(&mut store).unwrap();
    }
    // The evicted addition can never be undone
    assert_eq!(store.len(), 1);
    assert!(store.contains(first));
}

#[test]
fn test_default_capacity_bound() {
    let (mut store, mut history) = setup(crate::constants::DEFAULT_HISTORY_CAPACITY);
    for i in 0..=crate::constants::DEFAULT_HISTORY_CAPACITY {
        store.add(marker(i as f64)).unwrap();
    }
    history.capture();
    assert_eq!(history.undo_count(), 1000);
}

#[test]
fn test_set_capacity_trims() {
    let (mut store, mut history) = setup(10);
    for i in 0..6 {
        store.add(marker(i as f64)).unwrap();
    }
    history.capture();

    history.set_capacity(4);

    assert_eq!(history.capacity(), 4);
    assert_eq!(history.undo_count(), 4);
}

#[test]
fn test_failed_replay_restores_entry_and_guard() {
    let (mut store, mut history) = setup(10);
    let id = FeatureId::new();
    history.record(FeatureChange::Restyled {
        id,
        before: Style::default(),
        after: red(),
    });

    let err = history.undo(&mut store).unwrap_err();

    assert_eq!(err.direction, ReplayDirection::Undo);
    assert_eq!(err.source, StoreError::UnknownFeature(id));
    assert_eq!(history.undo_count(), 1);
    assert_eq!(history.redo_count(), 0);

    // Suppression was released: later edits are still captured
    store.add(marker(0.0)).unwrap();
    assert_eq!(history.capture(), 1);
}

#[test]
fn test_peek_descriptions() {
    let (mut store, mut history) = setup(10);
    let now = Utc::now();
    assert_eq!(history.peek_undo_description_at(now), "Nothing to undo");
    assert_eq!(history.peek_redo_description_at(now), "Nothing to redo");

    history.record_entry(HistoryEntry::new(
        FeatureChange::Removed(marker(0.0)),
        now - Duration::minutes(3),
    ));
    assert_eq!(history.peek_undo_description_at(now), "Undo deletion (3m ago)");

    history.undo(&mut store).unwrap();
    assert_eq!(history.peek_redo_description_at(now), "Redo deletion (3m ago)");
    assert_eq!(history.peek_undo_description_at(now), "Nothing to undo");
    assert_eq!(store.len(), 1);
}

#[test]
fn test_clear_discards_pending_notifications() {
    let (mut store, mut history) = setup(10);
    store.add(marker(0.0)).unwrap();
    history.capture();
    store.add(marker(1.0)).unwrap();

    history.clear();

    assert_eq!(history.capture(), 0);
    assert!(!history.can_undo());
}

/// add A (D), add B (D), restyle A to S1; undo ×3; redo ×2.
#[test]
fn test_add_add_restyle_scenario() {
    let (mut store, mut history) = setup(1000);
    let d = Style::default();
    let s1 = red();

    let a = store.add(Feature::marker(Coord::new(0.0, 0.0), d.clone())).unwrap();
    history.capture();
    let b = store.add(Feature::marker(Coord::new(5.0, 5.0), d.clone())).unwrap();
    history.capture();
    store.set_style(a, s1.clone()).unwrap();
    history.capture();

    let style_of = |store: &FeatureStore, id| store.get(id).map(|f: &Feature| f.style.clone());
    let ids = |store: &FeatureStore| store.iter().map(|f| f.id).collect::<Vec<_>>();

    history.undo(&mut store).unwrap();
    assert_eq!(ids(&store), vec![a, b]);
    assert_eq!(style_of(&store, a), Some(d.clone()));

    history.undo(&mut store).unwrap();
    assert_eq!(ids(&store), vec![a]);
    assert_eq!(style_of(&store, a), Some(d.clone()));

    history.undo(&mut store).unwrap();
    assert!(store.is_empty());

    history.redo(&mut store).unwrap();
    assert_eq!(ids(&store), vec![a]);
    assert_eq!(style_of(&store, a), Some(d.clone()));

    history.redo(&mut store).unwrap();
    assert_eq!(ids(&store), vec![a, b]);
    // The restyle is still waiting on the redo stack
    assert_eq!(style_of(&store, a), Some(d));
    assert_eq!(history.redo_count(), 1);
    assert_eq!(history.peek_redo_description_at(Utc::now()), "Redo style change (just now)");
}
