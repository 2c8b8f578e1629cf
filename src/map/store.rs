//! The live feature collection and its change notifications.
//!
//! Observers register with [`FeatureStore::subscribe`] and receive one
//! [`FeatureChange`] per mutation, in mutation order. A subscription lives exactly as
//! long as the [`FeatureSubscription`] handle: dropping it disconnects the channel and
//! the store forgets the subscriber on its next notification.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bevy::prelude::*;
use crossbeam::channel::{self, Receiver, Sender};
use thiserror::Error;

use super::feature::{Coord, Feature, FeatureId, Style};
use super::hit_testing::feature_hit;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("no feature with id {0}")]
    UnknownFeature(FeatureId),
    #[error("a feature with id {0} already exists")]
    DuplicateFeature(FeatureId),
}

/// One mutation of the store, with enough data to describe it in either direction.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureChange {
    Added(Feature),
    Removed(Feature),
    Restyled {
        id: FeatureId,
        before: Style,
        after: Style,
    },
}

impl FeatureChange {
    pub fn feature_id(&self) -> FeatureId {
        match self {
            FeatureChange::Added(feature) | FeatureChange::Removed(feature) => feature.id,
            FeatureChange::Restyled { id, .. } => *id,
        }
    }
}

struct Subscriber {
    sender: Sender<FeatureChange>,
    muted: Arc<AtomicBool>,
}

/// Receiving end of a store subscription.
pub struct FeatureSubscription {
    receiver: Receiver<FeatureChange>,
    muted: Arc<AtomicBool>,
}

impl FeatureSubscription {
    /// Take every pending notification, oldest first.
    pub fn drain(&self) -> Vec<FeatureChange> {
        self.receiver.try_iter().collect()
    }

    /// Stop delivery to this subscription until the returned guard is dropped.
    pub fn suppress(&self) -> ReplayGuard {
        ReplayGuard::acquire(Arc::clone(&self.muted))
    }

    pub fn is_suppressed(&self) -> bool {
        self.muted.load(Ordering::Acquire)
    }
}

/// Scoped "replay in progress" flag. Released on drop, including during unwinding.
#[must_use = "suppression ends as soon as the guard is dropped"]
pub struct ReplayGuard {
    flag: Arc<AtomicBool>,
    previous: bool,
}

impl ReplayGuard {
    fn acquire(flag: Arc<AtomicBool>) -> Self {
        let previous = flag.swap(true, Ordering::AcqRel);
        Self { flag, previous }
    }
}

impl Drop for ReplayGuard {
    fn drop(&mut self) {
        self.flag.store(self.previous, Ordering::Release);
    }
}

/// Resource owning every drawn feature, in insertion order.
#[derive(Resource, Default)]
pub struct FeatureStore {
    features: Vec<Feature>,
    subscribers: Vec<Subscriber>,
}

impl FeatureStore {
    pub fn subscribe(&mut self) -> FeatureSubscription {
        let (sender, receiver) = channel::unbounded();
        let muted = Arc::new(AtomicBool::new(false));
        self.subscribers.push(Subscriber {
            sender,
            muted: Arc::clone(&muted),
        });
        FeatureSubscription { receiver, muted }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn notify(&mut self, change: FeatureChange) {
        self.subscribers.retain(|subscriber| {
            if subscriber.muted.load(Ordering::Acquire) {
                return true;
            }
            // An unbounded send only fails once the receiver is gone
            subscriber.sender.send(change.clone()).is_ok()
        });
    }

    /// Add a feature under its own id.
    pub fn add(&mut self, feature: Feature) -> Result<FeatureId, StoreError> {
        if self.contains(feature.id) {
            return Err(StoreError::DuplicateFeature(feature.id));
        }
        let id = feature.id;
        self.features.push(feature.clone());
        self.notify(FeatureChange::Added(feature));
        Ok(id)
    }

    pub fn remove(&mut self, id: FeatureId) -> Result<Feature, StoreError> {
        let index = self
            .features
            .iter()
            .position(|f| f.id == id)
            .ok_or(StoreError::UnknownFeature(id))?;
        let feature = self.features.remove(index);
        self.notify(FeatureChange::Removed(feature.clone()));
        Ok(feature)
    }

    /// Replace a feature's style. Setting an identical style is not a mutation.
    pub fn set_style(&mut self, id: FeatureId, style: Style) -> Result<(), StoreError> {
        let feature = self
            .features
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(StoreError::UnknownFeature(id))?;
        if feature.style == style {
            return Ok(());
        }
        let before = std::mem::replace(&mut feature.style, style.clone());
        self.notify(FeatureChange::Restyled {
            id,
            before,
            after: style,
        });
        Ok(())
    }

    /// Remove every feature, one notification per feature.
    pub fn clear(&mut self) {
        let removed = std::mem::take(&mut self.features);
        for feature in removed {
            self.notify(FeatureChange::Removed(feature));
        }
    }

    pub fn get(&self, id: FeatureId) -> Option<&Feature> {
        self.features.iter().find(|f| f.id == id)
    }

    pub fn contains(&self, id: FeatureId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Owned copies of all features.
    pub fn snapshots(&self) -> Vec<Feature> {
        self.features.clone()
    }

    /// Topmost (most recently added) feature under `point`.
    pub fn hit_test(&self, point: Coord, tolerance: f64) -> Option<FeatureId> {
        self.features
            .iter()
            .rev()
            .find(|f| feature_hit(f, point, tolerance))
            .map(|f| f.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::feature::{Geometry, HexColor};

    fn marker(x: f64, y: f64) -> Feature {
        Feature::marker(Coord::new(x, y), Style::default())
    }

    #[test]
    fn test_add_notifies_subscriber() {
        let mut store = FeatureStore::default();
        let subscription = store.subscribe();
        let feature = marker(1.0, 2.0);

        let id = store.add(feature.clone()).unwrap();

        assert_eq!(id, feature.id);
        assert_eq!(subscription.drain(), vec![FeatureChange::Added(feature)]);
    }

    #[test]
    fn test_duplicate_add_rejected() {
        let mut store = FeatureStore::default();
        let feature = marker(0.0, 0.0);
        store.add(feature.clone()).unwrap();
        assert_eq!(
            store.add(feature.clone()),
            Err(StoreError::DuplicateFeature(feature.id))
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_unknown_feature() {
        let mut store = FeatureStore::default();
        let id = FeatureId::new();
        assert_eq!(store.remove(id), Err(StoreError::UnknownFeature(id)));
    }

    #[test]
    fn test_set_style_reports_before_and_after() {
        let mut store = FeatureStore::default();
        let id = store.add(marker(0.0, 0.0)).unwrap();
        let subscription = store.subscribe();
        let new_style = Style {
            color: HexColor::rgb(255, 0, 0),
            ..Style::default()
        };

        store.set_style(id, new_style.clone()).unwrap();

        assert_eq!(
            subscription.drain(),
            vec![FeatureChange::Restyled {
                id,
                before: Style::default(),
                after: new_style,
            }]
        );
    }

    #[test]
    fn test_identical_style_is_not_a_change() {
        let mut store = FeatureStore::default();
        let id = store.add(marker(0.0, 0.0)).unwrap();
        let subscription = store.subscribe();

        store.set_style(id, Style::default()).unwrap();

        assert!(subscription.drain().is_empty());
    }

    #[test]
    fn test_clear_emits_one_removal_per_feature() {
        let mut store = FeatureStore::default();
        store.add(marker(0.0, 0.0)).unwrap();
        store.add(marker(1.0, 1.0)).unwrap();
        let subscription = store.subscribe();

        store.clear();

        let changes = subscription.drain();
        assert_eq!(changes.len(), 2);
        assert!(changes.iter().all(|c| matches!(c, FeatureChange::Removed(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_dropped_subscription_is_pruned() {
        let mut store = FeatureStore::default();
        let subscription = store.subscribe();
        assert_eq!(store.subscriber_count(), 1);

        drop(subscription);
        store.add(marker(0.0, 0.0)).unwrap();

        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_suppressed_subscription_misses_changes() {
        let mut store = FeatureStore::default();
        let subscription = store.subscribe();
        let other = store.subscribe();

        {
            let _guard = subscription.suppress();
            assert!(subscription.is_suppressed());
            store.add(marker(0.0, 0.0)).unwrap();
        }

        assert!(!subscription.is_suppressed());
        assert!(subscription.drain().is_empty());
        assert_eq!(other.drain().len(), 1);
    }

    #[test]
    fn test_guard_released_during_unwind() {
        let mut store = FeatureStore::default();
        let subscription = store.subscribe();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = subscription.suppress();
            panic!("replay failed");
        }));

        assert!(result.is_err());
        assert!(!subscription.is_suppressed());
    }

    #[test]
    fn test_nested_guards_restore_outer_state() {
        let mut store = FeatureStore::default();
        let subscription = store.subscribe();

        let outer = subscription.suppress();
        {
            let _inner = subscription.suppress();
        }
        assert!(subscription.is_suppressed());
        drop(outer);
        assert!(!subscription.is_suppressed());
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let mut store = FeatureStore::default();
        store.add(marker(0.0, 0.0)).unwrap();
        let top = store.add(marker(1.0, 0.0)).unwrap();

        assert_eq!(store.hit_test(Coord::new(0.5, 0.0), 5.0), Some(top));
        assert_eq!(store.hit_test(Coord::new(50.0, 50.0), 5.0), None);
    }

    #[test]
    fn test_hit_test_polygon_interior() {
        let mut store = FeatureStore::default();
        let id = store
            .add(Feature::new(
                Geometry::polygon(vec![
                    Coord::new(0.0, 0.0),
                    Coord::new(100.0, 0.0),
                    Coord::new(100.0, 100.0),
                    Coord::new(0.0, 100.0),
                ]),
                Style::default(),
            ))
            .unwrap();

        assert_eq!(store.hit_test(Coord::new(50.0, 50.0), 1.0), Some(id));
    }
}
