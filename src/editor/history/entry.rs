//! History entries and their replay.

use chrono::{DateTime, Utc};

use crate::map::{FeatureChange, FeatureStore, StoreError};

/// One recorded mutation. Never modified after creation, only moved between stacks.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    change: FeatureChange,
    created_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(change: FeatureChange, created_at: DateTime<Utc>) -> Self {
        Self { change, created_at }
    }

    pub fn change(&self) -> &FeatureChange {
        &self.change
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn action_name(&self) -> &'static str {
        match self.change {
            FeatureChange::Added(_) => "addition",
            FeatureChange::Removed(_) => "deletion",
            FeatureChange::Restyled { .. } => "style change",
        }
    }

    /// e.g. `deletion (3m ago)`
    pub fn describe_at(&self, now: DateTime<Utc>) -> String {
        format!("{} ({})", self.action_name(), time_ago(self.created_at, now))
    }

    pub fn describe(&self) -> String {
        self.describe_at(Utc::now())
    }

    /// Undo the mutation.
    pub(super) fn apply_inverse(&self, store: &mut FeatureStore) -> Result<(), StoreError> {
        match &self.change {
            FeatureChange::Added(feature) => store.remove(feature.id).map(drop),
            FeatureChange::Removed(feature) => store.add(feature.clone()).map(drop),
            FeatureChange::Restyled { id, before, .. } => store.set_style(*id, before.clone()),
        }
    }

    /// Redo the mutation.
    pub(super) fn apply_forward(&self, store: &mut FeatureStore) -> Result<(), StoreError> {
        match &self.change {
            FeatureChange::Added(feature) => store.add(feature.clone()).map(drop),
            FeatureChange::Removed(feature) => store.remove(feature.id).map(drop),
            FeatureChange::Restyled { id, after, .. } => store.set_style(*id, after.clone()),
        }
    }
}

/// Coarse relative age: `just now`, `Nm ago`, `Nh ago` or `Nd ago`.
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();
    if seconds < 60 {
        "just now".to_string()
    } else if seconds < 3600 {
        format!("{}m ago", seconds / 60)
    } else if seconds < 86_400 {
        format!("{}h ago", seconds / 3600)
    } else {
        format!("{}d ago", seconds / 86_400)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::map::{Coord, Feature, Style};

    #[test]
    fn test_time_ago_buckets() {
        let now = Utc::now();
        assert_eq!(time_ago(now, now), "just now");
        assert_eq!(time_ago(now - Duration::seconds(59), now), "just now");
        assert_eq!(time_ago(now - Duration::seconds(60), now), "1m ago");
        assert_eq!(time_ago(now - Duration::minutes(59), now), "59m ago");
        assert_eq!(time_ago(now - Duration::hours(5), now), "5h ago");
        assert_eq!(time_ago(now - Duration::days(3), now), "3d ago");
    }

    #[test]
    fn test_clock_skew_reads_as_just_now() {
        let now = Utc::now();
        assert_eq!(time_ago(now + Duration::minutes(5), now), "just now");
    }

    #[test]
    fn test_description_names_the_action() {
        let now = Utc::now();
        let feature = Feature::marker(Coord::new(0.0, 0.0), Style::default());
        let entry = HistoryEntry::new(FeatureChange::Removed(feature), now - Duration::minutes(3));
        assert_eq!(entry.describe_at(now), "deletion (3m ago)");
    }
}
