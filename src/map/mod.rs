mod base_layer;
mod feature;
mod hit_testing;
pub mod persistence;
mod snapshot;
mod store;
mod viewport;

pub use base_layer::{apply_base_layer_backdrop, ActiveBaseLayer, BaseLayer};
pub use feature::{Coord, Feature, FeatureId, Geometry, HexColor, PointSymbol, Style};
pub use persistence::{
    AsyncSnapshotOperation, CurrentSnapshotFile, ExportSnapshotRequest, ImportSnapshotRequest,
};
pub use snapshot::{MapSnapshot, SnapshotError};
pub use store::{FeatureChange, FeatureStore, FeatureSubscription, StoreError};
pub use viewport::{FitViewportRequest, MapViewport, ViewportBounds};

use bevy::prelude::*;

use crate::common::Alerts;
use crate::config::{AppConfig, ConfigLoaded};

/// Startup system to select the configured base layer
fn apply_configured_base_layer(config: Res<AppConfig>, mut base_layer: ResMut<ActiveBaseLayer>) {
    base_layer.layer = config.data.base_layer();
    info!("Base layer: {}", base_layer.layer.display_name());
}

pub struct MapPlugin;

impl Plugin for MapPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FeatureStore>()
            .init_resource::<ActiveBaseLayer>()
            .init_resource::<MapViewport>()
            .init_resource::<AsyncSnapshotOperation>()
            .init_resource::<CurrentSnapshotFile>()
            .init_resource::<Alerts>()
            .add_message::<ExportSnapshotRequest>()
            .add_message::<ImportSnapshotRequest>()
            .add_message::<FitViewportRequest>()
            .add_systems(Startup, apply_configured_base_layer.after(ConfigLoaded))
            .add_systems(
                Update,
                (
                    persistence::export_snapshot_system.run_if(on_message::<ExportSnapshotRequest>),
                    persistence::import_snapshot_system.run_if(on_message::<ImportSnapshotRequest>),
                    persistence::poll_export_tasks,
                    persistence::poll_import_tasks,
                    apply_base_layer_backdrop,
                ),
            );
    }
}
