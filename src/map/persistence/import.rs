//! Snapshot import system and task polling.

use bevy::prelude::*;
use bevy::tasks::IoTaskPool;
use futures_lite::future;

use crate::common::{AlertKind, Alerts};
use crate::config::UpdateLastSnapshotPathRequest;
use crate::map::{
    ActiveBaseLayer, BaseLayer, FeatureStore, FitViewportRequest, MapSnapshot, StoreError,
};

use super::messages::ImportSnapshotRequest;
use super::resources::{AsyncSnapshotOperation, CurrentSnapshotFile, ImportSnapshotTask};
use super::results::{read_snapshot, ImportResult};

/// Starts an async read and parse of a snapshot file
pub fn import_snapshot_system(
    mut commands: Commands,
    mut events: MessageReader<ImportSnapshotRequest>,
    mut async_op: ResMut<AsyncSnapshotOperation>,
) {
    for event in events.read() {
        if async_op.is_busy() {
            warn!("Snapshot operation already in progress");
            continue;
        }

        let path = event.path.clone();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("map")
            .to_string();

        async_op.is_importing = true;
        async_op.operation_description = Some(format!("Importing {}...", file_name));

        let task = IoTaskPool::get().spawn(async move {
            let outcome = read_snapshot(&path);
            ImportResult { path, outcome }
        });

        commands.spawn(ImportSnapshotTask(task));
    }
}

/// Replace the map contents with an imported snapshot and restore its view.
///
/// The store is cleared first; nothing is touched when the file failed to parse.
pub(super) fn apply_snapshot(
    snapshot: &MapSnapshot,
    store: &mut FeatureStore,
    base_layer: &mut ActiveBaseLayer,
) -> Result<usize, StoreError> {
    let added = snapshot.apply_to(store)?;

    if let Some(id) = snapshot.base_layer.as_deref() {
        match BaseLayer::from_id(id) {
            Some(layer) => base_layer.layer = layer,
            None => warn!("Imported map names unknown base layer '{}'", id),
        }
    }

    Ok(added)
}

/// Polls import tasks and applies finished snapshots
#[allow(clippy::too_many_arguments)]
pub fn poll_import_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut ImportSnapshotTask)>,
    mut async_op: ResMut<AsyncSnapshotOperation>,
    mut store: ResMut<FeatureStore>,
    mut base_layer: ResMut<ActiveBaseLayer>,
    mut fit_events: MessageWriter<FitViewportRequest>,
    mut current_file: ResMut<CurrentSnapshotFile>,
    mut config_events: MessageWriter<UpdateLastSnapshotPathRequest>,
    mut alerts: ResMut<Alerts>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        let Some(result) = future::block_on(future::poll_once(&mut task.0)) else {
            continue;
        };

        async_op.is_importing = false;
        async_op.operation_description = None;
        commands.entity(entity).despawn();

        let snapshot = match result.outcome {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("Import of {:?} failed: {}", result.path, e);
                alerts.push(
                    AlertKind::Import,
                    format!(
                        "Failed to import map data. Please check the file format and try again.\n\n{}",
                        e
                    ),
                );
                continue;
            }
        };

        match apply_snapshot(&snapshot, &mut store, &mut base_layer) {
            Ok(count) => {
                info!("Imported {} features from {:?}", count, result.path);
                if let Some(bounds) = snapshot.bounds {
                    fit_events.write(FitViewportRequest { bounds });
                }
                current_file.path = Some(result.path.clone());
                config_events.write(UpdateLastSnapshotPathRequest { path: result.path });
            }
            Err(e) => {
                error!("Applying imported map failed: {}", e);
                alerts.push(AlertKind::Import, e.to_string());
            }
        }
    }
}
