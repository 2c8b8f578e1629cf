//! Snapshot export system and task polling.

use bevy::prelude::*;
use bevy::tasks::IoTaskPool;
use futures_lite::future;

use crate::common::{AlertKind, Alerts};
use crate::config::UpdateLastSnapshotPathRequest;
use crate::map::{ActiveBaseLayer, FeatureStore, MapSnapshot, MapViewport};

use super::messages::ExportSnapshotRequest;
use super::resources::{AsyncSnapshotOperation, CurrentSnapshotFile, ExportSnapshotTask};
use super::results::{write_snapshot, ExportResult};

/// Captures the current map and starts an async write
pub fn export_snapshot_system(
    mut commands: Commands,
    mut events: MessageReader<ExportSnapshotRequest>,
    store: Res<FeatureStore>,
    viewport: Res<MapViewport>,
    base_layer: Res<ActiveBaseLayer>,
    mut async_op: ResMut<AsyncSnapshotOperation>,
) {
    for event in events.read() {
        if async_op.is_busy() {
            warn!("Snapshot operation already in progress");
            continue;
        }

        let snapshot = MapSnapshot::capture(
            &store,
            viewport.bounds,
            viewport.zoom,
            base_layer.layer.id(),
        );

        let path = event.path.clone();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("map")
            .to_string();

        async_op.is_exporting = true;
        async_op.operation_description = Some(format!("Exporting {}...", file_name));

        let task = IoTaskPool::get().spawn(async move {
            let outcome = write_snapshot(&path, &snapshot);
            ExportResult { path, outcome }
        });

        commands.spawn(ExportSnapshotTask(task));
    }
}

/// Polls export tasks and reports the outcome
pub fn poll_export_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut ExportSnapshotTask)>,
    mut async_op: ResMut<AsyncSnapshotOperation>,
    mut current_file: ResMut<CurrentSnapshotFile>,
    mut config_events: MessageWriter<UpdateLastSnapshotPathRequest>,
    mut alerts: ResMut<Alerts>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        let Some(result) = future::block_on(future::poll_once(&mut task.0)) else {
            continue;
        };

        async_op.is_exporting = false;
        async_op.operation_description = None;

        match result.outcome {
            Ok(count) => {
                info!("Exported {} features to {:?}", count, result.path);
                current_file.path = Some(result.path.clone());
                config_events.write(UpdateLastSnapshotPathRequest { path: result.path });
            }
            Err(e) => {
                error!("Export to {:?} failed: {}", result.path, e);
                alerts.push(AlertKind::Export, e.to_string());
            }
        }

        commands.entity(entity).despawn();
    }
}
