//! Message types for snapshot import and export.

use bevy::prelude::*;
use std::path::PathBuf;

#[derive(Message)]
pub struct ExportSnapshotRequest {
    pub path: PathBuf,
}

#[derive(Message)]
pub struct ImportSnapshotRequest {
    pub path: PathBuf,
}
