//! Resource and component types for snapshot I/O.

use bevy::prelude::*;
use bevy::tasks::Task;
use std::path::PathBuf;

use super::results::{ExportResult, ImportResult};

/// Resource tracking async snapshot I/O for the busy indicator
#[derive(Resource, Default)]
pub struct AsyncSnapshotOperation {
    pub is_exporting: bool,
    pub is_importing: bool,
    /// Description of the current operation
    pub operation_description: Option<String>,
}

impl AsyncSnapshotOperation {
    pub fn is_busy(&self) -> bool {
        self.is_exporting || self.is_importing
    }
}

#[derive(Component)]
pub struct ExportSnapshotTask(pub Task<ExportResult>);

#[derive(Component)]
pub struct ImportSnapshotTask(pub Task<ImportResult>);

/// The map file most recently imported or exported
#[derive(Resource, Default)]
pub struct CurrentSnapshotFile {
    pub path: Option<PathBuf>,
}

impl CurrentSnapshotFile {
    pub fn display_name(&self) -> String {
        self.path
            .as_ref()
            .and_then(|p| p.file_stem())
            .and_then(|n| n.to_str())
            .unwrap_or("Untitled Map")
            .to_string()
    }
}
