//! Result types for async snapshot operations.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::map::{MapSnapshot, SnapshotError};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize map: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write file: {0}")]
    Write(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read file: {0}")]
    Read(#[from] std::io::Error),
    #[error(transparent)]
    Format(#[from] SnapshotError),
}

/// Result of an async export operation
pub struct ExportResult {
    pub path: PathBuf,
    pub outcome: Result<usize, ExportError>,
}

/// Result of an async import operation
pub struct ImportResult {
    pub path: PathBuf,
    pub outcome: Result<MapSnapshot, ImportError>,
}

pub(super) fn write_snapshot(path: &Path, snapshot: &MapSnapshot) -> Result<usize, ExportError> {
    let json = snapshot.to_json()?;
    std::fs::write(path, json)?;
    Ok(snapshot.features.len())
}

pub(super) fn read_snapshot(path: &Path) -> Result<MapSnapshot, ImportError> {
    let json = std::fs::read_to_string(path)?;
    Ok(MapSnapshot::from_json(&json)?)
}
