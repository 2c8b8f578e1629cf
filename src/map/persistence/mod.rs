//! Snapshot import and export.
//!
//! File I/O and JSON (de)serialization run on the `IoTaskPool`; results are
//! polled each frame and applied to the [`FeatureStore`](crate::map::FeatureStore)
//! on the main thread.
//!
//! ## Module Structure
//!
//! - [`messages`] - Request messages
//! - [`resources`] - Task components and operation state
//! - [`results`] - Outcomes of the async tasks
//! - [`export`] - Export system and task polling
//! - [`import`] - Import system and task polling

mod export;
mod import;
mod messages;
mod resources;
mod results;

#[cfg(test)]
mod tests;

pub use messages::{ExportSnapshotRequest, ImportSnapshotRequest};
pub use resources::{AsyncSnapshotOperation, CurrentSnapshotFile};
pub use results::{ExportError, ImportError};

pub use export::{export_snapshot_system, poll_export_tasks};
pub use import::{import_snapshot_system, poll_import_tasks};
