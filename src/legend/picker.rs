//! Reading user-chosen legend images off the main loop.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bevy::prelude::*;
use bevy::tasks::{AsyncComputeTaskPool, Task};
use futures_lite::future;
use thiserror::Error;

use crate::common::{AlertKind, Alerts};
use crate::constants::LEGEND_IMAGE_MAX_EDGE;

use super::LegendState;

#[derive(Debug, Error)]
pub enum LegendImageError {
    #[error("could not read the image file: {0}")]
    Read(#[from] std::io::Error),
    #[error("could not decode the image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Decoded RGBA pixels of a legend swatch image.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendImage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub rgba: Arc<Vec<u8>>,
}

/// Finished pick: `None` when the dialog was cancelled.
pub type LegendImagePick = Option<(PathBuf, Result<LegendImage, LegendImageError>)>;

/// Read and decode an image, shrinking it to legend swatch size.
pub fn load_legend_image(path: &Path) -> Result<LegendImage, LegendImageError> {
    let bytes = std::fs::read(path)?;
    let decoded = image::load_from_memory(&bytes)?;
    let decoded = if decoded.width().max(decoded.height()) > LEGEND_IMAGE_MAX_EDGE {
        decoded.thumbnail(LEGEND_IMAGE_MAX_EDGE, LEGEND_IMAGE_MAX_EDGE)
    } else {
        decoded
    };
    let rgba = decoded.to_rgba8();
    Ok(LegendImage {
        path: path.to_path_buf(),
        width: rgba.width(),
        height: rgba.height(),
        rgba: Arc::new(rgba.into_raw()),
    })
}

/// Open the image picker and read the chosen file in the background
pub fn spawn_legend_image_pick() -> Task<LegendImagePick> {
    let task_pool = AsyncComputeTaskPool::get();
    task_pool.spawn(async {
        let handle = rfd::AsyncFileDialog::new()
            .set_title("Import Legend Image")
            .add_filter("Images", &["png", "jpg", "jpeg", "webp"])
            .pick_file()
            .await?;
        let path = handle.path().to_path_buf();
        let result = load_legend_image(&path);
        Some((path, result))
    })
}

/// Apply a finished image pick to the legend draft
pub fn poll_legend_image_task(mut legend: ResMut<LegendState>, mut alerts: ResMut<Alerts>) {
    let Some(task) = legend.pending_image.as_mut() else {
        return;
    };
    let Some(result) = future::block_on(future::poll_once(task)) else {
        return;
    };
    legend.pending_image = None;

    match result {
        None => debug!("Legend image pick cancelled"),
        Some((path, Ok(image))) => {
            info!(
                "Legend image {} ({}x{})",
                path.display(),
                image.width,
                image.height
            );
            legend.add_image_row(image);
        }
        Some((path, Err(e))) => {
            error!("Legend image {} failed: {}", path.display(), e);
            alerts.push(
                AlertKind::LegendImage,
                format!("Failed to import image. Please try again.\n\n{}", e),
            );
        }
    }
}
