//! Raster export of the map view.
//!
//! Controls are hidden, the frame is given `capture_delay_ms` to settle, then
//! the primary window is captured and written as `map-export-<timestamp>.png`.
//! The delay cannot be cancelled once started. Controls come back whether the
//! capture succeeds or fails.

use std::path::{Path, PathBuf};
use std::time::Duration;

use bevy::prelude::*;
use bevy::render::view::screenshot::{Screenshot, ScreenshotCaptured};
use bevy::tasks::{IoTaskPool, Task};
use futures_lite::future;
use thiserror::Error;

use crate::common::{AlertKind, Alerts, ControlsVisibility};
use crate::config::AppConfig;
use crate::paths;

/// Give up on a screenshot that never arrives
const CAPTURE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("could not convert the captured frame: {0}")]
    Conversion(String),
    #[error("could not encode the PNG: {0}")]
    Encode(#[from] image::ImageError),
    #[error("could not write the image: {0}")]
    Io(#[from] std::io::Error),
    #[error("the frame was not captured in time")]
    TimedOut,
}

/// Request an image export of the current view.
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct ImageExportRequest;

#[derive(Debug, Default)]
pub enum CapturePhase {
    #[default]
    Idle,
    /// Controls hidden, letting the frame settle
    Settling(Timer),
    /// Screenshot requested, waiting for the frame
    Capturing(Timer),
    /// Frame received, PNG being written
    Writing,
}

/// Progress of the single in-flight image export.
#[derive(Resource, Debug, Default)]
pub struct CaptureJob {
    phase: CapturePhase,
}

impl CaptureJob {
    pub fn is_idle(&self) -> bool {
        matches!(self.phase, CapturePhase::Idle)
    }

    /// Start the settle delay. Returns false if an export is already running.
    pub fn start(&mut self, delay: Duration) -> bool {
        if !self.is_idle() {
            return false;
        }
        self.phase = CapturePhase::Settling(Timer::new(delay, TimerMode::Once));
        true
    }

    /// Advance the timers. Returns what the caller should do this frame.
    pub fn tick(&mut self, delta: Duration) -> CaptureStep {
        match &mut self.phase {
            CapturePhase::Idle => CaptureStep::Nothing,
            CapturePhase::Settling(timer) => {
                if timer.tick(delta).is_finished() {
                    self.phase =
                        CapturePhase::Capturing(Timer::new(CAPTURE_TIMEOUT, TimerMode::Once));
                    CaptureStep::TakeScreenshot
                } else {
                    CaptureStep::Nothing
                }
            }
            CapturePhase::Capturing(timer) => {
                if timer.tick(delta).is_finished() {
                    self.phase = CapturePhase::Idle;
                    CaptureStep::TimedOut
                } else {
                    CaptureStep::Nothing
                }
            }
            CapturePhase::Writing => CaptureStep::Nothing,
        }
    }

    /// A frame arrived. Returns false when no screenshot is awaited, e.g. after
    /// a timeout, in which case the frame is dropped.
    pub fn frame_arrived(&mut self) -> bool {
        if !matches!(self.phase, CapturePhase::Capturing(_)) {
            return false;
        }
        self.phase = CapturePhase::Writing;
        true
    }

    /// The export finished, successfully or not.
    pub fn finish(&mut self) {
        self.phase = CapturePhase::Idle;
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum CaptureStep {
    Nothing,
    TakeScreenshot,
    TimedOut,
}

/// RGBA pixels of the captured frame
pub struct CapturedFrame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

#[derive(Component)]
pub struct CaptureWriteTask(Task<Result<PathBuf, CaptureError>>);

/// `map-export-<timestamp>.png`
pub fn export_file_name(now: chrono::DateTime<chrono::Local>) -> String {
    format!("map-export-{}.png", now.format("%Y%m%d-%H%M%S"))
}

pub fn export_directory(config: &AppConfig) -> PathBuf {
    config
        .data
        .export_dir
        .clone()
        .unwrap_or_else(paths::exports_dir)
}

/// Encode the frame as PNG into `dir`, creating it if needed.
pub fn write_capture(dir: &Path, file_name: &str, frame: CapturedFrame) -> Result<PathBuf, CaptureError> {
    let image = image::RgbaImage::from_raw(frame.width, frame.height, frame.rgba)
        .ok_or_else(|| {
            CaptureError::Conversion(format!(
                "pixel buffer does not match {}x{}",
                frame.width, frame.height
            ))
        })?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    image.save_with_format(&path, image::ImageFormat::Png)?;
    Ok(path)
}

fn restore_controls(controls: &mut ControlsVisibility) {
    controls.hidden = false;
}

/// Hide the controls and start the settle delay
pub fn start_image_capture(
    mut requests: MessageReader<ImageExportRequest>,
    mut job: ResMut<CaptureJob>,
    mut controls: ResMut<ControlsVisibility>,
    config: Res<AppConfig>,
) {
    if requests.read().count() == 0 {
        return;
    }
    if job.start(Duration::from_millis(config.data.capture_delay_ms)) {
        controls.hidden = true;
        info!("Image export started");
    } else {
        warn!("Image export already in progress");
    }
}

pub fn tick_image_capture(
    mut commands: Commands,
    time: Res<Time>,
    mut job: ResMut<CaptureJob>,
    mut controls: ResMut<ControlsVisibility>,
    mut alerts: ResMut<Alerts>,
) {
    match job.tick(time.delta()) {
        CaptureStep::Nothing => {}
        CaptureStep::TakeScreenshot => {
            commands
                .spawn(Screenshot::primary_window())
                .observe(on_screenshot_captured);
        }
        CaptureStep::TimedOut => {
            restore_controls(&mut controls);
            error!("Image export: {}", CaptureError::TimedOut);
            alerts.push(AlertKind::ImageCapture, CaptureError::TimedOut.to_string());
        }
    }
}

fn on_screenshot_captured(
    captured: On<ScreenshotCaptured>,
    mut commands: Commands,
    config: Res<AppConfig>,
    mut job: ResMut<CaptureJob>,
    mut controls: ResMut<ControlsVisibility>,
    mut alerts: ResMut<Alerts>,
) {
    if !job.frame_arrived() {
        warn!("Image export: dropping a frame that arrived after the export ended");
        return;
    }

    let frame = match captured.image.clone().try_into_dynamic() {
        Ok(dynamic) => {
            let rgba = dynamic.to_rgba8();
            CapturedFrame {
                width: rgba.width(),
                height: rgba.height(),
                rgba: rgba.into_raw(),
            }
        }
        Err(e) => {
            job.finish();
            restore_controls(&mut controls);
            let error = CaptureError::Conversion(e.to_string());
            error!("Image export: {}", error);
            alerts.push(AlertKind::ImageCapture, error.to_string());
            return;
        }
    };

    // Frame is in hand; the controls can come back while the file is written
    restore_controls(&mut controls);

    let dir = export_directory(&config);
    let file_name = export_file_name(chrono::Local::now());
    let task = IoTaskPool::get().spawn(async move { write_capture(&dir, &file_name, frame) });
    commands.spawn(CaptureWriteTask(task));
}

pub fn poll_capture_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut CaptureWriteTask)>,
    mut job: ResMut<CaptureJob>,
    mut controls: ResMut<ControlsVisibility>,
    mut alerts: ResMut<Alerts>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if let Some(result) = future::block_on(future::poll_once(&mut task.0)) {
            commands.entity(entity).despawn();
            job.finish();
            restore_controls(&mut controls);

            match result {
                Ok(path) => info!("Exported map image to {}", path.display()),
                Err(e) => {
                    error!("Image export failed: {}", e);
                    alerts.push(
                        AlertKind::ImageCapture,
                        format!("Failed to export the map image.\n\n{}", e),
                    );
                }
            }
        }
    }
}

pub struct CapturePlugin;

impl Plugin for CapturePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CaptureJob>()
            .init_resource::<ControlsVisibility>()
            .add_message::<ImageExportRequest>()
            .add_systems(
                Update,
                (
                    start_image_capture.run_if(on_message::<ImageExportRequest>),
                    tick_image_capture,
                    poll_capture_tasks,
                )
                    .chain(),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("mapscribe-capture-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_settle_then_screenshot() {
        let mut job = CaptureJob::default();
        assert!(job.start(Duration::from_millis(500)));

        assert_eq!(job.tick(Duration::from_millis(300)), CaptureStep::Nothing);
        assert_eq!(
            job.tick(Duration::from_millis(250)),
            CaptureStep::TakeScreenshot
        );
        assert!(!job.is_idle());

        job.finish();
        assert!(job.is_idle());
    }

    #[test]
    fn test_second_start_rejected_while_running() {
        let mut job = CaptureJob::default();
        assert!(job.start(Duration::from_millis(500)));
        assert!(!job.start(Duration::from_millis(500)));
    }

    #[test]
    fn test_missing_frame_times_out() {
        let mut job = CaptureJob::default();
        job.start(Duration::ZERO);
        assert_eq!(job.tick(Duration::ZERO), CaptureStep::TakeScreenshot);

        assert_eq!(job.tick(CAPTURE_TIMEOUT), CaptureStep::TimedOut);
        assert!(job.is_idle());
    }

    #[test]
    fn test_slow_write_does_not_time_out() {
        let mut job = CaptureJob::default();
        job.start(Duration::ZERO);
        job.tick(Duration::ZERO);

        assert!(job.frame_arrived());
        assert_eq!(job.tick(CAPTURE_TIMEOUT * 3), CaptureStep::Nothing);
        assert!(!job.is_idle());

        job.finish();
        assert!(job.is_idle());
    }

    #[test]
    fn test_late_frame_is_dropped() {
        let mut job = CaptureJob::default();
        job.start(Duration::ZERO);
        job.tick(Duration::ZERO);
        assert_eq!(job.tick(CAPTURE_TIMEOUT), CaptureStep::TimedOut);

        assert!(!job.frame_arrived());
        assert!(job.is_idle());
    }

    #[test]
    fn test_frame_ignored_while_settling() {
        let mut job = CaptureJob::default();
        job.start(Duration::from_millis(500));
        assert!(!job.frame_arrived());
        assert_eq!(
            job.tick(Duration::from_millis(500)),
            CaptureStep::TakeScreenshot
        );
    }

    #[test]
    fn test_idle_tick_does_nothing() {
        let mut job = CaptureJob::default();
        assert_eq!(job.tick(Duration::from_secs(60)), CaptureStep::Nothing);
    }

    #[test]
    fn test_export_file_name() {
        use chrono::TimeZone;
        let now = chrono::Local
            .with_ymd_and_hms(2026, 3, 9, 14, 5, 7)
            .single()
            .unwrap();
        assert_eq!(export_file_name(now), "map-export-20260309-140507.png");
    }

    #[test]
    fn test_write_capture_png() {
        let dir = scratch_dir();
        let frame = CapturedFrame {
            width: 2,
            height: 2,
            rgba: vec![255; 16],
        };

        let path = write_capture(&dir, "shot.png", frame).unwrap();

        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (2, 2));
    }

    #[test]
    fn test_write_capture_rejects_short_buffer() {
        let frame = CapturedFrame {
            width: 4,
            height: 4,
            rgba: vec![0; 8],
        };
        assert!(matches!(
            write_capture(&scratch_dir(), "bad.png", frame),
            Err(CaptureError::Conversion(_))
        ));
    }
}
