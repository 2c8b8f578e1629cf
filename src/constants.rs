//! Centralized constants used across the application.
//!
//! This module contains magic numbers and configuration values that are used
//! in multiple places or would benefit from being named constants.

/// Default window width in pixels
pub const DEFAULT_WINDOW_WIDTH: f32 = 1600.0;

/// Default window height in pixels
pub const DEFAULT_WINDOW_HEIGHT: f32 = 900.0;

/// Default bound on each history stack
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

/// Delay between hiding the controls and capturing the frame for image export
pub const DEFAULT_CAPTURE_DELAY_MS: u64 = 500;

/// Screen-space pick radius for clicking features, in pixels
pub const PICK_TOLERANCE_PX: f32 = 6.0;

/// Screen-space radius around the first polygon vertex that closes the ring
pub const CLOSE_RING_RADIUS_PX: f32 = 10.0;

/// Two clicks closer together than this count as a double-click
pub const DOUBLE_CLICK_SECS: f32 = 0.35;

/// Radius of drawn point markers, in pixels
pub const MARKER_RADIUS_PX: f32 = 7.0;

/// Font size of on-map text labels
pub const LABEL_FONT_SIZE: f32 = 16.0;

/// Largest legend image edge kept after import; bigger images are downscaled
pub const LEGEND_IMAGE_MAX_EDGE: u32 = 64;

/// Edge length of a legend swatch in the editor and overlay
pub const LEGEND_SWATCH_SIZE: f32 = 18.0;
