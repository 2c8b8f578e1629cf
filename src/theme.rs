//! Centralized color theme for the application.
//!
//! This module provides the colors used by the editor UI and the map overlays.
//! Feature colors come from each feature's own style; see [`hex_to_bevy`].

use bevy::prelude::Color;
use bevy_egui::egui;

use crate::map::HexColor;

// ============================================================================
// Selection Colors
// ============================================================================

/// Light blue for the selected feature's bounding box
pub const SELECTION_COLOR: Color = Color::srgb(0.2, 0.6, 1.0);

// ============================================================================
// Construction Colors
// ============================================================================

/// Edges already placed in an in-progress polygon or line
pub const CONSTRUCTION_EDGE: Color = Color::srgba(1.0, 0.55, 0.1, 0.9);

/// Vertex dots of an in-progress shape
pub const CONSTRUCTION_VERTEX: Color = Color::srgb(1.0, 1.0, 1.0);

/// Rubber-band edge from the last vertex to the cursor
pub const CONSTRUCTION_PREVIEW: Color = Color::srgba(1.0, 0.55, 0.1, 0.45);

/// Ring around the first vertex when a click would close the polygon
pub const CONSTRUCTION_CLOSE: Color = Color::srgb(0.3, 0.9, 0.4);

// ============================================================================
// Quick style swatches
// ============================================================================

/// Preset colors offered next to the style editor's color pickers
pub fn swatch_palette() -> [(HexColor, &'static str); 8] {
    [
        (HexColor::rgb(0x2b, 0x6c, 0xb0), "Blue"),
        (HexColor::rgb(0xe5, 0x3e, 0x3e), "Red"),
        (HexColor::rgb(0x38, 0xa1, 0x69), "Green"),
        (HexColor::rgb(0xd6, 0x9e, 0x2e), "Yellow"),
        (HexColor::rgb(0xdd, 0x6b, 0x20), "Orange"),
        (HexColor::rgb(0x80, 0x5a, 0xd5), "Purple"),
        (HexColor::rgb(0x1a, 0x20, 0x2c), "Black"),
        (HexColor::rgb(0xff, 0xff, 0xff), "White"),
    ]
}

// ============================================================================
// UI Colors (egui)
// ============================================================================

pub mod ui {
    use bevy_egui::egui;

    /// Dark grey panel background (status bar, legend overlay)
    pub const PANEL_BACKGROUND: egui::Color32 = egui::Color32::from_rgb(45, 45, 48);

    /// Light grey for label text
    pub const LABEL_TEXT: egui::Color32 = egui::Color32::LIGHT_GRAY;

    /// Grey for help/hint text
    pub const HINT_TEXT: egui::Color32 = egui::Color32::GRAY;

    /// White for selected swatch borders
    pub const SELECTED_BORDER: egui::Color32 = egui::Color32::WHITE;

    /// Dark grey for unselected swatch borders
    pub const UNSELECTED_BORDER: egui::Color32 = egui::Color32::DARK_GRAY;

    /// Red for error messages
    pub const ERROR_TEXT: egui::Color32 = egui::Color32::from_rgb(230, 90, 90);

    /// Amber for warnings
    pub const WARNING_TEXT: egui::Color32 = egui::Color32::from_rgb(230, 180, 80);

    /// Semi-transparent black overlay for modal dialogs
    pub const MODAL_OVERLAY: egui::Color32 = egui::Color32::from_black_alpha(100);

    /// Light background for the on-map legend
    pub const LEGEND_BACKGROUND: egui::Color32 = egui::Color32::from_rgba_premultiplied(230, 230, 230, 235);

    /// Legend text on the light background
    pub const LEGEND_TEXT: egui::Color32 = egui::Color32::from_rgb(30, 30, 30);
}

// ============================================================================
// Color Conversion Utilities
// ============================================================================

/// Convert a feature color and opacity to a Bevy Color
pub fn hex_to_bevy(color: HexColor, alpha: f32) -> Color {
    let [r, g, b] = color.0;
    Color::srgba_u8(r, g, b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8)
}

/// Convert a feature color and opacity to egui Color32
pub fn hex_to_egui(color: HexColor, alpha: f32) -> egui::Color32 {
    let [r, g, b] = color.0;
    egui::Color32::from_rgba_unmultiplied(r, g, b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8)
}

/// Opaque egui color back to a feature color
pub fn egui_to_hex(color: egui::Color32) -> HexColor {
    HexColor::rgb(color.r(), color.g(), color.b())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_egui_round_trip() {
        let color = HexColor::rgb(0x2b, 0x6c, 0xb0);
        assert_eq!(egui_to_hex(hex_to_egui(color, 1.0)), color);
    }

    #[test]
    fn test_alpha_is_clamped() {
        let color = HexColor::rgb(10, 20, 30);
        assert_eq!(hex_to_egui(color, 2.0).a(), 255);
        assert_eq!(hex_to_egui(color, -1.0).a(), 0);
    }

    #[test]
    fn test_hex_to_bevy_channels() {
        let srgba = hex_to_bevy(HexColor::rgb(255, 0, 0), 0.5).to_srgba();
        assert_eq!(srgba.red, 1.0);
        assert_eq!(srgba.green, 0.0);
        assert!((srgba.alpha - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_palette_names_unique() {
        let palette = swatch_palette();
        for (i, (_, a)) in palette.iter().enumerate() {
            assert!(palette.iter().skip(i + 1).all(|(_, b)| a != b));
        }
    }
}
