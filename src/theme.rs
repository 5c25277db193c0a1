//! Centralized color theme for the canvas overlay.
//!
//! Selection, crop and hover colors here are the defaults; the accessibility
//! override in the config replaces them at runtime.

use bevy::prelude::Color;
use bevy_egui::egui;

// ============================================================================
// Item Outline Colors
// ============================================================================

/// Red outline and handles for selected items
pub const SELECTION_COLOR: Color = Color::srgb(1.0, 0.0, 0.0);

/// Green stripes along cropped edges
pub const CROP_COLOR: Color = Color::srgb(0.0, 1.0, 0.0);

/// Blue outline for hovered items
pub const HOVER_COLOR: Color = Color::srgb(0.0, 127.0 / 255.0, 1.0);

// ============================================================================
// Marquee Colors
// ============================================================================

/// Translucent grey marquee fill
pub const MARQUEE_FILL: Color = Color::srgba(0.7, 0.7, 0.7, 0.5);

/// White marquee border
pub const MARQUEE_BORDER: Color = Color::WHITE;

// ============================================================================
// Canvas Colors
// ============================================================================

/// Backdrop behind the canvas content
pub const BACKDROP_COLOR: Color = Color::BLACK;

/// Spacing helper label text
pub const SPACER_LABEL_COLOR: Color = Color::WHITE;

/// Tint for overflow tiles outside the canvas
pub const OVERFLOW_TINT: Color = Color::srgba(1.0, 1.0, 1.0, 0.35);

/// Convert an overlay color for egui text.
pub fn to_egui(color: Color) -> egui::Color32 {
    let srgba = color.to_srgba();
    egui::Color32::from_rgba_unmultiplied(
        (srgba.red * 255.0) as u8,
        (srgba.green * 255.0) as u8,
        (srgba.blue * 255.0) as u8,
        (srgba.alpha * 255.0) as u8,
    )
}
