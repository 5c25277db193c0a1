//! Cursor shape feedback for hover and drag.

use bevy::math::Vec2;

use crate::common::{CursorShape, Handle};
use crate::editor::hit_detection::handle_at;
use crate::scene::SceneGraph;

use super::InteractionMode;

/// Shape for an idle pointer at `point`: a handle's resize or rotate cursor,
/// or the default.
pub fn hover_cursor(scene: &dyn SceneGraph, point: Vec2, radius: f32) -> CursorShape {
    handle_at(scene, point, radius)
        .map(|hit| hit.handle.cursor_shape())
        .unwrap_or_default()
}

/// Shape while a gesture is in progress.
pub fn drag_cursor(mode: InteractionMode, handle: Handle) -> CursorShape {
    match mode {
        InteractionMode::Moving => CursorShape::SizeAll,
        InteractionMode::Selecting => CursorShape::Crosshair,
        InteractionMode::Rotating | InteractionMode::Panning => CursorShape::ClosedHand,
        InteractionMode::Resizing | InteractionMode::Cropping => handle.cursor_shape(),
        InteractionMode::Idle | InteractionMode::Pressed => CursorShape::Default,
    }
}
