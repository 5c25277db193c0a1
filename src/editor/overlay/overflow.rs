//! Overflow tiles: a repeating pattern over items, visible where they extend
//! past the canvas edges.

use bevy::math::Vec2;

use crate::constants::OVERFLOW_TILE_SIZE;
use crate::editor::CanvasSettings;
use crate::editor::hit_detection::GroupContext;
use crate::editor::transform::{box_corners, is_valid_box};
use crate::scene::{ItemId, SceneGraph};
use crate::theme::OVERFLOW_TINT;

use super::{Frame, OverlayPainter};

pub(super) fn draw_overflow(
    scene: &dyn SceneGraph,
    settings: &CanvasSettings,
    frame: &Frame,
    painter: &mut dyn OverlayPainter,
) {
    draw_children(scene, None, &GroupContext::default(), settings, frame, painter);
}

fn draw_children(
    scene: &dyn SceneGraph,
    parent: Option<ItemId>,
    ctx: &GroupContext,
    settings: &CanvasSettings,
    frame: &Frame,
    painter: &mut dyn OverlayPainter,
) {
    for id in scene.children(parent) {
        let Some(info) = scene.item(id) else {
            continue;
        };
        if info.locked || !info.has_video {
            continue;
        }
        if !settings.overflow_selection_hidden && !info.visible {
            continue;
        }
        if info.is_group {
            draw_children(scene, Some(id), &ctx.enter(&info), settings, frame, painter);
        }
        if !settings.overflow_always_visible && !info.selected {
            continue;
        }

        let m = ctx.box_of(&info);
        if !is_valid_box(&m) {
            continue;
        }
        let corners = box_corners(&m).map(|p| frame.to_widget(p));
        let extent = Vec2::new(m.matrix2.x_axis.length(), m.matrix2.y_axis.length()) * frame.scale;
        painter.draw_tiled_texture(corners, extent / OVERFLOW_TILE_SIZE, OVERFLOW_TINT);
    }
}
