//! Spacing helpers: distance guides from a lone selected item to the canvas
//! edges, each labelled "N px".

use bevy::color::Color;
use bevy::log::trace;
use bevy::math::Vec2;

use crate::constants::{HANDLE_RADIUS, HELPER_ROT_BREAKPOINT, SPACER_LABEL_MARGIN};
use crate::editor::hit_detection::context_for;
use crate::editor::transform::{is_valid_box, item_size};
use crate::scene::{SceneGraph, selected_items};
use crate::theme::SPACER_LABEL_COLOR;

use super::{Frame, OverlayColors, OverlayPainter, opaque};

/// Canvas edge a spacing guide measures to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    fn index(self) -> usize {
        match self {
            Side::Top => 0,
            Side::Bottom => 1,
            Side::Left => 2,
            Side::Right => 3,
        }
    }

    fn is_horizontal(self) -> bool {
        matches!(self, Side::Left | Side::Right)
    }
}

struct SpacerLabel {
    px: i32,
    text: String,
}

/// Label text per side, rebuilt only when the distance changes.
#[derive(Default)]
pub(super) struct SpacerLabels {
    labels: [Option<SpacerLabel>; 4],
    updates: usize,
}

impl SpacerLabels {
    fn set(&mut self, side: Side, px: i32) -> &str {
        let slot = &mut self.labels[side.index()];
        if slot.as_ref().is_none_or(|label| label.px != px) {
            *slot = Some(SpacerLabel {
                px,
                text: format!("{} px", px),
            });
            self.updates += 1;
        }
        slot.as_ref().map(|label| label.text.as_str()).unwrap_or_default()
    }

    pub fn text(&self, side: Side) -> Option<&str> {
        self.labels[side.index()].as_ref().map(|label| label.text.as_str())
    }

    /// Number of times any label text was rebuilt.
    pub fn updates(&self) -> usize {
        self.updates
    }
}

/// Unit-square points of the item's sides as they appear on screen, in
/// top, right, bottom, left order.
///
/// Past each 45 degree breakpoint a different item side faces each canvas
/// edge, and negative scale mirrors the opposite sides.
fn screen_sides(rotation: f32, scale: Vec2) -> [Vec2; 4] {
    let mut top = Vec2::new(0.5, 0.0);
    let mut right = Vec2::new(1.0, 0.5);
    let mut bottom = Vec2::new(0.5, 1.0);
    let mut left = Vec2::new(0.0, 0.5);

    if rotation >= HELPER_ROT_BREAKPOINT {
        let mut step = HELPER_ROT_BREAKPOINT;
        while step <= 360.0 && rotation >= step {
            (top, right, bottom, left) = (left, top, right, bottom);
            step += 90.0;
        }
    } else if rotation <= -HELPER_ROT_BREAKPOINT {
        let mut step = -HELPER_ROT_BREAKPOINT;
        while step >= -360.0 && rotation <= step {
            (top, right, bottom, left) = (right, bottom, left, top);
            step -= 90.0;
        }
    }

    if scale.x < 0.0 {
        std::mem::swap(&mut left, &mut right);
    }
    if scale.y < 0.0 {
        std::mem::swap(&mut top, &mut bottom);
    }
    [top, right, bottom, left]
}

pub(super) fn draw_spacing_helpers(
    scene: &dyn SceneGraph,
    frame: &Frame,
    colors: &OverlayColors,
    labels: &mut SpacerLabels,
    painter: &mut dyn OverlayPainter,
) {
    let selected = selected_items(scene, None);
    let [id] = selected.as_slice() else {
        return;
    };
    let Some(info) = scene.item(*id) else {
        return;
    };
    let size = item_size(&info);
    if info.locked || size.x == 0.0 || size.y == 0.0 {
        return;
    }
    if scene
        .group_of(*id)
        .and_then(|group| scene.item(group))
        .is_some_and(|group| group.locked)
    {
        return;
    }

    let ctx = context_for(scene, *id);
    let m = ctx.box_of(&info);
    if !is_valid_box(&m) {
        return;
    }

    let rotation = info.transform.rotation + ctx.rotation.to_degrees();
    let [top, right, bottom, left] =
        screen_sides(rotation, info.transform.scale).map(|p| m.transform_point2(p));
    let canvas = frame.canvas_size;

    let guides = [
        (Side::Top, Vec2::new(top.x, 0.0), top, top.y),
        (Side::Bottom, bottom, Vec2::new(bottom.x, canvas.y), canvas.y - bottom.y),
        (Side::Left, Vec2::new(0.0, left.y), left, left.x),
        (Side::Right, right, Vec2::new(canvas.x, right.y), canvas.x - right.x),
    ];

    for (side, start, end, distance) in guides {
        if distance < 0.0 {
            continue;
        }
        draw_guide(
            side,
            frame.to_widget(start),
            frame.to_widget(end),
            distance.round() as i32,
            frame,
            opaque(colors.selection),
            labels,
            painter,
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_guide(
    side: Side,
    start: Vec2,
    end: Vec2,
    px: i32,
    frame: &Frame,
    color: Color,
    labels: &mut SpacerLabels,
    painter: &mut dyn OverlayPainter,
) {
    let half = (end - start).perp().normalize_or_zero() * frame.line_thickness() * 0.5;
    painter.fill_polygon(&[start - half, end - half, end + half, start + half], color);

    let text = labels.set(side, px);
    let label_size = painter.measure_label(text);
    let margin = SPACER_LABEL_MARGIN * frame.pixel_ratio;
    let mid = (start + end) * 0.5;
    let position = if side.is_horizontal() {
        Vec2::new(
            mid.x - label_size.x / 2.0,
            end.y - margin - label_size.y / 2.0 - HANDLE_RADIUS * frame.pixel_ratio,
        )
    } else {
        Vec2::new(end.x + margin, mid.y - label_size.y / 2.0)
    };
    trace!("Spacing label {:?}: {}", side, text);
    painter.draw_label(text, position, SPACER_LABEL_COLOR);
}
