//! Snap engine: corrective offsets that align moving bounds to the canvas
//! edges, the canvas center, or the edges of other items.

use bevy::math::{Affine2, Vec2};

use crate::common::Handle;
use crate::constants::DEFAULT_SNAP_DISTANCE;
use crate::scene::{ItemId, SceneGraph};

use super::hit_detection::GroupContext;
use super::transform::{bounds_of, box_corners, box_transform, invert};

/// Snapping switches, read from the canvas configuration.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct SnapSettings {
    pub enabled: bool,
    pub screen: bool,
    pub center: bool,
    pub sources: bool,
    /// Maximum gap that snaps, in canvas pixels
    pub distance: f32,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            screen: true,
            center: false,
            sources: true,
            distance: DEFAULT_SNAP_DISTANCE,
        }
    }
}

fn snap_axis_to_screen(min: f32, max: f32, extent: f32, settings: &SnapSettings) -> f32 {
    let d = settings.distance;
    let center = (min + max) * 0.5;
    if settings.screen && min.abs() < d {
        -min
    } else if settings.screen && (extent - max).abs() < d {
        extent - max
    } else if settings.center
        && (extent - (max - min)).abs() > d
        && (extent * 0.5 - center).abs() < d
    {
        extent * 0.5 - center
    } else {
        0.0
    }
}

/// Offset aligning the box `tl`..`br` to the canvas edges or center.
///
/// Each axis is independent and an edge snap wins over a center snap.
pub fn screen_snap_offset(tl: Vec2, br: Vec2, canvas_size: Vec2, settings: &SnapSettings) -> Vec2 {
    if !settings.enabled {
        return Vec2::ZERO;
    }
    Vec2::new(
        snap_axis_to_screen(tl.x, br.x, canvas_size.x, settings),
        snap_axis_to_screen(tl.y, br.y, canvas_size.y, settings),
    )
}

fn nearest_edge_offset(
    min: f32,
    max: f32,
    others: impl Iterator<Item = (f32, f32)>,
    distance: f32,
) -> Option<f32> {
    others
        .flat_map(|(other_min, other_max)| {
            [
                other_min - min,
                other_max - min,
                other_min - max,
                other_max - max,
            ]
        })
        .filter(|offset| offset.abs() < distance)
        .min_by(|a, b| a.abs().total_cmp(&b.abs()))
}

/// Refine `screen_offset` with alignments to other items' edges.
///
/// Only boxes overlapping the moving box on the orthogonal axis count. An
/// item alignment replaces the screen offset on an axis when the screen did
/// not snap there or the item edge is closer.
pub fn item_edge_snap_offset(
    tl: Vec2,
    br: Vec2,
    others: &[(Vec2, Vec2)],
    settings: &SnapSettings,
    screen_offset: Vec2,
) -> Vec2 {
    if !settings.enabled {
        return Vec2::ZERO;
    }
    if !settings.sources {
        return screen_offset;
    }

    let overlapping_y = others
        .iter()
        .filter(|(min, max)| min.y <= br.y && max.y >= tl.y)
        .map(|(min, max)| (min.x, max.x));
    let overlapping_x = others
        .iter()
        .filter(|(min, max)| min.x <= br.x && max.x >= tl.x)
        .map(|(min, max)| (min.y, max.y));

    let pick = |candidate: Option<f32>, screen: f32| match candidate {
        Some(c) if screen == 0.0 || c.abs() < screen.abs() => c,
        _ => screen,
    };

    Vec2::new(
        pick(
            nearest_edge_offset(tl.x, br.x, overlapping_y, settings.distance),
            screen_offset.x,
        ),
        pick(
            nearest_edge_offset(tl.y, br.y, overlapping_x, settings.distance),
            screen_offset.y,
        ),
    )
}

/// Canvas-space bounds of every selected, unlocked item.
pub fn selection_bounds(scene: &dyn SceneGraph) -> Option<(Vec2, Vec2)> {
    let mut corners = Vec::new();
    collect_selected_corners(scene, None, &GroupContext::default(), &mut corners);
    bounds_of(&corners)
}

fn collect_selected_corners(
    scene: &dyn SceneGraph,
    parent: Option<ItemId>,
    ctx: &GroupContext,
    corners: &mut Vec<Vec2>,
) {
    for id in scene.children(parent) {
        let Some(info) = scene.item(id) else {
            continue;
        };
        if info.locked {
            continue;
        }
        if info.selected {
            corners.extend(box_corners(&ctx.box_of(&info)));
        } else if info.is_group {
            collect_selected_corners(scene, Some(id), &ctx.enter(&info), corners);
        }
    }
}

/// Bounds of the visible top-level items that are not part of the selection.
pub fn unselected_item_bounds(scene: &dyn SceneGraph) -> Vec<(Vec2, Vec2)> {
    scene
        .children(None)
        .into_iter()
        .filter_map(|id| scene.item(id))
        .filter(|info| info.visible && !info.selected)
        .filter_map(|info| bounds_of(&box_corners(&box_transform(&info))))
        .collect()
}

/// Apply screen and item snapping to a move of the current selection.
pub fn snap_movement(
    scene: &dyn SceneGraph,
    offset: Vec2,
    canvas_size: Vec2,
    settings: &SnapSettings,
) -> Vec2 {
    if !settings.enabled {
        return offset;
    }
    let Some((tl, br)) = selection_bounds(scene) else {
        return offset;
    };
    let (tl, br) = (tl + offset, br + offset);
    let screen = screen_snap_offset(tl, br, canvas_size, settings);
    let others = if settings.sources {
        unselected_item_bounds(scene)
    } else {
        Vec::new()
    };
    offset + item_edge_snap_offset(tl, br, &others, settings, screen)
}

/// Snap the dragged sides of an item-space box being stretched.
///
/// The box is projected to canvas space, snapped as a whole, and the
/// correction is mapped back and applied to the handle's sides only.
pub fn snap_stretch(
    tl: Vec2,
    br: Vec2,
    handle: Handle,
    item_to_canvas: &Affine2,
    canvas_size: Vec2,
    settings: &SnapSettings,
) -> (Vec2, Vec2) {
    if !settings.enabled {
        return (tl, br);
    }
    let Some(canvas_to_item) = invert(*item_to_canvas) else {
        return (tl, br);
    };
    let corners = [
        tl,
        Vec2::new(br.x, tl.y),
        Vec2::new(tl.x, br.y),
        br,
    ]
    .map(|c| item_to_canvas.transform_point2(c));
    let Some((min, max)) = bounds_of(&corners) else {
        return (tl, br);
    };

    let offset = screen_snap_offset(min, max, canvas_size, settings);
    let delta = canvas_to_item.transform_point2(corners[0] + offset) - tl;

    let (mut tl, mut br) = (tl, br);
    if handle.left() {
        tl.x += delta.x;
    } else if handle.right() {
        br.x += delta.x;
    }
    if handle.top() {
        tl.y += delta.y;
    } else if handle.bottom() {
        br.y += delta.y;
    }
    (tl, br)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{ItemTransform, MemoryScene};

    const CANVAS: Vec2 = Vec2::new(1920.0, 1080.0);

    fn settings() -> SnapSettings {
        SnapSettings {
            enabled: true,
            screen: true,
            center: true,
            sources: true,
            distance: 10.0,
        }
    }

    #[test]
    fn test_left_edge_snaps_to_zero() {
        let offset = screen_snap_offset(
            Vec2::new(4.0, 500.0),
            Vec2::new(104.0, 600.0),
            CANVAS,
            &settings(),
        );
        assert_eq!(offset, Vec2::new(-4.0, 0.0));
    }

    #[test]
    fn test_right_and_bottom_edges_snap() {
        let offset = screen_snap_offset(
            Vec2::new(1800.0, 900.0),
            Vec2::new(1915.0, 1088.0),
            CANVAS,
            &settings(),
        );
        assert_eq!(offset, Vec2::new(5.0, -8.0));
    }

    #[test]
    fn test_center_snap() {
        let offset = screen_snap_offset(
            Vec2::new(907.0, 100.0),
            Vec2::new(1007.0, 200.0),
            CANVAS,
            &settings(),
        );
        assert_eq!(offset, Vec2::new(3.0, 0.0));
    }

    #[test]
    fn test_edge_beats_center() {
        // Both the left edge and the center are within range
        let narrow = Vec2::new(10.0, 1080.0);
        let offset = screen_snap_offset(
            Vec2::new(2.0, 0.0),
            Vec2::new(12.0, 0.0),
            narrow,
            &SnapSettings {
                distance: 20.0,
                ..settings()
            },
        );
        assert_eq!(offset.x, -2.0);
    }

    #[test]
    fn test_disabled_returns_zero() {
        let off = SnapSettings {
            enabled: false,
            ..settings()
        };
        assert_eq!(
            screen_snap_offset(Vec2::new(4.0, 4.0), Vec2::splat(50.0), CANVAS, &off),
            Vec2::ZERO
        );
        assert_eq!(
            item_edge_snap_offset(
                Vec2::new(4.0, 4.0),
                Vec2::splat(50.0),
                &[(Vec2::splat(52.0), Vec2::splat(80.0))],
                &off,
                Vec2::new(3.0, 3.0)
            ),
            Vec2::ZERO
        );
    }

    #[test]
    fn test_item_edge_snap_requires_overlap() {
        let moving = (Vec2::new(200.0, 200.0), Vec2::new(300.0, 300.0));
        let beside = (Vec2::new(304.0, 250.0), Vec2::new(400.0, 350.0));
        let far_below = (Vec2::new(306.0, 800.0), Vec2::new(400.0, 900.0));
        let offset = item_edge_snap_offset(
            moving.0,
            moving.1,
            &[beside, far_below],
            &settings(),
            Vec2::ZERO,
        );
        assert_eq!(offset, Vec2::new(4.0, 0.0));
    }

    #[test]
    fn test_item_edge_snap_only_replaces_when_closer() {
        let moving = (Vec2::new(3.0, 200.0), Vec2::new(100.0, 300.0));
        let neighbor = (Vec2::new(108.0, 250.0), Vec2::new(200.0, 350.0));
        // Screen snap of -3 is closer than the neighbor's 8
        let offset = item_edge_snap_offset(
            moving.0,
            moving.1,
            &[neighbor],
            &settings(),
            Vec2::new(-3.0, 0.0),
        );
        assert_eq!(offset.x, -3.0);
    }

    #[test]
    fn test_snap_movement_uses_selection_bounds() {
        let mut scene = MemoryScene::new();
        let a = scene.add_item(None, Vec2::splat(100.0), ItemTransform::at(Vec2::new(20.0, 300.0)));
        scene.set_selected(a, true);
        let snapped = snap_movement(&scene, Vec2::new(-16.0, 0.0), CANVAS, &settings());
        assert_eq!(snapped, Vec2::new(-20.0, 0.0));
    }

    #[test]
    fn test_snap_movement_to_neighbor_item() {
        let mut scene = MemoryScene::new();
        let a = scene.add_item(None, Vec2::splat(100.0), ItemTransform::at(Vec2::new(500.0, 300.0)));
        let _b = scene.add_item(None, Vec2::splat(100.0), ItemTransform::at(Vec2::new(705.0, 320.0)));
        scene.set_selected(a, true);
        let snapped = snap_movement(&scene, Vec2::new(100.0, 0.0), CANVAS, &settings());
        assert_eq!(snapped, Vec2::new(105.0, 0.0));
    }

    #[test]
    fn test_snap_stretch_moves_dragged_side_only() {
        let item_to_canvas = Affine2::from_translation(Vec2::new(100.0, 100.0));
        let (tl, br) = snap_stretch(
            Vec2::ZERO,
            Vec2::new(1815.0, 50.0),
            Handle::CenterRight,
            &item_to_canvas,
            CANVAS,
            &settings(),
        );
        assert_eq!(tl, Vec2::ZERO);
        assert_eq!(br, Vec2::new(1820.0, 50.0));
    }
}
