//! Drag steps - move, rotate, crop and stretch.
//!
//! Handle steps take the pointer in the target's group space and always
//! start from the state captured in [`HandleDrag`], so each event computes
//! the full result rather than an increment.

use bevy::math::{Affine2, Vec2};

use crate::constants::{
    FINE_ROTATION_THRESHOLD, MIN_EXTENT, ROTATION_SNAP_THRESHOLD,
};
use crate::editor::Modifiers;
use crate::editor::snap::{SnapSettings, snap_stretch};
use crate::editor::transform::{
    clamp_aspect, default_rotation_candidates, draw_transform,
    fine_rotation_candidates, invert, linear_part, rotate_vector, snap_rotation,
};
use crate::scene::{BoundsType, ItemId, SceneGraph};

use super::HandleDrag;

/// Translate every selected item by `offset` (canvas space).
///
/// Selected items inside unselected groups receive the offset mapped into
/// the group's content space.
pub fn move_selection(scene: &mut dyn SceneGraph, offset: Vec2) {
    move_children(scene, None, offset);
}

fn move_children(scene: &mut dyn SceneGraph, parent: Option<ItemId>, offset: Vec2) {
    for id in scene.children(parent) {
        let Some(info) = scene.item(id) else {
            continue;
        };
        if info.locked {
            continue;
        }
        if info.selected {
            scene.set_position(id, info.transform.position + offset);
        } else if info.is_group {
            let Some(inverse) = invert(linear_part(&draw_transform(&info))) else {
                continue;
            };
            move_children(scene, Some(id), inverse.transform_point2(offset));
        }
    }
}

/// Snap a proposed rotation according to the held modifiers.
///
/// Shift snaps to fine steps, ctrl disables snapping, otherwise the right
/// and diagonal angles and the starting rotation attract.
pub fn snapped_rotation(angle: f32, start_rotation: f32, modifiers: Modifiers) -> f32 {
    if modifiers.shift {
        snap_rotation(angle, &fine_rotation_candidates(), FINE_ROTATION_THRESHOLD)
    } else if !modifiers.ctrl {
        snap_rotation(
            angle,
            &default_rotation_candidates(start_rotation),
            ROTATION_SNAP_THRESHOLD,
        )
    } else {
        angle
    }
}

/// Turn the item so the rotate handle follows the pointer around the pivot.
pub fn rotate_item(
    scene: &mut dyn SceneGraph,
    drag: &HandleDrag,
    pointer: Vec2,
    modifiers: Modifiers,
) {
    let angle = (pointer - drag.pivot).to_angle().to_degrees() + 90.0;
    let angle = snapped_rotation(angle, drag.start_rotation, modifiers);
    let position = drag.pivot + rotate_vector(drag.pivot_offset, angle.to_radians());

    scene.defer_update_begin(drag.item);
    // Position depends on the rotation being applied first
    scene.set_rotation(drag.item, angle);
    scene.set_position(drag.item, position);
    scene.defer_update_end(drag.item);
}

/// Min and max that swap roles along a flipped axis.
fn toward_start(a: f32, b: f32, flipped: bool) -> f32 {
    if flipped { a.max(b) } else { a.min(b) }
}

fn toward_end(a: f32, b: f32, flipped: bool) -> f32 {
    if flipped { a.min(b) } else { a.max(b) }
}

/// Item-space anchor of the box `tl`..`br` for the item's alignment.
fn anchor_in_box(tl: Vec2, br: Vec2, fraction: Vec2) -> Vec2 {
    tl + (br - tl) * fraction
}

/// Move the dragged edges inward or outward as crop.
pub fn crop_item(scene: &mut dyn SceneGraph, drag: &HandleDrag, pointer: Vec2) {
    let Some(info) = scene.item(drag.item) else {
        return;
    };
    let scale = drag.start_scale;
    if scale.x.abs() < f32::EPSILON || scale.y.abs() < f32::EPSILON {
        return;
    }
    let size = drag.start_size;
    let crop0 = drag.start_crop;
    let handle = drag.handle;
    let flip_x = scale.x < 0.0;
    let flip_y = scale.y < 0.0;

    // The pointer may not reach past the uncropped content
    let max_tl = Vec2::new(-crop0.left as f32 * scale.x, -crop0.top as f32 * scale.y);
    let max_br = Vec2::new(
        size.x + crop0.right as f32 * scale.x,
        size.y + crop0.bottom as f32 * scale.y,
    );
    let mut p = drag.group_to_item.transform_point2(pointer);
    p.x = toward_end(toward_start(p.x, max_br.x, flip_x), max_tl.x, flip_x);
    p.y = toward_end(toward_start(p.y, max_br.y, flip_y), max_tl.y, flip_y);

    let mut tl = Vec2::ZERO;
    let mut br = size;
    if handle.left() {
        tl.x = toward_start(p.x, size.x - MIN_EXTENT * scale.x, flip_x);
    } else if handle.right() {
        br.x = toward_end(p.x, MIN_EXTENT * scale.x, flip_x);
    }
    if handle.top() {
        tl.y = toward_start(p.y, size.y - MIN_EXTENT * scale.y, flip_y);
    } else if handle.bottom() {
        br.y = toward_end(p.y, MIN_EXTENT * scale.y, flip_y);
    }

    let mut crop = crop0;
    if handle.left() {
        crop.left += (tl.x / scale.x).round() as i32;
    } else if handle.right() {
        crop.right += ((size.x - br.x) / scale.x).round() as i32;
    }
    if handle.top() {
        crop.top += (tl.y / scale.y).round() as i32;
    } else if handle.bottom() {
        crop.bottom += ((size.y - br.y) / scale.y).round() as i32;
    }

    let anchor = anchor_in_box(tl, br, info.transform.alignment.fraction());
    let position = drag.item_to_group.transform_point2(anchor).round();

    scene.defer_update_begin(drag.item);
    scene.set_crop(drag.item, crop);
    if info.transform.bounds_type == BoundsType::None {
        scene.set_position(drag.item, position);
    }
    scene.defer_update_end(drag.item);
}

/// Keep at least the minimum extent along both axes of `size` without
/// letting the box turn inside out, moving the dragged sides to match.
fn clamp_min_extent(tl: &mut Vec2, br: &mut Vec2, size: Vec2, drag: &HandleDrag) -> Vec2 {
    let handle = drag.handle;
    let sign = drag.start_size.signum();
    let mut size = size;
    if size.x * sign.x < MIN_EXTENT {
        size.x = MIN_EXTENT * sign.x;
        if handle.left() {
            tl.x = br.x - size.x;
        } else if handle.right() {
            br.x = tl.x + size.x;
        }
    }
    if size.y * sign.y < MIN_EXTENT {
        size.y = MIN_EXTENT * sign.y;
        if handle.top() {
            tl.y = br.y - size.y;
        } else if handle.bottom() {
            br.y = tl.y + size.y;
        }
    }
    size
}

/// Resize the item by dragging one of its edges or corners.
pub fn stretch_item(
    scene: &mut dyn SceneGraph,
    drag: &HandleDrag,
    pointer: Vec2,
    modifiers: Modifiers,
    canvas_size: Vec2,
    snap: &SnapSettings,
) {
    let Some(info) = scene.item(drag.item) else {
        return;
    };
    let handle = drag.handle;
    let p = drag.group_to_item.transform_point2(pointer);

    let mut tl = Vec2::ZERO;
    let mut br = drag.start_size;
    if handle.left() {
        tl.x = p.x;
    } else if handle.right() {
        br.x = p.x;
    }
    if handle.top() {
        tl.y = p.y;
    } else if handle.bottom() {
        br.y = p.y;
    }

    if !modifiers.ctrl {
        let item_to_canvas: Affine2 = drag.context.transform * drag.item_to_group;
        (tl, br) = snap_stretch(tl, br, handle, &item_to_canvas, canvas_size, snap);
    }
    let extent = br - tl;
    let mut size = clamp_min_extent(&mut tl, &mut br, extent, drag);
    let base = match info.transform.bounds_type {
        BoundsType::Fixed => info.base_size,
        BoundsType::None => info.cropped_size(),
    };
    let keep_aspect = match info.transform.bounds_type {
        BoundsType::Fixed => modifiers.shift,
        BoundsType::None => !modifiers.shift,
    };
    if keep_aspect {
        size = clamp_aspect(&mut tl, &mut br, size, base, handle);
        // Rounding the locked axis can take it back under the minimum
        size = clamp_min_extent(&mut tl, &mut br, size, drag);
    }

    scene.defer_update_begin(drag.item);
    match info.transform.bounds_type {
        BoundsType::Fixed => scene.set_bounds(drag.item, size.abs()),
        BoundsType::None => {
            if base.x.abs() > f32::EPSILON && base.y.abs() > f32::EPSILON {
                scene.set_scale(drag.item, size / base);
            }
        }
    }

    let anchor = anchor_in_box(tl, br, info.transform.alignment.fraction());
    let position = drag.item_to_group.transform_point2(anchor).round();
    scene.set_position(drag.item, position);
    scene.defer_update_end(drag.item);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Alignment, Handle};
    use crate::editor::hit_detection::HandleHit;
    use crate::editor::selection::begin_handle_drag;
    use crate::scene::{Crop, ItemTransform, MemoryScene};

    fn drag_for(scene: &mut MemoryScene, item: ItemId, handle: Handle, cropping: bool) -> HandleDrag {
        let hit = HandleHit {
            item,
            handle,
            distance: 0.0,
        };
        begin_handle_drag(scene, &hit, cropping).unwrap()
    }

    fn no_snap() -> SnapSettings {
        SnapSettings {
            enabled: false,
            ..SnapSettings::default()
        }
    }

    #[test]
    fn test_move_selection_into_group_space() {
        let mut scene = MemoryScene::new();
        let group = scene.add_group(
            None,
            Vec2::splat(100.0),
            ItemTransform {
                scale: Vec2::splat(2.0),
                ..ItemTransform::default()
            },
        );
        let child = scene.add_item(Some(group), Vec2::splat(10.0), ItemTransform::at(Vec2::new(5.0, 5.0)));
        let top = scene.add_item(None, Vec2::splat(10.0), ItemTransform::at(Vec2::new(50.0, 50.0)));
        scene.set_selected(child, true);
        scene.set_selected(top, true);

        move_selection(&mut scene, Vec2::new(10.0, -4.0));
        assert_eq!(scene.item(top).unwrap().transform.position, Vec2::new(60.0, 46.0));
        assert_eq!(scene.item(child).unwrap().transform.position, Vec2::new(10.0, 3.0));
        assert_eq!(scene.item(group).unwrap().transform.position, Vec2::ZERO);
    }

    #[test]
    fn test_snapped_rotation_modes() {
        let none = Modifiers::default();
        let shift = Modifiers {
            shift: true,
            ..Modifiers::default()
        };
        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::default()
        };
        assert_eq!(snapped_rotation(47.0, 0.0, none), 45.0);
        assert_eq!(snapped_rotation(52.0, 0.0, shift), 45.0);
        assert_eq!(snapped_rotation(47.0, 0.0, ctrl), 47.0);
    }

    #[test]
    fn test_rotate_keeps_center_fixed() {
        let mut scene = MemoryScene::new();
        let a = scene.add_item(None, Vec2::new(100.0, 50.0), ItemTransform::at(Vec2::new(100.0, 100.0)));
        let drag = drag_for(&mut scene, a, Handle::Rotate, false);
        assert_eq!(drag.pivot, Vec2::new(150.0, 125.0));

        // Pointer straight right of the pivot reads as a quarter turn
        rotate_item(&mut scene, &drag, Vec2::new(300.0, 125.0), Modifiers::default());
        let info = scene.item(a).unwrap();
        assert!((info.transform.rotation - 90.0).abs() < 1e-4);
        let center = crate::editor::transform::box_transform(&info).transform_point2(Vec2::splat(0.5));
        assert!(center.abs_diff_eq(Vec2::new(150.0, 125.0), 1e-3));
        assert_eq!(scene.completed_updates(), 1);
    }

    #[test]
    fn test_stretch_right_edge_free_aspect() {
        let mut scene = MemoryScene::new();
        let a = scene.add_item(None, Vec2::new(100.0, 50.0), ItemTransform::at(Vec2::new(10.0, 10.0)));
        let drag = drag_for(&mut scene, a, Handle::CenterRight, false);
        let shift = Modifiers {
            shift: true,
            ..Modifiers::default()
        };
        stretch_item(&mut scene, &drag, Vec2::new(210.0, 30.0), shift, Vec2::splat(2000.0), &no_snap());
        let t = scene.item(a).unwrap().transform;
        assert_eq!(t.scale, Vec2::new(2.0, 1.0));
        assert_eq!(t.position, Vec2::new(10.0, 10.0));
    }

    #[test]
    fn test_stretch_corner_keeps_aspect_by_default() {
        let mut scene = MemoryScene::new();
        let a = scene.add_item(None, Vec2::new(160.0, 90.0), ItemTransform::default());
        let drag = drag_for(&mut scene, a, Handle::BottomRight, false);
        stretch_item(&mut scene, &drag, Vec2::new(320.0, 100.0), Modifiers::default(), Vec2::splat(4000.0), &no_snap());
        let t = scene.item(a).unwrap().transform;
        assert_eq!(t.scale, Vec2::new(2.0, 2.0));
    }

    #[test]
    fn test_stretch_top_left_moves_position() {
        let mut scene = MemoryScene::new();
        let a = scene.add_item(None, Vec2::new(100.0, 100.0), ItemTransform::at(Vec2::new(100.0, 100.0)));
        let drag = drag_for(&mut scene, a, Handle::TopLeft, false);
        stretch_item(&mut scene, &drag, Vec2::new(50.0, 50.0), Modifiers::default(), Vec2::splat(4000.0), &no_snap());
        let t = scene.item(a).unwrap().transform;
        assert_eq!(t.position, Vec2::new(50.0, 50.0));
        assert_eq!(t.scale, Vec2::new(1.5, 1.5));
    }

    #[test]
    fn test_stretch_clamps_to_minimum_without_inverting() {
        let mut scene = MemoryScene::new();
        let a = scene.add_item(None, Vec2::new(100.0, 100.0), ItemTransform::at(Vec2::new(100.0, 100.0)));
        let drag = drag_for(&mut scene, a, Handle::CenterRight, false);
        let shift = Modifiers {
            shift: true,
            ..Modifiers::default()
        };
        stretch_item(&mut scene, &drag, Vec2::new(20.0, 150.0), shift, Vec2::splat(4000.0), &no_snap());
        let t = scene.item(a).unwrap().transform;
        assert_eq!(t.scale.x, 0.02);
        assert_eq!(t.position, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_stretch_fixed_bounds() {
        let mut scene = MemoryScene::new();
        let a = scene.add_item(
            None,
            Vec2::new(100.0, 100.0),
            ItemTransform {
                bounds_type: BoundsType::Fixed,
                bounds: Vec2::new(200.0, 100.0),
                ..ItemTransform::default()
            },
        );
        let drag = drag_for(&mut scene, a, Handle::BottomCenter, false);
        stretch_item(&mut scene, &drag, Vec2::new(80.0, 160.0), Modifiers::default(), Vec2::splat(4000.0), &no_snap());
        let t = scene.item(a).unwrap().transform;
        assert_eq!(t.bounds, Vec2::new(200.0, 160.0));
        assert_eq!(t.scale, Vec2::ONE);
    }

    #[test]
    fn test_crop_left_edge_keeps_right_edge() {
        let mut scene = MemoryScene::new();
        let a = scene.add_item(None, Vec2::new(100.0, 100.0), ItemTransform::at(Vec2::new(100.0, 100.0)));
        let drag = drag_for(&mut scene, a, Handle::CenterLeft, true);
        assert!(drag.cropping);
        crop_item(&mut scene, &drag, Vec2::new(130.0, 150.0));
        let t = scene.item(a).unwrap().transform;
        assert_eq!(t.crop, Crop { left: 30, ..Crop::default() });
        assert_eq!(t.position, Vec2::new(130.0, 100.0));
    }

    #[test]
    fn test_crop_leaves_minimum_content() {
        let mut scene = MemoryScene::new();
        let a = scene.add_item(
            None,
            Vec2::new(100.0, 100.0),
            ItemTransform {
                scale: Vec2::splat(2.0),
                alignment: Alignment::BottomRight,
                ..ItemTransform::at(Vec2::new(200.0, 200.0))
            },
        );
        let drag = drag_for(&mut scene, a, Handle::BottomCenter, true);
        crop_item(&mut scene, &drag, Vec2::new(100.0, -500.0));
        let t = scene.item(a).unwrap().transform;
        assert_eq!(t.crop.bottom, 98);
        // Bottom-aligned: the anchor follows the dragged edge
        assert_eq!(t.position, Vec2::new(200.0, 4.0));
    }

    #[test]
    fn test_crop_cannot_exceed_uncropped_content() {
        let mut scene = MemoryScene::new();
        let a = scene.add_item(
            None,
            Vec2::new(100.0, 100.0),
            ItemTransform {
                crop: Crop {
                    top: 10,
                    ..Crop::default()
                },
                ..ItemTransform::at(Vec2::new(0.0, 10.0))
            },
        );
        let drag = drag_for(&mut scene, a, Handle::TopCenter, true);
        crop_item(&mut scene, &drag, Vec2::new(50.0, -300.0));
        let t = scene.item(a).unwrap().transform;
        assert_eq!(t.crop.top, 0);
        assert_eq!(t.position, Vec2::new(0.0, 0.0));
    }

    #[test]
    fn test_crop_fixed_bounds_repeats_same_result() {
        let mut scene = MemoryScene::new();
        let a = scene.add_item(
            None,
            Vec2::new(100.0, 100.0),
            ItemTransform {
                bounds_type: BoundsType::Fixed,
                bounds: Vec2::new(200.0, 100.0),
                ..ItemTransform::default()
            },
        );
        let drag = drag_for(&mut scene, a, Handle::CenterLeft, true);
        assert_eq!(drag.start_scale, Vec2::new(2.0, 1.0));
        // Each move event recomputes from the drag start, so a still pointer
        // must not keep eating into the content
        for _ in 0..4 {
            crop_item(&mut scene, &drag, Vec2::new(40.0, 50.0));
            let t = scene.item(a).unwrap().transform;
            assert_eq!(t.crop, Crop { left: 20, ..Crop::default() });
            assert_eq!(t.bounds, Vec2::new(200.0, 100.0));
        }
    }

    #[test]
    fn test_stretch_aspect_locked_edge_keeps_minimum_extent() {
        let mut scene = MemoryScene::new();
        let a = scene.add_item(None, Vec2::new(160.0, 90.0), ItemTransform::default());
        let drag = drag_for(&mut scene, a, Handle::CenterRight, false);
        stretch_item(&mut scene, &drag, Vec2::new(-50.0, 45.0), Modifiers::default(), Vec2::splat(4000.0), &no_snap());
        let t = scene.item(a).unwrap().transform;
        assert!(t.scale.x > 0.0 && t.scale.y > 0.0);
        assert!(t.scale.x * 160.0 >= MIN_EXTENT - 1e-3);
        assert!(t.scale.y * 90.0 >= MIN_EXTENT - 1e-3);
    }

    #[test]
    fn test_stretch_wide_item_never_collapses_height() {
        let mut scene = MemoryScene::new();
        let a = scene.add_item(None, Vec2::new(1000.0, 10.0), ItemTransform::default());
        let drag = drag_for(&mut scene, a, Handle::CenterRight, false);
        stretch_item(&mut scene, &drag, Vec2::new(-50.0, 5.0), Modifiers::default(), Vec2::splat(4000.0), &no_snap());
        let t = scene.item(a).unwrap().transform;
        assert!(t.scale.y * 10.0 >= MIN_EXTENT - 1e-3);
        assert!(t.scale.x * 1000.0 >= MIN_EXTENT - 1e-3);
    }
}
