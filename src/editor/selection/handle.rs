//! Starting a handle drag: capture the target's pre-drag state.

use bevy::log::debug;
use bevy::math::{Affine2, Vec2};

use crate::editor::hit_detection::{HandleHit, context_for};
use crate::editor::transform::{
    box_transform, content_scale, invert, item_size, rotate_vector,
};
use crate::scene::SceneGraph;

use super::HandleDrag;

/// Capture the state of the item under `hit` and open a group-resize
/// transaction on its group. Returns `None` for locked or degenerate items.
pub fn begin_handle_drag(
    scene: &mut dyn SceneGraph,
    hit: &HandleHit,
    cropping: bool,
) -> Option<HandleDrag> {
    let info = scene.item(hit.item)?;
    if info.locked {
        return None;
    }

    let context = context_for(scene, hit.item);
    let canvas_to_group = invert(context.transform)?;

    let m = box_transform(&info);
    let rotation = info.transform.rotation.to_radians();
    let upper_left = m.transform_point2(Vec2::ZERO);
    let item_to_group = Affine2::from_translation(upper_left) * Affine2::from_angle(rotation);
    let group_to_item = invert(item_to_group)?;

    let pivot = m.transform_point2(Vec2::splat(0.5));
    let pivot_offset = rotate_vector(info.transform.position - pivot, -rotation);

    let group = scene.group_of(hit.item);
    if let Some(group) = group {
        scene.defer_group_resize_begin(group);
    }

    debug!(
        "Begin {:?} drag on {:?} (cropping: {})",
        hit.handle, hit.item, cropping
    );

    Some(HandleDrag {
        item: hit.item,
        group,
        handle: hit.handle,
        cropping: cropping && hit.handle.is_resize(),
        context,
        canvas_to_group,
        item_to_group,
        group_to_item,
        start_rotation: info.transform.rotation,
        start_crop: info.transform.crop,
        start_scale: content_scale(&info),
        start_size: item_size(&info),
        pivot,
        pivot_offset,
    })
}
