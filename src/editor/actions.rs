//! Context-menu actions on the canvas and its items.

use bevy::log::info;
use bevy::math::Vec2;

use crate::common::Alignment;
use crate::scene::{BoundsType, Crop, ItemId, SceneGraph};

use super::SceneCanvas;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum CanvasAction {
    ToggleCanvasLock,
    ToggleItemLock(ItemId),
    ResetTransform(ItemId),
    TogglePanMode,
    /// `None` returns to letterboxing
    SetFixedScale(Option<f32>),
}

pub fn apply_action(canvas: &mut SceneCanvas, scene: &mut dyn SceneGraph, action: CanvasAction) {
    match action {
        CanvasAction::ToggleCanvasLock => canvas.set_locked(!canvas.is_locked()),
        CanvasAction::ToggleItemLock(id) => toggle_item_lock(scene, id),
        CanvasAction::ResetTransform(id) => reset_transform(scene, id),
        CanvasAction::TogglePanMode => canvas.set_pan_mode(!canvas.is_pan_mode()),
        CanvasAction::SetFixedScale(scale) => canvas.viewport_mut().set_fixed_scale(scale),
    }
}

pub fn toggle_item_lock(scene: &mut dyn SceneGraph, id: ItemId) {
    let Some(info) = scene.item(id) else {
        return;
    };
    scene.set_locked(id, !info.locked);
    info!("Item {:?} {}", id, if info.locked { "unlocked" } else { "locked" });
}

/// Put an item back at the origin, unscaled, uncropped and unrotated.
pub fn reset_transform(scene: &mut dyn SceneGraph, id: ItemId) {
    if scene.item(id).is_none() {
        return;
    }
    scene.defer_update_begin(id);
    scene.set_alignment(id, Alignment::TopLeft);
    scene.set_bounds_type(id, BoundsType::None);
    scene.set_scale(id, Vec2::ONE);
    scene.set_position(id, Vec2::ZERO);
    scene.set_crop(id, Crop::default());
    scene.set_rotation(id, 0.0);
    scene.defer_update_end(id);
}
