//! Scene-graph collaborator interface.
//!
//! The canvas never owns items. It reads their transform info through
//! [`SceneGraph`] and writes changes back through its setters, wrapping
//! multi-field writes in deferred-update transactions.

mod memory;

pub use memory::MemoryScene;

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::common::Alignment;

/// Host-assigned identifier of a scene item.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct ItemId(pub u64);

/// Pixels removed from each side of the item's content before scaling.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Crop {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Crop {
    pub fn is_empty(&self) -> bool {
        self.left == 0 && self.top == 0 && self.right == 0 && self.bottom == 0
    }

    /// Total pixels cropped on each axis.
    pub fn extent(&self) -> Vec2 {
        Vec2::new(
            (self.left + self.right) as f32,
            (self.top + self.bottom) as f32,
        )
    }
}

/// How an item's on-canvas size is derived.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum BoundsType {
    /// Size follows content size, crop and scale
    #[default]
    None,
    /// Content is stretched into a fixed bounds size
    Fixed,
}

/// The editable transform fields of an item.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ItemTransform {
    pub position: Vec2,
    pub scale: Vec2,
    /// Clockwise rotation in degrees (canvas y points down)
    pub rotation: f32,
    pub alignment: Alignment,
    pub bounds_type: BoundsType,
    pub bounds: Vec2,
    pub crop: Crop,
}

impl Default for ItemTransform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation: 0.0,
            alignment: Alignment::TopLeft,
            bounds_type: BoundsType::None,
            bounds: Vec2::ZERO,
            crop: Crop::default(),
        }
    }
}

impl ItemTransform {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

/// Snapshot of one item as reported by the scene graph.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ItemInfo {
    pub id: ItemId,
    pub transform: ItemTransform,
    /// Uncropped content size in pixels
    pub base_size: Vec2,
    pub visible: bool,
    pub locked: bool,
    pub selected: bool,
    pub is_group: bool,
    /// Whether the item produces visual content
    pub has_video: bool,
}

impl ItemInfo {
    /// Content size after cropping, before scale.
    pub fn cropped_size(&self) -> Vec2 {
        self.base_size - self.transform.crop.extent()
    }

    /// Items that can be picked by hit-testing and the marquee.
    pub fn is_pickable(&self) -> bool {
        self.visible && self.has_video && !self.locked
    }
}

/// Storage and mutation surface of the host's scene.
///
/// Enumeration order is back-to-front: the last child is drawn on top.
pub trait SceneGraph {
    /// Direct children of `parent`, or the top-level items when `None`.
    fn children(&self, parent: Option<ItemId>) -> Vec<ItemId>;

    fn item(&self, id: ItemId) -> Option<ItemInfo>;

    /// The group directly containing `id`, if any.
    fn group_of(&self, id: ItemId) -> Option<ItemId>;

    fn set_position(&mut self, id: ItemId, position: Vec2);
    fn set_rotation(&mut self, id: ItemId, degrees: f32);
    fn set_scale(&mut self, id: ItemId, scale: Vec2);
    fn set_crop(&mut self, id: ItemId, crop: Crop);
    fn set_bounds_type(&mut self, id: ItemId, bounds_type: BoundsType);
    fn set_bounds(&mut self, id: ItemId, bounds: Vec2);
    fn set_alignment(&mut self, id: ItemId, alignment: Alignment);
    fn set_selected(&mut self, id: ItemId, selected: bool);
    fn set_locked(&mut self, id: ItemId, locked: bool);

    /// Start batching writes to `id` so observers see one change.
    fn defer_update_begin(&mut self, _id: ItemId) {}
    fn defer_update_end(&mut self, _id: ItemId) {}

    /// Start a resize of a child of `group`; the group recomputes its
    /// bounds once when the matching end call arrives.
    fn defer_group_resize_begin(&mut self, _group: ItemId) {}
    fn defer_group_resize_end(&mut self, _group: ItemId) {}

    fn is_selected(&self, id: ItemId) -> bool {
        self.item(id).is_some_and(|info| info.selected)
    }
}

/// Ids of all selected items below `parent`, recursing into groups.
pub fn selected_items(scene: &dyn SceneGraph, parent: Option<ItemId>) -> Vec<ItemId> {
    let mut out = Vec::new();
    collect_selected(scene, parent, &mut out);
    out
}

fn collect_selected(scene: &dyn SceneGraph, parent: Option<ItemId>, out: &mut Vec<ItemId>) {
    for id in scene.children(parent) {
        let Some(info) = scene.item(id) else {
            continue;
        };
        if info.selected {
            out.push(id);
        }
        if info.is_group {
            collect_selected(scene, Some(id), out);
        }
    }
}

/// Deselect every item in the scene.
pub fn clear_selection(scene: &mut dyn SceneGraph) {
    for id in selected_items(scene, None) {
        scene.set_selected(id, false);
    }
}

/// Select `id` alone, clearing every other selection.
pub fn select_only(scene: &mut dyn SceneGraph, id: ItemId) {
    for other in selected_items(scene, None) {
        if other != id {
            scene.set_selected(other, false);
        }
    }
    scene.set_selected(id, true);
}
