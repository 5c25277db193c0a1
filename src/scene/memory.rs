//! In-memory scene graph used by the demo host and tests.

use std::collections::HashMap;

use bevy::log::debug;
use bevy::math::Vec2;

use super::{BoundsType, Crop, ItemId, ItemInfo, ItemTransform, SceneGraph};
use crate::common::Alignment;

struct Node {
    info: ItemInfo,
    parent: Option<ItemId>,
    children: Vec<ItemId>,
}

/// A tree of items kept in a map, with transaction bookkeeping.
#[derive(Default)]
pub struct MemoryScene {
    nodes: HashMap<ItemId, Node>,
    roots: Vec<ItemId>,
    next_id: u64,
    open_updates: usize,
    completed_updates: usize,
    group_resizes: Vec<ItemId>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a content item on top of `parent`'s children.
    pub fn add_item(
        &mut self,
        parent: Option<ItemId>,
        base_size: Vec2,
        transform: ItemTransform,
    ) -> ItemId {
        self.insert(parent, base_size, transform, false)
    }

    /// Add a group; its children are positioned in its content space.
    pub fn add_group(
        &mut self,
        parent: Option<ItemId>,
        base_size: Vec2,
        transform: ItemTransform,
    ) -> ItemId {
        self.insert(parent, base_size, transform, true)
    }

    fn insert(
        &mut self,
        parent: Option<ItemId>,
        base_size: Vec2,
        transform: ItemTransform,
        is_group: bool,
    ) -> ItemId {
        self.next_id += 1;
        let id = ItemId(self.next_id);
        let info = ItemInfo {
            id,
            transform,
            base_size,
            visible: true,
            locked: false,
            selected: false,
            is_group,
            has_video: true,
        };
        self.nodes.insert(
            id,
            Node {
                info,
                parent,
                children: Vec::new(),
            },
        );
        match parent.and_then(|p| self.nodes.get_mut(&p)) {
            Some(group) => group.children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// Remove an item and everything below it.
    pub fn remove(&mut self, id: ItemId) {
        let Some(node) = self.nodes.remove(&id) else {
            return;
        };
        for child in node.children {
            self.remove(child);
        }
        match node.parent.and_then(|p| self.nodes.get_mut(&p)) {
            Some(group) => group.children.retain(|c| *c != id),
            None => self.roots.retain(|c| *c != id),
        }
        debug!("Removed scene item {:?}", id);
    }

    pub fn set_visible(&mut self, id: ItemId, visible: bool) {
        self.with_info(id, |info| info.visible = visible);
    }

    pub fn set_has_video(&mut self, id: ItemId, has_video: bool) {
        self.with_info(id, |info| info.has_video = has_video);
    }

    /// Number of deferred updates that have been closed.
    pub fn completed_updates(&self) -> usize {
        self.completed_updates
    }

    /// Whether a deferred update is currently open.
    pub fn in_update(&self) -> bool {
        self.open_updates > 0
    }

    /// Groups with a resize transaction in progress.
    pub fn active_group_resizes(&self) -> &[ItemId] {
        &self.group_resizes
    }

    fn with_info(&mut self, id: ItemId, f: impl FnOnce(&mut ItemInfo)) {
        if let Some(node) = self.nodes.get_mut(&id) {
            f(&mut node.info);
        }
    }
}

impl SceneGraph for MemoryScene {
    fn children(&self, parent: Option<ItemId>) -> Vec<ItemId> {
        match parent {
            Some(p) => self
                .nodes
                .get(&p)
                .map(|n| n.children.clone())
                .unwrap_or_default(),
            None => self.roots.clone(),
        }
    }

    fn item(&self, id: ItemId) -> Option<ItemInfo> {
        self.nodes.get(&id).map(|n| n.info)
    }

    fn group_of(&self, id: ItemId) -> Option<ItemId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    fn set_position(&mut self, id: ItemId, position: Vec2) {
        self.with_info(id, |info| info.transform.position = position);
    }

    fn set_rotation(&mut self, id: ItemId, degrees: f32) {
        self.with_info(id, |info| info.transform.rotation = degrees);
    }

    fn set_scale(&mut self, id: ItemId, scale: Vec2) {
        self.with_info(id, |info| info.transform.scale = scale);
    }

    fn set_crop(&mut self, id: ItemId, crop: Crop) {
        self.with_info(id, |info| info.transform.crop = crop);
    }

    fn set_bounds_type(&mut self, id: ItemId, bounds_type: BoundsType) {
        self.with_info(id, |info| info.transform.bounds_type = bounds_type);
    }

    fn set_bounds(&mut self, id: ItemId, bounds: Vec2) {
        self.with_info(id, |info| info.transform.bounds = bounds);
    }

    fn set_alignment(&mut self, id: ItemId, alignment: Alignment) {
        self.with_info(id, |info| info.transform.alignment = alignment);
    }

    fn set_selected(&mut self, id: ItemId, selected: bool) {
        self.with_info(id, |info| info.selected = selected);
    }

    fn set_locked(&mut self, id: ItemId, locked: bool) {
        self.with_info(id, |info| info.locked = locked);
    }

    fn defer_update_begin(&mut self, _id: ItemId) {
        self.open_updates += 1;
    }

    fn defer_update_end(&mut self, _id: ItemId) {
        if self.open_updates > 0 {
            self.open_updates -= 1;
            self.completed_updates += 1;
        }
    }

    fn defer_group_resize_begin(&mut self, group: ItemId) {
        self.group_resizes.push(group);
    }

    fn defer_group_resize_end(&mut self, group: ItemId) {
        if let Some(index) = self.group_resizes.iter().position(|g| *g == group) {
            self.group_resizes.remove(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_are_back_to_front() {
        let mut scene = MemoryScene::new();
        let a = scene.add_item(None, Vec2::splat(10.0), ItemTransform::default());
        let b = scene.add_item(None, Vec2::splat(10.0), ItemTransform::default());
        assert_eq!(scene.children(None), vec![a, b]);
    }

    #[test]
    fn test_remove_group_removes_children() {
        let mut scene = MemoryScene::new();
        let group = scene.add_group(None, Vec2::splat(50.0), ItemTransform::default());
        let child = scene.add_item(Some(group), Vec2::splat(10.0), ItemTransform::default());
        assert_eq!(scene.group_of(child), Some(group));

        scene.remove(group);
        assert!(scene.item(group).is_none());
        assert!(scene.item(child).is_none());
        assert!(scene.children(None).is_empty());
    }

    #[test]
    fn test_deferred_update_counts() {
        let mut scene = MemoryScene::new();
        let a = scene.add_item(None, Vec2::splat(10.0), ItemTransform::default());
        scene.defer_update_begin(a);
        assert!(scene.in_update());
        scene.set_position(a, Vec2::new(3.0, 4.0));
        scene.defer_update_end(a);
        assert!(!scene.in_update());
        assert_eq!(scene.completed_updates(), 1);
        assert_eq!(
            scene.item(a).map(|i| i.transform.position),
            Some(Vec2::new(3.0, 4.0))
        );
    }

    #[test]
    fn test_group_resize_tracking() {
        let mut scene = MemoryScene::new();
        let group = scene.add_group(None, Vec2::splat(50.0), ItemTransform::default());
        scene.defer_group_resize_begin(group);
        assert_eq!(scene.active_group_resizes(), &[group]);
        scene.defer_group_resize_end(group);
        assert!(scene.active_group_resizes().is_empty());
    }
}
