//! Hit detection for items, transform handles and the marquee.
//!
//! Every query walks the scene tree explicitly, carrying a [`GroupContext`]
//! with the composed parent transform so nested groups resolve correctly.

use bevy::math::{Affine2, Vec2};

use crate::common::Handle;
use crate::constants::HANDLE_RADIUS;
use crate::scene::{ItemId, ItemInfo, SceneGraph};

use super::transform::{
    box_corners, box_transform, compose, draw_transform, is_valid_box, round_trip,
};

/// Accumulated transform of the groups enclosing an item.
#[derive(Clone, Copy, Debug)]
pub struct GroupContext {
    /// Maps the group's child space to canvas space
    pub transform: Affine2,
    /// Sum of ancestor group rotations, in radians
    pub rotation: f32,
}

impl Default for GroupContext {
    fn default() -> Self {
        Self {
            transform: Affine2::IDENTITY,
            rotation: 0.0,
        }
    }
}

impl GroupContext {
    /// Context for the children of `group`.
    pub fn enter(&self, group: &ItemInfo) -> Self {
        Self {
            transform: compose(self.transform, draw_transform(group)),
            rotation: self.rotation + group.transform.rotation.to_radians(),
        }
    }

    /// Box transform of `info` in canvas space.
    pub fn box_of(&self, info: &ItemInfo) -> Affine2 {
        compose(self.transform, box_transform(info))
    }
}

/// Context of the group chain above `id`, outermost group first.
pub fn context_for(scene: &dyn SceneGraph, id: ItemId) -> GroupContext {
    let mut chain = Vec::new();
    let mut current = scene.group_of(id);
    while let Some(group) = current {
        chain.push(group);
        current = scene.group_of(group);
    }
    chain
        .iter()
        .rev()
        .filter_map(|g| scene.item(*g))
        .fold(GroupContext::default(), |ctx, group| ctx.enter(&group))
}

fn in_unit_square(local: Vec2) -> bool {
    (0.0..=1.0).contains(&local.x) && (0.0..=1.0).contains(&local.y)
}

/// Whether `point` lies on the item, given the transform of its parent.
pub fn point_in_item(point: Vec2, info: &ItemInfo, parent: &Affine2) -> bool {
    let m = compose(*parent, box_transform(info));
    round_trip(&m, point).is_some_and(in_unit_square)
}

/// Pickable items under `point`, back-to-front.
///
/// A group's children are only reported when they are selected, so clicking
/// a group member picks the group until the member itself is selected.
fn hits_at(
    scene: &dyn SceneGraph,
    parent: Option<ItemId>,
    ctx: &GroupContext,
    point: Vec2,
    hits: &mut Vec<ItemInfo>,
) {
    for id in scene.children(parent) {
        let Some(info) = scene.item(id) else {
            continue;
        };
        if !info.is_pickable() {
            continue;
        }
        if (parent.is_none() || info.selected) && point_in_item(point, &info, &ctx.transform) {
            hits.push(info);
        }
        if info.is_group {
            hits_at(scene, Some(id), &ctx.enter(&info), point, hits);
        }
    }
}

/// The item a click at `point` should pick.
///
/// With `prefer_below_selected`, a click on an already selected item that
/// covers another hit picks the one directly beneath it, so repeated clicks
/// cycle down through a stack.
pub fn topmost_item_at(
    scene: &dyn SceneGraph,
    point: Vec2,
    prefer_below_selected: bool,
) -> Option<ItemId> {
    let mut hits = Vec::new();
    hits_at(scene, None, &GroupContext::default(), point, &mut hits);

    let mut from_top = hits.iter().rev();
    let top = from_top.next()?;
    if prefer_below_selected
        && top.selected
        && let Some(below) = from_top.next()
    {
        return Some(below.id);
    }
    Some(top.id)
}

/// Whether any selected, unlocked item contains `point`.
pub fn selected_at(scene: &dyn SceneGraph, point: Vec2) -> bool {
    selected_at_in(scene, None, &GroupContext::default(), point)
}

fn selected_at_in(
    scene: &dyn SceneGraph,
    parent: Option<ItemId>,
    ctx: &GroupContext,
    point: Vec2,
) -> bool {
    scene.children(parent).into_iter().any(|id| {
        let Some(info) = scene.item(id) else {
            return false;
        };
        if info.locked || !info.visible {
            return false;
        }
        if info.selected && point_in_item(point, &info, &ctx.transform) {
            return true;
        }
        info.is_group && selected_at_in(scene, Some(id), &ctx.enter(&info), point)
    })
}

/// A transform handle under the pointer.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct HandleHit {
    pub item: ItemId,
    pub handle: Handle,
    pub distance: f32,
}

/// Distance of the rotate handle from the item's top edge.
pub fn rotate_handle_offset(radius: f32) -> f32 {
    HANDLE_RADIUS * radius * 1.5 - radius
}

/// Canvas position of the rotate handle for a box transform.
///
/// The handle sits above the middle of the top edge, along the direction
/// leaving the item through that edge.
pub fn rotate_handle_position(m: &Affine2, radius: f32) -> Vec2 {
    let top_center = m.transform_point2(Vec2::new(0.5, 0.0));
    let outward = -m.matrix2.y_axis.normalize_or_zero();
    top_center + outward * rotate_handle_offset(radius)
}

/// Nearest handle of any selected item within `radius` of `point`.
pub fn handle_at(scene: &dyn SceneGraph, point: Vec2, radius: f32) -> Option<HandleHit> {
    let mut best = None;
    handles_in(scene, None, &GroupContext::default(), point, radius, &mut best);
    best
}

fn handles_in(
    scene: &dyn SceneGraph,
    parent: Option<ItemId>,
    ctx: &GroupContext,
    point: Vec2,
    radius: f32,
    best: &mut Option<HandleHit>,
) {
    for id in scene.children(parent) {
        let Some(info) = scene.item(id) else {
            continue;
        };
        if info.locked || !info.visible {
            continue;
        }
        if !info.selected {
            if info.is_group {
                handles_in(scene, Some(id), &ctx.enter(&info), point, radius, best);
            }
            continue;
        }

        let m = ctx.box_of(&info);
        if !is_valid_box(&m) {
            continue;
        }
        let candidates = Handle::RESIZE
            .iter()
            .filter_map(|h| h.fraction().map(|f| (*h, m.transform_point2(f))))
            .chain(std::iter::once((
                Handle::Rotate,
                rotate_handle_position(&m, radius),
            )));

        for (handle, position) in candidates {
            let distance = position.distance(point);
            if distance > radius {
                continue;
            }
            if best.is_none_or(|b| distance < b.distance) {
                *best = Some(HandleHit {
                    item: id,
                    handle,
                    distance,
                });
            }
        }
    }
}

/// Orientation test: whether a, b, c turn counter-clockwise.
fn counter_clockwise(a: Vec2, b: Vec2, c: Vec2) -> bool {
    (c.y - a.y) * (b.x - a.x) > (b.y - a.y) * (c.x - a.x)
}

fn segments_intersect(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> bool {
    counter_clockwise(p1, p3, p4) != counter_clockwise(p2, p3, p4)
        && counter_clockwise(p1, p2, p3) != counter_clockwise(p1, p2, p4)
}

fn quad_crosses_rect(quad: &[Vec2; 4], min: Vec2, max: Vec2) -> bool {
    let rect = [
        min,
        Vec2::new(max.x, min.y),
        max,
        Vec2::new(min.x, max.y),
    ];
    (0..4).any(|i| {
        let (a, b) = (quad[i], quad[(i + 1) % 4]);
        (0..4).any(|j| segments_intersect(a, b, rect[j], rect[(j + 1) % 4]))
    })
}

fn strictly_inside(point: Vec2, min: Vec2, max: Vec2) -> bool {
    point.x > min.x && point.x < max.x && point.y > min.y && point.y < max.y
}

/// Top-level items touched by the marquee spanning `start` to `end`.
///
/// Groups are treated as whole items.
pub fn items_in_rect(scene: &dyn SceneGraph, start: Vec2, end: Vec2) -> Vec<ItemId> {
    let min = start.min(end);
    let max = start.max(end);
    let probes = [
        min,
        Vec2::new(max.x, min.y),
        max,
        Vec2::new(min.x, max.y),
        (min + max) * 0.5,
    ];

    scene
        .children(None)
        .into_iter()
        .filter_map(|id| scene.item(id))
        .filter(|info| info.is_pickable())
        .filter(|info| {
            let m = box_transform(info);
            if !is_valid_box(&m) {
                return false;
            }
            let quad = box_corners(&m);
            let center = m.transform_point2(Vec2::splat(0.5));

            probes
                .iter()
                .any(|p| point_in_item(*p, info, &Affine2::IDENTITY))
                || quad
                    .iter()
                    .chain(std::iter::once(&center))
                    .any(|c| strictly_inside(*c, min, max))
                || quad_crosses_rect(&quad, min, max)
        })
        .map(|info| info.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Alignment;
    use crate::scene::{ItemTransform, MemoryScene};

    fn square_at(scene: &mut MemoryScene, position: Vec2, size: f32) -> ItemId {
        scene.add_item(None, Vec2::splat(size), ItemTransform::at(position))
    }

    #[test]
    fn test_point_in_item_rotation_invariance() {
        let point = Vec2::new(30.0, 60.0);
        for degrees in [0.0_f32, 17.0, 45.0, 90.0, 133.0, 180.0, 271.0, -60.0] {
            let transform = ItemTransform {
                rotation: degrees,
                ..ItemTransform::default()
            };
            let info = ItemInfo {
                id: ItemId(1),
                transform,
                base_size: Vec2::splat(100.0),
                visible: true,
                locked: false,
                selected: false,
                is_group: false,
                has_video: true,
            };
            let rotated = Vec2::from_angle(degrees.to_radians()).rotate(point);
            assert!(
                point_in_item(rotated, &info, &Affine2::IDENTITY),
                "rotation {degrees}"
            );
        }
    }

    #[test]
    fn test_point_outside_item() {
        let mut scene = MemoryScene::new();
        let a = square_at(&mut scene, Vec2::ZERO, 100.0);
        let info = scene.item(a).unwrap();
        assert!(!point_in_item(Vec2::new(101.0, 50.0), &info, &Affine2::IDENTITY));
        assert!(point_in_item(Vec2::new(100.0, 100.0), &info, &Affine2::IDENTITY));
    }

    #[test]
    fn test_topmost_prefers_upper_item() {
        let mut scene = MemoryScene::new();
        let _a = square_at(&mut scene, Vec2::ZERO, 100.0);
        let b = square_at(&mut scene, Vec2::new(50.0, 50.0), 100.0);
        assert_eq!(topmost_item_at(&scene, Vec2::new(75.0, 75.0), true), Some(b));
        assert_eq!(topmost_item_at(&scene, Vec2::new(300.0, 300.0), true), None);
    }

    #[test]
    fn test_topmost_clicks_through_selected() {
        let mut scene = MemoryScene::new();
        let a = square_at(&mut scene, Vec2::ZERO, 100.0);
        let b = square_at(&mut scene, Vec2::new(50.0, 50.0), 100.0);
        scene.set_selected(b, true);
        let p = Vec2::new(75.0, 75.0);
        assert_eq!(topmost_item_at(&scene, p, true), Some(a));
        assert_eq!(topmost_item_at(&scene, p, false), Some(b));
        // Nothing beneath: the selected item itself is picked
        assert_eq!(topmost_item_at(&scene, Vec2::new(140.0, 140.0), true), Some(b));
    }

    #[test]
    fn test_topmost_skips_locked_and_hidden() {
        let mut scene = MemoryScene::new();
        let a = square_at(&mut scene, Vec2::ZERO, 100.0);
        let b = square_at(&mut scene, Vec2::ZERO, 100.0);
        let c = square_at(&mut scene, Vec2::ZERO, 100.0);
        scene.set_locked(c, true);
        scene.set_visible(b, false);
        assert_eq!(topmost_item_at(&scene, Vec2::splat(10.0), false), Some(a));
    }

    #[test]
    fn test_group_members_hit_through_group_transform() {
        let mut scene = MemoryScene::new();
        let group = scene.add_group(
            None,
            Vec2::splat(200.0),
            ItemTransform {
                scale: Vec2::splat(2.0),
                ..ItemTransform::at(Vec2::new(100.0, 100.0))
            },
        );
        let child = scene.add_item(
            Some(group),
            Vec2::splat(10.0),
            ItemTransform::at(Vec2::new(20.0, 20.0)),
        );
        // Child occupies canvas (140,140)-(160,160)
        let p = Vec2::new(150.0, 150.0);
        assert_eq!(topmost_item_at(&scene, p, false), Some(group));
        scene.set_selected(child, true);
        assert_eq!(topmost_item_at(&scene, p, false), Some(child));
        assert!(selected_at(&scene, p));
        assert!(!selected_at(&scene, Vec2::new(110.0, 110.0)));
        let ctx = context_for(&scene, child);
        let canvas_box = ctx.box_of(&scene.item(child).unwrap());
        assert!(canvas_box
            .transform_point2(Vec2::ZERO)
            .abs_diff_eq(Vec2::new(140.0, 140.0), 1e-3));
    }

    #[test]
    fn test_handle_at_finds_corner_and_rotate() {
        let mut scene = MemoryScene::new();
        let a = square_at(&mut scene, Vec2::new(100.0, 100.0), 100.0);
        assert!(handle_at(&scene, Vec2::new(200.0, 200.0), 6.0).is_none());

        scene.set_selected(a, true);
        let hit = handle_at(&scene, Vec2::new(201.0, 202.0), 6.0).unwrap();
        assert_eq!(hit.item, a);
        assert_eq!(hit.handle, Handle::BottomRight);

        let edge = handle_at(&scene, Vec2::new(150.0, 99.0), 6.0).unwrap();
        assert_eq!(edge.handle, Handle::TopCenter);

        // 5 radii above the top edge
        let rotate = handle_at(&scene, Vec2::new(150.0, 70.0), 6.0).unwrap();
        assert_eq!(rotate.handle, Handle::Rotate);
    }

    #[test]
    fn test_handle_at_follows_rotation() {
        let mut scene = MemoryScene::new();
        let a = scene.add_item(
            None,
            Vec2::splat(100.0),
            ItemTransform {
                rotation: 90.0,
                alignment: Alignment::Center,
                ..ItemTransform::at(Vec2::new(200.0, 200.0))
            },
        );
        scene.set_selected(a, true);
        // Rotated clockwise a quarter turn, the top edge faces right
        let rotate = handle_at(&scene, Vec2::new(280.0, 200.0), 6.0).unwrap();
        assert_eq!(rotate.handle, Handle::Rotate);
        let top_left = handle_at(&scene, Vec2::new(250.0, 150.0), 6.0).unwrap();
        assert_eq!(top_left.handle, Handle::TopLeft);
    }

    #[test]
    fn test_handle_at_skips_locked_items() {
        let mut scene = MemoryScene::new();
        let a = square_at(&mut scene, Vec2::ZERO, 100.0);
        scene.set_selected(a, true);
        scene.set_locked(a, true);
        assert!(handle_at(&scene, Vec2::ZERO, 6.0).is_none());
    }

    #[test]
    fn test_items_in_rect_enclosed() {
        let mut scene = MemoryScene::new();
        let a = square_at(&mut scene, Vec2::new(10.0, 10.0), 20.0);
        let _far = square_at(&mut scene, Vec2::new(500.0, 500.0), 20.0);
        assert_eq!(
            items_in_rect(&scene, Vec2::ZERO, Vec2::new(100.0, 100.0)),
            vec![a]
        );
    }

    #[test]
    fn test_items_in_rect_grazing_corner() {
        let mut scene = MemoryScene::new();
        let a = square_at(&mut scene, Vec2::ZERO, 100.0);
        assert_eq!(
            items_in_rect(&scene, Vec2::new(200.0, 200.0), Vec2::new(95.0, 95.0)),
            vec![a]
        );
    }

    #[test]
    fn test_items_in_rect_edge_crossing_only() {
        let mut scene = MemoryScene::new();
        // Diamond with tips 70.7 px from (200, 200)
        let diamond = scene.add_item(
            None,
            Vec2::splat(100.0),
            ItemTransform {
                rotation: 45.0,
                alignment: Alignment::Center,
                ..ItemTransform::at(Vec2::new(200.0, 200.0))
            },
        );
        // A thin strip clipping the upper-left edge; no probe point lands inside
        let start = Vec2::new(100.0, 140.0);
        let end = Vec2::new(230.0, 145.0);
        let info = scene.item(diamond).unwrap();
        assert!(!point_in_item((start + end) * 0.5, &info, &Affine2::IDENTITY));
        assert_eq!(items_in_rect(&scene, start, end), vec![diamond]);
    }

    #[test]
    fn test_items_in_rect_excludes_locked_and_hidden() {
        let mut scene = MemoryScene::new();
        let a = square_at(&mut scene, Vec2::new(10.0, 10.0), 20.0);
        let b = square_at(&mut scene, Vec2::new(10.0, 10.0), 20.0);
        scene.set_locked(a, true);
        scene.set_visible(b, false);
        assert!(items_in_rect(&scene, Vec2::ZERO, Vec2::new(100.0, 100.0)).is_empty());
    }

    #[test]
    fn test_segments_intersect() {
        assert!(segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(10.0, 0.0)
        ));
        assert!(!segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(0.0, 5.0),
            Vec2::new(10.0, 5.0)
        ));
    }
}
