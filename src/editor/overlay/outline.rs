//! Outlines, crop stripes and transform handles of selected and hovered items.

use bevy::math::{Affine2, Vec2};

use crate::common::Handle;
use crate::constants::{HANDLE_RADIUS, HANDLE_SEL_RADIUS};
use crate::editor::hit_detection::{GroupContext, rotate_handle_position};
use crate::editor::transform::{box_corners, is_valid_box};
use crate::scene::{BoundsType, ItemId, ItemInfo, SceneGraph};

use super::{Frame, OverlayColors, OverlayPainter, edge_quad, inward_normal, opaque, stripe_quads};

pub(super) struct OutlinePass<'a> {
    pub frame: &'a Frame,
    pub colors: &'a OverlayColors,
    pub hovered: &'a [ItemId],
    /// Handle pick radius in canvas units, so drawn handles match hit-testing
    pub handle_radius: f32,
    pub unit_box: [Vec2; 4],
    pub unit_circle: &'a [Vec2],
}

impl OutlinePass<'_> {
    pub fn draw(&self, scene: &dyn SceneGraph, painter: &mut dyn OverlayPainter) {
        self.draw_children(scene, None, &GroupContext::default(), painter);
    }

    fn draw_children(
        &self,
        scene: &dyn SceneGraph,
        parent: Option<ItemId>,
        ctx: &GroupContext,
        painter: &mut dyn OverlayPainter,
    ) {
        for id in scene.children(parent) {
            let Some(info) = scene.item(id) else {
                continue;
            };
            if info.locked || !info.has_video {
                continue;
            }
            if info.is_group {
                self.draw_children(scene, Some(id), &ctx.enter(&info), painter);
            }

            let hovered = self.hovered.contains(&id);
            if !info.selected && !hovered {
                continue;
            }
            let m = ctx.box_of(&info);
            if !is_valid_box(&m) {
                continue;
            }

            self.draw_outline(&info, &m, hovered, painter);
            if info.selected {
                self.draw_handles(&m, painter);
            }
        }
    }

    fn draw_outline(&self, info: &ItemInfo, m: &Affine2, hovered: bool, painter: &mut dyn OverlayPainter) {
        let c = box_corners(m).map(|p| self.frame.to_widget(p));
        let center = self.frame.to_widget(m.transform_point2(Vec2::splat(0.5)));
        let thickness = self.frame.line_thickness();
        let crop = info.transform.crop;
        let sides = [
            (c[0], c[3], crop.left),
            (c[0], c[1], crop.top),
            (c[1], c[2], crop.right),
            (c[3], c[2], crop.bottom),
        ];

        let has_crop = crop.left > 0 || crop.top > 0 || crop.right > 0 || crop.bottom > 0;
        let show_crop = info.transform.bounds_type == BoundsType::None && has_crop;
        let hover_only = hovered && !info.selected;

        for (a, b, side_crop) in sides {
            let inward = inward_normal(a, b, center);
            if show_crop && !hover_only && side_crop > 0 {
                let color = opaque(self.colors.crop);
                for stripe in stripe_quads(a, b, inward, thickness) {
                    painter.fill_polygon(&stripe, color);
                }
                continue;
            }
            let color = if hover_only {
                self.colors.hover
            } else {
                self.colors.selection
            };
            painter.fill_polygon(&edge_quad(a, b, inward, thickness), opaque(color));
        }
    }

    fn draw_handles(&self, m: &Affine2, painter: &mut dyn OverlayPainter) {
        let color = opaque(self.colors.selection);
        let half = HANDLE_RADIUS * self.frame.pixel_ratio;

        for handle in Handle::RESIZE {
            let Some(fraction) = handle.fraction() else {
                continue;
            };
            let p = self.frame.to_widget(m.transform_point2(fraction));
            let square = self.unit_box.map(|c| p - Vec2::splat(half) + c * half * 2.0);
            painter.fill_polygon(&square, color);
        }

        let top = self.frame.to_widget(m.transform_point2(Vec2::new(0.5, 0.0)));
        let knob = self.frame.to_widget(rotate_handle_position(m, self.handle_radius));
        let stem_width = self.frame.line_thickness();
        let side = (knob - top).perp().normalize_or_zero() * stem_width * 0.5;
        painter.fill_polygon(&[top - side, knob - side, knob + side, top + side], color);

        let radius = HANDLE_SEL_RADIUS * self.frame.pixel_ratio;
        let circle: Vec<Vec2> = self
            .unit_circle
            .iter()
            .map(|c| knob - Vec2::splat(radius) + *c * radius * 2.0)
            .collect();
        painter.fill_polygon(&circle, color);
    }
}
