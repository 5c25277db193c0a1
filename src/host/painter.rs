//! Gizmo-backed overlay painter.
//!
//! The canvas draws in window coordinates (origin top-left, y down). The
//! overlay camera sits at the world origin, so a window point maps to
//! `(x - w/2, h/2 - y)`.

use bevy::camera::visibility::RenderLayers;
use bevy::gizmos::config::{GizmoConfigGroup, GizmoConfigStore};
use bevy::math::Affine2;
use bevy::prelude::*;

use crate::constants::LABEL_FONT_SIZE;
use crate::editor::OverlayPainter;
use crate::editor::hit_detection::GroupContext;
use crate::editor::transform::{box_corners, is_valid_box};
use crate::scene::{ItemId, SceneGraph};

/// Gizmo group for the canvas overlay
#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct CanvasGizmoGroup;

/// Render the overlay only to the canvas camera
pub fn configure_canvas_gizmos(mut config_store: ResMut<GizmoConfigStore>) {
    let (config, _) = config_store.config_mut::<CanvasGizmoGroup>();
    config.render_layers = RenderLayers::layer(1);
}

/// Text queued by the painter, drawn by egui later in the frame.
#[derive(Clone, PartialEq, Debug)]
pub struct OverlayLabel {
    pub text: String,
    pub position: Vec2,
    pub color: Color,
}

#[derive(Resource, Default)]
pub struct OverlayLabels {
    pub labels: Vec<OverlayLabel>,
}

/// Outline color for item content; the host has no video to show.
const CONTENT_COLOR: Color = Color::srgb(0.45, 0.45, 0.5);

pub fn window_to_world(point: Vec2, window_size: Vec2) -> Vec2 {
    Vec2::new(point.x - window_size.x / 2.0, window_size.y / 2.0 - point.y)
}

/// Approximate label extent for the egui body font.
pub fn measure_text(text: &str) -> Vec2 {
    Vec2::new(
        text.chars().count() as f32 * LABEL_FONT_SIZE * 0.6,
        LABEL_FONT_SIZE * 1.25,
    )
}

/// Canvas-space quads of every visible content item, back to front.
pub fn content_quads(scene: &dyn SceneGraph) -> Vec<[Vec2; 4]> {
    let mut quads = Vec::new();
    collect_quads(scene, None, &GroupContext::default(), &mut quads);
    quads
}

fn collect_quads(
    scene: &dyn SceneGraph,
    parent: Option<ItemId>,
    ctx: &GroupContext,
    quads: &mut Vec<[Vec2; 4]>,
) {
    for id in scene.children(parent) {
        let Some(info) = scene.item(id) else {
            continue;
        };
        if !info.visible {
            continue;
        }
        if info.is_group {
            collect_quads(scene, Some(id), &ctx.enter(&info), quads);
            continue;
        }
        let m = ctx.box_of(&info);
        if info.has_video && is_valid_box(&m) {
            quads.push(box_corners(&m));
        }
    }
}

pub struct GizmoPainter<'a, 'w, 's> {
    gizmos: &'a mut Gizmos<'w, 's, CanvasGizmoGroup>,
    window_size: Vec2,
    stack: Vec<Affine2>,
    content: &'a [[Vec2; 4]],
    labels: &'a mut Vec<OverlayLabel>,
}

impl<'a, 'w, 's> GizmoPainter<'a, 'w, 's> {
    pub fn new(
        gizmos: &'a mut Gizmos<'w, 's, CanvasGizmoGroup>,
        window_size: Vec2,
        content: &'a [[Vec2; 4]],
        labels: &'a mut Vec<OverlayLabel>,
    ) -> Self {
        Self {
            gizmos,
            window_size,
            stack: Vec::new(),
            content,
            labels,
        }
    }

    fn current(&self) -> Affine2 {
        self.stack.last().copied().unwrap_or(Affine2::IDENTITY)
    }

    fn to_world(&self, point: Vec2) -> Vec2 {
        window_to_world(self.current().transform_point2(point), self.window_size)
    }

    fn outline(&mut self, points: &[Vec2], color: Color) {
        let Some(first) = points.first() else {
            return;
        };
        let closed: Vec<Vec2> = points
            .iter()
            .chain(std::iter::once(first))
            .map(|p| self.to_world(*p))
            .collect();
        self.gizmos.linestrip_2d(closed, color);
    }
}

impl OverlayPainter for GizmoPainter<'_, '_, '_> {
    fn viewport_size(&self) -> Vec2 {
        self.window_size
    }

    fn push_transform(&mut self, transform: Affine2) {
        let combined = self.current() * transform;
        self.stack.push(combined);
    }

    fn pop_transform(&mut self) {
        self.stack.pop();
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Color) {
        self.outline(points, color);
    }

    fn draw_tiled_texture(&mut self, corners: [Vec2; 4], tiles: Vec2, tint: Color) {
        self.outline(&corners, tint);
        // One line per tile boundary on each axis
        let [tl, tr, br, bl] = corners;
        for i in 1..tiles.x.ceil() as usize {
            let t = i as f32 / tiles.x;
            let (a, b) = (tl.lerp(tr, t), bl.lerp(br, t));
            let (a, b) = (self.to_world(a), self.to_world(b));
            self.gizmos.line_2d(a, b, tint);
        }
        for i in 1..tiles.y.ceil() as usize {
            let t = i as f32 / tiles.y;
            let (a, b) = (tl.lerp(bl, t), tr.lerp(br, t));
            let (a, b) = (self.to_world(a), self.to_world(b));
            self.gizmos.line_2d(a, b, tint);
        }
    }

    fn draw_content(&mut self, canvas_size: Vec2) {
        let content = self.content;
        for quad in content {
            self.outline(quad, CONTENT_COLOR);
        }
        self.outline(
            &[
                Vec2::ZERO,
                Vec2::new(canvas_size.x, 0.0),
                canvas_size,
                Vec2::new(0.0, canvas_size.y),
            ],
            Color::WHITE,
        );
    }

    fn draw_label(&mut self, text: &str, position: Vec2, color: Color) {
        let position = self.current().transform_point2(position);
        self.labels.push(OverlayLabel {
            text: text.to_string(),
            position,
            color,
        });
    }

    fn measure_label(&self, text: &str) -> Vec2 {
        measure_text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{ItemTransform, MemoryScene};

    #[test]
    fn test_window_to_world_centers_origin() {
        let size = Vec2::new(800.0, 600.0);
        assert_eq!(window_to_world(Vec2::ZERO, size), Vec2::new(-400.0, 300.0));
        assert_eq!(window_to_world(Vec2::new(400.0, 300.0), size), Vec2::ZERO);
        assert_eq!(window_to_world(size, size), Vec2::new(400.0, -300.0));
    }

    #[test]
    fn test_measure_text_grows_with_length() {
        assert!(measure_text("1720 px").x > measure_text("12 px").x);
        assert_eq!(measure_text("").x, 0.0);
    }

    #[test]
    fn test_content_quads_skip_hidden_and_groups() {
        let mut scene = MemoryScene::new();
        scene.add_item(None, Vec2::splat(10.0), ItemTransform::default());
        let hidden = scene.add_item(None, Vec2::splat(10.0), ItemTransform::default());
        scene.set_visible(hidden, false);
        let group = scene.add_group(
            None,
            Vec2::splat(100.0),
            ItemTransform::at(Vec2::new(50.0, 0.0)),
        );
        scene.add_item(Some(group), Vec2::splat(10.0), ItemTransform::default());

        let quads = content_quads(&scene);
        assert_eq!(quads.len(), 2);
        // The grouped child lands inside its group's space
        assert_eq!(quads[1][0], Vec2::new(50.0, 0.0));
    }
}
