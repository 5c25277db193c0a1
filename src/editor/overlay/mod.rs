//! Per-frame overlay drawing.
//!
//! The renderer only reads the canvas and the scene. Everything it emits is
//! in widget pixels, through an [`OverlayPainter`] supplied by the host. Draw
//! order is overflow, backdrop, content, item outlines and handles, the
//! marquee, then the spacing helpers.

mod outline;
mod overflow;
mod spacing;


use bevy::color::{Alpha, Color};
use bevy::math::{Affine2, Vec2};

use crate::constants::{CIRCLE_SEGMENTS, CROP_STRIPE_PERIOD, HANDLE_RADIUS};
use crate::scene::SceneGraph;
use crate::theme::{
    BACKDROP_COLOR, CROP_COLOR, HOVER_COLOR, MARQUEE_BORDER, MARQUEE_FILL, SELECTION_COLOR,
};

use super::SceneCanvas;
use super::transform::UNIT_CORNERS;

use spacing::SpacerLabels;

pub use spacing::Side;

/// Drawing surface for the overlay, implemented by the host.
pub trait OverlayPainter {
    fn device_pixel_ratio(&self) -> f32 {
        1.0
    }

    fn viewport_size(&self) -> Vec2;

    /// Apply `transform` to everything drawn until the matching pop.
    fn push_transform(&mut self, transform: Affine2);
    fn pop_transform(&mut self);

    fn fill_polygon(&mut self, points: &[Vec2], color: Color);

    /// Repeat the overflow texture across a quad, `tiles` times per axis.
    fn draw_tiled_texture(&mut self, corners: [Vec2; 4], tiles: Vec2, tint: Color);

    /// Render the live canvas content into the canvas rectangle.
    fn draw_content(&mut self, canvas_size: Vec2);

    /// Draw text with its top-left corner at `position`.
    fn draw_label(&mut self, text: &str, position: Vec2, color: Color);
    fn measure_label(&self, text: &str) -> Vec2;
}

/// Outline colors, either the defaults or the accessibility override.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct OverlayColors {
    pub selection: Color,
    pub crop: Color,
    pub hover: Color,
}

impl Default for OverlayColors {
    fn default() -> Self {
        Self {
            selection: SELECTION_COLOR,
            crop: CROP_COLOR,
            hover: HOVER_COLOR,
        }
    }
}

impl OverlayColors {
    /// Colors from three packed ABGR values.
    pub fn from_packed(selection: i64, crop: i64, hover: i64) -> Self {
        Self {
            selection: color_from_int(selection),
            crop: color_from_int(crop),
            hover: color_from_int(hover),
        }
    }
}

/// Decode a packed color: red in the low byte, then green, blue and alpha.
pub fn color_from_int(value: i64) -> Color {
    let byte = |shift: u32| ((value >> shift) & 0xff) as u8;
    Color::srgba_u8(byte(0), byte(8), byte(16), byte(24))
}

/// Widget-space geometry shared by the drawing passes.
pub(crate) struct Frame {
    /// Canvas to widget pixels
    pub view: Affine2,
    pub scale: f32,
    pub canvas_size: Vec2,
    pub pixel_ratio: f32,
}

impl Frame {
    pub fn line_thickness(&self) -> f32 {
        HANDLE_RADIUS * self.pixel_ratio / 2.0
    }

    pub fn to_widget(&self, point: Vec2) -> Vec2 {
        self.view.transform_point2(point)
    }
}

/// Draws the canvas overlay and owns its cached geometry.
#[derive(Default)]
pub struct OverlayRenderer {
    unit_box: Option<[Vec2; 4]>,
    unit_circle: Option<Vec<Vec2>>,
    labels: SpacerLabels,
}

impl OverlayRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unit square, built on first use.
    fn unit_box(&mut self) -> [Vec2; 4] {
        *self.unit_box.get_or_insert(UNIT_CORNERS)
    }

    /// Unit-diameter circle centered at (0.5, 0.5), built on first use.
    fn unit_circle(&mut self) -> &[Vec2] {
        self.unit_circle.get_or_insert_with(|| {
            (0..CIRCLE_SEGMENTS)
                .map(|i| {
                    let angle = std::f32::consts::TAU * i as f32 / CIRCLE_SEGMENTS as f32;
                    Vec2::splat(0.5) + Vec2::from_angle(angle) * 0.5
                })
                .collect()
        })
    }

    /// Whether the lazily built geometry exists yet.
    pub fn has_geometry(&self) -> bool {
        self.unit_box.is_some() && self.unit_circle.is_some()
    }

    /// Text currently cached for a spacing label.
    pub fn spacer_text(&self, side: Side) -> Option<&str> {
        self.labels.text(side)
    }

    pub fn on_render(
        &mut self,
        canvas: &SceneCanvas,
        scene: &dyn SceneGraph,
        painter: &mut dyn OverlayPainter,
        width: f32,
        height: f32,
    ) {
        let mut viewport = *canvas.viewport();
        viewport.set_widget_size(Vec2::new(width, height));
        let scale = viewport.scale();
        let frame = Frame {
            view: Affine2::from_translation(viewport.offset()) * Affine2::from_scale(Vec2::splat(scale)),
            scale,
            canvas_size: viewport.canvas_size(),
            pixel_ratio: painter.device_pixel_ratio(),
        };
        let settings = canvas.settings();
        let unit_box = self.unit_box();

        if !settings.overflow_hidden && !canvas.is_locked() {
            overflow::draw_overflow(scene, settings, &frame, painter);
        }

        let backdrop = unit_box.map(|c| frame.to_widget(c * frame.canvas_size));
        painter.fill_polygon(&backdrop, BACKDROP_COLOR);

        painter.push_transform(frame.view);
        painter.draw_content(frame.canvas_size);
        painter.pop_transform();

        if !canvas.is_locked() {
            let hovered = canvas.hovered().snapshot();
            let circle = self.unit_circle().to_vec();
            let pass = outline::OutlinePass {
                frame: &frame,
                colors: &settings.colors,
                hovered: &hovered,
                handle_radius: canvas.handle_radius(),
                unit_box,
                unit_circle: &circle,
            };
            pass.draw(scene, painter);
        }

        if let Some(marquee) = canvas.marquee() {
            let min = frame.to_widget(marquee.min()).round();
            let max = frame.to_widget(marquee.max()).round();
            let rect = unit_box.map(|c| min + c * (max - min));
            painter.fill_polygon(&rect, MARQUEE_FILL);
            draw_rect_border(painter, min, max, frame.line_thickness(), MARQUEE_BORDER);
        }

        if settings.spacing_helpers && !canvas.is_locked() {
            spacing::draw_spacing_helpers(scene, &frame, &settings.colors, &mut self.labels, painter);
        }
    }
}

/// Thick segment from `a` to `b`, extending toward `inward`.
pub(crate) fn edge_quad(a: Vec2, b: Vec2, inward: Vec2, thickness: f32) -> [Vec2; 4] {
    let offset = inward.normalize_or_zero() * thickness;
    [a, b, b + offset, a + offset]
}

/// Normal of `a`..`b` pointing to the same side as `toward`.
pub(crate) fn inward_normal(a: Vec2, b: Vec2, toward: Vec2) -> Vec2 {
    let normal = (b - a).perp();
    if normal.dot(toward - a) < 0.0 { -normal } else { normal }
}

/// Dashed segment: half of every stripe period is drawn.
pub(crate) fn stripe_quads(a: Vec2, b: Vec2, inward: Vec2, thickness: f32) -> Vec<[Vec2; 4]> {
    let length = a.distance(b);
    if length <= 0.0 {
        return Vec::new();
    }
    let dir = (b - a) / length;
    let count = (length / CROP_STRIPE_PERIOD).ceil() as usize;
    (0..count)
        .map(|i| {
            let start = i as f32 * CROP_STRIPE_PERIOD;
            let end = (start + CROP_STRIPE_PERIOD / 2.0).min(length);
            edge_quad(a + dir * start, a + dir * end, inward, thickness)
        })
        .collect()
}

/// Border drawn inside an axis-aligned rectangle.
pub(crate) fn draw_rect_border(
    painter: &mut dyn OverlayPainter,
    min: Vec2,
    max: Vec2,
    thickness: f32,
    color: Color,
) {
    let (lo, hi) = (min.min(max), min.max(max));
    let center = (lo + hi) * 0.5;
    let corners = [lo, Vec2::new(hi.x, lo.y), hi, Vec2::new(lo.x, hi.y)];
    for i in 0..4 {
        let (a, b) = (corners[i], corners[(i + 1) % 4]);
        let quad = edge_quad(a, b, inward_normal(a, b, center), thickness);
        painter.fill_polygon(&quad, color);
    }
}

/// Opaque version of a configured color.
pub(crate) fn opaque(color: Color) -> Color {
    color.with_alpha(1.0)
}
