//! Placement of the canvas inside the widget it is drawn in.
//!
//! By default the canvas is letterboxed: scaled to fit and centered. A fixed
//! scale can be set instead, in which case the view can be panned.

use bevy::math::Vec2;

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Viewport {
    canvas_size: Vec2,
    widget_size: Vec2,
    fixed_scale: Option<f32>,
    pan: Vec2,
    scale: f32,
    offset: Vec2,
}

impl Viewport {
    pub fn new(canvas_size: Vec2) -> Self {
        let mut viewport = Self {
            canvas_size,
            widget_size: canvas_size,
            fixed_scale: None,
            pan: Vec2::ZERO,
            scale: 1.0,
            offset: Vec2::ZERO,
        };
        viewport.recompute();
        viewport
    }

    /// Canvas units to widget pixels.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Widget position of the canvas origin.
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn canvas_size(&self) -> Vec2 {
        self.canvas_size
    }

    pub fn widget_size(&self) -> Vec2 {
        self.widget_size
    }

    pub fn is_fixed_scale(&self) -> bool {
        self.fixed_scale.is_some()
    }

    pub fn set_canvas_size(&mut self, canvas_size: Vec2) {
        self.canvas_size = canvas_size;
        self.recompute();
    }

    pub fn set_widget_size(&mut self, widget_size: Vec2) {
        self.widget_size = widget_size;
        self.recompute();
    }

    /// Switch between letterboxing (`None`) and a fixed zoom.
    pub fn set_fixed_scale(&mut self, scale: Option<f32>) {
        self.fixed_scale = scale.filter(|s| *s > 0.0);
        if self.fixed_scale.is_none() {
            self.pan = Vec2::ZERO;
        }
        self.recompute();
    }

    /// Shift the view by a widget-space delta. Ignored when letterboxing.
    pub fn pan_by(&mut self, delta: Vec2) {
        if self.fixed_scale.is_some() {
            self.pan += delta;
            self.recompute();
        }
    }

    fn recompute(&mut self) {
        self.scale = match self.fixed_scale {
            Some(scale) => scale,
            None if self.canvas_size.x > 0.0 && self.canvas_size.y > 0.0 => {
                (self.widget_size / self.canvas_size).min_element()
            }
            None => 1.0,
        };
        self.offset = (self.widget_size - self.canvas_size * self.scale) * 0.5 + self.pan;
    }

    /// A collapsed widget (zero scale) maps without scaling.
    pub fn widget_to_canvas(&self, point: Vec2) -> Vec2 {
        if self.scale <= 0.0 {
            return point - self.offset;
        }
        (point - self.offset) / self.scale
    }

    pub fn canvas_to_widget(&self, point: Vec2) -> Vec2 {
        point * self.scale + self.offset
    }
}
