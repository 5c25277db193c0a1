//! The canvas engine: geometry, hit-testing, snapping, the interaction state
//! machine and the overlay renderer.
//!
//! Nothing in here touches the ECS. The host layer feeds pointer events into
//! a [`SceneCanvas`] and drives an [`OverlayRenderer`] once per frame.

pub mod actions;
mod canvas;
pub mod hit_detection;
pub mod overlay;
pub mod selection;
pub mod snap;
pub mod transform;
mod viewport;

pub use canvas::{CanvasRequest, SceneCanvas};
pub use overlay::{OverlayColors, OverlayPainter, OverlayRenderer};
pub use snap::SnapSettings;
pub use viewport::Viewport;

/// Keyboard modifiers held during a pointer event.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

/// Buttons held during a pointer move.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub struct PointerButtons {
    pub left: bool,
    pub right: bool,
    pub middle: bool,
}

/// Read-only behavior switches for one canvas.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct CanvasSettings {
    pub snap: SnapSettings,
    /// Clicking a selected item picks the one beneath it
    pub click_through_selected: bool,
    pub overflow_hidden: bool,
    pub overflow_always_visible: bool,
    pub overflow_selection_hidden: bool,
    pub spacing_helpers: bool,
    pub colors: OverlayColors,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            snap: SnapSettings::default(),
            click_through_selected: true,
            overflow_hidden: false,
            overflow_always_visible: false,
            overflow_selection_hidden: false,
            spacing_helpers: true,
            colors: OverlayColors::default(),
        }
    }
}
