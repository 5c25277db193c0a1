//! Common types shared across the canvas modules.
//!
//! Handles and alignments both resolve to a point on an item's unit square,
//! so they share the side-flag vocabulary used by crop and resize math.

use bevy::math::Vec2;
use bevy::window::{CursorIcon, SystemCursorIcon};
use serde::{Deserialize, Serialize};

/// Control point of a selected item that the pointer can grab.
#[derive(Default, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Handle {
    #[default]
    None,
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
    Rotate,
}

impl Handle {
    /// The eight resize handles in hit-test order.
    pub const RESIZE: [Handle; 8] = [
        Handle::TopLeft,
        Handle::TopCenter,
        Handle::TopRight,
        Handle::CenterLeft,
        Handle::CenterRight,
        Handle::BottomLeft,
        Handle::BottomCenter,
        Handle::BottomRight,
    ];

    /// Position of a resize handle on the unit square, y pointing down.
    pub fn fraction(&self) -> Option<Vec2> {
        let f = match self {
            Handle::None | Handle::Rotate => return None,
            Handle::TopLeft => Vec2::new(0.0, 0.0),
            Handle::TopCenter => Vec2::new(0.5, 0.0),
            Handle::TopRight => Vec2::new(1.0, 0.0),
            Handle::CenterLeft => Vec2::new(0.0, 0.5),
            Handle::CenterRight => Vec2::new(1.0, 0.5),
            Handle::BottomLeft => Vec2::new(0.0, 1.0),
            Handle::BottomCenter => Vec2::new(0.5, 1.0),
            Handle::BottomRight => Vec2::new(1.0, 1.0),
        };
        Some(f)
    }

    pub fn left(&self) -> bool {
        matches!(self, Handle::TopLeft | Handle::CenterLeft | Handle::BottomLeft)
    }

    pub fn right(&self) -> bool {
        matches!(self, Handle::TopRight | Handle::CenterRight | Handle::BottomRight)
    }

    pub fn top(&self) -> bool {
        matches!(self, Handle::TopLeft | Handle::TopCenter | Handle::TopRight)
    }

    pub fn bottom(&self) -> bool {
        matches!(self, Handle::BottomLeft | Handle::BottomCenter | Handle::BottomRight)
    }

    pub fn is_corner(&self) -> bool {
        (self.left() || self.right()) && (self.top() || self.bottom())
    }

    pub fn is_resize(&self) -> bool {
        self.fraction().is_some()
    }

    /// Cursor shown while hovering or dragging this handle.
    pub fn cursor_shape(&self) -> CursorShape {
        if (self.left() && self.top()) || (self.right() && self.bottom()) {
            CursorShape::ResizeDiagonalForward
        } else if (self.left() && self.bottom()) || (self.right() && self.top()) {
            CursorShape::ResizeDiagonalBackward
        } else if self.left() || self.right() {
            CursorShape::ResizeHorizontal
        } else if self.top() || self.bottom() {
            CursorShape::ResizeVertical
        } else if *self == Handle::Rotate {
            CursorShape::OpenHand
        } else {
            CursorShape::Default
        }
    }
}

/// Nine-way anchor that an item's position refers to.
#[derive(Default, Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Alignment {
    #[default]
    TopLeft,
    Top,
    TopRight,
    Left,
    Center,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl Alignment {
    /// Anchor position on the unit square, y pointing down.
    pub fn fraction(&self) -> Vec2 {
        let x = if self.left() {
            0.0
        } else if self.right() {
            1.0
        } else {
            0.5
        };
        let y = if self.top() {
            0.0
        } else if self.bottom() {
            1.0
        } else {
            0.5
        };
        Vec2::new(x, y)
    }

    pub fn left(&self) -> bool {
        matches!(self, Alignment::TopLeft | Alignment::Left | Alignment::BottomLeft)
    }

    pub fn right(&self) -> bool {
        matches!(self, Alignment::TopRight | Alignment::Right | Alignment::BottomRight)
    }

    pub fn top(&self) -> bool {
        matches!(self, Alignment::TopLeft | Alignment::Top | Alignment::TopRight)
    }

    pub fn bottom(&self) -> bool {
        matches!(self, Alignment::BottomLeft | Alignment::Bottom | Alignment::BottomRight)
    }
}

/// Pointer shape requested by the canvas, mapped to a window cursor by the host.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum CursorShape {
    #[default]
    Default,
    /// Top-left to bottom-right diagonal
    ResizeDiagonalForward,
    /// Bottom-left to top-right diagonal
    ResizeDiagonalBackward,
    ResizeHorizontal,
    ResizeVertical,
    OpenHand,
    ClosedHand,
    SizeAll,
    Crosshair,
}

impl CursorShape {
    /// Get the window cursor icon for this shape.
    pub fn cursor_icon(&self) -> CursorIcon {
        let icon = match self {
            CursorShape::Default => SystemCursorIcon::Default,
            CursorShape::ResizeDiagonalForward => SystemCursorIcon::NwseResize,
            CursorShape::ResizeDiagonalBackward => SystemCursorIcon::NeswResize,
            CursorShape::ResizeHorizontal => SystemCursorIcon::EwResize,
            CursorShape::ResizeVertical => SystemCursorIcon::NsResize,
            CursorShape::OpenHand => SystemCursorIcon::Grab,
            CursorShape::ClosedHand => SystemCursorIcon::Grabbing,
            CursorShape::SizeAll => SystemCursorIcon::Move,
            CursorShape::Crosshair => SystemCursorIcon::Crosshair,
        };
        CursorIcon::System(icon)
    }
}
