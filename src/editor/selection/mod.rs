//! Selection state for the canvas.
//!
//! This module holds everything the pointer handlers keep between events:
//! - The active drag session (move, resize, rotate or crop)
//! - The marquee rectangle
//! - Hovered items, shared with the renderer behind a mutex
//! - The selection retained across a modifier-held marquee

mod box_select;
mod cursor;
mod drag;
mod handle;


use std::sync::Arc;

use bevy::math::{Affine2, Vec2};
use parking_lot::Mutex;

use crate::common::Handle;
use crate::scene::{Crop, ItemId, SceneGraph, clear_selection, select_only};

use super::Modifiers;
use super::hit_detection::{GroupContext, topmost_item_at};

pub use box_select::{resolve_marquee, update_marquee};
pub use cursor::{drag_cursor, hover_cursor};
pub use drag::{crop_item, move_selection, rotate_item, stretch_item};
pub use handle::begin_handle_drag;

/// What the pointer is currently doing on the canvas.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum InteractionMode {
    #[default]
    Idle,
    Panning,
    /// Button down, not yet moved
    Pressed,
    Selecting,
    Moving,
    Resizing,
    Rotating,
    Cropping,
}

impl InteractionMode {
    pub fn is_dragging(&self) -> bool {
        !matches!(
            self,
            InteractionMode::Idle | InteractionMode::Panning | InteractionMode::Pressed
        )
    }
}

/// State captured when a handle drag begins on one item.
#[derive(Clone, Copy, Debug)]
pub struct HandleDrag {
    pub item: ItemId,
    /// Group directly containing the item; its resize is deferred until release
    pub group: Option<ItemId>,
    pub handle: Handle,
    pub cropping: bool,
    /// Canvas transform of the enclosing groups
    pub context: GroupContext,
    pub canvas_to_group: Affine2,
    /// Unrotated item space: origin at the box's top-left, axes along its edges
    pub item_to_group: Affine2,
    pub group_to_item: Affine2,
    pub start_rotation: f32,
    pub start_crop: Crop,
    /// Content scale at drag start; crop math stays in these units
    pub start_scale: Vec2,
    /// Signed on-canvas size at drag start
    pub start_size: Vec2,
    /// Box center the rotate handle turns around
    pub pivot: Vec2,
    /// Position relative to the pivot, with the start rotation removed
    pub pivot_offset: Vec2,
}

/// Transient state of one press-drag-release gesture.
#[derive(Clone, Copy, Debug)]
pub enum DragSession {
    Move {
        /// Offset already applied to the selection
        applied: Vec2,
    },
    Handle(HandleDrag),
}

/// Marquee rectangle in canvas coordinates.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct MarqueeBox {
    pub start: Vec2,
    pub current: Vec2,
}

impl MarqueeBox {
    pub fn min(&self) -> Vec2 {
        self.start.min(self.current)
    }

    pub fn max(&self) -> Vec2 {
        self.start.max(self.current)
    }
}

/// Items highlighted under the pointer.
///
/// Written by input handling and read by the renderer, possibly from another
/// thread; the lock is only held to copy or replace the list.
#[derive(Clone, Default)]
pub struct HoverTracker {
    items: Arc<Mutex<Vec<ItemId>>>,
}

impl HoverTracker {
    pub fn snapshot(&self) -> Vec<ItemId> {
        self.items.lock().clone()
    }

    pub fn set(&self, items: Vec<ItemId>) {
        *self.items.lock() = items;
    }

    pub fn clear(&self) {
        self.items.lock().clear();
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.lock().contains(&id)
    }
}

/// Selection bookkeeping owned by the canvas.
#[derive(Default)]
pub struct SelectionTracking {
    pub hovered: HoverTracker,
    /// Items selected when a modified press began
    pub retained: Vec<ItemId>,
}

/// Apply a click at `point`: ctrl toggles the item under it, otherwise the
/// item is selected alone, or everything is deselected on empty space.
pub fn click_select(
    scene: &mut dyn SceneGraph,
    point: Vec2,
    modifiers: Modifiers,
    click_through: bool,
) {
    if modifiers.ctrl {
        if let Some(id) = topmost_item_at(scene, point, false) {
            let selected = scene.is_selected(id);
            scene.set_selected(id, !selected);
        }
        return;
    }
    match topmost_item_at(scene, point, click_through) {
        Some(id) => select_only(scene, id),
        None => clear_selection(scene),
    }
}
