//! The interaction state machine.
//!
//! [`SceneCanvas`] receives pointer events in widget coordinates, converts
//! them to canvas space through its [`Viewport`], and turns press/move/release
//! sequences into selection changes and transform edits on the scene.

use bevy::log::{debug, info};
use bevy::math::Vec2;

use crate::common::{CursorShape, Handle};
use crate::constants::HANDLE_SEL_RADIUS;
use crate::scene::{ItemId, SceneGraph, selected_items};

use super::hit_detection::{handle_at, selected_at, topmost_item_at};
use super::selection::{
    DragSession, HandleDrag, HoverTracker, InteractionMode, MarqueeBox, SelectionTracking,
    begin_handle_drag, click_select, crop_item, drag_cursor, hover_cursor, move_selection,
    resolve_marquee, rotate_item, stretch_item, update_marquee,
};
use super::snap::snap_movement;
use super::{CanvasSettings, Modifiers, PointerButton, PointerButtons, Viewport};

/// Something the canvas wants its host to do.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum CanvasRequest {
    /// Show the context menu at a widget position, for the first selected item
    ContextMenu {
        position: Vec2,
        item: Option<ItemId>,
    },
}

pub struct SceneCanvas {
    viewport: Viewport,
    settings: CanvasSettings,
    mode: InteractionMode,
    mouse_down: bool,
    mouse_moved: bool,
    /// Whether the press landed on the current selection
    over_selection: bool,
    start_pos: Vec2,
    mouse_pos: Vec2,
    drag: Option<DragSession>,
    marquee: Option<MarqueeBox>,
    selection: SelectionTracking,
    cropping: bool,
    locked: bool,
    pan_mode: bool,
    pan_origin: Vec2,
    cursor: CursorShape,
    requests: Vec<CanvasRequest>,
}

impl SceneCanvas {
    pub fn new(canvas_size: Vec2, settings: CanvasSettings) -> Self {
        Self {
            viewport: Viewport::new(canvas_size),
            settings,
            mode: InteractionMode::Idle,
            mouse_down: false,
            mouse_moved: false,
            over_selection: false,
            start_pos: Vec2::ZERO,
            mouse_pos: Vec2::ZERO,
            drag: None,
            marquee: None,
            selection: SelectionTracking::default(),
            cropping: false,
            locked: false,
            pan_mode: false,
            pan_origin: Vec2::ZERO,
            cursor: CursorShape::Default,
            requests: Vec::new(),
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn settings(&self) -> &CanvasSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: CanvasSettings) {
        self.settings = settings;
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn drag(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    pub fn marquee(&self) -> Option<&MarqueeBox> {
        self.marquee.as_ref()
    }

    pub fn hovered(&self) -> &HoverTracker {
        &self.selection.hovered
    }

    pub fn cursor(&self) -> CursorShape {
        self.cursor
    }

    /// Last pointer position in canvas space.
    pub fn pointer(&self) -> Vec2 {
        self.mouse_pos
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn set_locked(&mut self, locked: bool) {
        if self.locked != locked {
            info!("Canvas {}", if locked { "locked" } else { "unlocked" });
        }
        self.locked = locked;
    }

    pub fn is_pan_mode(&self) -> bool {
        self.pan_mode
    }

    pub fn set_pan_mode(&mut self, pan_mode: bool) {
        self.pan_mode = pan_mode;
        self.cursor = if pan_mode {
            CursorShape::OpenHand
        } else {
            CursorShape::Default
        };
    }

    /// Pick radius for handles, in canvas units.
    pub fn handle_radius(&self) -> f32 {
        let scale = self.viewport.scale();
        if scale <= 0.0 {
            return HANDLE_SEL_RADIUS;
        }
        HANDLE_SEL_RADIUS / scale
    }

    /// Drain the requests raised since the last call.
    pub fn take_requests(&mut self) -> Vec<CanvasRequest> {
        std::mem::take(&mut self.requests)
    }

    pub fn on_press(
        &mut self,
        scene: &mut dyn SceneGraph,
        button: PointerButton,
        position: Vec2,
        modifiers: Modifiers,
    ) -> bool {
        if self.pan_mode && self.viewport.is_fixed_scale() && button == PointerButton::Left {
            self.mode = InteractionMode::Panning;
            self.pan_origin = position;
            self.cursor = CursorShape::ClosedHand;
            return true;
        }

        if button == PointerButton::Right {
            self.set_pan_mode(false);
        }

        if self.locked {
            return false;
        }

        match button {
            PointerButton::Left => {}
            PointerButton::Right => return true,
            PointerButton::Middle => return false,
        }

        if self.mouse_down {
            return true;
        }

        self.mouse_down = true;
        self.mouse_moved = false;
        self.mode = InteractionMode::Pressed;
        self.cropping = modifiers.alt;
        self.selection.retained.clear();
        if modifiers.any() {
            self.selection.retained = selected_items(scene, None);
        }

        let pos = self.viewport.widget_to_canvas(position).round();
        self.start_pos = pos;
        self.mouse_pos = pos;
        self.over_selection = selected_at(scene, pos);

        self.drag = handle_at(scene, pos, self.handle_radius())
            .and_then(|hit| begin_handle_drag(scene, &hit, self.cropping))
            .map(DragSession::Handle);

        true
    }

    pub fn on_move(
        &mut self,
        scene: &mut dyn SceneGraph,
        position: Vec2,
        buttons: PointerButtons,
        modifiers: Modifiers,
    ) -> bool {
        if self.mode == InteractionMode::Panning && buttons.left {
            self.viewport.pan_by(position - self.pan_origin);
            self.pan_origin = position;
            return true;
        }

        if self.locked {
            return true;
        }

        let pos = self.viewport.widget_to_canvas(position);

        if !self.mouse_down {
            let hovered = topmost_item_at(scene, pos, true);
            self.selection.hovered.set(hovered.into_iter().collect());
            self.mouse_pos = pos;
            self.cursor = if self.pan_mode {
                CursorShape::OpenHand
            } else {
                hover_cursor(scene, pos, self.handle_radius())
            };
            return true;
        }

        if !self.mouse_moved && !self.over_selection && self.drag.is_none() {
            click_select(
                scene,
                self.start_pos,
                modifiers,
                self.settings.click_through_selected,
            );
            self.over_selection = selected_at(scene, self.start_pos);
        }

        let pos = pos.round();
        match self.drag {
            Some(DragSession::Handle(drag)) => self.drag_handle(scene, &drag, pos, modifiers),
            _ if self.over_selection => self.drag_selection(scene, pos, modifiers),
            _ => self.drag_marquee(scene, pos),
        }

        if self.mouse_down {
            self.mouse_moved = true;
        }
        self.mouse_pos = pos;
        true
    }

    fn drag_handle(
        &mut self,
        scene: &mut dyn SceneGraph,
        drag: &HandleDrag,
        pos: Vec2,
        modifiers: Modifiers,
    ) {
        if !scene.item(drag.item).is_some_and(|info| !info.locked) {
            debug!("Drag target {:?} is gone or locked, ending drag", drag.item);
            self.end_gesture(scene);
            return;
        }

        self.marquee = None;
        let local = drag.canvas_to_group.transform_point2(pos);
        self.mode = if drag.handle == Handle::Rotate {
            rotate_item(scene, drag, local, modifiers);
            InteractionMode::Rotating
        } else if drag.cropping {
            crop_item(scene, drag, local);
            InteractionMode::Cropping
        } else {
            stretch_item(
                scene,
                drag,
                local,
                modifiers,
                self.viewport.canvas_size(),
                &self.settings.snap,
            );
            InteractionMode::Resizing
        };
        self.cursor = drag_cursor(self.mode, drag.handle);
    }

    fn drag_selection(&mut self, scene: &mut dyn SceneGraph, pos: Vec2, modifiers: Modifiers) {
        self.marquee = None;
        self.mode = InteractionMode::Moving;
        self.cursor = drag_cursor(self.mode, Handle::None);

        let applied = match self.drag {
            Some(DragSession::Move { applied }) => applied,
            _ => Vec2::ZERO,
        };
        let mut step = pos - self.start_pos - applied;
        if !modifiers.ctrl {
            step = snap_movement(scene, step, self.viewport.canvas_size(), &self.settings.snap);
        }
        move_selection(scene, step);
        self.drag = Some(DragSession::Move {
            applied: applied + step,
        });
    }

    fn drag_marquee(&mut self, scene: &mut dyn SceneGraph, pos: Vec2) {
        if self.marquee.is_none() && !self.mouse_moved {
            click_select(
                scene,
                self.start_pos,
                Modifiers::default(),
                self.settings.click_through_selected,
            );
        }
        let start = self.start_pos;
        let marquee = self.marquee.get_or_insert(MarqueeBox {
            start,
            current: start,
        });
        update_marquee(scene, marquee, pos, &self.selection);

        self.mode = InteractionMode::Selecting;
        self.cursor = drag_cursor(self.mode, Handle::None);
    }

    pub fn on_release(
        &mut self,
        scene: &mut dyn SceneGraph,
        button: PointerButton,
        position: Vec2,
        modifiers: Modifiers,
    ) -> bool {
        if self.mode == InteractionMode::Panning {
            self.mode = InteractionMode::Idle;
            self.cursor = CursorShape::OpenHand;
            return true;
        }

        if !self.mouse_down && button == PointerButton::Right {
            let item = selected_items(scene, None).first().copied();
            debug!("Context menu requested for {:?}", item);
            self.requests.push(CanvasRequest::ContextMenu { position, item });
            return true;
        }

        if self.locked || !self.mouse_down || button != PointerButton::Left {
            return false;
        }

        let pos = self.viewport.widget_to_canvas(position);
        if !self.mouse_moved {
            click_select(scene, pos, modifiers, self.settings.click_through_selected);
        }
        if self.marquee.is_some() {
            resolve_marquee(scene, &self.selection, modifiers);
        }

        self.end_gesture(scene);

        let hovered = topmost_item_at(scene, pos, true);
        self.selection.hovered.set(hovered.into_iter().collect());
        self.selection.retained.clear();
        self.mouse_pos = pos;
        true
    }

    /// The pointer left the widget.
    pub fn on_leave(&mut self) -> bool {
        if self.marquee.is_none() {
            self.selection.hovered.clear();
        }
        true
    }

    /// Close the current gesture, ending any group resize it opened.
    fn end_gesture(&mut self, scene: &mut dyn SceneGraph) {
        if let Some(DragSession::Handle(drag)) = self.drag.take()
            && let Some(group) = drag.group
        {
            scene.defer_group_resize_end(group);
        }
        self.marquee = None;
        self.mouse_down = false;
        self.mouse_moved = false;
        self.over_selection = false;
        self.cropping = false;
        self.mode = InteractionMode::Idle;
        self.cursor = CursorShape::Default;
    }
}
