//! Window input forwarded to the active canvas.

use bevy::prelude::*;
use bevy::window::{CursorIcon, PrimaryWindow, SystemCursorIcon};
use bevy_egui::EguiContexts;

use crate::editor::actions::{CanvasAction, apply_action};
use crate::editor::{CanvasRequest, Modifiers, PointerButton, PointerButtons};
use crate::scene::selected_items;

use super::{ActiveCanvas, CanvasActionRequest, CanvasRegistry, ContextMenuState, HostScene};

const BUTTONS: [(MouseButton, PointerButton); 3] = [
    (MouseButton::Left, PointerButton::Left),
    (MouseButton::Right, PointerButton::Right),
    (MouseButton::Middle, PointerButton::Middle),
];

pub fn modifiers_from_keys(keys: &ButtonInput<KeyCode>) -> Modifiers {
    Modifiers {
        shift: keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]),
        ctrl: keys.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]),
        alt: keys.any_pressed([KeyCode::AltLeft, KeyCode::AltRight]),
    }
}

pub fn buttons_from_mouse(mouse: &ButtonInput<MouseButton>) -> PointerButtons {
    PointerButtons {
        left: mouse.pressed(MouseButton::Left),
        right: mouse.pressed(MouseButton::Right),
        middle: mouse.pressed(MouseButton::Middle),
    }
}

/// Feed cursor movement and mouse buttons into the active canvas.
///
/// Presses over egui are not forwarded; releases always are, so a gesture
/// that ends over a panel still closes.
#[allow(clippy::too_many_arguments)]
pub fn forward_pointer_input(
    window_query: Query<&Window, With<PrimaryWindow>>,
    mouse: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    mut contexts: EguiContexts,
    active: Res<ActiveCanvas>,
    mut registry: ResMut<CanvasRegistry>,
    mut scene: ResMut<HostScene>,
    mut last_cursor: Local<Option<Vec2>>,
) {
    let Ok(window) = window_query.single() else {
        return;
    };
    let Some(entry) = active.0.and_then(|id| registry.get_mut(id)) else {
        return;
    };
    let canvas = &mut entry.canvas;
    let scene = &mut scene.0;
    canvas
        .viewport_mut()
        .set_widget_size(Vec2::new(window.width(), window.height()));

    let Some(cursor) = window.cursor_position() else {
        if last_cursor.take().is_some() {
            canvas.on_leave();
        }
        return;
    };

    let over_ui = contexts
        .ctx_mut()
        .is_ok_and(|ctx| ctx.is_pointer_over_area());
    let modifiers = modifiers_from_keys(&keys);

    if *last_cursor != Some(cursor) {
        canvas.on_move(scene, cursor, buttons_from_mouse(&mouse), modifiers);
        *last_cursor = Some(cursor);
    }

    for (mouse_button, button) in BUTTONS {
        if mouse.just_pressed(mouse_button) && !over_ui {
            canvas.on_press(scene, button, cursor, modifiers);
        }
        if mouse.just_released(mouse_button) {
            canvas.on_release(scene, button, cursor, modifiers);
        }
    }
}

/// Keyboard shortcuts for canvas actions.
pub fn handle_canvas_shortcuts(
    keys: Res<ButtonInput<KeyCode>>,
    scene: Res<HostScene>,
    mut contexts: EguiContexts,
    mut actions: MessageWriter<CanvasActionRequest>,
) {
    // Don't act on shortcuts while typing in a text field
    if let Ok(ctx) = contexts.ctx_mut()
        && ctx.wants_keyboard_input()
    {
        return;
    }

    let first_selected = selected_items(&scene.0, None).first().copied();
    let action = if keys.just_pressed(KeyCode::KeyL) {
        Some(CanvasAction::ToggleCanvasLock)
    } else if keys.just_pressed(KeyCode::Space) {
        Some(CanvasAction::TogglePanMode)
    } else if keys.just_pressed(KeyCode::Digit1) {
        Some(CanvasAction::SetFixedScale(Some(1.0)))
    } else if keys.just_pressed(KeyCode::Digit0) {
        Some(CanvasAction::SetFixedScale(None))
    } else if keys.just_pressed(KeyCode::KeyK) {
        first_selected.map(CanvasAction::ToggleItemLock)
    } else if keys.just_pressed(KeyCode::KeyR) {
        first_selected.map(CanvasAction::ResetTransform)
    } else {
        None
    };

    if let Some(action) = action {
        actions.write(CanvasActionRequest(action));
    }
}

pub fn apply_canvas_actions(
    mut requests: MessageReader<CanvasActionRequest>,
    active: Res<ActiveCanvas>,
    mut registry: ResMut<CanvasRegistry>,
    mut scene: ResMut<HostScene>,
) {
    let Some(entry) = active.0.and_then(|id| registry.get_mut(id)) else {
        requests.clear();
        return;
    };
    for CanvasActionRequest(action) in requests.read() {
        debug!("Applying canvas action {:?}", action);
        apply_action(&mut entry.canvas, &mut scene.0, *action);
    }
}

/// Turn canvas requests into host UI state.
pub fn collect_canvas_requests(
    active: Res<ActiveCanvas>,
    mut registry: ResMut<CanvasRegistry>,
    mut menu: ResMut<ContextMenuState>,
) {
    let Some(entry) = active.0.and_then(|id| registry.get_mut(id)) else {
        return;
    };
    for request in entry.canvas.take_requests() {
        match request {
            CanvasRequest::ContextMenu { position, item } => {
                menu.open = Some((position, item));
            }
        }
    }
}

/// Map the canvas cursor shape onto the window; default over egui.
pub fn update_canvas_cursor(
    window_query: Query<Entity, With<PrimaryWindow>>,
    active: Res<ActiveCanvas>,
    registry: Res<CanvasRegistry>,
    mut commands: Commands,
    mut contexts: EguiContexts,
) {
    let Ok(entity) = window_query.single() else {
        return;
    };

    let Some(entry) = active.0.and_then(|id| registry.get(id)) else {
        return;
    };

    // A drag keeps its cursor even when it passes over a panel
    if !entry.canvas.mode().is_dragging()
        && let Ok(ctx) = contexts.ctx_mut()
        && ctx.is_pointer_over_area()
    {
        commands
            .entity(entity)
            .insert(CursorIcon::System(SystemCursorIcon::Default));
        return;
    }

    commands
        .entity(entity)
        .insert(entry.canvas.cursor().cursor_icon());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifiers_from_keys() {
        let mut keys = ButtonInput::<KeyCode>::default();
        assert!(!modifiers_from_keys(&keys).any());

        keys.press(KeyCode::ControlRight);
        keys.press(KeyCode::AltLeft);
        let modifiers = modifiers_from_keys(&keys);
        assert!(modifiers.ctrl && modifiers.alt && !modifiers.shift);
    }

    #[test]
    fn test_buttons_from_mouse() {
        let mut mouse = ButtonInput::<MouseButton>::default();
        mouse.press(MouseButton::Left);
        let buttons = buttons_from_mouse(&mouse);
        assert!(buttons.left && !buttons.right && !buttons.middle);
    }
}
