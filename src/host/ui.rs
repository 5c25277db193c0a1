//! egui passes: overlay labels, the canvas context menu and the config reset
//! notice.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::config::ConfigResetNotification;
use crate::constants::LABEL_FONT_SIZE;
use crate::editor::actions::CanvasAction;
use crate::scene::SceneGraph;
use crate::theme::to_egui;

use super::painter::OverlayLabels;
use super::{ActiveCanvas, CanvasActionRequest, CanvasRegistry, ContextMenuState, HostScene};

/// Draw the labels queued by this frame's overlay pass
pub fn draw_overlay_labels(mut contexts: EguiContexts, labels: Res<OverlayLabels>) -> Result {
    let ctx = contexts.ctx_mut()?;
    for (i, label) in labels.labels.iter().enumerate() {
        egui::Area::new(egui::Id::new(("overlay_label", i)))
            .fixed_pos(egui::pos2(label.position.x, label.position.y))
            .order(egui::Order::Background)
            .interactable(false)
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new(&label.text)
                        .color(to_egui(label.color))
                        .size(LABEL_FONT_SIZE),
                );
            });
    }
    Ok(())
}

pub fn context_menu_ui(
    mut contexts: EguiContexts,
    mut menu: ResMut<ContextMenuState>,
    active: Res<ActiveCanvas>,
    registry: Res<CanvasRegistry>,
    scene: Res<HostScene>,
    mut actions: MessageWriter<CanvasActionRequest>,
) -> Result {
    let Some((position, item)) = menu.open else {
        return Ok(());
    };
    let Some(entry) = active.0.and_then(|id| registry.get(id)) else {
        menu.open = None;
        return Ok(());
    };
    let ctx = contexts.ctx_mut()?;

    let mut chosen = None;
    let response = egui::Area::new(egui::Id::new("canvas_context_menu"))
        .fixed_pos(egui::pos2(position.x, position.y))
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                let lock_label = if entry.canvas.is_locked() {
                    "Unlock Canvas"
                } else {
                    "Lock Canvas"
                };
                if ui.button(lock_label).clicked() {
                    chosen = Some(CanvasAction::ToggleCanvasLock);
                }
                if ui.button("Toggle Pan Mode").clicked() {
                    chosen = Some(CanvasAction::TogglePanMode);
                }

                let Some(info) = item.and_then(|id| scene.0.item(id)) else {
                    return;
                };
                ui.separator();
                let item_lock = if info.locked { "Unlock Item" } else { "Lock Item" };
                if ui.button(item_lock).clicked() {
                    chosen = Some(CanvasAction::ToggleItemLock(info.id));
                }
                if ui.button("Reset Transform").clicked() {
                    chosen = Some(CanvasAction::ResetTransform(info.id));
                }
            });
        })
        .response;

    if let Some(action) = chosen {
        actions.write(CanvasActionRequest(action));
        menu.open = None;
    } else if response.clicked_elsewhere() || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        menu.open = None;
    }
    Ok(())
}

/// Tell the user their config file was replaced with defaults
pub fn config_reset_notification_ui(
    mut contexts: EguiContexts,
    mut notification: ResMut<ConfigResetNotification>,
) -> Result {
    if !notification.show {
        return Ok(());
    }

    egui::Window::new("Configuration Reset")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.label("Canvas settings were reset to their defaults.");
            if let Some(ref reason) = notification.reason {
                ui.add_space(5.0);
                ui.label(egui::RichText::new(reason).weak());
            }
            ui.add_space(10.0);
            if ui.button("OK").clicked() {
                notification.show = false;
            }
        });

    Ok(())
}
