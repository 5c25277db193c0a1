//! Marquee (box) selection.

use bevy::log::debug;
use bevy::math::Vec2;

use crate::editor::Modifiers;
use crate::editor::hit_detection::items_in_rect;
use crate::scene::{SceneGraph, clear_selection};

use super::{MarqueeBox, SelectionTracking};

/// Stretch the marquee to `point` and highlight the items it touches.
pub fn update_marquee(
    scene: &dyn SceneGraph,
    marquee: &mut MarqueeBox,
    point: Vec2,
    tracking: &SelectionTracking,
) {
    marquee.current = point;
    tracking
        .hovered
        .set(items_in_rect(scene, marquee.start, marquee.current));
}

/// Commit the highlighted items to the selection.
///
/// Without modifiers the marquee replaces the selection. With ctrl it
/// toggles each item against the selection held at press time, and with
/// alt it removes them from it.
pub fn resolve_marquee(scene: &mut dyn SceneGraph, tracking: &SelectionTracking, modifiers: Modifiers) {
    clear_selection(scene);
    if modifiers.any() {
        for id in &tracking.retained {
            scene.set_selected(*id, true);
        }
    }

    let hovered = tracking.hovered.snapshot();
    for id in &hovered {
        if modifiers.alt {
            scene.set_selected(*id, false);
        } else if modifiers.ctrl {
            let selected = scene.is_selected(*id);
            scene.set_selected(*id, !selected);
        } else {
            scene.set_selected(*id, true);
        }
    }
    tracking.hovered.clear();

    debug!("Marquee resolved over {} items", hovered.len());
}
