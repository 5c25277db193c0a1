//! Bevy host for the canvas engine.
//!
//! The primary window acts as the canvas widget: window input is forwarded
//! to the active [`SceneCanvas`], and its overlay is drawn with gizmos plus
//! egui labels every frame.

mod demo;
mod input;
mod painter;
mod registry;
mod ui;

pub use painter::{CanvasGizmoGroup, OverlayLabel, OverlayLabels};
pub use registry::{CanvasEntry, CanvasId, CanvasRegistry};

use bevy::camera::visibility::RenderLayers;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiPrimaryContextPass;

use crate::config::{CanvasConfig, ConfigLoaded};
use crate::constants::{DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};
use crate::editor::{OverlayPainter, SceneCanvas};
use crate::editor::actions::CanvasAction;
use crate::scene::{ItemId, MemoryScene};

use painter::GizmoPainter;

/// The scene edited by the host's canvases
#[derive(Resource, Default)]
pub struct HostScene(pub MemoryScene);

/// Canvas bound to the primary window
#[derive(Resource, Default)]
pub struct ActiveCanvas(pub Option<CanvasId>);

/// Open context menu: widget position and the item it acts on
#[derive(Resource, Default)]
pub struct ContextMenuState {
    pub open: Option<(Vec2, Option<ItemId>)>,
}

/// Message to run a canvas action on the active canvas
#[derive(Message, Clone, Copy, Debug)]
pub struct CanvasActionRequest(pub CanvasAction);

fn spawn_canvas_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        // Layer 0 = main content, Layer 1 = canvas overlay
        RenderLayers::from_layers(&[0, 1]),
    ));
}

fn setup_canvas(
    config: Res<CanvasConfig>,
    mut registry: ResMut<CanvasRegistry>,
    mut active: ResMut<ActiveCanvas>,
    mut scene: ResMut<HostScene>,
) {
    scene.0 = demo::demo_scene();
    let canvas = SceneCanvas::new(
        Vec2::new(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT),
        config.data.to_settings(),
    );
    active.0 = Some(registry.register(canvas));
}

fn sync_canvas_settings(config: Res<CanvasConfig>, mut registry: ResMut<CanvasRegistry>) {
    registry.apply_settings(config.data.to_settings());
}

fn draw_canvas_overlay(
    mut gizmos: Gizmos<CanvasGizmoGroup>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    active: Res<ActiveCanvas>,
    mut registry: ResMut<CanvasRegistry>,
    scene: Res<HostScene>,
    mut labels: ResMut<OverlayLabels>,
) {
    labels.labels.clear();
    let Ok(window) = window_query.single() else {
        return;
    };
    let Some(CanvasEntry { canvas, renderer }) = active.0.and_then(|id| registry.get_mut(id))
    else {
        return;
    };

    let size = Vec2::new(window.width(), window.height());
    let content = painter::content_quads(&scene.0);
    let mut painter = GizmoPainter::new(&mut gizmos, size, &content, &mut labels.labels);
    let viewport = painter.viewport_size();
    renderer.on_render(canvas, &scene.0, &mut painter, viewport.x, viewport.y);
}

pub struct SceneCanvasPlugin;

impl Plugin for SceneCanvasPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CanvasRegistry>()
            .init_resource::<ActiveCanvas>()
            .init_resource::<HostScene>()
            .init_resource::<ContextMenuState>()
            .init_resource::<OverlayLabels>()
            .add_message::<CanvasActionRequest>()
            .init_gizmo_group::<CanvasGizmoGroup>()
            .add_systems(
                Startup,
                (
                    spawn_canvas_camera,
                    painter::configure_canvas_gizmos,
                    setup_canvas.after(ConfigLoaded),
                ),
            )
            .add_systems(
                Update,
                (
                    sync_canvas_settings.run_if(resource_changed::<CanvasConfig>),
                    input::forward_pointer_input,
                    input::collect_canvas_requests,
                    input::handle_canvas_shortcuts,
                    input::apply_canvas_actions,
                    draw_canvas_overlay,
                    input::update_canvas_cursor,
                )
                    .chain(),
            )
            .add_systems(
                EguiPrimaryContextPass,
                (
                    ui::draw_overlay_labels,
                    ui::context_menu_ui,
                    ui::config_reset_notification_ui,
                ),
            );
    }
}
