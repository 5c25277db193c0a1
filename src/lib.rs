//! Interactive 2D scene-composition canvas.
//!
//! [`editor`] holds the engine: transform math, hit-testing, snapping, the
//! interaction state machine and the overlay renderer. It talks to the scene
//! through [`scene::SceneGraph`] and draws through
//! [`editor::OverlayPainter`]. [`host`] wires both into a Bevy app.

pub mod common;
pub mod config;
pub mod constants;
pub mod editor;
pub mod host;
pub mod paths;
pub mod scene;
pub mod theme;
