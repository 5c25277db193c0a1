//! Live canvases owned by the host.

use std::collections::BTreeMap;

use bevy::log::{debug, info};
use bevy::prelude::Resource;

use crate::editor::{CanvasSettings, OverlayRenderer, SceneCanvas};

/// Identifier handed out by [`CanvasRegistry::register`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct CanvasId(pub u32);

/// A canvas together with the renderer that draws its overlay.
pub struct CanvasEntry {
    pub canvas: SceneCanvas,
    pub renderer: OverlayRenderer,
}

/// Every canvas currently shown. Configuration changes are pushed to all of
/// them through [`CanvasRegistry::apply_settings`].
#[derive(Resource, Default)]
pub struct CanvasRegistry {
    entries: BTreeMap<CanvasId, CanvasEntry>,
    next_id: u32,
}

impl CanvasRegistry {
    pub fn register(&mut self, canvas: SceneCanvas) -> CanvasId {
        let id = CanvasId(self.next_id);
        self.next_id += 1;
        self.entries.insert(
            id,
            CanvasEntry {
                canvas,
                renderer: OverlayRenderer::new(),
            },
        );
        info!("Registered canvas {:?}", id);
        id
    }

    pub fn unregister(&mut self, id: CanvasId) -> Option<SceneCanvas> {
        let entry = self.entries.remove(&id)?;
        info!("Unregistered canvas {:?}", id);
        Some(entry.canvas)
    }

    pub fn clear(&mut self) {
        debug!("Clearing {} canvases", self.entries.len());
        self.entries.clear();
    }

    pub fn get(&self, id: CanvasId) -> Option<&CanvasEntry> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: CanvasId) -> Option<&mut CanvasEntry> {
        self.entries.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace the settings of every registered canvas.
    pub fn apply_settings(&mut self, settings: CanvasSettings) {
        for entry in self.entries.values_mut() {
            entry.canvas.set_settings(settings);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec2;

    fn canvas() -> SceneCanvas {
        SceneCanvas::new(Vec2::new(1920.0, 1080.0), CanvasSettings::default())
    }

    #[test]
    fn test_register_and_unregister() {
        let mut registry = CanvasRegistry::default();
        let a = registry.register(canvas());
        let b = registry.register(canvas());
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);

        assert!(registry.unregister(a).is_some());
        assert!(registry.unregister(a).is_none());
        assert!(registry.get(a).is_none());
        assert!(registry.get(b).is_some());
    }

    #[test]
    fn test_ids_not_reused_after_clear() {
        let mut registry = CanvasRegistry::default();
        let a = registry.register(canvas());
        registry.clear();
        assert!(registry.is_empty());
        assert_ne!(registry.register(canvas()), a);
    }

    #[test]
    fn test_apply_settings_reaches_every_canvas() {
        let mut registry = CanvasRegistry::default();
        let a = registry.register(canvas());
        let b = registry.register(canvas());
        let settings = CanvasSettings {
            spacing_helpers: false,
            ..CanvasSettings::default()
        };

        registry.apply_settings(settings);

        for id in [a, b] {
            let entry = registry.get(id).unwrap();
            assert!(!entry.canvas.settings().spacing_helpers);
        }
    }
}
