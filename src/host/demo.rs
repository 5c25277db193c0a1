//! Scene shown when the binary starts.

use bevy::math::Vec2;

use crate::common::Alignment;
use crate::scene::{Crop, ItemTransform, MemoryScene};

pub fn demo_scene() -> MemoryScene {
    let mut scene = MemoryScene::new();

    scene.add_item(
        None,
        Vec2::new(1920.0, 1080.0),
        ItemTransform {
            scale: Vec2::splat(0.5),
            ..ItemTransform::at(Vec2::new(80.0, 80.0))
        },
    );
    scene.add_item(
        None,
        Vec2::new(640.0, 360.0),
        ItemTransform {
            rotation: 15.0,
            alignment: Alignment::Center,
            crop: Crop {
                left: 40,
                right: 40,
                ..Crop::default()
            },
            ..ItemTransform::at(Vec2::new(1400.0, 300.0))
        },
    );

    let group = scene.add_group(
        None,
        Vec2::new(600.0, 300.0),
        ItemTransform::at(Vec2::new(200.0, 650.0)),
    );
    scene.add_item(
        Some(group),
        Vec2::new(280.0, 280.0),
        ItemTransform::at(Vec2::new(10.0, 10.0)),
    );
    scene.add_item(
        Some(group),
        Vec2::new(280.0, 280.0),
        ItemTransform::at(Vec2::new(310.0, 10.0)),
    );

    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneGraph;

    #[test]
    fn test_demo_scene_layout() {
        let scene = demo_scene();
        let roots = scene.children(None);
        assert_eq!(roots.len(), 3);
        let group = roots[2];
        assert!(scene.item(group).is_some_and(|info| info.is_group));
        assert_eq!(scene.children(Some(group)).len(), 2);
    }
}
