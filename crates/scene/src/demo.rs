use crate::graph::{Environment, Scene, SceneObject, rgb_hex};
use crate::shape::Shape;
use glam::{Vec2, Vec3};
use walkthrough_common::{ObjectTag, Pose};

/// The stock scene: a hittable cyan cube at the origin over a large green
/// ground plane, white fog, one directional light. The camera spawns five
/// units back looking at the cube.
pub fn demo_scene() -> Scene {
    let mut scene = Scene::new();
    scene.set_environment(Environment::default());
    scene.set_spawn(Pose::new(Vec3::new(0.0, 0.0, 5.0), 0.0));

    scene.add_object(
        SceneObject::new("cube", Shape::unit_cube())
            .with_tag(ObjectTag::Hittable)
            .with_color(rgb_hex(0x00FFFF)),
    );
    scene.add_object(
        SceneObject::new("ground", Shape::Quad {
            size: Vec2::splat(10_000.0),
        })
        .at(Vec3::new(0.0, -1.0, 0.0))
        .with_color(rgb_hex(0x008800)),
    );
    scene
}
