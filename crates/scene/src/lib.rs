//! Scene: static geometry the navigator moves through.
//!
//! Objects are axis-aligned cuboids and upward-facing quads arranged in a
//! tree of translated groups. The navigation core never walks the tree; it
//! only issues ray queries through [`GeometryQuery`].
//!
//! # Invariants
//! - Geometry is immutable while frames run.
//! - Query results are sorted ascending by distance; empty is a valid answer.
//! - Cuboids are solid: a ray starting inside one hits it at distance 0.
//! - A broken included asset is logged and left out; it never fails the scene.

mod demo;
mod graph;
mod loader;
mod query;
mod shape;

pub use demo::demo_scene;
pub use graph::{Environment, Group, PlacedObject, Scene, SceneNode, SceneObject, rgb_hex};
pub use loader::{NodeDescription, SceneDescription, SceneError, load_scene, load_scene_or_empty};
pub use query::{GeometryQuery, Hit, QueryError, nearest_valid};
pub use shape::{QUAD_RENDER_THICKNESS, Shape};

pub fn crate_info() -> &'static str {
    "walkthrough-scene v0.1.0"
}
