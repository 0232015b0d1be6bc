use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Thickness used when a quad has to be drawn as a box.
pub const QUAD_RENDER_THICKNESS: f32 = 1e-3;

/// Direction components below this are treated as parallel to a slab.
const PARALLEL_EPSILON: f32 = 1e-8;

/// Intersectable geometry, centred on the owning object's position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    /// Axis-aligned box with full edge lengths `size`.
    Cuboid { size: Vec3 },
    /// Horizontal rectangle in the XZ plane, visible from above only.
    /// `size` is (extent along X, extent along Z).
    Quad { size: Vec2 },
}

impl Shape {
    pub fn unit_cube() -> Self {
        Self::Cuboid { size: Vec3::ONE }
    }

    /// Distance along the unit direction `dir` from `origin` to the first
    /// surface, if any.
    ///
    /// Cuboids are solid: a ray starting inside one hits it at distance 0.
    /// Quads are one-sided and never hit from below.
    pub fn intersect(&self, center: Vec3, origin: Vec3, dir: Vec3) -> Option<f32> {
        match *self {
            Self::Cuboid { size } => {
                let half = size * 0.5;
                ray_aabb(origin, dir, center - half, center + half)
            }
            Self::Quad { size } => ray_quad(origin, dir, center, size * 0.5),
        }
    }

    /// Scale applied to a unit cube to draw this shape.
    pub fn render_scale(&self) -> Vec3 {
        match *self {
            Self::Cuboid { size } => size,
            Self::Quad { size } => Vec3::new(size.x, QUAD_RENDER_THICKNESS, size.y),
        }
    }

    pub fn is_finite(&self) -> bool {
        match *self {
            Self::Cuboid { size } => size.is_finite() && size.min_element() >= 0.0,
            Self::Quad { size } => size.is_finite() && size.min_element() >= 0.0,
        }
    }
}

/// Ray vs axis-aligned box, slab method. Returns the entry distance.
fn ray_aabb(origin: Vec3, dir: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;

    for axis in 0..3 {
        let o = origin[axis];
        let d = dir[axis];
        if d.abs() < PARALLEL_EPSILON {
            // Parallel: either always inside this slab or never.
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let mut t0 = (min[axis] - o) * inv;
        let mut t1 = (max[axis] - o) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_enter = t_enter.max(t0);
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return None;
        }
    }

    if t_exit < 0.0 {
        return None;
    }
    // Origin inside the box.
    Some(t_enter.max(0.0))
}

/// Ray vs upward-facing horizontal rectangle.
fn ray_quad(origin: Vec3, dir: Vec3, center: Vec3, half: Vec2) -> Option<f32> {
    if dir.y > -PARALLEL_EPSILON {
        return None;
    }
    let t = (center.y - origin.y) / dir.y;
    if t < 0.0 {
        return None;
    }
    let p = origin + dir * t;
    let inside = (p.x - center.x).abs() <= half.x && (p.z - center.z).abs() <= half.y;
    inside.then_some(t)
}
