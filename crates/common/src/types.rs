use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Unique identifier for an object in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight hex digits, for logs and debug output.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short())
    }
}

/// Identity tag carried by every scene object.
///
/// Only `Hittable` objects react to the target picker; everything else
/// (ground, walls) is plain environment that still blocks movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectTag {
    Hittable,
    #[default]
    Environment,
}

impl ObjectTag {
    pub fn is_hittable(self) -> bool {
        matches!(self, Self::Hittable)
    }
}

/// Camera/player pose: world position plus yaw around +Y in radians.
///
/// Yaw is unbounded; it only ever feeds trigonometric functions, so it wraps
/// implicitly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    #[serde(default)]
    pub yaw: f32,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
        }
    }
}

impl Pose {
    pub fn new(position: Vec3, yaw: f32) -> Self {
        Self { position, yaw }
    }

    /// Unit view direction. At yaw 0 the camera looks down -Z.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos())
    }
}

/// Set of objects drawn with the highlight appearance this frame.
///
/// Everything not in the set renders with its default appearance, so
/// `reset` returns every object to default in one step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightState {
    highlighted: BTreeSet<ObjectId>,
}

impl HighlightState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return every object to its default appearance.
    pub fn reset(&mut self) {
        self.highlighted.clear();
    }

    pub fn highlight(&mut self, id: ObjectId) {
        self.highlighted.insert(id);
    }

    pub fn is_highlighted(&self, id: ObjectId) -> bool {
        self.highlighted.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.highlighted.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.highlighted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.highlighted.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_id_uniqueness() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        assert_ne!(a, b);
        assert_eq!(a.short().len(), 8);
    }

    #[test]
    fn tag_defaults_to_environment() {
        assert_eq!(ObjectTag::default(), ObjectTag::Environment);
        assert!(ObjectTag::Hittable.is_hittable());
        assert!(!ObjectTag::Environment.is_hittable());
    }

    #[test]
    fn forward_at_zero_yaw_looks_down_negative_z() {
        let pose = Pose::default();
        assert!((pose.forward() - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn forward_after_quarter_turn_left_looks_down_negative_x() {
        let pose = Pose::new(Vec3::ZERO, std::f32::consts::FRAC_PI_2);
        assert!((pose.forward() - Vec3::NEG_X).length() < 1e-6);
    }

    #[test]
    fn highlight_reset_clears_everything() {
        let mut state = HighlightState::new();
        let id = ObjectId::new();
        state.highlight(id);
        assert!(state.is_highlighted(id));
        assert_eq!(state.len(), 1);

        state.reset();
        assert!(!state.is_highlighted(id));
        assert!(state.is_empty());
    }
}
