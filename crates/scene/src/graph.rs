use crate::query::{GeometryQuery, Hit, QueryError};
use crate::shape::Shape;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use walkthrough_common::{ObjectId, ObjectTag, Pose};

/// Linear RGBA colour from a 0xRRGGBB literal, alpha 1.
pub fn rgb_hex(hex: u32) -> [f32; 4] {
    let channel = |shift: u32| ((hex >> shift) & 0xFF) as f32 / 255.0;
    [channel(16), channel(8), channel(0), 1.0]
}

/// Scene-wide rendering parameters. Not consulted by navigation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Environment {
    /// Background colour; fog fades towards it.
    pub clear_color: [f32; 4],
    /// Exponential-squared fog density. Zero disables fog.
    pub fog_density: f32,
    /// Directional light position; the light shines towards the origin.
    pub light_position: Vec3,
    pub light_intensity: f32,
    /// Colour of a highlighted object.
    pub highlight_color: [f32; 4],
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            clear_color: rgb_hex(0xFFFFFF),
            fog_density: 0.1,
            light_position: Vec3::new(16.0, 9.0, 25.0),
            light_intensity: 0.9,
            highlight_color: rgb_hex(0xFF0000),
        }
    }
}

impl Environment {
    /// Unit vector pointing from the surface towards the light.
    pub fn light_direction(&self) -> Vec3 {
        let dir = self.light_position.normalize_or_zero();
        if dir == Vec3::ZERO { Vec3::Y } else { dir }
    }
}

/// A leaf object: geometry with an identity, a tag and a default colour.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub id: ObjectId,
    pub name: String,
    pub tag: ObjectTag,
    pub shape: Shape,
    /// Position relative to the enclosing group.
    pub position: Vec3,
    pub color: [f32; 4],
}

impl SceneObject {
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            id: ObjectId::new(),
            name: name.into(),
            tag: ObjectTag::Environment,
            shape,
            position: Vec3::ZERO,
            color: [0.8, 0.8, 0.8, 1.0],
        }
    }

    pub fn with_tag(mut self, tag: ObjectTag) -> Self {
        self.tag = tag;
        self
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }
}

/// A compound node: children translated by `offset`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Group {
    pub name: String,
    pub offset: Vec3,
    pub children: Vec<SceneNode>,
}

impl Group {
    pub fn new(name: impl Into<String>, offset: Vec3) -> Self {
        Self {
            name: name.into(),
            offset,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, node: impl Into<SceneNode>) -> Self {
        self.children.push(node.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneNode {
    Object(SceneObject),
    Group(Group),
}

impl From<SceneObject> for SceneNode {
    fn from(object: SceneObject) -> Self {
        Self::Object(object)
    }
}

impl From<Group> for SceneNode {
    fn from(group: Group) -> Self {
        Self::Group(group)
    }
}

/// An object together with its resolved world-space centre.
#[derive(Debug, Clone, Copy)]
pub struct PlacedObject<'a> {
    pub object: &'a SceneObject,
    pub world_position: Vec3,
}

/// Static scene: root nodes, environment and spawn pose.
///
/// Navigation only sees it through [`GeometryQuery`]; renderers read it
/// through [`Scene::objects`].
#[derive(Debug, Clone, Default)]
pub struct Scene {
    roots: Vec<SceneNode>,
    environment: Environment,
    spawn: Pose,
}

impl Scene {
    /// An empty room: no geometry, default environment, spawn at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn set_environment(&mut self, environment: Environment) {
        self.environment = environment;
    }

    pub fn spawn(&self) -> Pose {
        self.spawn
    }

    pub fn set_spawn(&mut self, spawn: Pose) {
        self.spawn = spawn;
    }

    /// Add a root-level object. Returns its id.
    pub fn add_object(&mut self, object: SceneObject) -> ObjectId {
        let id = object.id;
        self.roots.push(SceneNode::Object(object));
        id
    }

    pub fn add_group(&mut self, group: Group) {
        self.roots.push(SceneNode::Group(group));
    }

    pub fn add_node(&mut self, node: SceneNode) {
        self.roots.push(node);
    }

    pub fn roots(&self) -> &[SceneNode] {
        &self.roots
    }

    /// Every object in the scene, depth first, with world positions.
    pub fn objects(&self) -> Vec<PlacedObject<'_>> {
        let mut out = Vec::new();
        visit(&self.roots, Vec3::ZERO, true, &mut |object, world_position| {
            out.push(PlacedObject {
                object,
                world_position,
            });
        });
        out
    }

    pub fn get(&self, id: ObjectId) -> Option<PlacedObject<'_>> {
        self.objects().into_iter().find(|p| p.object.id == id)
    }

    pub fn hittable_ids(&self) -> Vec<ObjectId> {
        self.objects()
            .into_iter()
            .filter(|p| p.object.tag.is_hittable())
            .map(|p| p.object.id)
            .collect()
    }

    pub fn object_count(&self) -> usize {
        self.objects().len()
    }

    pub fn is_empty(&self) -> bool {
        self.object_count() == 0
    }
}

fn visit<'a>(
    nodes: &'a [SceneNode],
    offset: Vec3,
    recursive: bool,
    f: &mut impl FnMut(&'a SceneObject, Vec3),
) {
    for node in nodes {
        match node {
            SceneNode::Object(object) => f(object, offset + object.position),
            SceneNode::Group(group) if recursive => {
                visit(&group.children, offset + group.offset, true, f);
            }
            SceneNode::Group(_) => {}
        }
    }
}

impl GeometryQuery for Scene {
    fn intersect(
        &self,
        origin: Vec3,
        direction: Vec3,
        recursive: bool,
    ) -> Result<Vec<Hit>, QueryError> {
        if !origin.is_finite() {
            return Err(QueryError::NonFiniteOrigin(origin));
        }
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO {
            return Err(QueryError::DegenerateDirection(direction));
        }

        let mut hits = Vec::new();
        visit(&self.roots, Vec3::ZERO, recursive, &mut |object, center| {
            if let Some(distance) = object.shape.intersect(center, origin, dir) {
                hits.push(Hit {
                    distance,
                    object: object.id,
                    tag: object.tag,
                });
            }
        });
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        Ok(hits)
    }
}
