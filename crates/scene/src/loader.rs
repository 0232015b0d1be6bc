use crate::graph::{Environment, Group, Scene, SceneNode, SceneObject};
use crate::shape::Shape;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkthrough_common::{ObjectTag, Pose};

/// Nested includes deeper than this are skipped.
const MAX_INCLUDE_DEPTH: usize = 8;

/// Errors from scene loading.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("scene parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid node `{name}`: {reason}")]
    InvalidNode { name: String, reason: String },
    #[error("invalid {field}: {reason}")]
    InvalidSetting { field: &'static str, reason: String },
}

/// On-disk scene format (YAML).
///
/// ```yaml
/// spawn: { position: [0, 0, 5], yaw: 0 }
/// environment: { fog_density: 0.1 }
/// nodes:
///   - type: object
///     name: cube
///     tag: hittable
///     shape: { kind: cuboid, size: [1, 1, 1] }
///     color: [0, 1, 1, 1]
///   - type: include
///     path: props/table.yaml
///     offset: [3, 0, 0]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default)]
    pub spawn: Pose,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub nodes: Vec<NodeDescription>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeDescription {
    Object {
        name: String,
        #[serde(default)]
        tag: ObjectTag,
        shape: Shape,
        #[serde(default)]
        position: Vec3,
        #[serde(default = "default_color")]
        color: [f32; 4],
    },
    Group {
        name: String,
        #[serde(default)]
        offset: Vec3,
        #[serde(default)]
        children: Vec<NodeDescription>,
    },
    /// Nodes of another scene file, path relative to the including file.
    /// Only its `nodes` are used; a missing or broken file is skipped.
    Include {
        path: PathBuf,
        #[serde(default)]
        offset: Vec3,
    },
}

fn default_color() -> [f32; 4] {
    [0.8, 0.8, 0.8, 1.0]
}

impl SceneDescription {
    pub fn from_yaml(text: &str) -> Result<Self, SceneError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn read(path: &Path) -> Result<Self, SceneError> {
        let text = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    /// Build a scene. Includes resolve against `base_dir` (current directory
    /// when `None`).
    pub fn build(&self, base_dir: Option<&Path>) -> Result<Scene, SceneError> {
        self.validate()?;
        let base = base_dir.unwrap_or_else(|| Path::new("."));
        let mut scene = Scene::new();
        scene.set_spawn(self.spawn);
        scene.set_environment(self.environment);
        for node in build_nodes(&self.nodes, base, 0)? {
            scene.add_node(node);
        }
        Ok(scene)
    }

    /// Spawn and environment values must be finite; fog density and light
    /// intensity must also be non-negative.
    fn validate(&self) -> Result<(), SceneError> {
        let invalid = |field: &'static str, reason: String| {
            Err(SceneError::InvalidSetting { field, reason })
        };
        let spawn = &self.spawn;
        if !spawn.position.is_finite() {
            return invalid("spawn.position", format!("{} is not finite", spawn.position));
        }
        if !spawn.yaw.is_finite() {
            return invalid("spawn.yaw", format!("{} is not finite", spawn.yaw));
        }

        let env = &self.environment;
        if !env.clear_color.iter().all(|c| c.is_finite()) {
            return invalid(
                "environment.clear_color",
                format!("{:?} is not finite", env.clear_color),
            );
        }
        if !env.highlight_color.iter().all(|c| c.is_finite()) {
            return invalid(
                "environment.highlight_color",
                format!("{:?} is not finite", env.highlight_color),
            );
        }
        if !env.light_position.is_finite() {
            return invalid(
                "environment.light_position",
                format!("{} is not finite", env.light_position),
            );
        }
        if !(env.fog_density.is_finite() && env.fog_density >= 0.0) {
            return invalid(
                "environment.fog_density",
                format!("{} must be finite and non-negative", env.fog_density),
            );
        }
        if !(env.light_intensity.is_finite() && env.light_intensity >= 0.0) {
            return invalid(
                "environment.light_intensity",
                format!("{} must be finite and non-negative", env.light_intensity),
            );
        }
        Ok(())
    }
}

fn non_finite_offset(name: &str, offset: Vec3) -> SceneError {
    SceneError::InvalidNode {
        name: name.to_string(),
        reason: format!("offset {offset} is not finite"),
    }
}

fn build_nodes(
    nodes: &[NodeDescription],
    base: &Path,
    depth: usize,
) -> Result<Vec<SceneNode>, SceneError> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            NodeDescription::Object {
                name,
                tag,
                shape,
                position,
                color,
            } => {
                if !shape.is_finite() {
                    return Err(SceneError::InvalidNode {
                        name: name.clone(),
                        reason: format!("shape {shape:?} must be finite and non-negative"),
                    });
                }
                if !position.is_finite() {
                    return Err(SceneError::InvalidNode {
                        name: name.clone(),
                        reason: format!("position {position:?} is not finite"),
                    });
                }
                let object = SceneObject::new(name.clone(), *shape)
                    .with_tag(*tag)
                    .at(*position)
                    .with_color(*color);
                out.push(SceneNode::Object(object));
            }
            NodeDescription::Group {
                name,
                offset,
                children,
            } => {
                if !offset.is_finite() {
                    return Err(non_finite_offset(name, *offset));
                }
                let mut group = Group::new(name.clone(), *offset);
                group.children = build_nodes(children, base, depth)?;
                out.push(SceneNode::Group(group));
            }
            NodeDescription::Include { path, offset } => {
                if !offset.is_finite() {
                    return Err(non_finite_offset(&path.display().to_string(), *offset));
                }
                if let Some(group) = include(&base.join(path), *offset, depth + 1) {
                    out.push(SceneNode::Group(group));
                }
            }
        }
    }
    Ok(out)
}

/// Load an included file as a group. Failures are logged and the asset is
/// left out; the rest of the scene still loads.
fn include(path: &Path, offset: Vec3, depth: usize) -> Option<Group> {
    if depth > MAX_INCLUDE_DEPTH {
        tracing::warn!(path = %path.display(), depth, "include depth exceeded, skipping");
        return None;
    }
    let description = match SceneDescription::read(path) {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!(path = %path.display(), "skipping scene asset: {e}");
            return None;
        }
    };
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    match build_nodes(&description.nodes, base, depth) {
        Ok(children) => {
            tracing::debug!(path = %path.display(), nodes = children.len(), "included scene asset");
            Some(Group {
                name: path.display().to_string(),
                offset,
                children,
            })
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), "skipping scene asset: {e}");
            None
        }
    }
}

/// Load and build a scene file.
pub fn load_scene(path: impl AsRef<Path>) -> Result<Scene, SceneError> {
    let path = path.as_ref();
    let description = SceneDescription::read(path)?;
    let scene = description.build(path.parent())?;
    tracing::info!(
        path = %path.display(),
        objects = scene.object_count(),
        "scene loaded"
    );
    Ok(scene)
}

/// Load a scene file, degrading to an empty room if it cannot be loaded.
pub fn load_scene_or_empty(path: impl AsRef<Path>) -> Scene {
    let path = path.as_ref();
    load_scene(path).unwrap_or_else(|e| {
        tracing::error!(
            path = %path.display(),
            "scene load failed, continuing with an empty scene: {e}"
        );
        Scene::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::GeometryQuery;
    use std::io::Write;

    const CUBE_SCENE: &str = r#"
spawn:
  position: [0, 0, 5]
environment:
  fog_density: 0.05
nodes:
  - type: object
    name: cube
    tag: hittable
    shape: { kind: cuboid, size: [1, 1, 1] }
    color: [0, 1, 1, 1]
  - type: object
    name: ground
    shape: { kind: quad, size: [100, 100] }
    position: [0, -1, 0]
"#;

    #[test]
    fn parse_and_build() {
        let description = SceneDescription::from_yaml(CUBE_SCENE).unwrap();
        let scene = description.build(None).unwrap();

        assert_eq!(scene.object_count(), 2);
        assert_eq!(scene.hittable_ids().len(), 1);
        assert_eq!(scene.spawn().position, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(scene.environment().fog_density, 0.05);
        // Unspecified environment fields keep their defaults.
        assert_eq!(scene.environment().light_intensity, 0.9);
    }

    #[test]
    fn missing_sections_default() {
        let scene = SceneDescription::from_yaml("{}").unwrap().build(None).unwrap();
        assert!(scene.is_empty());
        assert_eq!(scene.spawn(), Pose::default());
    }

    #[test]
    fn groups_nest() {
        let yaml = r#"
nodes:
  - type: group
    name: row
    offset: [0, 0, -3]
    children:
      - type: object
        name: a
        shape: { kind: cuboid, size: [1, 1, 1] }
        position: [1, 0, 0]
"#;
        let scene = SceneDescription::from_yaml(yaml).unwrap().build(None).unwrap();
        let objects = scene.objects();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].world_position, Vec3::new(1.0, 0.0, -3.0));
    }

    #[test]
    fn negative_size_is_rejected() {
        let yaml = r#"
nodes:
  - type: object
    name: broken
    shape: { kind: cuboid, size: [1, -1, 1] }
"#;
        let err = SceneDescription::from_yaml(yaml).unwrap().build(None).unwrap_err();
        assert!(matches!(err, SceneError::InvalidNode { .. }));
    }

    #[test]
    fn non_finite_offsets_are_rejected() {
        let group = r#"
nodes:
  - type: group
    name: row
    offset: [.nan, 0, 0]
"#;
        let err = SceneDescription::from_yaml(group).unwrap().build(None).unwrap_err();
        assert!(matches!(err, SceneError::InvalidNode { ref name, .. } if name == "row"));

        let include = "nodes:\n  - type: include\n    path: prop.yaml\n    offset: [0, .inf, 0]\n";
        let err = SceneDescription::from_yaml(include).unwrap().build(None).unwrap_err();
        assert!(
            matches!(err, SceneError::InvalidNode { ref name, .. } if name.contains("prop.yaml"))
        );
    }

    #[test]
    fn bad_spawn_and_environment_are_rejected() {
        let cases = [
            ("spawn: { position: [0, .nan, 5] }", "spawn.position"),
            ("spawn: { position: [0, 0, 5], yaw: .inf }", "spawn.yaw"),
            ("environment: { fog_density: -0.1 }", "environment.fog_density"),
            ("environment: { light_intensity: .nan }", "environment.light_intensity"),
            ("environment: { light_position: [1, .inf, 0] }", "environment.light_position"),
            ("environment: { clear_color: [1, 1, .nan, 1] }", "environment.clear_color"),
        ];
        for (yaml, expected) in cases {
            let err = SceneDescription::from_yaml(yaml).unwrap().build(None).unwrap_err();
            match err {
                SceneError::InvalidSetting { field, .. } => assert_eq!(field, expected, "{yaml}"),
                other => panic!("{yaml}: unexpected {other}"),
            }
        }
    }

    #[test]
    fn unknown_node_type_is_a_parse_error() {
        let yaml = "nodes:\n  - type: light\n    name: sun\n";
        assert!(matches!(
            SceneDescription::from_yaml(yaml),
            Err(SceneError::Parse(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.yaml");
        std::fs::write(&path, CUBE_SCENE).unwrap();

        let scene = load_scene(&path).unwrap();
        let hits = scene.intersect(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z, true).unwrap();
        assert_eq!(hits.len(), 1);
        assert!((hits[0].distance - 4.5).abs() < 1e-5);
    }

    #[test]
    fn includes_resolve_relative_to_the_including_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("props")).unwrap();
        let asset = r#"
nodes:
  - type: object
    name: crate
    tag: hittable
    shape: { kind: cuboid, size: [1, 1, 1] }
"#;
        std::fs::write(dir.path().join("props/crate.yaml"), asset).unwrap();
        let main = dir.path().join("main.yaml");
        let mut file = std::fs::File::create(&main).unwrap();
        writeln!(
            file,
            "nodes:\n  - type: include\n    path: props/crate.yaml\n    offset: [4, 0, 0]"
        )
        .unwrap();

        let scene = load_scene(&main).unwrap();
        let objects = scene.objects();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].world_position, Vec3::new(4.0, 0.0, 0.0));
    }

    #[test]
    fn missing_include_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let main = dir.path().join("main.yaml");
        let yaml = r#"
nodes:
  - type: include
    path: nowhere.yaml
  - type: object
    name: cube
    shape: { kind: cuboid, size: [1, 1, 1] }
"#;
        std::fs::write(&main, yaml).unwrap();

        let scene = load_scene(&main).unwrap();
        assert_eq!(scene.object_count(), 1);
    }

    #[test]
    fn self_include_stops_at_depth_limit() {
        let dir = tempfile::tempdir().unwrap();
        let main = dir.path().join("loop.yaml");
        let yaml = r#"
nodes:
  - type: object
    name: cube
    shape: { kind: cuboid, size: [1, 1, 1] }
  - type: include
    path: loop.yaml
"#;
        std::fs::write(&main, yaml).unwrap();

        let scene = load_scene(&main).unwrap();
        // The root plus one copy per permitted nesting level.
        assert_eq!(scene.object_count(), MAX_INCLUDE_DEPTH + 1);
    }

    #[test]
    fn unreadable_scene_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let scene = load_scene_or_empty(dir.path().join("missing.yaml"));
        assert!(scene.is_empty());

        let garbage = dir.path().join("garbage.yaml");
        std::fs::write(&garbage, "nodes: [[[").unwrap();
        assert!(load_scene_or_empty(&garbage).is_empty());
    }
}
