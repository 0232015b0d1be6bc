use crate::movement::Displacement;
use glam::Vec3;
use serde::Serialize;
use std::f32::consts::FRAC_1_SQRT_2;
use walkthrough_common::ObjectId;
use walkthrough_scene::{GeometryQuery, Hit, nearest_valid};

const D: f32 = FRAC_1_SQRT_2;

/// Fixed clearance probes: the four axis directions and the four diagonals
/// in the horizontal plane. Independent of heading.
pub const PROBE_DIRECTIONS: [Vec3; 8] = [
    Vec3::new(1.0, 0.0, 0.0),
    Vec3::new(-1.0, 0.0, 0.0),
    Vec3::new(0.0, 0.0, 1.0),
    Vec3::new(0.0, 0.0, -1.0),
    Vec3::new(D, 0.0, D),
    Vec3::new(-D, 0.0, D),
    Vec3::new(D, 0.0, -D),
    Vec3::new(-D, 0.0, -D),
];

/// The probe that cancelled a move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Obstruction {
    pub probe: Vec3,
    pub distance: f32,
    pub object: ObjectId,
}

/// Resolver output: the displacement to commit and, when it was cancelled,
/// what cancelled it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub displacement: Displacement,
    pub obstruction: Option<Obstruction>,
}

impl Resolution {
    pub fn clear(displacement: Displacement) -> Self {
        Self {
            displacement,
            obstruction: None,
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.obstruction.is_some()
    }
}

/// Nearest valid hit along a ray, recursing into groups.
///
/// A failed query counts as no hit: missing geometry must never freeze the
/// player or stall the frame.
pub(crate) fn cast<G: GeometryQuery + ?Sized>(
    geometry: &G,
    origin: Vec3,
    direction: Vec3,
) -> Option<Hit> {
    match geometry.intersect(origin, direction, true) {
        Ok(hits) => nearest_valid(&hits).copied(),
        Err(e) => {
            tracing::debug!(?origin, ?direction, "geometry query failed, treating as clear: {e}");
            None
        }
    }
}

/// Gate a proposed displacement.
///
/// Probes are cast from the candidate position `position + (dx, 0, dz)`. If
/// any probe's nearest hit is strictly closer than `clearance`, the whole
/// displacement is cancelled; there is no sliding along the free axis. A hit
/// exactly at `clearance` is allowed.
pub fn resolve<G: GeometryQuery + ?Sized>(
    geometry: &G,
    position: Vec3,
    proposed: Displacement,
    clearance: f32,
) -> Resolution {
    let candidate = position + proposed.as_vec3();

    for probe in PROBE_DIRECTIONS {
        let Some(hit) = cast(geometry, candidate, probe) else {
            continue;
        };
        if hit.distance < clearance {
            tracing::debug!(
                ?candidate,
                ?probe,
                distance = hit.distance,
                object = %hit.object,
                "move cancelled"
            );
            return Resolution {
                displacement: Displacement::ZERO,
                obstruction: Some(Obstruction {
                    probe,
                    distance: hit.distance,
                    object: hit.object,
                }),
            };
        }
    }

    Resolution::clear(proposed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeGeometry;
    use walkthrough_common::ObjectTag;
    use walkthrough_scene::{Scene, SceneObject, Shape};

    #[test]
    fn probes_are_unit_and_distinct() {
        for (i, a) in PROBE_DIRECTIONS.iter().enumerate() {
            assert!((a.length() - 1.0).abs() < 1e-6);
            assert_eq!(a.y, 0.0);
            for b in &PROBE_DIRECTIONS[i + 1..] {
                assert!(a.dot(*b) < 0.99);
            }
        }
    }

    #[test]
    fn empty_geometry_never_blocks() {
        let proposed = Displacement::new(0.1, -0.1);
        let r = resolve(&Scene::new(), Vec3::ZERO, proposed, 0.1);
        assert_eq!(r.displacement, proposed);
        assert!(!r.is_blocked());
    }

    #[test]
    fn close_probe_cancels_everything() {
        let geometry = FakeGeometry::new().obstacle(Vec3::X, 0.05, ObjectTag::Environment);
        let r = resolve(&geometry, Vec3::ZERO, Displacement::new(-0.1, -0.1), 0.1);
        assert_eq!(r.displacement, Displacement::ZERO);
        let obstruction = r.obstruction.unwrap();
        assert_eq!(obstruction.probe, Vec3::X);
        assert_eq!(obstruction.distance, 0.05);
    }

    #[test]
    fn clearance_is_exclusive() {
        let proposed = Displacement::new(0.1, 0.0);

        let at = FakeGeometry::new().obstacle(Vec3::X, 0.1, ObjectTag::Environment);
        assert_eq!(resolve(&at, Vec3::ZERO, proposed, 0.1).displacement, proposed);

        let inside = FakeGeometry::new().obstacle(Vec3::X, 0.099, ObjectTag::Environment);
        assert_eq!(
            resolve(&inside, Vec3::ZERO, proposed, 0.1).displacement,
            Displacement::ZERO
        );
    }

    #[test]
    fn every_probe_direction_can_block() {
        for probe in PROBE_DIRECTIONS {
            let geometry = FakeGeometry::new().obstacle(probe, 0.01, ObjectTag::Environment);
            let r = resolve(&geometry, Vec3::ZERO, Displacement::new(0.0, 0.1), 0.1);
            assert!(r.is_blocked(), "probe {probe:?}");
        }
    }

    #[test]
    fn probes_start_at_the_candidate_position() {
        let geometry = FakeGeometry::new();
        let position = Vec3::new(1.0, 0.0, 2.0);
        resolve(&geometry, position, Displacement::new(0.1, -0.1), 0.1);

        let queries = geometry.queries();
        assert_eq!(queries.len(), PROBE_DIRECTIONS.len());
        for (origin, _) in &queries {
            assert!((*origin - Vec3::new(1.1, 0.0, 1.9)).length() < 1e-6);
        }
        for probe in PROBE_DIRECTIONS {
            assert!(queries.iter().any(|(_, d)| *d == probe));
        }
    }

    #[test]
    fn failed_queries_fail_open() {
        let geometry = FakeGeometry::failing();
        let proposed = Displacement::new(0.1, 0.1);
        assert_eq!(resolve(&geometry, Vec3::ZERO, proposed, 0.1).displacement, proposed);
    }

    #[test]
    fn malformed_distances_fail_open() {
        let geometry = FakeGeometry::new()
            .obstacle(Vec3::X, f32::NAN, ObjectTag::Environment)
            .obstacle(Vec3::NEG_X, -0.5, ObjectTag::Environment);
        let proposed = Displacement::new(0.1, 0.0);
        assert_eq!(resolve(&geometry, Vec3::ZERO, proposed, 0.1).displacement, proposed);
    }

    #[test]
    fn diagonal_move_near_one_wall_stops_both_axes() {
        // A wall just past the candidate on +X; the Z component is free but
        // is cancelled as well.
        let mut scene = Scene::new();
        scene.add_object(
            SceneObject::new("wall", Shape::Cuboid {
                size: Vec3::new(0.2, 2.0, 10.0),
            })
            .at(Vec3::new(0.25, 0.0, 0.0)),
        );
        let proposed = Displacement::new(0.1, -0.1);
        let r = resolve(&scene, Vec3::ZERO, proposed, 0.1);
        assert_eq!(r.displacement, Displacement::ZERO);
        assert!((r.obstruction.unwrap().distance - 0.05).abs() < 1e-5);
    }

    #[test]
    fn open_space_in_a_real_scene_commits() {
        let mut scene = Scene::new();
        scene.add_object(
            SceneObject::new("wall", Shape::Cuboid {
                size: Vec3::new(0.2, 2.0, 10.0),
            })
            .at(Vec3::new(3.0, 0.0, 0.0)),
        );
        let proposed = Displacement::new(0.1, 0.0);
        assert!(!resolve(&scene, Vec3::ZERO, proposed, 0.1).is_blocked());
    }
}
