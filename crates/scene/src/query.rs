use glam::Vec3;
use walkthrough_common::{ObjectId, ObjectTag};

/// One ray/surface intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Distance from the ray origin along the normalized direction.
    pub distance: f32,
    pub object: ObjectId,
    pub tag: ObjectTag,
}

impl Hit {
    /// Finite and non-negative. Anything else is malformed and ignored.
    pub fn is_valid(&self) -> bool {
        self.distance.is_finite() && self.distance >= 0.0
    }
}

/// Errors from a geometry query.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("degenerate ray direction {0:?}")]
    DegenerateDirection(Vec3),
    #[error("non-finite ray origin {0:?}")]
    NonFiniteOrigin(Vec3),
    #[error("geometry unavailable: {0}")]
    Unavailable(String),
}

/// Ray intersection service over static scene geometry.
///
/// Implementations return hits sorted ascending by distance. An empty result
/// is a normal answer, not an error. With `recursive` set, grouped children
/// are traversed; without it only root-level objects are tested.
pub trait GeometryQuery {
    fn intersect(
        &self,
        origin: Vec3,
        direction: Vec3,
        recursive: bool,
    ) -> Result<Vec<Hit>, QueryError>;
}

impl<T: GeometryQuery + ?Sized> GeometryQuery for &T {
    fn intersect(
        &self,
        origin: Vec3,
        direction: Vec3,
        recursive: bool,
    ) -> Result<Vec<Hit>, QueryError> {
        (**self).intersect(origin, direction, recursive)
    }
}

/// Nearest valid hit, independent of the order the service returned.
pub fn nearest_valid(hits: &[Hit]) -> Option<&Hit> {
    hits.iter()
        .filter(|h| h.is_valid())
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(distance: f32) -> Hit {
        Hit {
            distance,
            object: ObjectId::new(),
            tag: ObjectTag::Environment,
        }
    }

    #[test]
    fn nearest_of_empty_is_none() {
        assert!(nearest_valid(&[]).is_none());
    }

    #[test]
    fn nearest_ignores_order() {
        let hits = [hit(3.0), hit(0.5), hit(2.0)];
        assert_eq!(nearest_valid(&hits).unwrap().distance, 0.5);
    }

    #[test]
    fn malformed_hits_are_skipped() {
        let hits = [hit(f32::NAN), hit(-1.0), hit(f32::INFINITY), hit(4.0)];
        assert_eq!(nearest_valid(&hits).unwrap().distance, 4.0);

        let only_bad = [hit(f32::NAN), hit(-0.01)];
        assert!(nearest_valid(&only_bad).is_none());
    }

    #[test]
    fn zero_distance_is_valid() {
        assert!(hit(0.0).is_valid());
    }
}
