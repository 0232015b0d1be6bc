use crate::collision::cast;
use walkthrough_common::{HighlightState, ObjectId, Pose};
use walkthrough_scene::GeometryQuery;

/// The hittable object under the crosshair, if the nearest surface along the
/// view ray belongs to one. A non-hittable surface in front hides anything
/// behind it.
pub fn pick_target<G: GeometryQuery + ?Sized>(geometry: &G, pose: &Pose) -> Option<ObjectId> {
    let hit = cast(geometry, pose.position, pose.forward())?;
    hit.tag.is_hittable().then_some(hit.object)
}

/// Reset every highlight, then, while the trigger is held, highlight the
/// current target. Highlights therefore last exactly one frame.
pub fn update_highlights<G: GeometryQuery + ?Sized>(
    geometry: &G,
    pose: &Pose,
    trigger_held: bool,
    highlights: &mut HighlightState,
) -> Option<ObjectId> {
    highlights.reset();
    if !trigger_held {
        return None;
    }
    let target = pick_target(geometry, pose)?;
    tracing::trace!(target = %target, "target highlighted");
    highlights.highlight(target);
    Some(target)
}
