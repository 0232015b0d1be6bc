use crate::collision::{Obstruction, Resolution, resolve};
use crate::config::NavConfig;
use crate::movement::{Displacement, integrate};
use crate::picker::update_highlights;
use serde::Serialize;
use walkthrough_common::{HighlightState, ObjectId, Pose};
use walkthrough_input::{Action, InputState, KeyBindings};
use walkthrough_scene::GeometryQuery;

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameReport {
    /// 1-based frame number.
    pub frame: u64,
    /// Pose after the commit.
    pub pose: Pose,
    pub proposed: Displacement,
    pub committed: Displacement,
    pub obstruction: Option<Obstruction>,
    pub target: Option<ObjectId>,
}

impl FrameReport {
    pub fn blocked(&self) -> bool {
        self.obstruction.is_some()
    }
}

/// Owner of all mutable navigation state.
///
/// Input events write the action set between ticks; [`Navigator::tick`] is the
/// only writer of the pose and the highlights.
#[derive(Debug, Clone)]
pub struct Navigator {
    config: NavConfig,
    input: InputState,
    pose: Pose,
    highlights: HighlightState,
    frame: u64,
}

impl Navigator {
    pub fn new(config: NavConfig, bindings: KeyBindings, spawn: Pose) -> Self {
        Self {
            config,
            input: InputState::new(bindings),
            pose: spawn,
            highlights: HighlightState::new(),
            frame: 0,
        }
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn highlights(&self) -> &HighlightState {
        &self.highlights
    }

    /// Number of completed ticks.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn key_down(&mut self, key: &str) -> Option<Action> {
        self.input.key_down(key)
    }

    pub fn key_up(&mut self, key: &str) -> Option<Action> {
        self.input.key_up(key)
    }

    /// Run one frame: integrate, resolve and commit, then pick.
    pub fn tick<G: GeometryQuery + ?Sized>(&mut self, geometry: &G) -> FrameReport {
        let frame = self.frame + 1;
        let _span = tracing::trace_span!("frame", frame).entered();

        let actions = *self.input.actions();

        let motion = integrate(&actions, self.pose.yaw, &self.config);
        self.pose.yaw = motion.yaw;

        // A zero move commits zero whatever the probes say.
        let resolution = if motion.displacement.is_zero() {
            Resolution::clear(Displacement::ZERO)
        } else {
            resolve(
                geometry,
                self.pose.position,
                motion.displacement,
                self.config.clearance,
            )
        };
        self.pose.position += resolution.displacement.as_vec3();

        let target = update_highlights(
            geometry,
            &self.pose,
            actions.is_held(Action::Trigger),
            &mut self.highlights,
        );

        self.frame = frame;
        let report = FrameReport {
            frame,
            pose: self.pose,
            proposed: motion.displacement,
            committed: resolution.displacement,
            obstruction: resolution.obstruction,
            target,
        };
        tracing::trace!(
            x = self.pose.position.x,
            z = self.pose.position.z,
            yaw = self.pose.yaw,
            blocked = report.blocked(),
            "frame committed"
        );
        report
    }
}

/// Whether the run loop should request another frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Stop,
}

/// The host side of the run loop: input delivery and rendering.
pub trait FrameHost {
    /// Apply input events that arrived before `frame` (1-based) runs.
    fn poll_input(&mut self, frame: u64, input: &mut InputState) -> LoopControl;

    /// Render request for the frame just committed.
    fn present(&mut self, navigator: &Navigator, report: &FrameReport);
}

/// Drive frames until the host stops or `max_frames` have run. Returns the
/// number of frames run.
pub fn run<G, H>(
    navigator: &mut Navigator,
    geometry: &G,
    host: &mut H,
    max_frames: Option<u64>,
) -> u64
where
    G: GeometryQuery + ?Sized,
    H: FrameHost + ?Sized,
{
    let mut frames = 0;
    while max_frames.is_none_or(|max| frames < max) {
        let next = navigator.frame() + 1;
        if host.poll_input(next, navigator.input_mut()) == LoopControl::Stop {
            break;
        }
        let report = navigator.tick(geometry);
        host.present(navigator, &report);
        frames += 1;
    }
    tracing::debug!(frames, "run loop finished");
    frames
}
