//! Navigation kernel: turns held actions into a committed camera pose, one
//! frame at a time.
//!
//! Per tick, in order: integrate yaw and a proposed displacement, gate the
//! displacement with eight clearance probes, commit, then pick the target
//! under the crosshair.
//!
//! # Invariants
//! - Each stage is a pure function of its inputs and the fixed [`NavConfig`].
//! - Yaw always applies; translation is all-or-nothing.
//! - Geometry failures fail open: no obstruction, no target.
//! - The kernel never fails a frame.

pub mod collision;
pub mod config;
pub mod frame;
pub mod movement;
pub mod picker;

pub use collision::{Obstruction, PROBE_DIRECTIONS, Resolution, resolve};
pub use config::{ConfigError, NavConfig, Settings};
pub use frame::{FrameHost, FrameReport, LoopControl, Navigator, run};
pub use movement::{Displacement, Motion, integrate, local_velocity};
pub use picker::{pick_target, update_highlights};

pub fn crate_info() -> &'static str {
    "walkthrough-kernel v0.1.0"
}
