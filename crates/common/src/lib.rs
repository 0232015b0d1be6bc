//! Shared types for the walkthrough navigation demo.

mod types;

pub use types::{HighlightState, ObjectId, ObjectTag, Pose};
