//! Input: key identifiers mapped onto a closed set of held actions.
//!
//! # Invariants
//! - Every action has a defined held flag at all times (default released).
//! - Only key events write the action set; frame processing only reads it.
//! - Unbound keys are no-ops, never errors.

pub mod action;
pub mod bindings;

pub use action::{Action, ActionSet};
pub use bindings::{InputState, KeyBindings};

pub fn crate_info() -> &'static str {
    "walkthrough-input v0.1.0"
}
