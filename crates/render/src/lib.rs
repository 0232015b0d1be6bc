//! Rendering adapter: renderer-agnostic view and frame interface.
//!
//! # Invariants
//! - Renderers cannot mutate the pose, the input or the scene.
//! - The view's aspect ratio is updated on resize before the next frame.
//! - Highlighting lasts one frame; colours derive from the frame's highlight state.

mod renderer;
mod view;

pub use renderer::{DebugTextRenderer, FrameView, Renderer};
pub use view::RenderView;

pub fn crate_info() -> &'static str {
    "walkthrough-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
