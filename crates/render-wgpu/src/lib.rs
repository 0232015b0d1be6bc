//! wgpu render backend for the walkthrough.
//!
//! Draws every scene object as an instanced, lit box under exponential fog,
//! recolouring highlighted objects.
//!
//! # Invariants
//! - Renderer never mutates the scene, the pose or the highlight state.
//! - The depth buffer and view aspect follow the surface size.

mod gpu;
mod shaders;

pub use gpu::WgpuRenderer;
