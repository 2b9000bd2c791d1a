//! WebGPU rendering module
//!
//! Draws the blade ribbon and optional debug lines over the scene. The 3D
//! scene itself is rendered by the host page.

pub mod pipeline;
pub mod vertex;

pub use pipeline::OverlayRenderState;
pub use vertex::Vertex;
