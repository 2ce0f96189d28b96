//! wgpu backend for the mixed-resolution compositor.
//!
//! Draws a flat list of layered cubes (plus a grid floor on its own layer)
//! for any camera, hands out pooled colour + depth temporaries, and performs
//! the depth-writing blit the compositor's two passes rely on.
//!
//! # Invariants
//! - Every image is a colour texture plus a `Depth32Float` texture.
//! - Each backend operation submits its own command buffer, so uniform
//!   writes never bleed between cameras within a frame.
//! - Blit pipelines are cached per blend/depth state.

mod backend;
mod camera;
mod pipeline;
mod scene;
mod shaders;
mod target;

pub use backend::{BlitMaterial, WgpuBackend};
pub use scene::{SceneObject, SceneRenderer};
pub use target::{create_depth_texture, RenderImage, TargetPool, DEPTH_FORMAT};
