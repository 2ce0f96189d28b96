use bytemuck::{Pod, Zeroable};
use scaleview_render::Camera;

/// Per-camera uniform block shared by the scene and grid shaders.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    /// World-space eye position; `w` is unused.
    pub eye: [f32; 4],
}

impl CameraUniform {
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            eye: camera.transform.position.extend(1.0).to_array(),
        }
    }
}

/// Convert a camera clear colour to the wgpu representation.
pub(crate) fn clear_color(rgba: [f32; 4]) -> wgpu::Color {
    wgpu::Color {
        r: rgba[0] as f64,
        g: rgba[1] as f64,
        b: rgba[2] as f64,
        a: rgba[3] as f64,
    }
}
