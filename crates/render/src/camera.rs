use crate::scale::Extent;
use glam::Mat4;
use scaleview_common::{LayerMask, Transform};

/// Perspective projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y: 60.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Projection {
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_lh(self.fov_y, self.aspect, self.near, self.far)
    }
}

/// What a camera does to its target before drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearMode {
    /// Clear colour to the given RGBA and depth to the far plane.
    SolidColor([f32; 4]),
    /// Keep colour, clear depth only.
    DepthOnly,
}

impl ClearMode {
    pub const TRANSPARENT: ClearMode = ClearMode::SolidColor([0.0, 0.0, 0.0, 0.0]);
}

/// A camera: pose, projection, target size and which layers it draws.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub transform: Transform,
    pub projection: Projection,
    pub pixel_extent: Extent,
    pub clear: ClearMode,
    pub culling_mask: LayerMask,
    /// Whether the host renders this camera automatically each frame.
    pub enabled: bool,
    /// Hidden cameras are internal helpers: not listed, not saved.
    pub hidden: bool,
}

impl Camera {
    pub fn new(pixel_extent: Extent) -> Self {
        Self {
            transform: Transform::default(),
            projection: Projection {
                aspect: pixel_extent.aspect(),
                ..Projection::default()
            },
            pixel_extent,
            clear: ClearMode::SolidColor([0.1, 0.1, 0.15, 1.0]),
            culling_mask: LayerMask::ALL,
            enabled: true,
            hidden: false,
        }
    }

    /// Resize the target and keep the aspect ratio in step.
    pub fn set_pixel_extent(&mut self, extent: Extent) {
        self.pixel_extent = extent;
        self.projection.aspect = extent.aspect();
    }

    pub fn view_matrix(&self) -> Mat4 {
        let t = &self.transform;
        Mat4::look_to_lh(t.position, t.forward(), t.up())
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection.matrix()
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
