use crate::blit::BlitState;
use crate::camera::Camera;
use crate::error::RenderError;
use crate::scale::Extent;

/// Name of the compositing shader: copies colour and writes the source
/// image's depth as fragment depth.
pub const BLIT_SHADER: &str = "blit_copy_with_last_camera_depth";

/// Colour storage for a render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorFormat {
    /// Whatever the backend uses for its presentable images.
    #[default]
    Default,
}

/// Description of a temporary colour + depth target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetDesc {
    pub extent: Extent,
    pub depth_bits: u8,
    pub format: ColorFormat,
}

impl TargetDesc {
    pub fn color_depth(extent: Extent) -> Self {
        Self {
            extent,
            depth_bits: 24,
            format: ColorFormat::Default,
        }
    }
}

/// The rendering collaborator the compositor drives.
///
/// Images are colour + depth pairs. The caller supplies the primary camera's
/// finished image and the output image; temporaries come from
/// [`RenderBackend::acquire_temporary`] and must go back through
/// [`RenderBackend::release_temporary`].
pub trait RenderBackend {
    type Image;
    type Material;

    /// Build a material for a named shader.
    fn load_material(&mut self, shader: &str) -> Result<Self::Material, RenderError>;

    fn acquire_temporary(&mut self, desc: &TargetDesc) -> Result<Self::Image, RenderError>;

    fn release_temporary(&mut self, image: Self::Image);

    /// Render the layers in `camera.culling_mask` into `target`, clearing as
    /// `camera.clear` says.
    fn render_camera(&mut self, camera: &Camera, target: &Self::Image) -> Result<(), RenderError>;

    /// Full-screen blit of `source` onto `dest` with the given state.
    fn blit(
        &mut self,
        source: &Self::Image,
        dest: &Self::Image,
        material: &Self::Material,
        state: BlitState,
    ) -> Result<(), RenderError>;
}
