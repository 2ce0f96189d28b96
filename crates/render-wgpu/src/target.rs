use scaleview_render::Extent;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Most temporaries kept around for reuse.
const POOL_CAPACITY: usize = 4;

/// A colour view paired with a depth view of the same size.
pub struct RenderImage {
    pub color: wgpu::TextureView,
    pub depth: wgpu::TextureView,
    pub extent: Extent,
}

impl RenderImage {
    /// An offscreen image whose colour and depth can both be rendered to and
    /// sampled.
    pub fn offscreen(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        extent: Extent,
        label: &str,
    ) -> Self {
        let extent = non_zero(extent);
        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent3d(extent),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let depth = create_depth_texture(device, extent);
        Self {
            color: color.create_view(&Default::default()),
            depth: depth.create_view(&Default::default()),
            extent,
        }
    }

    /// Wrap existing views, e.g. a swapchain image plus a depth buffer.
    pub fn from_views(color: wgpu::TextureView, depth: wgpu::TextureView, extent: Extent) -> Self {
        Self {
            color,
            depth,
            extent,
        }
    }
}

/// Depth texture usable as an attachment and as a sampled texture.
pub fn create_depth_texture(device: &wgpu::Device, extent: Extent) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: extent3d(non_zero(extent)),
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    })
}

/// Free list of released temporaries, matched by exact extent.
#[derive(Default)]
pub struct TargetPool {
    free: Vec<RenderImage>,
    live: usize,
}

impl TargetPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse a pooled image of this extent, or build a fresh one.
    pub fn acquire(
        &mut self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        extent: Extent,
    ) -> RenderImage {
        let wanted = non_zero(extent);
        self.live += 1;
        match self.free.iter().position(|img| img.extent == wanted) {
            Some(i) => self.free.swap_remove(i),
            None => {
                tracing::debug!(%wanted, "allocating temporary target");
                RenderImage::offscreen(device, format, wanted, "temporary_target")
            }
        }
    }

    pub fn release(&mut self, image: RenderImage) {
        self.live = self.live.saturating_sub(1);
        if self.free.len() >= POOL_CAPACITY {
            // Oldest entry goes first.
            self.free.remove(0);
        }
        self.free.push(image);
    }

    pub fn live(&self) -> usize {
        self.live
    }

    pub fn pooled(&self) -> usize {
        self.free.len()
    }

    /// Drop every pooled image, e.g. after the output is resized.
    pub fn clear(&mut self) {
        self.free.clear();
    }
}

/// wgpu rejects zero-sized textures.
fn non_zero(extent: Extent) -> Extent {
    Extent::new(extent.width.max(1), extent.height.max(1))
}

fn extent3d(extent: Extent) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: extent.width,
        height: extent.height,
        depth_or_array_layers: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_extent_is_clamped() {
        assert_eq!(non_zero(Extent::new(0, 5)), Extent::new(1, 5));
        assert_eq!(non_zero(Extent::new(7, 0)), Extent::new(7, 1));
    }

    #[test]
    fn extent3d_is_single_layer() {
        let e = extent3d(Extent::new(3, 4));
        assert_eq!((e.width, e.height, e.depth_or_array_layers), (3, 4, 1));
    }

    #[test]
    fn empty_pool() {
        let pool = TargetPool::new();
        assert_eq!(pool.live(), 0);
        assert_eq!(pool.pooled(), 0);
    }
}
