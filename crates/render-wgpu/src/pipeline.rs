//! Pipeline building blocks shared by the scene and blit passes.

use crate::target::DEPTH_FORMAT;

/// Depth state for a pass that writes depth and tests with `compare`.
///
/// Scene draws use `Less`; the blits pick whatever their `BlitState` asks for.
pub(crate) fn depth_state(compare: wgpu::CompareFunction) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: true,
        depth_compare: compare,
        stencil: Default::default(),
        bias: Default::default(),
    }
}

pub(crate) fn color_target(
    format: wgpu::TextureFormat,
    blend: wgpu::BlendState,
) -> Option<wgpu::ColorTargetState> {
    Some(wgpu::ColorTargetState {
        format,
        blend: Some(blend),
        write_mask: wgpu::ColorWrites::ALL,
    })
}

pub(crate) fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// A fragment-stage 2D texture binding.
pub(crate) fn texture_entry(binding: u32, sample_type: wgpu::TextureSampleType) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type,
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

pub(crate) fn wgsl_module(device: &wgpu::Device, label: &str, source: &str) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    })
}

/// One bind group layout and the pipeline layout that uses only it.
pub(crate) fn single_group_layout(
    device: &wgpu::Device,
    label: &str,
    entries: &[wgpu::BindGroupLayoutEntry],
) -> (wgpu::BindGroupLayout, wgpu::PipelineLayout) {
    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries,
    });
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });
    (bind_group_layout, pipeline_layout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_state_always_writes_in_depth_format() {
        for compare in [wgpu::CompareFunction::Less, wgpu::CompareFunction::Always] {
            let state = depth_state(compare);
            assert_eq!(state.format, DEPTH_FORMAT);
            assert!(state.depth_write_enabled);
            assert_eq!(state.depth_compare, compare);
        }
    }

    #[test]
    fn color_target_writes_every_channel() {
        let target = color_target(wgpu::TextureFormat::Rgba8Unorm, wgpu::BlendState::ALPHA_BLENDING)
            .unwrap();
        assert_eq!(target.write_mask, wgpu::ColorWrites::ALL);
        assert_eq!(target.blend, Some(wgpu::BlendState::ALPHA_BLENDING));
    }

    #[test]
    fn texture_entries_are_fragment_only() {
        let entry = texture_entry(1, wgpu::TextureSampleType::Depth);
        assert_eq!(entry.binding, 1);
        assert_eq!(entry.visibility, wgpu::ShaderStages::FRAGMENT);
        assert!(matches!(
            entry.ty,
            wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Depth,
                ..
            }
        ));
    }

    #[test]
    fn uniform_entry_keeps_visibility() {
        let stages = wgpu::ShaderStages::VERTEX_FRAGMENT;
        let entry = uniform_entry(0, stages);
        assert_eq!(entry.visibility, stages);
        assert!(matches!(entry.ty, wgpu::BindingType::Buffer { .. }));
    }
}
