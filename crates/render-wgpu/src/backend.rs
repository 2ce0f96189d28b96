use crate::pipeline;
use crate::scene::{SceneObject, SceneRenderer};
use crate::shaders;
use crate::target::{RenderImage, TargetPool};
use scaleview_render::{
    BlendFactor, BlitState, Camera, CompareFunction, Extent, RenderBackend, RenderError,
    TargetDesc, BLIT_SHADER,
};
use std::collections::HashMap;

/// Compiled blit shader plus the bindings it samples through.
pub struct BlitMaterial {
    id: u64,
    shader: wgpu::ShaderModule,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    sampler: wgpu::Sampler,
}

/// [`RenderBackend`] over a wgpu device.
///
/// Owns the device and queue; the host borrows them back through
/// [`WgpuBackend::device`] and [`WgpuBackend::queue`] for surface setup and UI.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    color_format: wgpu::TextureFormat,
    scene: SceneRenderer,
    objects: Vec<SceneObject>,
    pool: TargetPool,
    blit_pipelines: HashMap<(u64, BlitState), wgpu::RenderPipeline>,
    next_material_id: u64,
}

impl WgpuBackend {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, color_format: wgpu::TextureFormat) -> Self {
        let scene = SceneRenderer::new(&device, color_format);
        Self {
            device,
            queue,
            color_format,
            scene,
            objects: Vec::new(),
            pool: TargetPool::new(),
            blit_pipelines: HashMap::new(),
            next_material_id: 0,
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.color_format
    }

    pub fn scene_mut(&mut self) -> &mut SceneRenderer {
        &mut self.scene
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn set_objects(&mut self, objects: Vec<SceneObject>) {
        self.objects = objects;
    }

    /// An offscreen colour + depth image in the backend's colour format.
    pub fn create_image(&self, extent: Extent, label: &str) -> RenderImage {
        RenderImage::offscreen(&self.device, self.color_format, extent, label)
    }

    pub fn pool(&self) -> &TargetPool {
        &self.pool
    }

    /// Forget pooled temporaries, e.g. after the output was resized.
    pub fn trim_pool(&mut self) {
        self.pool.clear();
    }

    fn blit_pipeline(&mut self, material: &BlitMaterial, state: BlitState) -> &wgpu::RenderPipeline {
        let device = &self.device;
        let color_format = self.color_format;
        self.blit_pipelines
            .entry((material.id, state))
            .or_insert_with(|| {
                tracing::debug!(?state, "building blit pipeline");
                create_blit_pipeline(device, material, color_format, state)
            })
    }
}

impl RenderBackend for WgpuBackend {
    type Image = RenderImage;
    type Material = BlitMaterial;

    fn load_material(&mut self, shader: &str) -> Result<BlitMaterial, RenderError> {
        if shader != BLIT_SHADER {
            return Err(RenderError::ShaderNotFound(shader.to_string()));
        }

        let module = pipeline::wgsl_module(&self.device, "blit_shader", shaders::BLIT_SHADER);
        let (bind_group_layout, pipeline_layout) = pipeline::single_group_layout(
            &self.device,
            "blit_layout",
            &[
                pipeline::texture_entry(0, wgpu::TextureSampleType::Float { filterable: true }),
                pipeline::texture_entry(1, wgpu::TextureSampleType::Depth),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        );

        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("blit_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let id = self.next_material_id;
        self.next_material_id += 1;
        tracing::info!(shader, "blit material loaded");

        Ok(BlitMaterial {
            id,
            shader: module,
            bind_group_layout,
            pipeline_layout,
            sampler,
        })
    }

    fn acquire_temporary(&mut self, desc: &TargetDesc) -> Result<RenderImage, RenderError> {
        Ok(self.pool.acquire(&self.device, self.color_format, desc.extent))
    }

    fn release_temporary(&mut self, image: RenderImage) {
        self.pool.release(image);
    }

    fn render_camera(&mut self, camera: &Camera, target: &RenderImage) -> Result<(), RenderError> {
        self.scene
            .render(&self.device, &self.queue, camera, &self.objects, target);
        Ok(())
    }

    fn blit(
        &mut self,
        source: &RenderImage,
        dest: &RenderImage,
        material: &BlitMaterial,
        state: BlitState,
    ) -> Result<(), RenderError> {
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("blit_bind_group"),
            layout: &material.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&source.color),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&source.depth),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&material.sampler),
                },
            ],
        });

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("blit_encoder"),
        });
        let pipeline = self.blit_pipeline(material, state);

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("blit_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &dest.color,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &dest.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }
}

fn create_blit_pipeline(
    device: &wgpu::Device,
    material: &BlitMaterial,
    color_format: wgpu::TextureFormat,
    state: BlitState,
) -> wgpu::RenderPipeline {
    let blend = wgpu::BlendComponent {
        src_factor: blend_factor(state.src_blend),
        dst_factor: blend_factor(state.dst_blend),
        operation: wgpu::BlendOperation::Add,
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("blit_pipeline"),
        layout: Some(&material.pipeline_layout),
        vertex: wgpu::VertexState {
            module: &material.shader,
            entry_point: Some("vs_blit"),
            compilation_options: Default::default(),
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module: &material.shader,
            entry_point: Some("fs_blit"),
            compilation_options: Default::default(),
            targets: &[pipeline::color_target(
                color_format,
                wgpu::BlendState {
                    color: blend,
                    alpha: blend,
                },
            )],
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: Some(pipeline::depth_state(compare_function(state.depth_test))),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

fn blend_factor(factor: BlendFactor) -> wgpu::BlendFactor {
    match factor {
        BlendFactor::Zero => wgpu::BlendFactor::Zero,
        BlendFactor::One => wgpu::BlendFactor::One,
        BlendFactor::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
    }
}

fn compare_function(compare: CompareFunction) -> wgpu::CompareFunction {
    match compare {
        CompareFunction::Never => wgpu::CompareFunction::Never,
        CompareFunction::Less => wgpu::CompareFunction::Less,
        CompareFunction::Equal => wgpu::CompareFunction::Equal,
        CompareFunction::LessEqual => wgpu::CompareFunction::LessEqual,
        CompareFunction::Greater => wgpu::CompareFunction::Greater,
        CompareFunction::NotEqual => wgpu::CompareFunction::NotEqual,
        CompareFunction::GreaterEqual => wgpu::CompareFunction::GreaterEqual,
        CompareFunction::Always => wgpu::CompareFunction::Always,
    }
}
