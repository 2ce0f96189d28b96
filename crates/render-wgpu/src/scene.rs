use crate::camera::{clear_color, CameraUniform};
use crate::pipeline;
use crate::shaders;
use crate::target::RenderImage;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use scaleview_common::Transform;
use scaleview_render::{Camera, ClearMode};
use wgpu::util::DeviceExt;

/// A cube in the demo scene, tagged with the layer it renders on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneObject {
    pub transform: Transform,
    pub layer: u8,
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
    tint: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct GridVertex {
    position: [f32; 3],
    color: [f32; 4],
}

/// Unit cube, one quad per face so normals stay flat.
fn cube_mesh() -> (Vec<Vertex>, Vec<u16>) {
    const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        // (normal, u axis, v axis)
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (n, u, v) in FACES {
        let base = vertices.len() as u16;
        for (su, sv) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            let position = [
                0.5 * n[0] + su * u[0] + sv * v[0],
                0.5 * n[1] + su * u[1] + sv * v[1],
                0.5 * n[2] + su * u[2] + sv * v[2],
            ];
            vertices.push(Vertex {
                position,
                normal: n,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    (vertices, indices)
}

/// Grid floor line list on the y = 0 plane. The two lines through the origin
/// are coloured after the axis they run along (+X red, +Z blue).
fn grid_mesh(half_extent: i32, spacing: f32) -> Vec<GridVertex> {
    const LINE: [f32; 4] = [0.4, 0.4, 0.4, 1.0];
    const X_AXIS: [f32; 4] = [0.75, 0.25, 0.25, 1.0];
    const Z_AXIS: [f32; 4] = [0.25, 0.35, 0.8, 1.0];

    let extent = half_extent as f32 * spacing;
    let mut verts = Vec::with_capacity(((2 * half_extent + 1) * 4) as usize);
    for i in -half_extent..=half_extent {
        let offset = i as f32 * spacing;
        let (along_x, along_z) = if i == 0 { (X_AXIS, Z_AXIS) } else { (LINE, LINE) };
        for (position, color) in [
            ([-extent, 0.0, offset], along_x),
            ([extent, 0.0, offset], along_x),
            ([offset, 0.0, -extent], along_z),
            ([offset, 0.0, extent], along_z),
        ] {
            verts.push(GridVertex { position, color });
        }
    }
    verts
}

/// Per-layer tint: `rgb` is a hue picked by walking the colour wheel in
/// golden-ratio steps, `a` is how strongly it is mixed in. Layer 0 is untinted.
fn layer_tint(layer: u8) -> [f32; 4] {
    if layer == 0 {
        return [1.0, 1.0, 1.0, 0.0];
    }
    let hue = (layer as f32 * 0.618_034).fract();
    let phase = Vec3::new(0.0, 1.0 / 3.0, 2.0 / 3.0);
    let rgb = (std::f32::consts::TAU * (Vec3::splat(hue) + phase))
        .to_array()
        .map(|a| 0.5 + 0.5 * a.cos());
    [rgb[0], rgb[1], rgb[2], 0.35]
}

fn instances_for(camera: &Camera, objects: &[SceneObject], max: usize) -> Vec<InstanceData> {
    objects
        .iter()
        .filter(|o| camera.culling_mask.contains(o.layer))
        .take(max)
        .map(|o| {
            let t = &o.transform;
            let cols = Mat4::from_scale_rotation_translation(t.scale, t.rotation, t.position)
                .to_cols_array_2d();
            InstanceData {
                model_0: cols[0],
                model_1: cols[1],
                model_2: cols[2],
                model_3: cols[3],
                color: o.color,
                tint: layer_tint(o.layer),
            }
        })
        .collect()
}

fn create_cube_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let module = pipeline::wgsl_module(device, "scene_shader", shaders::SCENE_SHADER);
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("scene_cubes"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &module,
            entry_point: Some("vs_scene"),
            compilation_options: Default::default(),
            buffers: &[
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
                },
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<InstanceData>() as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &wgpu::vertex_attr_array![
                        2 => Float32x4,
                        3 => Float32x4,
                        4 => Float32x4,
                        5 => Float32x4,
                        6 => Float32x4,
                        7 => Float32x4,
                    ],
                },
            ],
        },
        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: Some("fs_scene"),
            compilation_options: Default::default(),
            targets: &[pipeline::color_target(color_format, wgpu::BlendState::REPLACE)],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            // The view is left-handed, so outward faces wound counter-clockwise
            // in world space land clockwise on screen.
            front_face: wgpu::FrontFace::Cw,
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(pipeline::depth_state(wgpu::CompareFunction::Less)),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

fn create_grid_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let module = pipeline::wgsl_module(device, "grid_shader", shaders::GRID_SHADER);
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("scene_grid"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &module,
            entry_point: Some("vs_grid"),
            compilation_options: Default::default(),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<GridVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4],
            }],
        },
        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: Some("fs_grid"),
            compilation_options: Default::default(),
            targets: &[pipeline::color_target(color_format, wgpu::BlendState::REPLACE)],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::LineList,
            ..Default::default()
        },
        depth_stencil: Some(pipeline::depth_state(wgpu::CompareFunction::Less)),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

/// Draws the layered demo scene for one camera at a time.
pub struct SceneRenderer {
    cube_pipeline: wgpu::RenderPipeline,
    grid_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    cube_vertex_buffer: wgpu::Buffer,
    cube_index_buffer: wgpu::Buffer,
    cube_index_count: u32,
    grid_vertex_buffer: wgpu::Buffer,
    grid_vertex_count: u32,
    instance_buffer: wgpu::Buffer,
    max_instances: u32,
    /// Layer the grid floor belongs to.
    pub grid_layer: u8,
}

impl SceneRenderer {
    pub fn new(device: &wgpu::Device, color_format: wgpu::TextureFormat) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("scene_camera_uniform"),
            contents: bytemuck::bytes_of(&CameraUniform::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let (bind_group_layout, pipeline_layout) = pipeline::single_group_layout(
            device,
            "scene_layout",
            &[pipeline::uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)],
        );
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_camera_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let cube_pipeline = create_cube_pipeline(device, &pipeline_layout, color_format);
        let grid_pipeline = create_grid_pipeline(device, &pipeline_layout, color_format);

        let (cube_verts, cube_indices) = cube_mesh();
        let cube_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_vertex_buffer"),
            contents: bytemuck::cast_slice(&cube_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let cube_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_index_buffer"),
            contents: bytemuck::cast_slice(&cube_indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let grid_verts = grid_mesh(50, 1.0);
        let grid_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("grid_vertex_buffer"),
            contents: bytemuck::cast_slice(&grid_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let max_instances = 10_000u32;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (max_instances as u64) * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            cube_pipeline,
            grid_pipeline,
            uniform_buffer,
            uniform_bind_group,
            cube_vertex_buffer,
            cube_index_buffer,
            cube_index_count: cube_indices.len() as u32,
            grid_vertex_buffer,
            grid_vertex_count: grid_verts.len() as u32,
            instance_buffer,
            max_instances,
            grid_layer: 0,
        }
    }

    /// Draw the objects on `camera`'s layers into `target`.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        camera: &Camera,
        objects: &[SceneObject],
        target: &RenderImage,
    ) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&CameraUniform::from_camera(camera)),
        );

        let instances = instances_for(camera, objects, self.max_instances as usize);
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }
        let draw_grid = camera.culling_mask.contains(self.grid_layer);

        let color_load = match camera.clear {
            ClearMode::SolidColor(rgba) => wgpu::LoadOp::Clear(clear_color(rgba)),
            ClearMode::DepthOnly => wgpu::LoadOp::Load,
        };

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("scene_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.color,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &target.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            if draw_grid {
                pass.set_pipeline(&self.grid_pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_vertex_buffer(0, self.grid_vertex_buffer.slice(..));
                pass.draw(0..self.grid_vertex_count, 0..1);
            }

            if !instances.is_empty() {
                pass.set_pipeline(&self.cube_pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_vertex_buffer(0, self.cube_vertex_buffer.slice(..));
                pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                pass.set_index_buffer(self.cube_index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..self.cube_index_count, 0, 0..instances.len() as u32);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
        tracing::trace!(
            layers = %camera.culling_mask,
            instances = instances.len(),
            grid = draw_grid,
            "scene rendered"
        );
    }
}
