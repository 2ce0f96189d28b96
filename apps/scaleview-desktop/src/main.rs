mod demo;

use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec3;
use scaleview_common::{LayerMask, Settings, Transform};
use scaleview_control::FlyController;
use scaleview_input::{Axis, Bindings, Component, ControlState};
use scaleview_render::{
    Camera, Extent, MixedResolutionCompositor, RenderBackend, ScaleFactors, MAX_SCALE, MIN_SCALE,
};
use scaleview_render_wgpu::{create_depth_texture, RenderImage, WgpuBackend};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "scaleview-desktop", about = "Mixed-resolution layer viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Settings file (JSON). Without it a demo configuration is used.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the width scale factor
    #[arg(long)]
    width_scale: Option<f32>,

    /// Override the height scale factor
    #[arg(long)]
    height_scale: Option<f32>,

    /// Layers to render at reduced resolution (repeatable); replaces the configured mask
    #[arg(long = "scaled-layer")]
    scaled_layers: Vec<u8>,
}

impl Cli {
    fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)
                .with_context(|| format!("loading settings from {}", path.display()))?,
            None => demo::demo_settings(),
        };
        if let Some(w) = self.width_scale {
            settings.compositor.width_scale_factor = w;
        }
        if let Some(h) = self.height_scale {
            settings.compositor.height_scale_factor = h;
        }
        if !self.scaled_layers.is_empty() {
            settings.compositor.layer_mask = LayerMask::from_layers(self.scaled_layers.iter().copied())?;
        }
        Ok(settings)
    }
}

/// Arrow keys drive pitch and yaw at this many input units, Q/E roll at 1.
const LOOK_INPUT: f32 = 10.0;

/// Slider floor. `ScaleFactors` excludes `MIN_SCALE` itself.
const SLIDER_MIN: f32 = MIN_SCALE + 0.01;

fn default_bindings() -> Bindings<KeyCode> {
    Bindings::new()
        .bind(KeyCode::KeyW, Axis::Horizontal, Component::Y, 1.0)
        .bind(KeyCode::KeyS, Axis::Horizontal, Component::Y, -1.0)
        .bind(KeyCode::KeyD, Axis::Horizontal, Component::X, 1.0)
        .bind(KeyCode::KeyA, Axis::Horizontal, Component::X, -1.0)
        .bind(KeyCode::Space, Axis::Vertical, Component::Scalar, 1.0)
        .bind(KeyCode::ControlLeft, Axis::Vertical, Component::Scalar, -1.0)
        .bind(KeyCode::ArrowUp, Axis::Pitch, Component::Scalar, LOOK_INPUT)
        .bind(KeyCode::ArrowDown, Axis::Pitch, Component::Scalar, -LOOK_INPUT)
        .bind(KeyCode::ArrowRight, Axis::Yaw, Component::Scalar, LOOK_INPUT)
        .bind(KeyCode::ArrowLeft, Axis::Yaw, Component::Scalar, -LOOK_INPUT)
        .bind(KeyCode::KeyQ, Axis::Roll, Component::Scalar, -1.0)
        .bind(KeyCode::KeyE, Axis::Roll, Component::Scalar, 1.0)
}

/// Application state independent of the GPU.
struct AppState {
    settings: Settings,
    controller: FlyController,
    bindings: Bindings<KeyCode>,
    control: ControlState,
    primary: Camera,
    show_panel: bool,
    // Panel edits, applied to the compositor when valid
    width_factor: f32,
    height_factor: f32,
    scale_error: Option<String>,
    last_frame: Instant,
    // Fixed timestep
    tick_accumulator: f64,
    tick_rate: f64,
}

impl AppState {
    fn new(settings: Settings) -> Self {
        let mut primary = Camera::new(Extent::new(1280, 720));
        primary.transform = Transform::from_position(Vec3::new(0.0, 5.0, -20.0));

        Self {
            controller: FlyController::new(settings.controller.speed),
            bindings: default_bindings(),
            control: ControlState::new(),
            primary,
            show_panel: true,
            width_factor: settings.compositor.width_scale_factor,
            height_factor: settings.compositor.height_scale_factor,
            scale_error: None,
            settings,
            last_frame: Instant::now(),
            tick_accumulator: 0.0,
            tick_rate: 1.0 / 60.0,
        }
    }

    fn update(&mut self, dt: f32) {
        self.tick_accumulator += dt as f64;
        while self.tick_accumulator >= self.tick_rate {
            self.tick_accumulator -= self.tick_rate;
            self.controller.tick(
                &mut self.primary.transform,
                &self.control,
                self.tick_rate as f32,
            );
        }
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        let event = if pressed {
            self.bindings.press(key)
        } else {
            self.bindings.release(key)
        };
        if let Some(event) = event {
            self.control.apply(event);
            return;
        }

        if pressed && key == KeyCode::F1 {
            self.show_panel = !self.show_panel;
        }
    }

    fn release_all_keys(&mut self) {
        let events = self.bindings.release_all();
        self.control.apply_all(events);
    }

    fn draw_ui(&mut self, ctx: &EguiContext, compositor: &mut MixedResolutionCompositor<WgpuBackend>) {
        if !self.show_panel {
            return;
        }

        let split = compositor.partition();
        let stats = compositor.stats();
        let secondary_extent = compositor.secondary_camera().pixel_extent;

        egui::SidePanel::left("compositor")
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.heading("Scaleview");
                ui.separator();
                let p = self.primary.transform.position;
                ui.label(format!("Camera: ({:.1}, {:.1}, {:.1})", p.x, p.y, p.z));
                ui.label(format!("Speed: {:.1}", self.controller.speed));
                ui.separator();

                ui.heading("Layers");
                ui.label(format!("Full resolution: {}", split.full_resolution));
                ui.label(format!("Scaled: {}", split.scaled));
                let scaled: Vec<String> = split.scaled.layers().map(|l| l.to_string()).collect();
                ui.small(format!("scaled layers [{}]", scaled.join(", ")));
                ui.separator();

                ui.heading("Resolution");
                ui.label(format!("Primary: {}", self.primary.pixel_extent));
                ui.label(format!("Secondary: {}", secondary_extent));
                let mut changed = false;
                changed |= ui
                    .add(egui::Slider::new(&mut self.width_factor, SLIDER_MIN..=MAX_SCALE).text("width"))
                    .changed();
                changed |= ui
                    .add(egui::Slider::new(&mut self.height_factor, SLIDER_MIN..=MAX_SCALE).text("height"))
                    .changed();
                if changed {
                    match ScaleFactors::new(self.width_factor, self.height_factor) {
                        Ok(factors) => {
                            compositor.set_scale_factors(factors);
                            self.settings.compositor.width_scale_factor = factors.width();
                            self.settings.compositor.height_scale_factor = factors.height();
                            self.scale_error = None;
                        }
                        Err(e) => self.scale_error = Some(e.to_string()),
                    }
                }
                if let Some(err) = &self.scale_error {
                    ui.colored_label(egui::Color32::LIGHT_RED, err);
                }
                ui.separator();

                ui.label(format!("Frames: {}", stats.frames_composited));
                ui.label(format!(
                    "Temporaries: {} acquired, {} live",
                    stats.temporaries_acquired,
                    stats.live_temporaries()
                ));

                ui.separator();
                ui.small("F1: Toggle Panel | WASD/Space/Ctrl: Move | Arrows: Look | Q/E: Roll");
            });
    }
}

/// Everything that exists once the window and device are up.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    backend: WgpuBackend,
    compositor: MixedResolutionCompositor<WgpuBackend>,
    /// Primary camera's full-resolution image.
    source: RenderImage,
    /// Depth paired with the swapchain image.
    output_depth: wgpu::Texture,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(settings: Settings) -> Self {
        Self {
            state: AppState::new(settings),
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<Gpu> {
        let attrs = Window::default_attributes()
            .with_title("Scaleview")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no suitable GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("scaleview_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let extent = Extent::new(config.width, config.height);
        self.state.primary.set_pixel_extent(extent);

        let mut backend = WgpuBackend::new(device, queue, surface_format);
        backend.set_objects(demo::demo_scene());
        backend.scene_mut().grid_layer = demo::GROUND_LAYER;

        let compositor = MixedResolutionCompositor::setup(
            &self.state.settings.compositor,
            &mut self.state.primary,
            &mut backend,
        )?;

        let source = backend.create_image(extent, "primary_source");
        let output_depth = create_depth_texture(backend.device(), extent);

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(backend.device(), surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Gpu {
            window,
            surface,
            config,
            backend,
            compositor,
            source,
            output_depth,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        gpu.config.width = new_size.width.max(1);
        gpu.config.height = new_size.height.max(1);
        gpu.surface.configure(gpu.backend.device(), &gpu.config);

        let extent = Extent::new(gpu.config.width, gpu.config.height);
        self.state.primary.set_pixel_extent(extent);
        gpu.source = gpu.backend.create_image(extent, "primary_source");
        gpu.output_depth = create_depth_texture(gpu.backend.device(), extent);
        gpu.backend.trim_pool();
        tracing::debug!(%extent, "resized");
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let dt = (now - self.state.last_frame).as_secs_f32().min(0.1);
        self.state.last_frame = now;
        self.state.update(dt);

        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(gpu.backend.device(), &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let extent = Extent::new(gpu.config.width, gpu.config.height);
        let dest = RenderImage::from_views(
            output.texture.create_view(&wgpu::TextureViewDescriptor::default()),
            gpu.output_depth.create_view(&wgpu::TextureViewDescriptor::default()),
            extent,
        );

        let rendered = gpu
            .backend
            .render_camera(&self.state.primary, &gpu.source)
            .and_then(|()| {
                gpu.compositor
                    .composite(&mut gpu.backend, &self.state.primary, &gpu.source, &dest)
            });
        if let Err(e) = rendered {
            tracing::error!("frame failed: {e}");
        }

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let compositor = &mut gpu.compositor;
        let state = &mut self.state;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            state.draw_ui(ctx, compositor);
        });
        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let device = gpu.backend.device();
        let queue = gpu.backend.queue();
        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        gpu.egui_renderer.update_buffers(
            device,
            queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &dest.color,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match self.init_gpu(event_loop) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                tracing::error!("failed to initialise graphics: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => self.resize(new_size),
            WindowEvent::Focused(false) => self.state.release_all_keys(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                self.state
                    .handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let settings = cli.settings()?;
    tracing::info!(
        speed = settings.controller.speed,
        scaled = %settings.compositor.layer_mask,
        "scaleview-desktop starting"
    );

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(settings);
    event_loop.run_app(&mut app)?;

    Ok(())
}
