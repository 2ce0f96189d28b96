use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use glam::{EulerRot, Vec2};
use scaleview_common::{LayerMask, Settings, Transform};
use scaleview_control::FlyController;
use scaleview_input::{AxisEvent, ControlState};
use scaleview_render::{
    partition, Camera, CompositorStats, Extent, FramePlan, LayerPartition,
    MixedResolutionCompositor, RecordingBackend,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scaleview-cli", about = "CLI tool for scaleview: controller and compositor dry runs")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions
    Info,
    /// Simulate the fly controller for a number of ticks with constant input
    Fly {
        /// Settings file (JSON) supplying the speed
        #[arg(long)]
        config: Option<PathBuf>,
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "50")]
        ticks: u32,
        /// Seconds per tick
        #[arg(long, default_value = "0.02")]
        dt: f32,
        /// Override the translation speed
        #[arg(long)]
        speed: Option<f32>,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        pitch: f32,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        roll: f32,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        yaw: f32,
        /// Lateral move input (right is positive)
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        lateral: f32,
        /// Forward move input
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        forward: f32,
        /// Vertical move input
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        vertical: f32,
        /// Print the transform after every tick
        #[arg(long)]
        each: bool,
    },
    /// Run composite frames against the recording backend and print what it did
    Composite {
        /// Settings file (JSON) supplying the compositor settings
        #[arg(long)]
        config: Option<PathBuf>,
        /// Number of frames to composite
        #[arg(short, long, default_value = "1")]
        frames: u32,
        #[arg(long, default_value = "1920")]
        width: u32,
        #[arg(long, default_value = "1080")]
        height: u32,
        /// Override the width scale factor
        #[arg(long)]
        width_scale: Option<f32>,
        /// Override the height scale factor
        #[arg(long)]
        height_scale: Option<f32>,
        /// Layers to render at reduced resolution (repeatable)
        #[arg(long = "scaled-layer")]
        scaled_layers: Vec<u8>,
        /// Primary camera culling mask, decimal or 0x-prefixed hex
        #[arg(long, default_value = "0xffffffff", value_parser = parse_mask)]
        visible: LayerMask,
        /// Make every secondary render fail
        #[arg(long)]
        fail_renders: bool,
    },
    /// Print how a culling mask is split by a layer selection
    Partition {
        /// Primary camera culling mask, decimal or 0x-prefixed hex
        #[arg(long, default_value = "0xffffffff", value_parser = parse_mask)]
        visible: LayerMask,
        /// Selected layer indices
        #[arg(required = true)]
        layers: Vec<u8>,
    },
    /// Write a default settings file
    InitConfig {
        #[arg(default_value = "scaleview.json")]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn parse_mask(s: &str) -> Result<LayerMask, String> {
    let bits = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse::<u32>(),
    };
    bits.map(LayerMask).map_err(|e| format!("invalid layer mask '{s}': {e}"))
}

fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    match path {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display())),
        None => Ok(Settings::default()),
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct FlyInput {
    pitch: f32,
    roll: f32,
    yaw: f32,
    lateral: f32,
    forward: f32,
    vertical: f32,
}

impl FlyInput {
    fn control_state(&self) -> ControlState {
        let mut state = ControlState::new();
        state.apply_all([
            AxisEvent::Pitch(self.pitch),
            AxisEvent::Roll(self.roll),
            AxisEvent::Yaw(self.yaw),
            AxisEvent::Horizontal(Vec2::new(self.lateral, self.forward)),
            AxisEvent::Vertical(self.vertical),
        ]);
        state
    }
}

fn simulate_fly(
    controller: &FlyController,
    input: &FlyInput,
    ticks: u32,
    dt: f32,
    mut on_tick: impl FnMut(u32, &Transform),
) -> Transform {
    let state = input.control_state();
    let mut transform = Transform::default();
    for i in 0..ticks {
        controller.tick(&mut transform, &state, dt);
        on_tick(i + 1, &transform);
    }
    transform
}

fn describe(transform: &Transform) -> String {
    let p = transform.position;
    // Report in flight senses: nose up and top-to-the-right are positive,
    // which are negative turns about +X and +Z in the left-handed basis.
    let (yaw, pitch, roll) = transform.rotation.to_euler(EulerRot::YXZ);
    let (pitch, roll) = (-pitch, -roll);
    format!(
        "position=({:.3}, {:.3}, {:.3}) yaw={:.2} pitch={:.2} roll={:.2}",
        p.x,
        p.y,
        p.z,
        yaw.to_degrees(),
        pitch.to_degrees(),
        roll.to_degrees()
    )
}

struct CompositeRun {
    partition: LayerPartition,
    plan: FramePlan,
    transcript: String,
    stats: CompositorStats,
    failed_frames: u32,
    live_after: usize,
}

fn run_composite(
    settings: &Settings,
    visible: LayerMask,
    extent: Extent,
    frames: u32,
    fail_renders: bool,
) -> anyhow::Result<CompositeRun> {
    let mut backend = RecordingBackend::new();
    let mut primary = Camera::new(extent);
    primary.culling_mask = visible;

    let mut compositor = MixedResolutionCompositor::setup(&settings.compositor, &mut primary, &mut backend)?;
    backend.fail_camera_renders(fail_renders);

    let source = backend.create_image(extent);
    let dest = backend.create_image(extent);

    let mut failed_frames = 0;
    for frame in 0..frames {
        if let Err(e) = compositor.composite(&mut backend, &primary, &source, &dest) {
            tracing::debug!(frame, "frame failed: {e}");
            failed_frames += 1;
        }
    }

    Ok(CompositeRun {
        partition: compositor.partition(),
        plan: compositor.plan(extent),
        transcript: backend.transcript(),
        stats: compositor.stats(),
        failed_frames,
        live_after: backend.live_temporaries(),
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("scaleview-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("input: {}", scaleview_input::crate_info());
            println!("control: {}", scaleview_control::crate_info());
            println!("render: {}", scaleview_render::crate_info());
        }
        Commands::Fly {
            config,
            ticks,
            dt,
            speed,
            pitch,
            roll,
            yaw,
            lateral,
            forward,
            vertical,
            each,
        } => {
            let settings = load_settings(config.as_deref())?;
            let controller = FlyController::new(speed.unwrap_or(settings.controller.speed));
            let input = FlyInput {
                pitch,
                roll,
                yaw,
                lateral,
                forward,
                vertical,
            };
            println!(
                "Fly: ticks={ticks}, dt={dt}, speed={}, input={input:?}",
                controller.speed
            );
            let end = simulate_fly(&controller, &input, ticks, dt, |i, t| {
                if each {
                    println!("{i:>5}: {}", describe(t));
                }
            });
            println!("Final: {}", describe(&end));
        }
        Commands::Composite {
            config,
            frames,
            width,
            height,
            width_scale,
            height_scale,
            scaled_layers,
            visible,
            fail_renders,
        } => {
            let mut settings = load_settings(config.as_deref())?;
            if let Some(w) = width_scale {
                settings.compositor.width_scale_factor = w;
            }
            if let Some(h) = height_scale {
                settings.compositor.height_scale_factor = h;
            }
            if !scaled_layers.is_empty() {
                settings.compositor.layer_mask = LayerMask::from_layers(scaled_layers)?;
            }

            let run = run_composite(&settings, visible, Extent::new(width, height), frames, fail_renders)?;
            println!(
                "Layers: scaled={} full_resolution={}",
                run.partition.scaled, run.partition.full_resolution
            );
            println!(
                "Plan: primary={} scaled={}",
                run.plan.primary_extent, run.plan.scaled_extent
            );
            for (i, op) in run.plan.ops.iter().enumerate() {
                println!("  {i}: {op:?}");
            }
            println!("Backend calls:");
            print!("{}", run.transcript);
            println!(
                "Stats: frames={} failed={} acquired={} released={} live={}",
                run.stats.frames_composited,
                run.failed_frames,
                run.stats.temporaries_acquired,
                run.stats.temporaries_released,
                run.live_after
            );
        }
        Commands::Partition { visible, layers } => {
            let selection = LayerMask::from_layers(layers)?;
            let split = partition(visible, selection);
            println!("visible:         {visible}");
            println!("selection:       {selection}");
            println!("scaled:          {}", split.scaled);
            println!("full_resolution: {}", split.full_resolution);
        }
        Commands::InitConfig { path, force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            Settings::default().save(&path)?;
            println!("Wrote default settings to {}", path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn parse_mask_accepts_hex_and_decimal() {
        assert_eq!(parse_mask("0x10").unwrap(), LayerMask(16));
        assert_eq!(parse_mask("16").unwrap(), LayerMask(16));
        assert_eq!(parse_mask("0xFFFFFFFF").unwrap(), LayerMask::ALL);
        assert!(parse_mask("layers").is_err());
    }

    #[test]
    fn fly_forward_moves_along_positive_z() {
        let input = FlyInput {
            forward: 1.0,
            ..FlyInput::default()
        };
        let end = simulate_fly(&FlyController::new(10.0), &input, 50, 0.02, |_, _| {});
        assert!((end.position - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-3);
    }

    #[test]
    fn fly_turns_in_flight_senses() {
        let input = FlyInput {
            pitch: 100.0,
            ..FlyInput::default()
        };
        let end = simulate_fly(&FlyController::new(1.0), &input, 1, 1.0, |_, _| {});
        assert!(end.forward().y > 0.0);
        assert!(describe(&end).contains("pitch=10.00"), "{}", describe(&end));

        let input = FlyInput {
            yaw: 100.0,
            ..FlyInput::default()
        };
        let end = simulate_fly(&FlyController::new(1.0), &input, 1, 1.0, |_, _| {});
        assert!(end.forward().x > 0.0);
        assert!(describe(&end).contains("yaw=10.00"), "{}", describe(&end));
    }

    #[test]
    fn fly_reports_every_tick() {
        let mut seen = Vec::new();
        simulate_fly(&FlyController::default(), &FlyInput::default(), 3, 0.1, |i, _| seen.push(i));
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn composite_dry_run_balances_temporaries() {
        let mut settings = Settings::default();
        settings.compositor.width_scale_factor = 0.5;
        settings.compositor.height_scale_factor = 0.5;
        settings.compositor.layer_mask = LayerMask(0b10);

        let run = run_composite(&settings, LayerMask::ALL, Extent::new(1920, 1080), 3, false).unwrap();
        assert_eq!(run.plan.scaled_extent, Extent::new(960, 540));
        assert_eq!(run.partition.scaled, LayerMask(0b10));
        assert_eq!(run.stats.frames_composited, 3);
        assert_eq!(run.stats.temporaries_acquired, 3);
        assert_eq!(run.live_after, 0);
        assert_eq!(run.failed_frames, 0);
    }

    #[test]
    fn failing_renders_still_release() {
        let run = run_composite(&Settings::default(), LayerMask::ALL, Extent::new(64, 64), 2, true).unwrap();
        assert_eq!(run.failed_frames, 2);
        assert_eq!(run.stats.frames_composited, 0);
        assert_eq!(run.stats.temporaries_released, 2);
        assert_eq!(run.live_after, 0);
    }

    #[test]
    fn invalid_scale_fails_setup() {
        let mut settings = Settings::default();
        settings.compositor.width_scale_factor = 0.1;
        assert!(run_composite(&settings, LayerMask::ALL, Extent::new(64, 64), 1, false).is_err());
    }
}
