use glam::Vec3;
use scaleview_common::{CompositorSettings, LayerMask, Settings, Transform};
use scaleview_render_wgpu::SceneObject;

/// Grid floor and the ring of pillars.
pub const GROUND_LAYER: u8 = 0;
/// Floating cubes; the layer the demo renders at reduced resolution.
pub const FLOATERS_LAYER: u8 = 1;
/// Small markers that stay sharp.
pub const MARKERS_LAYER: u8 = 8;

/// Settings used when no config file is given.
pub fn demo_settings() -> Settings {
    Settings {
        compositor: CompositorSettings {
            width_scale_factor: 0.5,
            height_scale_factor: 0.5,
            layer_mask: LayerMask(1 << FLOATERS_LAYER),
        },
        ..Settings::default()
    }
}

fn cube(position: Vec3, scale: f32, layer: u8, color: [f32; 4]) -> SceneObject {
    SceneObject {
        transform: Transform {
            position,
            scale: Vec3::splat(scale),
            ..Transform::default()
        },
        layer,
        color,
    }
}

pub fn demo_scene() -> Vec<SceneObject> {
    let mut objects = Vec::new();

    for i in 0..8 {
        let angle = i as f32 * std::f32::consts::TAU / 8.0;
        let at = Vec3::new(angle.cos() * 12.0, 1.0, angle.sin() * 12.0);
        objects.push(cube(at, 2.0, GROUND_LAYER, [0.55, 0.55, 0.6, 1.0]));
    }

    for x in -3..=3 {
        for z in -3..=3 {
            let at = Vec3::new(x as f32 * 3.0, 4.0 + ((x + z) as f32 * 0.7).sin(), z as f32 * 3.0);
            let hue = (x + 3) as f32 / 6.0;
            objects.push(cube(at, 0.8, FLOATERS_LAYER, [0.9, 0.3 + 0.5 * hue, 1.0 - hue, 1.0]));
        }
    }

    for (x, z) in [(-6.0, -6.0), (6.0, -6.0), (6.0, 6.0), (-6.0, 6.0)] {
        objects.push(cube(Vec3::new(x, 0.25, z), 0.5, MARKERS_LAYER, [1.0, 0.85, 0.1, 1.0]));
    }

    objects
}
