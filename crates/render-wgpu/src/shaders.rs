/// Lit, layer-tinted cubes. Colour fades toward a dim cue with distance from
/// the eye so the scaled layers read against the sharp ones at range.
pub const SCENE_SHADER: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
    eye: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: Camera;

struct Corner {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct Placement {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
    @location(7) tint: vec4<f32>,
};

struct Shaded {
    @builtin(position) clip: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) world: vec3<f32>,
    @location(2) albedo: vec4<f32>,
};

const SUN: vec3<f32> = vec3<f32>(-0.4, 0.8, -0.45);
const CUE_RANGE: f32 = 90.0;

@vertex
fn vs_scene(corner: Corner, at: Placement) -> Shaded {
    let model = mat4x4<f32>(at.model_0, at.model_1, at.model_2, at.model_3);
    let world = model * vec4<f32>(corner.position, 1.0);

    var out: Shaded;
    out.clip = camera.view_proj * world;
    out.world = world.xyz;
    out.normal = normalize((model * vec4<f32>(corner.normal, 0.0)).xyz);
    out.albedo = vec4<f32>(mix(at.color.rgb, at.color.rgb * at.tint.rgb, at.tint.a), at.color.a);
    return out;
}

@fragment
fn fs_scene(in: Shaded) -> @location(0) vec4<f32> {
    let facing = max(dot(in.normal, normalize(SUN)), 0.0);
    let lit = in.albedo.rgb * (0.25 + 0.75 * facing);
    let cue = clamp(distance(in.world, camera.eye.xyz) / CUE_RANGE, 0.0, 1.0);
    return vec4<f32>(lit * (1.0 - 0.6 * cue), in.albedo.a);
}
"#;

/// Floor lines, darkened with distance so the far edge of the grid does not
/// alias into a solid band.
pub const GRID_SHADER: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
    eye: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: Camera;

struct LinePoint {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct LineOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) world: vec3<f32>,
    @location(1) color: vec4<f32>,
};

const FADE_START: f32 = 15.0;
const FADE_END: f32 = 50.0;

@vertex
fn vs_grid(point: LinePoint) -> LineOut {
    var out: LineOut;
    out.clip = camera.view_proj * vec4<f32>(point.position, 1.0);
    out.world = point.position;
    out.color = point.color;
    return out;
}

@fragment
fn fs_grid(in: LineOut) -> @location(0) vec4<f32> {
    let reach = distance(in.world.xz, camera.eye.xz);
    let fade = smoothstep(FADE_START, FADE_END, reach);
    return vec4<f32>(in.color.rgb * (1.0 - fade), in.color.a);
}
"#;

/// Full-screen blit that copies the source colour and writes the source
/// depth as fragment depth, so the destination's depth test sees the depth
/// of whichever camera produced the source.
///
/// The source may be smaller than the destination: colour is filtered, depth
/// is point-sampled.
pub const BLIT_SHADER: &str = r#"
@group(0) @binding(0)
var src_color: texture_2d<f32>;
@group(0) @binding(1)
var src_depth: texture_depth_2d;
@group(0) @binding(2)
var src_sampler: sampler;

struct BlitOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_blit(@builtin(vertex_index) index: u32) -> BlitOutput {
    // One oversized triangle covering the viewport.
    let uv = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));
    var out: BlitOutput;
    out.clip_position = vec4<f32>(uv * vec2<f32>(2.0, -2.0) + vec2<f32>(-1.0, 1.0), 0.0, 1.0);
    out.uv = uv;
    return out;
}

struct BlitFragment {
    @location(0) color: vec4<f32>,
    @builtin(frag_depth) depth: f32,
};

@fragment
fn fs_blit(in: BlitOutput) -> BlitFragment {
    let dims = vec2<f32>(textureDimensions(src_depth));
    let texel = vec2<i32>(clamp(in.uv * dims, vec2<f32>(0.0), dims - vec2<f32>(1.0)));

    var out: BlitFragment;
    out.color = textureSample(src_color, src_sampler, in.uv);
    out.depth = textureLoad(src_depth, texel, 0);
    return out;
}
"#;
