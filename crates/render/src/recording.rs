use crate::backend::{RenderBackend, TargetDesc, BLIT_SHADER};
use crate::blit::{BlitState, Texel};
use crate::camera::{Camera, ClearMode};
use crate::error::RenderError;
use crate::scale::Extent;
use scaleview_common::LayerMask;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub u64);

impl std::fmt::Display for ImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "img#{}", self.0)
    }
}

/// Image handle handed out by the [`RecordingBackend`]. Holds no pixels.
#[derive(Debug, PartialEq, Eq)]
pub struct RecordedImage {
    pub id: ImageId,
    pub extent: Extent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedMaterial {
    pub shader: String,
}

/// One call made against the [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    LoadMaterial(String),
    Acquire {
        image: ImageId,
        desc: TargetDesc,
    },
    Release {
        image: ImageId,
    },
    RenderCamera {
        target: ImageId,
        culling_mask: LayerMask,
        clear: ClearMode,
    },
    Blit {
        source: ImageId,
        dest: ImageId,
        state: BlitState,
    },
}

impl std::fmt::Display for BackendCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoadMaterial(shader) => write!(f, "load material '{shader}'"),
            Self::Acquire { image, desc } => write!(
                f,
                "acquire {image} {} depth={}",
                desc.extent, desc.depth_bits
            ),
            Self::Release { image } => write!(f, "release {image}"),
            Self::RenderCamera {
                target,
                culling_mask,
                ..
            } => write!(f, "render layers {culling_mask} -> {target}"),
            Self::Blit {
                source,
                dest,
                state,
            } => write!(
                f,
                "blit {source} -> {dest} blend=({:?}, {:?}) ztest={:?}",
                state.src_blend, state.dst_blend, state.depth_test
            ),
        }
    }
}

/// Headless backend that records every call instead of drawing.
///
/// Tracks which temporaries are still live so callers can check that every
/// acquire is matched by a release. Each image also carries a single
/// [`Texel`]: cameras resolve the fragments placed with
/// [`RecordingBackend::place`] into it and blits combine texels with
/// [`BlitState::shade`], so the result of a composite can be read back with
/// [`RecordingBackend::texel`].
#[derive(Debug)]
pub struct RecordingBackend {
    calls: Vec<BackendCall>,
    shaders: Vec<String>,
    live: BTreeSet<ImageId>,
    pixels: BTreeMap<ImageId, Texel>,
    fragments: Vec<(u8, Texel)>,
    next_id: u64,
    fail_renders: bool,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingBackend {
    /// A backend that knows the blit shader.
    pub fn new() -> Self {
        Self {
            shaders: vec![BLIT_SHADER.to_string()],
            ..Self::without_shaders()
        }
    }

    /// A backend with no shaders: every material load fails.
    pub fn without_shaders() -> Self {
        Self {
            calls: Vec::new(),
            shaders: Vec::new(),
            live: BTreeSet::new(),
            pixels: BTreeMap::new(),
            fragments: Vec::new(),
            next_id: 0,
            fail_renders: false,
        }
    }

    /// Make subsequent camera renders fail.
    pub fn fail_camera_renders(&mut self, fail: bool) {
        self.fail_renders = fail;
    }

    /// A persistent image, e.g. the primary camera's target or the output.
    pub fn create_image(&mut self, extent: Extent) -> RecordedImage {
        let id = self.next_image_id();
        self.pixels.insert(id, Texel::CLEAR);
        RecordedImage { id, extent }
    }

    /// Add opaque geometry on `layer` covering the modelled pixel.
    pub fn place(&mut self, layer: u8, texel: Texel) {
        self.fragments.push((layer, texel));
    }

    /// Current contents of the modelled pixel of `image`.
    pub fn texel(&self, image: &RecordedImage) -> Texel {
        self.texel_of(image.id)
    }

    fn texel_of(&self, id: ImageId) -> Texel {
        self.pixels.get(&id).copied().unwrap_or(Texel::CLEAR)
    }

    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn live_temporaries(&self) -> usize {
        self.live.len()
    }

    /// One line per recorded call.
    pub fn transcript(&self) -> String {
        let mut out = String::new();
        for (i, call) in self.calls.iter().enumerate() {
            let _ = writeln!(out, "{i:>4}: {call}");
        }
        out
    }

    fn next_image_id(&mut self) -> ImageId {
        let id = ImageId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl RenderBackend for RecordingBackend {
    type Image = RecordedImage;
    type Material = RecordedMaterial;

    fn load_material(&mut self, shader: &str) -> Result<RecordedMaterial, RenderError> {
        if !self.shaders.iter().any(|s| s == shader) {
            return Err(RenderError::ShaderNotFound(shader.to_string()));
        }
        self.calls.push(BackendCall::LoadMaterial(shader.to_string()));
        Ok(RecordedMaterial {
            shader: shader.to_string(),
        })
    }

    fn acquire_temporary(&mut self, desc: &TargetDesc) -> Result<RecordedImage, RenderError> {
        let image = self.create_image(desc.extent);
        self.live.insert(image.id);
        self.calls.push(BackendCall::Acquire {
            image: image.id,
            desc: *desc,
        });
        Ok(image)
    }

    fn release_temporary(&mut self, image: RecordedImage) {
        self.pixels.remove(&image.id);
        if !self.live.remove(&image.id) {
            tracing::warn!(image = %image.id, "released an image that was not a live temporary");
        }
        self.calls.push(BackendCall::Release { image: image.id });
    }

    fn render_camera(&mut self, camera: &Camera, target: &RecordedImage) -> Result<(), RenderError> {
        if self.fail_renders {
            return Err(RenderError::Backend(format!("render into {} failed", target.id)));
        }
        self.calls.push(BackendCall::RenderCamera {
            target: target.id,
            culling_mask: camera.culling_mask,
            clear: camera.clear,
        });

        let mut out = match camera.clear {
            ClearMode::SolidColor(color) => Texel::new(color, 1.0),
            ClearMode::DepthOnly => Texel::new(self.texel_of(target.id).color, 1.0),
        };
        for &(layer, fragment) in &self.fragments {
            if camera.culling_mask.contains(layer) && fragment.depth < out.depth {
                out = fragment;
            }
        }
        self.pixels.insert(target.id, out);
        Ok(())
    }

    fn blit(
        &mut self,
        source: &RecordedImage,
        dest: &RecordedImage,
        _material: &RecordedMaterial,
        state: BlitState,
    ) -> Result<(), RenderError> {
        self.calls.push(BackendCall::Blit {
            source: source.id,
            dest: dest.id,
            state,
        });
        let out = state.shade(self.texel_of(source.id), self.texel_of(dest.id));
        self.pixels.insert(dest.id, out);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_shader_is_not_found() {
        let mut b = RecordingBackend::new();
        let err = b.load_material("missing").unwrap_err();
        assert_eq!(err, RenderError::ShaderNotFound("missing".into()));
        assert!(b.calls().is_empty());
    }

    #[test]
    fn tracks_live_temporaries() {
        let mut b = RecordingBackend::new();
        let a = b.acquire_temporary(&TargetDesc::color_depth(Extent::new(4, 4))).unwrap();
        let c = b.acquire_temporary(&TargetDesc::color_depth(Extent::new(2, 2))).unwrap();
        assert_ne!(a.id, c.id);
        assert_eq!(b.live_temporaries(), 2);
        b.release_temporary(a);
        b.release_temporary(c);
        assert_eq!(b.live_temporaries(), 0);
    }

    #[test]
    fn transcript_lists_calls() {
        let mut b = RecordingBackend::new();
        b.load_material(BLIT_SHADER).unwrap();
        let src = b.create_image(Extent::new(8, 8));
        let dst = b.create_image(Extent::new(8, 8));
        let m = RecordedMaterial {
            shader: BLIT_SHADER.into(),
        };
        b.blit(&src, &dst, &m, BlitState::OPAQUE_COPY).unwrap();

        let text = b.transcript();
        assert!(text.contains("load material"));
        assert!(text.contains("blit img#0 -> img#1"));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn camera_keeps_nearest_visible_fragment() {
        let mut b = RecordingBackend::new();
        b.place(0, Texel::new([1.0, 0.0, 0.0, 1.0], 0.7));
        b.place(0, Texel::new([0.0, 1.0, 0.0, 1.0], 0.4));
        b.place(2, Texel::new([0.0, 0.0, 1.0, 1.0], 0.1));
        let target = b.create_image(Extent::new(1, 1));
        let mut cam = Camera::new(Extent::new(1, 1));
        cam.culling_mask = LayerMask(0b011);

        b.render_camera(&cam, &target).unwrap();
        assert_eq!(b.texel(&target), Texel::new([0.0, 1.0, 0.0, 1.0], 0.4));
    }

    #[test]
    fn transparent_camera_with_nothing_visible_stays_clear() {
        let mut b = RecordingBackend::new();
        b.place(3, Texel::new([1.0; 4], 0.5));
        let target = b.create_image(Extent::new(1, 1));
        let mut cam = Camera::new(Extent::new(1, 1));
        cam.clear = ClearMode::TRANSPARENT;
        cam.culling_mask = LayerMask(0b1);

        b.render_camera(&cam, &target).unwrap();
        assert_eq!(b.texel(&target), Texel::CLEAR);
    }

    #[test]
    fn blit_shades_destination() {
        let mut b = RecordingBackend::new();
        let m = b.load_material(BLIT_SHADER).unwrap();
        let src = b.create_image(Extent::new(1, 1));
        let dst = b.create_image(Extent::new(1, 1));
        b.place(0, Texel::new([1.0, 1.0, 1.0, 1.0], 0.25));
        let cam = Camera::new(Extent::new(1, 1));
        b.render_camera(&cam, &src).unwrap();

        b.blit(&src, &dst, &m, BlitState::OPAQUE_COPY).unwrap();
        assert_eq!(b.texel(&dst), Texel::new([1.0, 1.0, 1.0, 1.0], 0.25));
    }

    #[test]
    fn failing_render_records_nothing() {
        let mut b = RecordingBackend::new();
        b.fail_camera_renders(true);
        let target = b.create_image(Extent::new(1, 1));
        let cam = Camera::new(Extent::new(1, 1));
        assert!(b.render_camera(&cam, &target).is_err());
        assert!(b.calls().is_empty());
    }
}
