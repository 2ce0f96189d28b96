//! Fixed-function state for the compositing blit.
//!
//! The blit shader copies a source image's colour and writes the source's
//! depth as fragment depth. What changes between the two passes is only the
//! blend factors and the depth comparison, captured here as [`BlitState`].
//! [`BlitState::shade`] applies that state to one texel; the recording
//! backend composites with it.

/// Blend factor applied to source or destination colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
}

impl BlendFactor {
    fn weight(self, src_alpha: f32) -> f32 {
        match self {
            Self::Zero => 0.0,
            Self::One => 1.0,
            Self::SrcAlpha => src_alpha,
            Self::OneMinusSrcAlpha => 1.0 - src_alpha,
        }
    }
}

/// Depth comparison between an incoming fragment and the stored depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareFunction {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

impl CompareFunction {
    pub fn passes(self, incoming: f32, stored: f32) -> bool {
        match self {
            Self::Never => false,
            Self::Less => incoming < stored,
            Self::Equal => incoming == stored,
            Self::LessEqual => incoming <= stored,
            Self::Greater => incoming > stored,
            Self::NotEqual => incoming != stored,
            Self::GreaterEqual => incoming >= stored,
            Self::Always => true,
        }
    }
}

/// Blend and depth-test configuration for one blit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlitState {
    pub src_blend: BlendFactor,
    pub dst_blend: BlendFactor,
    pub depth_test: CompareFunction,
}

impl BlitState {
    /// Overwrite colour and depth unconditionally.
    pub const OPAQUE_COPY: BlitState = BlitState {
        src_blend: BlendFactor::One,
        dst_blend: BlendFactor::Zero,
        depth_test: CompareFunction::Always,
    };

    /// Source-over alpha blend, only where the source is nearer than what is stored.
    pub const ALPHA_OVER: BlitState = BlitState {
        src_blend: BlendFactor::SrcAlpha,
        dst_blend: BlendFactor::OneMinusSrcAlpha,
        depth_test: CompareFunction::Less,
    };

    /// Resolve one source texel against one destination texel.
    ///
    /// A fragment that fails the depth test leaves the destination untouched.
    /// A passing fragment blends colour and writes its depth.
    pub fn shade(&self, src: Texel, dst: Texel) -> Texel {
        if !self.depth_test.passes(src.depth, dst.depth) {
            return dst;
        }
        let s = self.src_blend.weight(src.color[3]);
        let d = self.dst_blend.weight(src.color[3]);
        let mut color = [0.0; 4];
        for (i, c) in color.iter_mut().enumerate() {
            *c = src.color[i] * s + dst.color[i] * d;
        }
        Texel {
            color,
            depth: src.depth,
        }
    }
}

/// One pixel: RGBA colour plus normalized depth (0 near, 1 far).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Texel {
    pub color: [f32; 4],
    pub depth: f32,
}

impl Texel {
    /// What a camera clearing to transparent leaves behind.
    pub const CLEAR: Texel = Texel {
        color: [0.0; 4],
        depth: 1.0,
    };

    pub fn new(color: [f32; 4], depth: f32) -> Self {
        Self { color, depth }
    }
}
