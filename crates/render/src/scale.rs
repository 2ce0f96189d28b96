use crate::error::RenderError;

/// Exclusive lower bound for a scale factor.
pub const MIN_SCALE: f32 = 0.1;
/// Inclusive upper bound for a scale factor.
pub const MAX_SCALE: f32 = 1.0;

/// Pixel dimensions of an image or render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl std::fmt::Display for Extent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Independent width and height factors for the reduced-resolution pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    width: f32,
    height: f32,
}

impl Default for ScaleFactors {
    fn default() -> Self {
        Self::NATIVE
    }
}

impl ScaleFactors {
    /// No reduction. Both passes still run.
    pub const NATIVE: ScaleFactors = ScaleFactors {
        width: 1.0,
        height: 1.0,
    };

    pub fn new(width: f32, height: f32) -> Result<Self, RenderError> {
        Ok(Self {
            width: check("width", width)?,
            height: check("height", height)?,
        })
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Floor of each factor times the matching dimension.
    pub fn scaled(&self, extent: Extent) -> Extent {
        Extent {
            width: scale_dim(self.width, extent.width),
            height: scale_dim(self.height, extent.height),
        }
    }
}

fn check(axis: &'static str, value: f32) -> Result<f32, RenderError> {
    // NaN fails both comparisons.
    if value > MIN_SCALE && value <= MAX_SCALE {
        Ok(value)
    } else {
        Err(RenderError::ScaleOutOfRange { axis, value })
    }
}

fn scale_dim(factor: f32, dim: u32) -> u32 {
    (factor * dim as f32).floor() as u32
}
