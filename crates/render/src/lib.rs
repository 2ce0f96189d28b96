//! Mixed-resolution layer compositing, independent of any GPU API.
//!
//! A primary camera renders the full-resolution layers. A hidden secondary
//! camera renders the selected layers into a smaller temporary target, which
//! is then alpha-blended over the primary image, depth-tested against the
//! depth the primary pass left in the output.
//!
//! # Invariants
//! - The layer split is decided once at setup and never changes.
//! - Scaled layers and full-resolution layers are disjoint.
//! - Every temporary target acquired in a frame is released in that frame,
//!   whether or not the frame's passes succeed.
//! - Backends never see the compositor's secondary camera mutably.

mod backend;
mod blit;
mod camera;
mod compositor;
mod error;
mod partition;
mod recording;
mod scale;

pub use backend::{ColorFormat, RenderBackend, TargetDesc, BLIT_SHADER};
pub use blit::{BlendFactor, BlitState, CompareFunction, Texel};
pub use camera::{Camera, ClearMode, Projection};
pub use compositor::{CompositorStats, FrameOp, FramePlan, MixedResolutionCompositor, Slot};
pub use error::RenderError;
pub use partition::{partition, LayerPartition};
pub use recording::{BackendCall, ImageId, RecordedImage, RecordedMaterial, RecordingBackend};
pub use scale::{Extent, ScaleFactors, MAX_SCALE, MIN_SCALE};

pub fn crate_info() -> &'static str {
    "scaleview-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
