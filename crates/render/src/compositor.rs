use crate::backend::{RenderBackend, TargetDesc, BLIT_SHADER};
use crate::blit::BlitState;
use crate::camera::{Camera, ClearMode};
use crate::error::RenderError;
use crate::partition::{partition, LayerPartition};
use crate::scale::{Extent, ScaleFactors};
use scaleview_common::CompositorSettings;

/// Which image a frame operation reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The primary camera's finished full-resolution image.
    Source,
    /// The final output image.
    Output,
    /// This frame's reduced-resolution temporary.
    Temporary,
}

/// One step of a composite cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOp {
    AcquireTemporary(TargetDesc),
    Blit {
        source: Slot,
        dest: Slot,
        state: BlitState,
    },
    RenderSecondary {
        target: Slot,
    },
    ReleaseTemporary,
}

/// The ordered operations for one frame at a given primary size.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub primary_extent: Extent,
    pub scaled_extent: Extent,
    pub ops: Vec<FrameOp>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompositorStats {
    pub frames_composited: u64,
    pub temporaries_acquired: u64,
    pub temporaries_released: u64,
    pub last_scaled_extent: Option<Extent>,
}

impl CompositorStats {
    pub fn live_temporaries(&self) -> u64 {
        self.temporaries_acquired - self.temporaries_released
    }
}

/// Renders a subset of layers at reduced resolution and composites them over
/// the primary camera's image.
///
/// Constructed by [`MixedResolutionCompositor::setup`]; a value of this type
/// is always ready to composite. The secondary camera and blit material are
/// owned here and dropped with it.
pub struct MixedResolutionCompositor<B: RenderBackend> {
    factors: ScaleFactors,
    partition: LayerPartition,
    secondary: Camera,
    material: B::Material,
    stats: CompositorStats,
}

impl<B: RenderBackend> MixedResolutionCompositor<B> {
    /// Split the primary camera's layers, build the hidden secondary camera
    /// and load the blit material.
    ///
    /// On error the primary camera is left untouched.
    pub fn setup(
        settings: &CompositorSettings,
        primary: &mut Camera,
        backend: &mut B,
    ) -> Result<Self, RenderError> {
        let factors = ScaleFactors::new(settings.width_scale_factor, settings.height_scale_factor)?;
        let material = backend.load_material(BLIT_SHADER)?;

        let split = partition(primary.culling_mask, settings.layer_mask);
        primary.culling_mask = split.full_resolution;

        let mut secondary = primary.clone();
        secondary.clear = ClearMode::TRANSPARENT;
        secondary.culling_mask = split.scaled;
        secondary.enabled = false;
        secondary.hidden = true;

        tracing::info!(
            scaled = %split.scaled,
            full_resolution = %split.full_resolution,
            width_factor = factors.width(),
            height_factor = factors.height(),
            "mixed-resolution compositor ready"
        );

        Ok(Self {
            factors,
            partition: split,
            secondary,
            material,
            stats: CompositorStats::default(),
        })
    }

    pub fn scale_factors(&self) -> ScaleFactors {
        self.factors
    }

    /// Change the reduction for subsequent frames. The layer split is unaffected.
    pub fn set_scale_factors(&mut self, factors: ScaleFactors) {
        tracing::debug!(
            width = factors.width(),
            height = factors.height(),
            "scale factors changed"
        );
        self.factors = factors;
    }

    pub fn partition(&self) -> LayerPartition {
        self.partition
    }

    pub fn secondary_camera(&self) -> &Camera {
        &self.secondary
    }

    pub fn stats(&self) -> CompositorStats {
        self.stats
    }

    /// The operations one composite cycle performs for a primary image of
    /// `primary_extent`.
    pub fn plan(&self, primary_extent: Extent) -> FramePlan {
        let scaled_extent = self.factors.scaled(primary_extent);
        FramePlan {
            primary_extent,
            scaled_extent,
            ops: vec![
                FrameOp::AcquireTemporary(TargetDesc::color_depth(scaled_extent)),
                FrameOp::Blit {
                    source: Slot::Source,
                    dest: Slot::Output,
                    state: BlitState::OPAQUE_COPY,
                },
                FrameOp::RenderSecondary {
                    target: Slot::Temporary,
                },
                FrameOp::Blit {
                    source: Slot::Temporary,
                    dest: Slot::Output,
                    state: BlitState::ALPHA_OVER,
                },
                FrameOp::ReleaseTemporary,
            ],
        }
    }

    /// Run one composite cycle: copy `source` into `dest`, render the scaled
    /// layers into a temporary, blend the temporary over `dest`.
    ///
    /// The temporary is released before returning, also when a pass fails.
    pub fn composite(
        &mut self,
        backend: &mut B,
        primary: &Camera,
        source: &B::Image,
        dest: &B::Image,
    ) -> Result<(), RenderError> {
        let plan = self.plan(primary.pixel_extent);
        self.follow_primary(primary, plan.scaled_extent);

        let temporary = backend.acquire_temporary(&TargetDesc::color_depth(plan.scaled_extent))?;
        self.stats.temporaries_acquired += 1;

        let result = self.run_passes(backend, &plan, source, dest, &temporary);

        backend.release_temporary(temporary);
        self.stats.temporaries_released += 1;

        if let Err(e) = &result {
            tracing::warn!("composite failed: {e}");
        } else {
            self.stats.frames_composited += 1;
            self.stats.last_scaled_extent = Some(plan.scaled_extent);
            tracing::debug!(
                primary = %plan.primary_extent,
                scaled = %plan.scaled_extent,
                "frame composited"
            );
        }
        result
    }

    fn run_passes(
        &self,
        backend: &mut B,
        plan: &FramePlan,
        source: &B::Image,
        dest: &B::Image,
        temporary: &B::Image,
    ) -> Result<(), RenderError> {
        for op in &plan.ops {
            match *op {
                FrameOp::AcquireTemporary(_) | FrameOp::ReleaseTemporary => {}
                FrameOp::Blit {
                    source: from,
                    dest: to,
                    state,
                } => backend.blit(
                    pick(from, source, dest, temporary),
                    pick(to, source, dest, temporary),
                    &self.material,
                    state,
                )?,
                FrameOp::RenderSecondary { target } => {
                    backend.render_camera(&self.secondary, pick(target, source, dest, temporary))?
                }
            }
        }
        Ok(())
    }

    /// The secondary camera sits exactly on the primary: it takes the
    /// primary's pose and projection (aspect included) at the scaled target
    /// size.
    fn follow_primary(&mut self, primary: &Camera, scaled_extent: Extent) {
        self.secondary.transform = primary.transform;
        self.secondary.projection = primary.projection;
        self.secondary.pixel_extent = scaled_extent;
    }
}

fn pick<'a, T>(slot: Slot, source: &'a T, dest: &'a T, temporary: &'a T) -> &'a T {
    match slot {
        Slot::Source => source,
        Slot::Output => dest,
        Slot::Temporary => temporary,
    }
}
