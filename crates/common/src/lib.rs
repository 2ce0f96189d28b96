//! Shared types for the scaleview components.
//!
//! # Invariants
//! - Transforms are left-handed; the forward axis is +Z.
//! - A layer mask has exactly 32 addressable layers.

pub mod config;
pub mod layer;
pub mod types;

pub use config::{CompositorSettings, ConfigError, ControllerSettings, Settings};
pub use layer::{LayerError, LayerMask, LAYER_COUNT};
pub use types::Transform;
