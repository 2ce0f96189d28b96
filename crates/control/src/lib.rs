//! Free-fly controller: per-tick incremental rotation and translation of a
//! transform from the latched input axes.
//!
//! # Invariants
//! - Rotation rates are fixed per tick and ignore the tick duration.
//! - Translation scales with speed and tick duration; vertical moves at half rate.
//! - Each move axis contributes an independent additive term.

mod fly;

pub use fly::{delta_position, delta_rotation, FlyController, TickReport};

pub fn crate_info() -> &'static str {
    concat!("scaleview-control v", env!("CARGO_PKG_VERSION"))
}
