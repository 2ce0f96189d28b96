//! Input axes: named axis events, the latched control state they feed, and
//! button bindings that turn key presses into axis events.
//!
//! # Invariants
//! - Axis events are assignments: the latest value per axis wins.
//! - Latched values persist until overwritten, independent of tick rate.

pub mod axis;
pub mod bindings;
pub mod state;

pub use axis::{Axis, AxisEvent};
pub use bindings::{Bindings, Component};
pub use state::ControlState;

pub fn crate_info() -> &'static str {
    concat!("scaleview-input v", env!("CARGO_PKG_VERSION"))
}
