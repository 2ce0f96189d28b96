use glam::Vec2;

/// The named axes a free-fly controller listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    Pitch,
    Roll,
    Yaw,
    /// Two-component move: x is lateral, y is forward.
    Horizontal,
    Vertical,
}

/// A value delivered for one named axis.
///
/// Producers (keyboard bindings, gamepads, scripted tests) emit these; the
/// controller only ever sees the latched [`crate::ControlState`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisEvent {
    Pitch(f32),
    Roll(f32),
    Yaw(f32),
    Horizontal(Vec2),
    Vertical(f32),
}

impl AxisEvent {
    pub fn axis(&self) -> Axis {
        match self {
            Self::Pitch(_) => Axis::Pitch,
            Self::Roll(_) => Axis::Roll,
            Self::Yaw(_) => Axis::Yaw,
            Self::Horizontal(_) => Axis::Horizontal,
            Self::Vertical(_) => Axis::Vertical,
        }
    }
}
