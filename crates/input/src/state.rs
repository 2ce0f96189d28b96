use crate::axis::AxisEvent;
use glam::Vec3;

/// Latest value received on every axis.
///
/// `move_input` packs the two move axes as (lateral, vertical, forward).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlState {
    pub pitch: f32,
    pub roll: f32,
    pub yaw: f32,
    pub move_input: Vec3,
}

impl ControlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the stored value for the event's axis.
    pub fn apply(&mut self, event: AxisEvent) {
        match event {
            AxisEvent::Pitch(v) => self.pitch = v,
            AxisEvent::Roll(v) => self.roll = v,
            AxisEvent::Yaw(v) => self.yaw = v,
            AxisEvent::Horizontal(v) => {
                self.move_input.x = v.x;
                self.move_input.z = v.y;
            }
            AxisEvent::Vertical(v) => self.move_input.y = v,
        }
        tracing::trace!(?event, "axis latched");
    }

    pub fn apply_all<I>(&mut self, events: I)
    where
        I: IntoIterator<Item = AxisEvent>,
    {
        for event in events {
            self.apply(event);
        }
    }

    pub fn is_idle(&self) -> bool {
        self.pitch == 0.0 && self.roll == 0.0 && self.yaw == 0.0 && self.move_input == Vec3::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn starts_idle() {
        assert!(ControlState::new().is_idle());
    }

    #[test]
    fn horizontal_maps_to_lateral_and_forward() {
        let mut s = ControlState::new();
        s.apply(AxisEvent::Horizontal(Vec2::new(0.25, -1.0)));
        assert_eq!(s.move_input, Vec3::new(0.25, 0.0, -1.0));
    }

    #[test]
    fn vertical_leaves_horizontal_untouched() {
        let mut s = ControlState::new();
        s.apply(AxisEvent::Horizontal(Vec2::new(1.0, 1.0)));
        s.apply(AxisEvent::Vertical(-0.5));
        assert_eq!(s.move_input, Vec3::new(1.0, -0.5, 1.0));
    }

    #[test]
    fn last_value_wins() {
        let mut s = ControlState::new();
        s.apply_all([AxisEvent::Yaw(3.0), AxisEvent::Yaw(-2.0), AxisEvent::Pitch(7.0)]);
        assert_eq!(s.yaw, -2.0);
        assert_eq!(s.pitch, 7.0);
        assert_eq!(s.roll, 0.0);
    }

    #[test]
    fn values_are_not_clamped() {
        let mut s = ControlState::new();
        s.apply(AxisEvent::Roll(250.0));
        assert_eq!(s.roll, 250.0);
        assert!(!s.is_idle());
    }
}
