use glam::{Quat, Vec3};
use scaleview_common::Transform;
use scaleview_input::ControlState;

/// Yaw rate in degrees per tick per unit of input.
const YAW_RATE: f32 = 0.1;
/// Pitch rate in degrees per tick per unit of input. Positive input pitches up.
const PITCH_RATE: f32 = -0.1;
/// Roll rate in degrees per tick per unit of input. Positive input rolls right.
const ROLL_RATE: f32 = -1.0;
/// Vertical translation runs at half the lateral/forward speed.
const VERTICAL_SPEED_SCALE: f32 = 0.5;

/// Free-fly controller. Owns no input state; it reads whatever was last
/// latched into a [`ControlState`] every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyController {
    pub speed: f32,
}

impl Default for FlyController {
    fn default() -> Self {
        Self { speed: 10.0 }
    }
}

/// What a single tick did to the transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub rotation_delta: Quat,
    pub displacement: Vec3,
}

impl FlyController {
    pub fn new(speed: f32) -> Self {
        Self { speed }
    }

    /// Advance `transform` by one tick of `dt` seconds.
    ///
    /// Rotation is applied first; the translation then moves along the
    /// already-rotated basis.
    pub fn tick(&self, transform: &mut Transform, input: &ControlState, dt: f32) -> TickReport {
        let rotation_delta = delta_rotation(transform, input);
        transform.rotation = (rotation_delta * transform.rotation).normalize();

        let displacement = delta_position(transform, input, self.speed, dt);
        transform.position += displacement;

        tracing::trace!(
            dt,
            ?displacement,
            position = ?transform.position,
            "fly controller tick"
        );

        TickReport {
            rotation_delta,
            displacement,
        }
    }
}

/// Incremental world rotation for one tick: yaw about the current up axis,
/// then pitch about the current right axis, then roll about the current
/// forward axis, multiplied in that order.
pub fn delta_rotation(transform: &Transform, input: &ControlState) -> Quat {
    let yaw = Quat::from_axis_angle(transform.up(), (YAW_RATE * input.yaw).to_radians());
    let pitch = Quat::from_axis_angle(transform.right(), (PITCH_RATE * input.pitch).to_radians());
    let roll = Quat::from_axis_angle(transform.forward(), (ROLL_RATE * input.roll).to_radians());
    Quat::IDENTITY * yaw * pitch * roll
}

/// Displacement for one tick along the transform's current basis.
pub fn delta_position(transform: &Transform, input: &ControlState, speed: f32, dt: f32) -> Vec3 {
    let step = speed * dt;
    let m = input.move_input;
    step * m.x * transform.right()
        + VERTICAL_SPEED_SCALE * step * m.y * transform.up()
        + step * m.z * transform.forward()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use scaleview_input::AxisEvent;

    const EPS: f32 = 1e-5;

    #[test]
    fn idle_input_is_a_no_op() {
        let controller = FlyController::new(10.0);
        let mut t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        let report = controller.tick(&mut t, &ControlState::new(), 0.016);
        assert_eq!(report.displacement, Vec3::ZERO);
        assert!(report.rotation_delta.abs_diff_eq(Quat::IDENTITY, EPS));
        assert_eq!(t.position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn yaw_ten_for_one_tick_is_one_degree_about_up() {
        let controller = FlyController::default();
        let mut t = Transform::default();
        let mut input = ControlState::new();
        input.apply(AxisEvent::Yaw(10.0));

        controller.tick(&mut t, &input, 1.0 / 60.0);

        let expected = Quat::from_axis_angle(Vec3::Y, 1.0_f32.to_radians());
        assert!(t.rotation.abs_diff_eq(expected, EPS));
    }

    #[test]
    fn rotation_ignores_tick_duration() {
        let mut input = ControlState::new();
        input.apply(AxisEvent::Pitch(5.0));
        let t = Transform::default();
        let mut short = t;
        let mut long = t;
        FlyController::default().tick(&mut short, &input, 0.001);
        FlyController::default().tick(&mut long, &input, 1.0);
        assert!(short.rotation.abs_diff_eq(long.rotation, EPS));
    }

    #[test]
    fn positive_pitch_raises_the_nose() {
        let mut input = ControlState::new();
        input.apply(AxisEvent::Pitch(100.0));
        let mut t = Transform::default();
        FlyController::new(1.0).tick(&mut t, &input, 1.0);
        // -10 degrees about +X lifts the +Z forward vector.
        assert!(t.forward().y > 0.0);
        assert!((t.forward().y - 10.0_f32.to_radians().sin()).abs() < EPS);
        let expected = Quat::from_axis_angle(Vec3::X, (-10.0_f32).to_radians());
        assert!(t.rotation.abs_diff_eq(expected, EPS));
    }

    #[test]
    fn positive_yaw_turns_right() {
        let mut input = ControlState::new();
        input.apply(AxisEvent::Yaw(100.0));
        let mut t = Transform::default();
        FlyController::new(1.0).tick(&mut t, &input, 1.0);
        assert!(t.forward().x > 0.0);
        assert!((t.forward().x - 10.0_f32.to_radians().sin()).abs() < EPS);
        assert!(t.forward().y.abs() < EPS);
    }

    #[test]
    fn positive_roll_tilts_the_top_right() {
        let mut input = ControlState::new();
        input.apply(AxisEvent::Roll(10.0));
        let mut t = Transform::default();
        FlyController::new(1.0).tick(&mut t, &input, 1.0);
        assert!(t.up().x > 0.0);
        assert!((t.up().x - 10.0_f32.to_radians().sin()).abs() < EPS);
        // Rolling never moves the nose.
        assert!(t.forward().abs_diff_eq(Vec3::Z, EPS));
    }

    #[test]
    fn roll_is_about_forward_axis() {
        let mut input = ControlState::new();
        input.apply(AxisEvent::Roll(3.0));
        let t = Transform::default();
        let delta = delta_rotation(&t, &input);
        let expected = Quat::from_axis_angle(Vec3::Z, (-3.0_f32).to_radians());
        assert!(delta.abs_diff_eq(expected, EPS));
        // Forward is the rotation axis, so it is unchanged.
        assert!((delta * t.forward()).abs_diff_eq(t.forward(), EPS));
    }

    #[test]
    fn composition_order_is_yaw_then_pitch_then_roll() {
        let mut input = ControlState::new();
        input.apply_all([
            AxisEvent::Yaw(300.0),
            AxisEvent::Pitch(200.0),
            AxisEvent::Roll(15.0),
        ]);
        let t = Transform {
            rotation: Quat::from_rotation_z(0.4) * Quat::from_rotation_y(0.7),
            ..Transform::default()
        };

        let yaw = Quat::from_axis_angle(t.up(), 30.0_f32.to_radians());
        let pitch = Quat::from_axis_angle(t.right(), (-20.0_f32).to_radians());
        let roll = Quat::from_axis_angle(t.forward(), (-15.0_f32).to_radians());

        let delta = delta_rotation(&t, &input);
        assert!(delta.abs_diff_eq(yaw * pitch * roll, EPS));
        assert!(!delta.abs_diff_eq(roll * pitch * yaw, 1e-3));
    }

    #[test]
    fn vertical_moves_at_half_rate() {
        let controller = FlyController::new(10.0);
        let mut input = ControlState::new();
        input.apply(AxisEvent::Horizontal(Vec2::new(1.0, 0.0)));
        input.apply(AxisEvent::Vertical(1.0));

        let mut t = Transform::default();
        let report = controller.tick(&mut t, &input, 1.0);

        assert!((report.displacement.x - 10.0).abs() < EPS);
        assert!((report.displacement.y - 5.0).abs() < EPS);
        assert!(report.displacement.z.abs() < EPS);
    }

    #[test]
    fn forward_input_moves_along_positive_z() {
        let mut input = ControlState::new();
        input.apply(AxisEvent::Horizontal(Vec2::new(0.0, 1.0)));
        let d = delta_position(&Transform::default(), &input, 2.0, 0.5);
        assert!(d.abs_diff_eq(Vec3::new(0.0, 0.0, 1.0), EPS));
    }

    #[test]
    fn axis_contributions_are_additive() {
        let t = Transform {
            rotation: Quat::from_rotation_y(1.1) * Quat::from_rotation_x(-0.3),
            ..Transform::default()
        };
        let mut lateral = ControlState::new();
        lateral.apply(AxisEvent::Horizontal(Vec2::new(0.7, 0.0)));
        let mut vertical = ControlState::new();
        vertical.apply(AxisEvent::Vertical(-0.4));
        let mut forward = ControlState::new();
        forward.apply(AxisEvent::Horizontal(Vec2::new(0.0, 0.9)));
        let mut all = ControlState::new();
        all.apply_all([
            AxisEvent::Horizontal(Vec2::new(0.7, 0.9)),
            AxisEvent::Vertical(-0.4),
        ]);

        let sum = delta_position(&t, &lateral, 3.0, 0.1)
            + delta_position(&t, &vertical, 3.0, 0.1)
            + delta_position(&t, &forward, 3.0, 0.1);
        assert!(delta_position(&t, &all, 3.0, 0.1).abs_diff_eq(sum, EPS));
    }

    #[test]
    fn zero_speed_never_moves() {
        let controller = FlyController::new(0.0);
        let mut input = ControlState::new();
        input.apply(AxisEvent::Horizontal(Vec2::ONE));
        input.apply(AxisEvent::Vertical(1.0));
        let mut t = Transform::default();
        controller.tick(&mut t, &input, 1.0);
        assert_eq!(t.position, Vec3::ZERO);
    }

    #[test]
    fn held_input_keeps_moving_every_tick() {
        let controller = FlyController::new(1.0);
        let mut input = ControlState::new();
        input.apply(AxisEvent::Horizontal(Vec2::new(1.0, 0.0)));
        let mut t = Transform::default();
        for _ in 0..4 {
            controller.tick(&mut t, &input, 0.5);
        }
        assert!(t.position.abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), EPS));
    }

    #[test]
    fn translation_uses_rotated_basis() {
        let controller = FlyController::new(1.0);
        let mut input = ControlState::new();
        input.apply(AxisEvent::Yaw(900.0));
        input.apply(AxisEvent::Horizontal(Vec2::new(0.0, 1.0)));
        let mut t = Transform::default();
        controller.tick(&mut t, &input, 1.0);
        // A 90 degree yaw to the right happens first, so forward now points along +X.
        assert!(t.position.abs_diff_eq(Vec3::X, EPS));
    }
}
