use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Spatial transform: position, rotation, scale.
///
/// Basis vectors follow the left-handed convention used by the renderer:
/// right is +X, up is +Y and forward is +Z, all rotated by `rotation`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn right(&self) -> Vec3 {
        (self.rotation * Vec3::X).normalize()
    }

    pub fn up(&self) -> Vec3 {
        (self.rotation * Vec3::Y).normalize()
    }

    pub fn forward(&self) -> Vec3 {
        (self.rotation * Vec3::Z).normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
    }

    #[test]
    fn identity_basis() {
        let t = Transform::default();
        assert_eq!(t.right(), Vec3::X);
        assert_eq!(t.up(), Vec3::Y);
        assert_eq!(t.forward(), Vec3::Z);
    }

    #[test]
    fn basis_follows_rotation() {
        let t = Transform {
            rotation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            ..Transform::default()
        };
        // Quarter turn about +Y turns right: forward swings from +Z to +X.
        assert!(t.forward().abs_diff_eq(Vec3::X, 1e-6));
        assert!(t.right().abs_diff_eq(Vec3::NEG_Z, 1e-6));
        assert!(t.up().abs_diff_eq(Vec3::Y, 1e-6));
    }
}
