use glam::{DMat3, DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// Rigid transformation `x' = R * x + t`.
///
/// For a relative pose `cam2_from_cam1` the translation of an estimated
/// essential matrix has unit norm, the scale is not observable.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rigid3 {
    /// Unit quaternion of the rotation.
    pub rotation: DQuat,
    /// Translation vector.
    pub translation: DVec3,
}

impl Default for Rigid3 {
    fn default() -> Self {
        Self {
            rotation: DQuat::IDENTITY,
            translation: DVec3::ZERO,
        }
    }
}

impl Rigid3 {
    /// Create a transform from a rotation and a translation.
    pub fn new(rotation: DQuat, translation: DVec3) -> Self {
        Self {
            rotation: rotation.normalize(),
            translation,
        }
    }

    /// Create a transform from a rotation matrix and a translation.
    pub fn from_rotation_matrix(rotation: &DMat3, translation: DVec3) -> Self {
        Self::new(DQuat::from_mat3(rotation), translation)
    }

    /// The rotation as a 3x3 matrix.
    pub fn rotation_matrix(&self) -> DMat3 {
        DMat3::from_quat(self.rotation)
    }

    /// Apply the transform to a point.
    pub fn transform_point(&self, point: DVec3) -> DVec3 {
        self.rotation * point + self.translation
    }

    /// The inverse transform.
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.inverse();
        Self {
            rotation,
            translation: -(rotation * self.translation),
        }
    }
}
