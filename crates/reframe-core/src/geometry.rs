//! The rigid operator that maps geometry between two frame conventions.

use nalgebra::{
    Isometry3, Matrix3, Matrix6, Point3, Quaternion, Translation3, Unit, UnitQuaternion, Vector3,
};
use std::f64::consts::PI;

/// Orientations whose norm is within this distance of one are composed as-is.
const NORM_TOLERANCE: f64 = 1e-9;

/// A fixed rotation, plus an optional translation, converting vectors and
/// orientations expressed in a source convention into a target convention.
///
/// The operator is built once and shared read-only by every relay. The
/// rotation applies to every geometric field. The translation applies only
/// to position-like fields; velocities, accelerations, forces and torques
/// are frame-relative and only ever see the rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTransform {
    isometry: Isometry3<f64>,
}

impl FrameTransform {
    /// Create an operator from a rotation and a translation.
    pub fn new(rotation: UnitQuaternion<f64>, translation: Vector3<f64>) -> Self {
        Self {
            isometry: Isometry3::from_parts(Translation3::from(translation), rotation),
        }
    }

    /// Create a rotation-only operator.
    pub fn from_rotation(rotation: UnitQuaternion<f64>) -> Self {
        Self::new(rotation, Vector3::zeros())
    }

    /// Create a rotation-only operator from roll, pitch and yaw in radians.
    pub fn from_rpy(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self::from_rotation(UnitQuaternion::from_euler_angles(roll, pitch, yaw))
    }

    /// Create an operator from raw quaternion components.
    ///
    /// The quaternion is normalized here, once, so that composing with it
    /// later never introduces drift.
    pub fn from_quaternion(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self::from_rotation(UnitQuaternion::from_quaternion(Quaternion::new(w, x, y, z)))
    }

    /// The operator that leaves everything unchanged.
    pub fn identity() -> Self {
        Self {
            isometry: Isometry3::identity(),
        }
    }

    /// Forward-left-up body axes to forward-right-down body axes.
    ///
    /// This is a half turn about X. It maps mobile-robot conventions onto
    /// the maritime and aerospace ones.
    pub fn flu_to_frd() -> Self {
        Self::from_rotation(UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI))
    }

    /// East-north-up world axes to north-east-down world axes.
    pub fn enu_to_ned() -> Self {
        let axis = Unit::new_normalize(Vector3::new(1.0, 1.0, 0.0));
        Self::from_rotation(UnitQuaternion::from_axis_angle(&axis, PI))
    }

    /// Replace the translation component.
    pub fn with_translation(mut self, translation: Vector3<f64>) -> Self {
        self.isometry.translation = Translation3::from(translation);
        self
    }

    /// The operator mapping target-convention values back to the source
    /// convention.
    pub fn inverse(&self) -> Self {
        Self {
            isometry: self.isometry.inverse(),
        }
    }

    pub fn rotation(&self) -> &UnitQuaternion<f64> {
        &self.isometry.rotation
    }

    pub fn translation(&self) -> Vector3<f64> {
        self.isometry.translation.vector
    }

    /// Rotate a frame-relative vector (velocity, acceleration, force,
    /// torque). The translation is never applied.
    pub fn rotate_vector(&self, vector: Vector3<f64>) -> Vector3<f64> {
        self.isometry.transform_vector(&vector)
    }

    /// Map a position-like vector through the rotation and the translation.
    pub fn map_position(&self, position: Vector3<f64>) -> Vector3<f64> {
        self.isometry.transform_point(&Point3::from(position)).coords
    }

    /// Compose an orientation with the rotation, as `rotation * orientation`.
    ///
    /// An orientation with a finite, non-zero norm other than one is
    /// normalized first. Zero and non-finite quaternions are composed as
    /// given, so NaN input yields NaN output.
    pub fn map_orientation(&self, orientation: Quaternion<f64>) -> Quaternion<f64> {
        let norm = orientation.norm();
        let orientation = if norm.is_finite() && norm > 0.0 && (norm - 1.0).abs() > NORM_TOLERANCE
        {
            orientation / norm
        } else {
            orientation
        };

        self.isometry.rotation.into_inner() * orientation
    }

    /// Rotate a row-major 6x6 covariance over (linear, angular) components
    /// as `M C Mᵀ` where `M = diag(R, R)`.
    pub fn map_covariance(&self, covariance: &[f64; 36]) -> [f64; 36] {
        let rotation: Matrix3<f64> = self.isometry.rotation.to_rotation_matrix().into_inner();

        let mut block = Matrix6::<f64>::zeros();
        block.fixed_view_mut::<3, 3>(0, 0).copy_from(&rotation);
        block.fixed_view_mut::<3, 3>(3, 3).copy_from(&rotation);

        let input = Matrix6::from_row_slice(covariance);
        let output = block * input * block.transpose();

        let mut result = [0.0; 36];
        for row in 0..6 {
            for col in 0..6 {
                result[row * 6 + col] = output[(row, col)];
            }
        }
        result
    }
}

impl Default for FrameTransform {
    fn default() -> Self {
        Self::identity()
    }
}
