//! Oriented frames on a curve.
//!
//! A [`Frame`] is a position plus three mutually orthonormal axes:
//! - `tangent`: local X, along the curve in the direction of increasing `t`
//! - `normal`: local Y, perpendicular to the tangent
//! - `binormal`: local Z, completing the right-handed basis (`tangent × normal`)
//!
//! Frames convert to and from nalgebra's `Isometry3`, which is the oriented
//! control point type, and compose like rigid transforms.

use nalgebra::{Isometry3, Matrix3, Point3, Rotation3, Translation3, UnitQuaternion, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A coordinate frame at a point on a curve.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Frame {
    /// Position on the curve.
    pub position: Point3<f64>,
    /// Unit tangent vector (forward direction).
    pub tangent: Vector3<f64>,
    /// Unit normal vector (perpendicular to tangent).
    pub normal: Vector3<f64>,
    /// Unit binormal vector (`tangent × normal`).
    pub binormal: Vector3<f64>,
}

impl Frame {
    /// Create a new frame with the given components.
    ///
    /// # Note
    ///
    /// The vectors are assumed to be orthonormal. Use [`Self::from_tangent_and_up`]
    /// for automatic orthonormalization.
    #[must_use]
    pub fn new(
        position: Point3<f64>,
        tangent: Vector3<f64>,
        normal: Vector3<f64>,
        binormal: Vector3<f64>,
    ) -> Self {
        Self {
            position,
            tangent,
            normal,
            binormal,
        }
    }

    /// Create a frame from a tangent and normal; the binormal is derived.
    #[must_use]
    pub fn from_axes(position: Point3<f64>, tangent: Vector3<f64>, normal: Vector3<f64>) -> Self {
        Self::new(position, tangent, normal, tangent.cross(&normal))
    }

    /// Create a frame from a tangent vector and an "up" hint.
    ///
    /// The normal and binormal are computed to form an orthonormal basis,
    /// with the normal as close to the up vector as possible.
    #[must_use]
    pub fn from_tangent_and_up(
        position: Point3<f64>,
        tangent: Vector3<f64>,
        up: Vector3<f64>,
    ) -> Self {
        let tangent = tangent.normalize();

        // Binormal is perpendicular to both tangent and up
        let binormal = tangent.cross(&up);
        let binormal_norm = binormal.norm();

        let (normal, binormal) = if binormal_norm > 1e-10 {
            let binormal = binormal / binormal_norm;
            let normal = binormal.cross(&tangent);
            (normal, binormal)
        } else {
            // Tangent is parallel to up, choose arbitrary perpendicular
            let perp = if tangent.x.abs() < 0.9 {
                Vector3::x()
            } else {
                Vector3::y()
            };
            let binormal = tangent.cross(&perp).normalize();
            let normal = binormal.cross(&tangent);
            (normal, binormal)
        };

        Self {
            position,
            tangent,
            normal,
            binormal,
        }
    }

    /// Frame at `position` whose tangent points along `direction`, with the
    /// normal as close to `up` as possible.
    ///
    /// A zero `direction` has no defined tangent and yields NaN axes.
    #[must_use]
    pub fn look_along(position: Point3<f64>, direction: Vector3<f64>, up: Vector3<f64>) -> Self {
        Self::from_tangent_and_up(position, direction, up)
    }

    /// The rotation taking world X/Y/Z onto tangent/normal/binormal.
    #[must_use]
    pub fn to_quaternion(&self) -> UnitQuaternion<f64> {
        let m = Matrix3::from_columns(&[self.tangent, self.normal, self.binormal]);
        UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(m))
    }

    /// Create a frame from a rotation quaternion.
    #[must_use]
    pub fn from_quaternion(position: Point3<f64>, q: UnitQuaternion<f64>) -> Self {
        let m = q.to_rotation_matrix();
        Self {
            position,
            tangent: m.matrix().column(0).into(),
            normal: m.matrix().column(1).into(),
            binormal: m.matrix().column(2).into(),
        }
    }

    /// Rigid transform equivalent of this frame.
    #[must_use]
    pub fn to_isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.position.coords), self.to_quaternion())
    }

    /// Frame equivalent of a rigid transform.
    #[must_use]
    pub fn from_isometry(iso: &Isometry3<f64>) -> Self {
        Self::from_quaternion(Point3::from(iso.translation.vector), iso.rotation)
    }

    /// `self ∘ other`: `other` expressed in this frame's local coordinates.
    #[must_use]
    pub fn compose(&self, other: &Frame) -> Self {
        Self {
            position: self.local_to_world(other.position),
            tangent: self.local_direction_to_world(other.tangent),
            normal: self.local_direction_to_world(other.normal),
            binormal: self.local_direction_to_world(other.binormal),
        }
    }

    /// The inverse transform, such that `f.compose(&f.inverse())` is the
    /// identity frame at the origin.
    #[must_use]
    pub fn inverse(&self) -> Self {
        // Rows of the rotation become the inverse's columns.
        let tangent = Vector3::new(self.tangent.x, self.normal.x, self.binormal.x);
        let normal = Vector3::new(self.tangent.y, self.normal.y, self.binormal.y);
        let binormal = Vector3::new(self.tangent.z, self.normal.z, self.binormal.z);
        let local = self.world_to_local(Point3::origin());
        Self {
            position: local,
            tangent,
            normal,
            binormal,
        }
    }

    /// Transform a local point to world coordinates.
    #[must_use]
    pub fn local_to_world(&self, local: Point3<f64>) -> Point3<f64> {
        self.position + self.tangent * local.x + self.normal * local.y + self.binormal * local.z
    }

    /// Transform a local direction to world coordinates.
    #[must_use]
    pub fn local_direction_to_world(&self, local: Vector3<f64>) -> Vector3<f64> {
        self.tangent * local.x + self.normal * local.y + self.binormal * local.z
    }

    /// Transform a world point to local coordinates.
    #[must_use]
    pub fn world_to_local(&self, world: Point3<f64>) -> Point3<f64> {
        let v = world - self.position;
        Point3::new(
            v.dot(&self.tangent),
            v.dot(&self.normal),
            v.dot(&self.binormal),
        )
    }

    /// Rotate the normal and binormal about the tangent by `angle` radians.
    #[must_use]
    pub fn rotated_about_tangent(&self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        let normal = self.normal * cos + self.binormal * sin;
        let binormal = self.binormal * cos - self.normal * sin;
        Self {
            normal,
            binormal,
            ..*self
        }
    }

    /// Check if the frame is orthonormal within tolerance.
    #[must_use]
    pub fn is_orthonormal(&self, tolerance: f64) -> bool {
        let t_len = (self.tangent.norm() - 1.0).abs();
        let n_len = (self.normal.norm() - 1.0).abs();
        let b_len = (self.binormal.norm() - 1.0).abs();
        let tn_dot = self.tangent.dot(&self.normal).abs();
        let tb_dot = self.tangent.dot(&self.binormal).abs();
        let nb_dot = self.normal.dot(&self.binormal).abs();

        t_len < tolerance
            && n_len < tolerance
            && b_len < tolerance
            && tn_dot < tolerance
            && tb_dot < tolerance
            && nb_dot < tolerance
    }

    /// Carry this frame to a new position and tangent with one
    /// double-reflection step (Wang et al., 2008).
    #[must_use]
    pub fn transport(&self, position: Point3<f64>, tangent: Vector3<f64>) -> Self {
        let tangent = tangent.normalize();

        let v1 = position - self.position;
        let c1 = v1.dot(&v1);

        if c1 < 1e-20 {
            // Points are coincident, just update tangent
            let binormal = tangent.cross(&self.normal);
            let binormal_norm = binormal.norm();

            let (normal, binormal) = if binormal_norm > 1e-10 {
                let binormal = binormal / binormal_norm;
                let normal = binormal.cross(&tangent);
                (normal, binormal)
            } else {
                (self.normal, self.binormal)
            };

            return Self::new(position, tangent, normal, binormal);
        }

        // First reflection, across the plane bisecting the two positions
        let r_l = self.normal - v1 * (2.0 / c1) * v1.dot(&self.normal);
        let t_l = self.tangent - v1 * (2.0 / c1) * v1.dot(&self.tangent);

        // Second reflection maps the reflected tangent onto the new one
        let v2 = tangent - t_l;
        let c2 = v2.dot(&v2);

        let normal = if c2 < 1e-20 {
            r_l.normalize()
        } else {
            (r_l - v2 * (2.0 / c2) * v2.dot(&r_l)).normalize()
        };

        Self::from_axes(position, tangent, normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_frame() -> Frame {
        Frame::from_tangent_and_up(
            Point3::new(1.0, 2.0, 3.0),
            Vector3::new(1.0, 1.0, 0.0).normalize(),
            Vector3::z(),
        )
    }

    #[test]
    fn test_frame_creation() {
        let frame = Frame::from_tangent_and_up(Point3::origin(), Vector3::x(), Vector3::z());

        assert!(frame.is_orthonormal(1e-10));
        assert_relative_eq!(frame.tangent, Vector3::x(), epsilon = 1e-10);
        assert_relative_eq!(frame.normal, Vector3::z(), epsilon = 1e-10);
    }

    #[test]
    fn test_tangent_parallel_to_up() {
        let frame = Frame::look_along(Point3::origin(), Vector3::z() * 3.0, Vector3::z());
        assert!(frame.is_orthonormal(1e-10));
        assert_relative_eq!(frame.tangent, Vector3::z(), epsilon = 1e-10);
    }

    #[test]
    fn test_zero_direction_is_nan() {
        let frame = Frame::look_along(Point3::origin(), Vector3::zeros(), Vector3::z());
        assert!(frame.tangent.x.is_nan());
    }

    #[test]
    fn test_quaternion_roundtrip() {
        let frame = sample_frame();
        let q = frame.to_quaternion();
        let reconstructed = Frame::from_quaternion(frame.position, q);

        assert_relative_eq!(frame.tangent, reconstructed.tangent, epsilon = 1e-10);
        assert_relative_eq!(frame.normal, reconstructed.normal, epsilon = 1e-10);
        assert_relative_eq!(frame.binormal, reconstructed.binormal, epsilon = 1e-10);
    }

    #[test]
    fn test_compose_matches_isometry_product() {
        let a = sample_frame();
        let b = Frame::from_tangent_and_up(
            Point3::new(-1.0, 0.5, 2.0),
            Vector3::new(0.0, 1.0, 1.0).normalize(),
            Vector3::x(),
        );

        let composed = a.compose(&b);
        let expected = Frame::from_isometry(&(a.to_isometry() * b.to_isometry()));

        assert_relative_eq!(composed.position, expected.position, epsilon = 1e-10);
        assert_relative_eq!(composed.tangent, expected.tangent, epsilon = 1e-10);
        assert_relative_eq!(composed.normal, expected.normal, epsilon = 1e-10);
        assert_relative_eq!(composed.binormal, expected.binormal, epsilon = 1e-10);
    }

    #[test]
    fn test_inverse_composes_to_identity() {
        let frame = sample_frame();
        let identity = frame.compose(&frame.inverse());

        assert_relative_eq!(identity.position, Point3::origin(), epsilon = 1e-10);
        assert_relative_eq!(identity.tangent, Vector3::x(), epsilon = 1e-10);
        assert_relative_eq!(identity.normal, Vector3::y(), epsilon = 1e-10);
        assert_relative_eq!(identity.binormal, Vector3::z(), epsilon = 1e-10);
    }

    #[test]
    fn test_rotated_about_tangent() {
        let frame = Frame::from_tangent_and_up(Point3::origin(), Vector3::x(), Vector3::z());
        let rotated = frame.rotated_about_tangent(std::f64::consts::FRAC_PI_2);

        assert!(rotated.is_orthonormal(1e-10));
        assert_relative_eq!(rotated.tangent, frame.tangent, epsilon = 1e-12);
        assert_relative_eq!(rotated.normal, frame.binormal, epsilon = 1e-12);
    }

    #[test]
    fn test_transport_along_straight_line_keeps_normal() {
        let start = Frame::from_tangent_and_up(Point3::origin(), Vector3::x(), Vector3::z());
        let next = start.transport(Point3::new(2.0, 0.0, 0.0), Vector3::x());

        assert!(next.is_orthonormal(1e-10));
        assert_relative_eq!(next.normal, start.normal, epsilon = 1e-12);
    }

    #[test]
    fn test_transport_around_planar_arc() {
        // Quarter circle in the XY plane; the out-of-plane normal must not
        // pick up any twist.
        let mut frame = Frame::from_tangent_and_up(Point3::new(1.0, 0.0, 0.0), Vector3::y(), Vector3::z());
        for i in 1..=32 {
            let angle = i as f64 / 32.0 * std::f64::consts::FRAC_PI_2;
            let position = Point3::new(angle.cos(), angle.sin(), 0.0);
            let tangent = Vector3::new(-angle.sin(), angle.cos(), 0.0);
            frame = frame.transport(position, tangent);

            assert!(frame.is_orthonormal(1e-10));
            assert_relative_eq!(frame.normal, Vector3::z(), epsilon = 1e-10);
        }
    }
}
