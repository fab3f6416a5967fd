//! Control point types.
//!
//! A curve is built from control points of exactly one [`PointKind`]. Every
//! position is carried internally as a `Vector3<f64>`; planar points live in
//! the `z = 0` plane.

use crate::{CurveError, Result};
use nalgebra::{Isometry3, Point2, Point3, UnitQuaternion, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The kind of a control point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PointKind {
    /// A point in the plane.
    Planar,
    /// A point in space.
    Spatial,
    /// A point in space with an orientation.
    Oriented,
}

impl PointKind {
    /// Whether curves of this kind have a binormal and torsion.
    #[must_use]
    pub fn is_spatial(self) -> bool {
        !matches!(self, Self::Planar)
    }
}

/// A point the curve must pass through.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ControlPoint {
    /// A 2D point.
    Planar(Point2<f64>),
    /// A 3D point.
    Spatial(Point3<f64>),
    /// A 3D point with an orientation.
    Oriented(Isometry3<f64>),
}

impl ControlPoint {
    /// The kind tag of this point.
    #[must_use]
    pub fn kind(&self) -> PointKind {
        match self {
            Self::Planar(_) => PointKind::Planar,
            Self::Spatial(_) => PointKind::Spatial,
            Self::Oriented(_) => PointKind::Oriented,
        }
    }

    /// Position as a 3D vector (`z = 0` for planar points).
    #[must_use]
    pub fn position(&self) -> Vector3<f64> {
        match self {
            Self::Planar(p) => Vector3::new(p.x, p.y, 0.0),
            Self::Spatial(p) => p.coords,
            Self::Oriented(iso) => iso.translation.vector,
        }
    }

    /// Orientation of an oriented point.
    #[must_use]
    pub fn rotation(&self) -> Option<UnitQuaternion<f64>> {
        match self {
            Self::Oriented(iso) => Some(iso.rotation),
            _ => None,
        }
    }

    /// Whether every coordinate is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Planar(p) => p.coords.iter().all(|c| c.is_finite()),
            Self::Spatial(p) => p.coords.iter().all(|c| c.is_finite()),
            Self::Oriented(iso) => {
                iso.translation.vector.iter().all(|c| c.is_finite())
                    && iso.rotation.coords.iter().all(|c| c.is_finite())
            }
        }
    }

    /// Whether two points lie within `epsilon` of each other.
    ///
    /// Only positions are compared.
    #[must_use]
    pub fn fuzzy_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self.position() - other.position()).norm() <= epsilon
    }
}

impl From<Point2<f64>> for ControlPoint {
    fn from(p: Point2<f64>) -> Self {
        Self::Planar(p)
    }
}

impl From<Point3<f64>> for ControlPoint {
    fn from(p: Point3<f64>) -> Self {
        Self::Spatial(p)
    }
}

impl From<Isometry3<f64>> for ControlPoint {
    fn from(iso: Isometry3<f64>) -> Self {
        Self::Oriented(iso)
    }
}

/// Check that `points` is non-empty, finite, and of a single kind.
pub(crate) fn validate(points: &[ControlPoint]) -> Result<PointKind> {
    let first = points
        .first()
        .ok_or_else(|| CurveError::insufficient_points(1, 0))?;
    let expected = first.kind();

    for (index, point) in points.iter().enumerate() {
        if point.kind() != expected {
            return Err(CurveError::MixedPointKinds {
                index,
                expected,
                found: point.kind(),
            });
        }
        if !point.is_finite() {
            return Err(CurveError::InvalidPoint { index });
        }
    }

    Ok(expected)
}

/// Merge runs of adjacent points closer than `epsilon`, keeping the first.
pub(crate) fn dedup(points: &[ControlPoint], epsilon: f64) -> Vec<ControlPoint> {
    let mut unique: Vec<ControlPoint> = Vec::with_capacity(points.len());
    for point in points {
        match unique.last() {
            Some(last) if last.fuzzy_eq(point, epsilon) => {}
            _ => unique.push(*point),
        }
    }
    unique
}
