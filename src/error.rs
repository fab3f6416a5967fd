//! Error types for spline construction and queries.

use crate::PointKind;
use thiserror::Error;

/// Errors that can occur while building or querying a spline.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CurveError {
    /// Insufficient points to define the curve.
    #[error("insufficient points: need at least {required}, got {actual}")]
    InsufficientPoints {
        /// Minimum required points.
        required: usize,
        /// Actual number of points provided.
        actual: usize,
    },

    /// Control points of different kinds were mixed in one curve.
    #[error("control point {index} is {found:?}, expected {expected:?}")]
    MixedPointKinds {
        /// Index of the first offending point.
        index: usize,
        /// Kind of the first control point.
        expected: PointKind,
        /// Kind found at `index`.
        found: PointKind,
    },

    /// A control point has a non-finite coordinate.
    #[error("control point {index} has a non-finite coordinate")]
    InvalidPoint {
        /// Index of the offending point.
        index: usize,
    },

    /// A construction parameter is outside its domain.
    #[error("invalid {name} = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Rejected value.
        value: f64,
        /// What the parameter must satisfy.
        reason: &'static str,
    },

    /// Invalid degree for the Chebyshev interpolant.
    #[error("invalid degree {degree}: must be even and between {min} and {max}")]
    InvalidDegree {
        /// Specified degree.
        degree: usize,
        /// Minimum allowed degree.
        min: usize,
        /// Maximum allowed degree.
        max: usize,
    },

    /// The query is undefined for this kind of control point.
    #[error("{operation} is not defined for {kind:?} control points")]
    UnsupportedPointKind {
        /// Name of the rejected query.
        operation: &'static str,
        /// Kind of the curve's control points.
        kind: PointKind,
    },

    /// A rotation-minimizing frame was requested without a seed frame and
    /// without a precomputed lookup table.
    #[error("segment {segment} has no precomputed rotation-minimizing frames")]
    RmfNotPrecomputed {
        /// Index of the segment within its chain (0 for standalone segments).
        segment: usize,
    },

    /// Segment index range is empty or out of bounds.
    #[error("invalid segment range {first}..={last} for {count} segments")]
    InvalidSegmentRange {
        /// First requested index.
        first: usize,
        /// Last requested index.
        last: usize,
        /// Number of segments in the chain.
        count: usize,
    },
}

impl CurveError {
    /// Create an insufficient points error.
    #[must_use]
    pub fn insufficient_points(required: usize, actual: usize) -> Self {
        Self::InsufficientPoints { required, actual }
    }

    /// Create an invalid parameter error.
    #[must_use]
    pub fn invalid_parameter(name: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value,
            reason,
        }
    }

    /// Create an unsupported point kind error.
    #[must_use]
    pub fn unsupported(operation: &'static str, kind: PointKind) -> Self {
        Self::UnsupportedPointKind { operation, kind }
    }

    /// Check if this is an insufficient points error.
    #[must_use]
    pub fn is_insufficient_points(&self) -> bool {
        matches!(self, Self::InsufficientPoints { .. })
    }

    /// Check if this error was raised while validating construction input.
    #[must_use]
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            Self::InsufficientPoints { .. }
                | Self::MixedPointKinds { .. }
                | Self::InvalidPoint { .. }
                | Self::InvalidParameter { .. }
        )
    }

    /// Check if this is an unsupported point kind error.
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedPointKind { .. })
    }
}
