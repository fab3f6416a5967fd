//! Construction parameters and numeric tolerances.

use crate::{CurveError, Result};
use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default Chebyshev degree used for unit-speed data.
pub const DEFAULT_CHEBYSHEV_DEGREE: usize = 8;

/// Numeric tolerances and iteration caps shared by every segment of a chain.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tolerances {
    /// Residual at which the Newton–bisection arc-length solve stops.
    ///
    /// Default: `1e-13`
    pub newton_tolerance: f64,

    /// Iteration cap for the Newton–bisection solve.
    ///
    /// Default: `16`
    pub newton_max_iterations: usize,

    /// Residual at which regula falsi stops when inverting a Chebyshev
    /// interpolant.
    ///
    /// Default: `1e-12`
    pub falsi_tolerance: f64,

    /// Iteration cap for regula falsi.
    ///
    /// Default: `10`
    pub falsi_max_iterations: usize,

    /// Leading coefficients below this magnitude make the bounding box
    /// root solver fall back to a linear solve.
    ///
    /// Default: `1e-12`
    pub quadratic_epsilon: f64,

    /// Number of entries in the unit-speed lookup table.
    ///
    /// Default: `65`
    pub lookup_table_size: usize,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            newton_tolerance: 1e-13,
            newton_max_iterations: 16,
            falsi_tolerance: 1e-12,
            falsi_max_iterations: 10,
            quadratic_epsilon: 1e-12,
            lookup_table_size: 65,
        }
    }
}

/// Parameters controlling how a [`Chain`](crate::Chain) is built.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChainParams {
    /// Knot spacing exponent: `0` uniform, `0.5` centripetal, `1` chordal.
    ///
    /// Default: `0.5`
    pub alpha: f64,

    /// Tangent scale in `[0, 1]`; `1` collapses tangents to zero.
    ///
    /// Default: `0.0`
    pub tension: f64,

    /// Close the curve back onto its first control point.
    ///
    /// Default: `false`
    pub loops: bool,

    /// Adjacent control points closer than this distance are merged.
    ///
    /// Default: `1e-9`
    pub epsilon: f64,

    /// Frames per segment used when rotation-minimizing frames are
    /// precomputed on demand.
    ///
    /// Default: `16`
    pub rmf_frames_per_segment: usize,

    /// Up-vector goal for the look-along frame seeding the first segment's
    /// rotation-minimizing frames.
    ///
    /// Default: `+Z`
    pub up: Vector3<f64>,

    /// Numeric tolerances handed to every segment.
    pub tolerances: Tolerances,
}

impl Default for ChainParams {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            tension: 0.0,
            loops: false,
            epsilon: 1e-9,
            rmf_frames_per_segment: 16,
            up: Vector3::z(),
            tolerances: Tolerances::default(),
        }
    }
}

impl ChainParams {
    /// Uniform parametrization (`alpha = 0`).
    #[must_use]
    pub fn uniform() -> Self {
        Self {
            alpha: 0.0,
            ..Default::default()
        }
    }

    /// Centripetal parametrization (`alpha = 0.5`), the default.
    #[must_use]
    pub fn centripetal() -> Self {
        Self::default()
    }

    /// Chordal parametrization (`alpha = 1`).
    #[must_use]
    pub fn chordal() -> Self {
        Self {
            alpha: 1.0,
            ..Default::default()
        }
    }

    /// Set the knot spacing exponent.
    #[must_use]
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the tension.
    #[must_use]
    pub fn with_tension(mut self, tension: f64) -> Self {
        self.tension = tension;
        self
    }

    /// Set whether the curve loops.
    #[must_use]
    pub fn with_loops(mut self, loops: bool) -> Self {
        self.loops = loops;
        self
    }

    /// Check every parameter against its domain.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(CurveError::invalid_parameter(
                "alpha",
                self.alpha,
                "must lie in [0, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&self.tension) {
            return Err(CurveError::invalid_parameter(
                "tension",
                self.tension,
                "must lie in [0, 1]",
            ));
        }
        if !(self.epsilon >= 0.0 && self.epsilon.is_finite()) {
            return Err(CurveError::invalid_parameter(
                "epsilon",
                self.epsilon,
                "must be finite and non-negative",
            ));
        }
        if self.rmf_frames_per_segment == 0 {
            return Err(CurveError::invalid_parameter(
                "rmf_frames_per_segment",
                0.0,
                "must be at least 1",
            ));
        }
        if self.tolerances.lookup_table_size < 2 {
            return Err(CurveError::invalid_parameter(
                "lookup_table_size",
                self.tolerances.lookup_table_size as f64,
                "must be at least 2",
            ));
        }
        Ok(())
    }
}

/// When unit-speed data is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Precompute {
    /// Build the interpolant immediately.
    #[default]
    Now,
    /// Store the parameters and build on first use.
    OnDemand,
}

/// How a precomputed inverse arc-length interpolant is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ArcStrategy {
    /// Evaluate the Chebyshev series on every query.
    #[default]
    Polynomial,
    /// Linearly interpolate a table sampled from the Chebyshev series.
    LookupTable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_valid() {
        assert!(ChainParams::default().validate().is_ok());
        assert!(ChainParams::uniform().validate().is_ok());
        assert!(ChainParams::chordal().validate().is_ok());
    }

    #[test]
    fn test_presets() {
        assert_eq!(ChainParams::uniform().alpha, 0.0);
        assert_eq!(ChainParams::centripetal().alpha, 0.5);
        assert_eq!(ChainParams::chordal().alpha, 1.0);

        let params = ChainParams::default().with_tension(0.25).with_loops(true);
        assert_eq!(params.tension, 0.25);
        assert!(params.loops);
    }

    #[test]
    fn test_out_of_domain_params() {
        let err = ChainParams::default().with_alpha(1.5).validate();
        assert!(matches!(
            err,
            Err(CurveError::InvalidParameter { name: "alpha", .. })
        ));

        let err = ChainParams::default().with_tension(-0.1).validate();
        assert!(matches!(
            err,
            Err(CurveError::InvalidParameter { name: "tension", .. })
        ));

        let err = ChainParams::default().with_alpha(f64::NAN).validate();
        assert!(err.is_err());

        let params = ChainParams {
            rmf_frames_per_segment: 0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
