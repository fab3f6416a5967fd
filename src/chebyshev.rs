//! Chebyshev interpolation of monotone functions on `[0, 1]`.
//!
//! The interpolant samples its function at the `degree + 1` Chebyshev
//! extrema mapped into `[0, 1]` and evaluates with the second barycentric
//! formula. Both endpoints are nodes and are pinned to exactly `0` and `1`,
//! since every function interpolated here maps `0 ↦ 0` and `1 ↦ 1`.

use crate::{CurveError, Result, Tolerances};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::warn;

/// Smallest accepted degree.
pub const MIN_DEGREE: usize = 2;

/// Largest accepted degree.
pub const MAX_DEGREE: usize = 64;

/// A polynomial interpolant on `[0, 1]` built on Chebyshev nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Chebyshev {
    grid: Arc<[f64]>,
    values: Vec<f64>,
}

impl Chebyshev {
    /// Build an interpolant of `f` with the given even `degree`.
    ///
    /// `f` is only sampled at interior nodes.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InvalidDegree`] if `degree` is odd or outside
    /// [`MIN_DEGREE`]`..=`[`MAX_DEGREE`].
    pub fn new<F>(degree: usize, f: F) -> Result<Self>
    where
        F: Fn(f64) -> f64,
    {
        check_degree(degree)?;
        Ok(Self::sample(degree, f))
    }

    /// Build without validating `degree`; callers check it up front.
    pub(crate) fn sample<F>(degree: usize, f: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        let grid = nodes(degree);
        let mut values = Vec::with_capacity(degree + 1);
        values.push(0.0);
        values.extend(grid[1..degree].iter().map(|&x| f(x)));
        values.push(1.0);

        Self { grid, values }
    }

    /// Polynomial degree.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.grid.len() - 1
    }

    /// Node positions in ascending order.
    #[must_use]
    pub fn grid(&self) -> &[f64] {
        &self.grid
    }

    /// Interpolated values at each node.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Evaluate the interpolant at `x`.
    ///
    /// Returns the stored value exactly when `x` is a node.
    #[must_use]
    pub fn evaluate(&self, x: f64) -> f64 {
        let last = self.degree();
        let mut numerator = 0.0;
        let mut denominator = 0.0;

        for (j, (&node, &value)) in self.grid.iter().zip(&self.values).enumerate() {
            let diff = x - node;
            if diff == 0.0 {
                return value;
            }

            let mut weight = if j % 2 == 0 { 1.0 } else { -1.0 };
            if j == 0 || j == last {
                weight *= 0.5;
            }

            let k = weight / diff;
            numerator += k * value;
            denominator += k;
        }

        numerator / denominator
    }

    /// Build the inverse interpolant with default tolerances.
    #[must_use]
    pub fn invert(&self) -> Self {
        let tolerances = Tolerances::default();
        self.invert_with(tolerances.falsi_tolerance, tolerances.falsi_max_iterations)
    }

    /// Build the inverse interpolant on the same grid.
    ///
    /// Each grid node `y` is mapped to the `x` with `self.evaluate(x) = y`,
    /// found by false position inside the grid interval whose values bracket
    /// `y`. The interpolant must be monotone increasing.
    #[must_use]
    pub fn invert_with(&self, tolerance: f64, max_iterations: usize) -> Self {
        let last = self.degree();
        let mut values = Vec::with_capacity(last + 1);
        values.push(0.0);
        values.extend(
            self.grid[1..last]
                .iter()
                .map(|&y| self.solve(y, tolerance, max_iterations)),
        );
        values.push(1.0);

        Self {
            grid: Arc::clone(&self.grid),
            values,
        }
    }

    /// Find `x` with `evaluate(x) = y`.
    fn solve(&self, y: f64, tolerance: f64, max_iterations: usize) -> f64 {
        // First index whose value exceeds y; the bracket is [j - 1, j].
        let j = self
            .values
            .partition_point(|&v| v <= y)
            .clamp(1, self.degree());

        let (mut lo, mut hi) = (self.grid[j - 1], self.grid[j]);
        let (mut f_lo, mut f_hi) = (self.values[j - 1] - y, self.values[j] - y);
        if f_lo == 0.0 {
            return lo;
        }

        // Illinois variant: halve the stale endpoint's residual when the
        // same side is replaced twice in a row.
        let mut side = 0i8;
        for _ in 0..max_iterations {
            let x = if f_hi == f_lo {
                0.5 * (lo + hi)
            } else {
                (lo * f_hi - hi * f_lo) / (f_hi - f_lo)
            };
            let fx = self.evaluate(x) - y;
            if fx.abs() < tolerance {
                return x;
            }

            if (fx < 0.0) == (f_lo < 0.0) {
                lo = x;
                f_lo = fx;
                if side == -1 {
                    f_hi *= 0.5;
                }
                side = -1;
            } else {
                hi = x;
                f_hi = fx;
                if side == 1 {
                    f_lo *= 0.5;
                }
                side = 1;
            }
        }

        warn!(
            value = y,
            lower = lo,
            upper = hi,
            "false position did not converge, using bracket midpoint"
        );
        0.5 * (lo + hi)
    }
}

pub(crate) fn check_degree(degree: usize) -> Result<()> {
    if degree % 2 != 0 || !(MIN_DEGREE..=MAX_DEGREE).contains(&degree) {
        return Err(CurveError::InvalidDegree {
            degree,
            min: MIN_DEGREE,
            max: MAX_DEGREE,
        });
    }
    Ok(())
}

/// Chebyshev extrema for `degree`, mapped into `[0, 1]` ascending.
///
/// Node sets are shared between every interpolant of the same degree.
fn nodes(degree: usize) -> Arc<[f64]> {
    static CACHE: OnceLock<Mutex<HashMap<usize, Arc<[f64]>>>> = OnceLock::new();

    let build = || -> Arc<[f64]> {
        let n = degree as f64;
        let mut grid: Vec<f64> = (0..=degree)
            .map(|j| 0.5 * (1.0 - (j as f64 * std::f64::consts::PI / n).cos()))
            .collect();
        grid[0] = 0.0;
        grid[degree] = 1.0;
        grid.into()
    };

    match CACHE.get_or_init(|| Mutex::new(HashMap::new())).lock() {
        Ok(mut cache) => Arc::clone(cache.entry(degree).or_insert_with(build)),
        Err(_) => build(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_grid_is_ascending_with_pinned_ends() {
        let cheb = Chebyshev::new(8, |x| x).unwrap();
        let grid = cheb.grid();

        assert_eq!(grid.len(), 9);
        assert_eq!(grid[0], 0.0);
        assert_eq!(grid[8], 1.0);
        assert_relative_eq!(grid[4], 0.5, epsilon = 1e-15);
        assert!(grid.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_grid_is_shared_per_degree() {
        let a = Chebyshev::new(6, |x| x).unwrap();
        let b = Chebyshev::new(6, |x| x * x).unwrap();
        assert!(Arc::ptr_eq(&a.grid, &b.grid));
    }

    #[test]
    fn test_boundary_values_are_forced() {
        // f deliberately violates the boundary conditions.
        let cheb = Chebyshev::new(4, |x| x + 0.25).unwrap();
        assert_eq!(cheb.evaluate(0.0), 0.0);
        assert_eq!(cheb.evaluate(1.0), 1.0);
    }

    #[test]
    fn test_reproduces_low_degree_polynomials() {
        let f = |x: f64| x * x * (3.0 - 2.0 * x);
        let cheb = Chebyshev::new(4, f).unwrap();

        for i in 0..=20 {
            let x = i as f64 / 20.0;
            assert_relative_eq!(cheb.evaluate(x), f(x), epsilon = 1e-13);
        }
    }

    #[test]
    fn test_exact_at_nodes() {
        let cheb = Chebyshev::new(8, |x| x.sqrt()).unwrap();
        for (&x, &v) in cheb.grid().iter().zip(cheb.values()) {
            assert_eq!(cheb.evaluate(x), v);
        }
    }

    #[test]
    fn test_invert_keeps_grid() {
        let forward = Chebyshev::new(8, |x| x * x).unwrap();
        let inverse = forward.invert();

        assert!(Arc::ptr_eq(&forward.grid, &inverse.grid));
        for (&y, &x) in inverse.grid().iter().zip(inverse.values()) {
            assert_relative_eq!(forward.evaluate(x), y, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_invert_approximates_inverse_function() {
        let scale = 2.0_f64.exp() - 1.0;
        let f = move |x: f64| ((2.0 * x).exp() - 1.0) / scale;
        let inverse = Chebyshev::new(16, f).unwrap().invert();

        for i in 1..10 {
            let y = i as f64 / 10.0;
            let expected = (1.0 + scale * y).ln() / 2.0;
            assert_relative_eq!(inverse.evaluate(y), expected, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_invert_returns_bracket_midpoint_when_capped() {
        let forward = Chebyshev::new(8, |x| x * x).unwrap();
        let inverse = forward.invert_with(0.0, 0);

        assert_eq!(inverse.values()[0], 0.0);
        assert_eq!(inverse.values()[8], 1.0);
        for (&y, &x) in inverse.grid()[1..8].iter().zip(&inverse.values()[1..8]) {
            let j = forward.values().iter().position(|&v| v > y).unwrap();
            assert_eq!(x, 0.5 * (forward.grid()[j - 1] + forward.grid()[j]));
        }
    }

    #[test]
    fn test_rejects_odd_and_out_of_range_degrees() {
        assert!(matches!(
            Chebyshev::new(7, |x| x),
            Err(CurveError::InvalidDegree { degree: 7, .. })
        ));
        assert!(Chebyshev::new(0, |x| x).is_err());
        assert!(Chebyshev::new(MAX_DEGREE + 2, |x| x).is_err());
        assert!(Chebyshev::new(MIN_DEGREE, |x| x).is_ok());
    }
}
