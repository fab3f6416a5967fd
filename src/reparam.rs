//! Arc-length reparametrization.
//!
//! Maps a fraction `s ∈ [0, 1]` of a segment's arc length to the local
//! parameter `u` that reaches it. The accurate path solves
//! `arc(u) / L − s = 0` with a bracketed Newton iteration; the fast paths
//! interpolate the forward fraction `arc(u) / L` on Chebyshev nodes and
//! invert that interpolant by false position on the same grid.

use crate::chebyshev::Chebyshev;
use crate::{ArcStrategy, Tolerances};
use std::sync::OnceLock;
use tracing::warn;

/// Solve `arc(u) / total = s` for `u ∈ [0, 1]`.
///
/// `arc` is the arc length from `0` to `u` and `speed` its derivative. Newton
/// steps that leave the current bracket are replaced by bisection. After
/// `max_iterations` the bracket midpoint is returned with a warning.
pub(crate) fn newton_bisection<A, S>(
    s: f64,
    total: f64,
    arc: A,
    speed: S,
    tolerance: f64,
    max_iterations: usize,
) -> f64
where
    A: Fn(f64) -> f64,
    S: Fn(f64) -> f64,
{
    let mut lower = 0.0;
    let mut upper = 1.0;
    let mut u = s;

    for _ in 0..max_iterations {
        let f = arc(u) / total - s;
        if f.abs() < tolerance {
            return u;
        }

        if f > 0.0 {
            upper = u;
        } else {
            lower = u;
        }

        // A zero derivative gives a non-finite step, which fails the
        // bracket test below.
        let g = speed(u) / total;
        let next = u - f / g;
        u = if next > lower && next < upper {
            next
        } else {
            0.5 * (lower + upper)
        };
    }

    warn!(
        fraction = s,
        lower, upper, "arc-length solve did not converge, using bracket midpoint"
    );
    0.5 * (lower + upper)
}

/// Configured unit-speed data of one segment, built at most once.
#[derive(Debug, Clone)]
pub(crate) struct UnitSpeedData {
    strategy: ArcStrategy,
    degree: usize,
    table_size: usize,
    falsi_tolerance: f64,
    falsi_max_iterations: usize,
    inverse: OnceLock<InverseArcLength>,
}

impl UnitSpeedData {
    /// Store the parameters without building anything. `degree` must
    /// already be validated.
    pub(crate) fn new(strategy: ArcStrategy, degree: usize, tolerances: &Tolerances) -> Self {
        Self {
            strategy,
            degree,
            table_size: tolerances.lookup_table_size,
            falsi_tolerance: tolerances.falsi_tolerance,
            falsi_max_iterations: tolerances.falsi_max_iterations,
            inverse: OnceLock::new(),
        }
    }

    /// The inverse interpolant, building it from the forward arc-length
    /// fraction on first use.
    pub(crate) fn inverse<F>(&self, fraction: F) -> &InverseArcLength
    where
        F: Fn(f64) -> f64,
    {
        self.inverse.get_or_init(|| {
            let polynomial = Chebyshev::sample(self.degree, fraction)
                .invert_with(self.falsi_tolerance, self.falsi_max_iterations);
            InverseArcLength::build(self.strategy, self.table_size, polynomial)
        })
    }

    /// Whether the interpolant has been built.
    pub(crate) fn is_built(&self) -> bool {
        self.inverse.get().is_some()
    }
}

/// Precomputed inverse arc-length function.
#[derive(Debug, Clone)]
pub(crate) struct InverseArcLength {
    polynomial: Chebyshev,
    /// Uniformly spaced samples of `polynomial`; empty unless the lookup
    /// table strategy was requested.
    table: Vec<f64>,
}

impl InverseArcLength {
    fn build(strategy: ArcStrategy, table_size: usize, polynomial: Chebyshev) -> Self {
        let table = match strategy {
            ArcStrategy::Polynomial => Vec::new(),
            ArcStrategy::LookupTable => {
                let last = (table_size - 1) as f64;
                (0..table_size)
                    .map(|i| polynomial.evaluate(i as f64 / last))
                    .collect()
            }
        };
        Self { polynomial, table }
    }

    /// Local parameter reaching arc-length fraction `s`.
    pub(crate) fn evaluate(&self, s: f64) -> f64 {
        if self.table.len() < 2 {
            return self.polynomial.evaluate(s);
        }

        let last = self.table.len() - 1;
        let x = s * last as f64;
        let cell = x.floor();
        if cell >= 0.0 && cell < last as f64 {
            let i = cell as usize;
            let frac = x - cell;
            return self.table[i] + (self.table[i + 1] - self.table[i]) * frac;
        }

        // Outside the table (including NaN); should not happen for s in [0, 1).
        self.polynomial.evaluate(s)
    }
}
