//! Cubic polynomial segments.
//!
//! A [`Segment`] is the piece of a spline between two interior control
//! points, stored in monomial form
//!
//! ```text
//! r(u) = a·u³ + b·u² + c·u + d,   u ∈ [0, 1]
//! ```
//!
//! Its arc length is integrated once at construction. Unit-speed data and
//! rotation-minimizing frames are optional caches, each populated at most
//! once per configuration.

use crate::factory;
use crate::quadrature::gauss_legendre;
use crate::quaternion;
use crate::reparam::{UnitSpeedData, newton_bisection};
use crate::{ArcStrategy, CurveError, Frame, PointKind, Precompute, Result, Tolerances, chebyshev};
use nalgebra::{Point3, UnitQuaternion, Vector3};
use std::sync::OnceLock;

/// One cubic piece of a Catmull-Rom spline.
#[derive(Debug, Clone)]
pub struct Segment {
    kind: PointKind,
    a: Vector3<f64>,
    b: Vector3<f64>,
    c: Vector3<f64>,
    d: Vector3<f64>,
    /// Position at `u = 1`, kept so the endpoint is reproduced exactly.
    end: Vector3<f64>,
    length: f64,
    rotations: Option<[UnitQuaternion<f64>; 4]>,
    tolerances: Tolerances,
    unit_speed: Option<UnitSpeedData>,
    rmfs: OnceLock<Vec<Frame>>,
}

impl Segment {
    /// Centripetal-family segment through `points[1]` and `points[2]`.
    ///
    /// `points[0]` and `points[3]` only shape the end tangents.
    #[must_use]
    pub fn catmull_rom(points: [Point3<f64>; 4], alpha: f64, tension: f64) -> Self {
        let window = points.map(|p| p.coords);
        let coefficients = factory::coefficients(&window, alpha, tension);
        Self::cubic(
            PointKind::Spatial,
            coefficients,
            window[2],
            None,
            Tolerances::default(),
        )
    }

    /// Degenerate segment sitting on one point.
    #[must_use]
    pub fn point(position: Point3<f64>) -> Self {
        Self::stationary(
            PointKind::Spatial,
            position.coords,
            None,
            Tolerances::default(),
        )
    }

    /// Straight segment from `start` to `end` with constant speed.
    #[must_use]
    pub fn line(start: Point3<f64>, end: Point3<f64>) -> Self {
        Self::straight(
            PointKind::Spatial,
            start.coords,
            end.coords,
            None,
            Tolerances::default(),
        )
    }

    /// General cubic; the arc length is integrated here.
    pub(crate) fn cubic(
        kind: PointKind,
        [a, b, c, d]: [Vector3<f64>; 4],
        end: Vector3<f64>,
        rotations: Option<[UnitQuaternion<f64>; 4]>,
        tolerances: Tolerances,
    ) -> Self {
        let mut segment = Self::with_length(kind, [a, b, c, d], end, 0.0, rotations, tolerances);
        segment.length = gauss_legendre(|u| segment.velocity(u).norm(), 0.0, 1.0);
        segment
    }

    pub(crate) fn stationary(
        kind: PointKind,
        position: Vector3<f64>,
        rotation: Option<UnitQuaternion<f64>>,
        tolerances: Tolerances,
    ) -> Self {
        let zero = Vector3::zeros();
        Self::with_length(
            kind,
            [zero, zero, zero, position],
            position,
            0.0,
            rotation.map(|q| [q; 4]),
            tolerances,
        )
    }

    pub(crate) fn straight(
        kind: PointKind,
        start: Vector3<f64>,
        end: Vector3<f64>,
        rotations: Option<(UnitQuaternion<f64>, UnitQuaternion<f64>)>,
        tolerances: Tolerances,
    ) -> Self {
        let zero = Vector3::zeros();
        let chord = end - start;
        Self::with_length(
            kind,
            [zero, zero, chord, start],
            end,
            chord.norm(),
            rotations.map(|(q1, q2)| [q1, q1, q2, q2]),
            tolerances,
        )
    }

    fn with_length(
        kind: PointKind,
        [a, b, c, d]: [Vector3<f64>; 4],
        end: Vector3<f64>,
        length: f64,
        rotations: Option<[UnitQuaternion<f64>; 4]>,
        tolerances: Tolerances,
    ) -> Self {
        Self {
            kind,
            a,
            b,
            c,
            d,
            end,
            length,
            rotations,
            tolerances,
            unit_speed: None,
            rmfs: OnceLock::new(),
        }
    }

    /// Kind of the control points this segment was built from.
    #[must_use]
    pub fn kind(&self) -> PointKind {
        self.kind
    }

    /// Monomial coefficients `[a, b, c, d]`.
    #[must_use]
    pub fn coefficients(&self) -> [Vector3<f64>; 4] {
        [self.a, self.b, self.c, self.d]
    }

    /// Source quaternions `q0..q3` of an oriented segment.
    #[must_use]
    pub fn rotations(&self) -> Option<&[UnitQuaternion<f64>; 4]> {
        self.rotations.as_ref()
    }

    /// Total arc length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Whether the segment has zero length.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.length == 0.0
    }

    /// Position at `u`.
    #[must_use]
    pub fn position(&self, u: f64) -> Point3<f64> {
        if u == 1.0 {
            return Point3::from(self.end);
        }
        Point3::from(((self.a * u + self.b) * u + self.c) * u + self.d)
    }

    /// First derivative with respect to `u`.
    #[must_use]
    pub fn velocity(&self, u: f64) -> Vector3<f64> {
        (self.a * (3.0 * u) + self.b * 2.0) * u + self.c
    }

    /// Second derivative with respect to `u`.
    #[must_use]
    pub fn acceleration(&self, u: f64) -> Vector3<f64> {
        self.a * (6.0 * u) + self.b * 2.0
    }

    /// Third derivative, constant over the segment.
    #[must_use]
    pub fn jerk(&self, _u: f64) -> Vector3<f64> {
        self.a * 6.0
    }

    /// Unit tangent. NaN where the velocity vanishes.
    #[must_use]
    pub fn tangent(&self, u: f64) -> Vector3<f64> {
        self.velocity(u).normalize()
    }

    /// Unit normal.
    ///
    /// Planar curves use the counter-clockwise perpendicular of the tangent.
    /// Spatial curves use the direction of `dT/du`, which is NaN where the
    /// curvature is zero.
    #[must_use]
    pub fn normal(&self, u: f64) -> Vector3<f64> {
        match self.kind {
            PointKind::Planar => perpendicular(&self.tangent(u)),
            PointKind::Spatial | PointKind::Oriented => self.curvature_numerator(u).normalize(),
        }
    }

    /// Unit binormal `T × N`.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::UnsupportedPointKind`] for planar segments.
    pub fn binormal(&self, u: f64) -> Result<Vector3<f64>> {
        if !self.kind.is_spatial() {
            return Err(CurveError::unsupported("binormal", self.kind));
        }
        Ok(self.tangent(u).cross(&self.normal(u)))
    }

    /// Curvature at `u` and the unit normal it was derived from.
    ///
    /// Planar curvature is signed: positive when the curve turns
    /// counter-clockwise.
    #[must_use]
    pub fn curvature(&self, u: f64) -> (f64, Vector3<f64>) {
        let velocity = self.velocity(u);
        match self.kind {
            PointKind::Planar => {
                let acceleration = self.acceleration(u);
                let cross = velocity.x * acceleration.y - velocity.y * acceleration.x;
                let speed = velocity.norm();
                (
                    cross / (speed * speed * speed),
                    perpendicular(&(velocity / speed)),
                )
            }
            PointKind::Spatial | PointKind::Oriented => {
                // dT/du = n / |r'|³ and κ = |dT/du| / |r'|.
                let n = self.curvature_numerator(u);
                let speed_sq = velocity.norm_squared();
                let magnitude = n.norm();
                (magnitude / (speed_sq * speed_sq), n / magnitude)
            }
        }
    }

    /// Torsion `((r' × r'') · r''') / |r' × r''|²`.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::UnsupportedPointKind`] for planar segments.
    pub fn torsion(&self, u: f64) -> Result<f64> {
        if !self.kind.is_spatial() {
            return Err(CurveError::unsupported("torsion", self.kind));
        }
        let cross = self.velocity(u).cross(&self.acceleration(u));
        Ok(cross.dot(&self.jerk(u)) / cross.norm_squared())
    }

    /// `r''·|r'|² − r'·(r'·r'')`, proportional to `dT/du`.
    fn curvature_numerator(&self, u: f64) -> Vector3<f64> {
        let velocity = self.velocity(u);
        let acceleration = self.acceleration(u);
        acceleration * velocity.norm_squared() - velocity * velocity.dot(&acceleration)
    }

    /// Frame looking along the velocity with the normal near `up`.
    ///
    /// Zero-length segments return a fixed frame looking along +X.
    #[must_use]
    pub fn frame_look_along(&self, u: f64, up: Vector3<f64>) -> Frame {
        let direction = if self.is_degenerate() {
            Vector3::x()
        } else {
            self.velocity(u)
        };
        Frame::look_along(self.position(u), direction, up)
    }

    /// Frenet frame (tangent, normal, binormal). NaN where the curvature is
    /// zero.
    #[must_use]
    pub fn frame_frenet(&self, u: f64) -> Frame {
        Frame::from_axes(self.position(u), self.tangent(u), self.normal(u))
    }

    /// Frame positioned on the curve and oriented by SQUAD over the four
    /// source rotations.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::UnsupportedPointKind`] unless the segment was
    /// built from oriented points.
    pub fn frame_squad(&self, u: f64) -> Result<Frame> {
        let [q0, q1, q2, q3] = self
            .rotations
            .as_ref()
            .ok_or_else(|| CurveError::unsupported("squad", self.kind))?;
        let rotation = quaternion::squad(q0, q1, q2, q3, u);
        Ok(Frame::from_quaternion(self.position(u), rotation))
    }

    /// Walk `count` equal steps of `u` from `initial` and store the
    /// `count + 1` rotation-minimizing frames.
    pub fn precompute_rmfs(&mut self, count: usize, initial: &Frame) {
        self.rmfs = OnceLock::from(self.walk_rmfs(count, initial));
    }

    /// Precomputed rotation-minimizing frames, if any.
    #[must_use]
    pub fn rmf_table(&self) -> Option<&[Frame]> {
        self.rmfs.get().map(Vec::as_slice)
    }

    /// Rotation-minimizing frame at `u`.
    ///
    /// With `previous`, one double-reflection step runs from that frame.
    /// Without it, the nearest precomputed frame seeds the step.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::RmfNotPrecomputed`] if `previous` is `None`
    /// and [`Self::precompute_rmfs`] has not run.
    pub fn rmf(&self, u: f64, previous: Option<&Frame>) -> Result<Frame> {
        if let Some(previous) = previous {
            return Ok(self.transport(previous, u));
        }
        let table = self
            .rmf_table()
            .ok_or(CurveError::RmfNotPrecomputed { segment: 0 })?;
        Ok(self.rmf_from_table(table, u))
    }

    /// The frame table, walking it from `initial` if it is missing.
    pub(crate) fn rmfs_or_init<F>(&self, count: usize, initial: F) -> &[Frame]
    where
        F: FnOnce() -> Frame,
    {
        self.rmfs.get_or_init(|| self.walk_rmfs(count, &initial()))
    }

    pub(crate) fn clear_rmfs(&mut self) {
        self.rmfs = OnceLock::new();
    }

    pub(crate) fn rmf_from_table(&self, table: &[Frame], u: f64) -> Frame {
        let count = table.len() - 1;
        let nearest = (u * count as f64).round().max(0.0) as usize;
        self.transport(&table[nearest.min(count)], u)
    }

    /// One double-reflection step from `frame` to `u`.
    pub(crate) fn transport(&self, frame: &Frame, u: f64) -> Frame {
        if self.is_degenerate() {
            return Frame {
                position: self.position(u),
                ..*frame
            };
        }
        frame.transport(self.position(u), self.velocity(u))
    }

    fn walk_rmfs(&self, count: usize, initial: &Frame) -> Vec<Frame> {
        let count = count.max(1);
        let mut frames = Vec::with_capacity(count + 1);
        let mut frame = self.transport(initial, 0.0);
        frames.push(frame);
        for i in 1..=count {
            frame = self.transport(&frame, i as f64 / count as f64);
            frames.push(frame);
        }
        frames
    }

    /// Arc length between two local parameters, regardless of order.
    ///
    /// The full `[0, 1]` range returns the cached length; any other range is
    /// integrated.
    #[must_use]
    pub fn length_between(&self, a: f64, b: f64) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        if lo == 0.0 && hi == 1.0 {
            return self.length;
        }
        gauss_legendre(|u| self.velocity(u).norm(), lo, hi)
    }

    /// Local parameter at arc-length fraction `s`, using precomputed
    /// unit-speed data when configured.
    #[must_use]
    pub fn reparametrize(&self, s: f64) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        if s <= 0.0 {
            return 0.0;
        }
        if s >= 1.0 {
            return 1.0;
        }
        match &self.unit_speed {
            Some(data) => data.inverse(|u| self.arc_fraction(u)).evaluate(s),
            None => self.reparametrize_accurate(s),
        }
    }

    /// Local parameter at arc-length fraction `s` by Newton–bisection.
    #[must_use]
    pub fn reparametrize_accurate(&self, s: f64) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        if s <= 0.0 {
            return 0.0;
        }
        if s >= 1.0 {
            return 1.0;
        }
        newton_bisection(
            s,
            self.length,
            |u| self.length_between(0.0, u),
            |u| self.velocity(u).norm(),
            self.tolerances.newton_tolerance,
            self.tolerances.newton_max_iterations,
        )
    }

    fn arc_fraction(&self, u: f64) -> f64 {
        if self.is_degenerate() {
            return u;
        }
        self.length_between(0.0, u) / self.length
    }

    /// Configure the fast inverse arc-length interpolant.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InvalidDegree`] for odd or out-of-range degrees.
    pub fn precompute_unit_speed_data(
        &mut self,
        when: Precompute,
        strategy: ArcStrategy,
        degree: usize,
    ) -> Result<()> {
        chebyshev::check_degree(degree)?;
        let data = UnitSpeedData::new(strategy, degree, &self.tolerances);
        if when == Precompute::Now {
            data.inverse(|u| self.arc_fraction(u));
        }
        self.unit_speed = Some(data);
        Ok(())
    }

    /// Whether unit-speed data has been built (not merely configured).
    #[must_use]
    pub fn has_unit_speed_data(&self) -> bool {
        self.unit_speed.as_ref().is_some_and(UnitSpeedData::is_built)
    }

    /// Axis-aligned bounding box `(min, max)`.
    ///
    /// Candidates are both endpoints plus every root of a velocity
    /// component inside `(0, 1)`.
    #[must_use]
    pub fn bounding_box(&self) -> (Point3<f64>, Point3<f64>) {
        let start = self.position(0.0);
        let mut min = start;
        let mut max = start;
        let mut include = |p: Point3<f64>| {
            min = min.inf(&p);
            max = max.sup(&p);
        };

        include(self.position(1.0));
        for axis in 0..3 {
            let roots = solve_quadratic(
                3.0 * self.a[axis],
                2.0 * self.b[axis],
                self.c[axis],
                self.tolerances.quadratic_epsilon,
            );
            for u in roots {
                if u > 0.0 && u < 1.0 {
                    include(self.position(u));
                }
            }
        }

        (min, max)
    }
}

/// Real roots of `a·x² + b·x + c`.
///
/// Falls back to the linear solve when `|a| < epsilon` and returns no roots
/// for a negative discriminant.
fn solve_quadratic(a: f64, b: f64, c: f64, epsilon: f64) -> Vec<f64> {
    if a.abs() < epsilon {
        if b.abs() < epsilon {
            return Vec::new();
        }
        return vec![-c / b];
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return Vec::new();
    }

    let root = discriminant.sqrt();
    vec![(-b + root) / (2.0 * a), (-b - root) / (2.0 * a)]
}

/// Counter-clockwise perpendicular in the XY plane.
fn perpendicular(v: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(-v.y, v.x, 0.0)
}
