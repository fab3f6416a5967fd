//! Multi-segment Catmull-Rom splines.
//!
//! A [`Chain`] owns the deduplicated control points, one [`Segment`] per
//! interior pair, and a knot vector splitting the global parameter
//! `t ∈ [0, 1]` into per-segment intervals proportional to arc length.
//!
//! Every `solve_*` query clamps `t`, finds the enclosing segment, optionally
//! maps the local parameter through the segment's arc-length inverse, and
//! delegates.
//!
//! # Example
//!
//! ```
//! use catrom::{Chain, ControlPoint, Point2};
//!
//! let points: Vec<ControlPoint> = [(0.0, 0.0), (1.0, 2.0), (3.0, 2.0), (4.0, 0.0)]
//!     .iter()
//!     .map(|&(x, y)| Point2::new(x, y).into())
//!     .collect();
//!
//! let chain = Chain::new(&points).unwrap();
//! assert_eq!(chain.segments().len(), 3);
//! assert!(chain.length() > 4.0);
//! ```

use crate::factory;
use crate::point;
use crate::{
    ArcStrategy, ChainParams, ControlPoint, CurveError, Frame, PointKind, Precompute, Result,
    Segment, chebyshev,
};
use nalgebra::{Point3, Vector3};
use std::f64::consts::{PI, TAU};
use tracing::debug;

/// A Catmull-Rom spline through a list of control points.
#[derive(Debug, Clone)]
pub struct Chain {
    kind: PointKind,
    points: Vec<ControlPoint>,
    segments: Vec<Segment>,
    /// `segments.len() + 1` ascending values from `0` to `1`.
    knots: Vec<f64>,
    length: f64,
    params: ChainParams,
    rmf_frames: usize,
}

impl Chain {
    /// Build a centripetal, open chain with default parameters.
    ///
    /// # Errors
    ///
    /// See [`Chain::with_params`].
    pub fn new(points: &[ControlPoint]) -> Result<Self> {
        Self::with_params(points, &ChainParams::default())
    }

    /// Build a chain with explicit parameters.
    ///
    /// Adjacent points closer than `params.epsilon` are merged. A looping
    /// chain is closed back onto its first point unless the input already
    /// ends there.
    ///
    /// # Errors
    ///
    /// - [`CurveError::InvalidParameter`] if `params` is out of its domain.
    /// - [`CurveError::InsufficientPoints`] if `points` is empty.
    /// - [`CurveError::MixedPointKinds`] if the points are not all one kind.
    /// - [`CurveError::InvalidPoint`] if a coordinate is not finite.
    pub fn with_params(points: &[ControlPoint], params: &ChainParams) -> Result<Self> {
        params.validate()?;
        let kind = point::validate(points)?;

        let mut points = point::dedup(points, params.epsilon);
        if params.loops {
            let closed = points.len() > 1
                && points[0].fuzzy_eq(&points[points.len() - 1], params.epsilon);
            if closed {
                points.pop();
            }
            if points.len() > 1 {
                points.push(points[0]);
            }
        }

        let segments = factory::build_segments(&points, kind, params);
        let length: f64 = segments.iter().map(Segment::length).sum();
        let knots = knot_vector(&segments, length);

        debug!(
            ?kind,
            points = points.len(),
            segments = segments.len(),
            length,
            loops = params.loops,
            "built chain"
        );

        Ok(Self {
            kind,
            points,
            segments,
            knots,
            length,
            params: *params,
            rmf_frames: params.rmf_frames_per_segment,
        })
    }

    /// Kind shared by every control point.
    #[must_use]
    pub fn kind(&self) -> PointKind {
        self.kind
    }

    /// Control points after deduplication; loops end on their first point.
    #[must_use]
    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    /// The segments, in order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Segment boundaries in global parameter space.
    #[must_use]
    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    /// Whether the chain closes onto its first point.
    #[must_use]
    pub fn is_loop(&self) -> bool {
        self.params.loops
    }

    /// Parameters the chain was built with.
    #[must_use]
    pub fn params(&self) -> &ChainParams {
        &self.params
    }

    /// Total arc length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Segment index and local parameter for global `t`.
    ///
    /// `t` is clamped to `[0, 1]`. Interior knots belong to the segment that
    /// starts there.
    ///
    /// # Panics
    ///
    /// Panics if no knot interval encloses `t`, which only happens for a NaN
    /// `t` on a multi-segment chain.
    #[must_use]
    pub fn segment_at_time(&self, t: f64) -> (usize, f64) {
        let count = self.segments.len();
        let t = t.clamp(0.0, 1.0);
        if count == 1 {
            return (0, t);
        }
        if t <= 0.0 {
            return (0, 0.0);
        }
        if t >= 1.0 {
            return (count - 1, 1.0);
        }

        // Keep knots[lo] <= t < knots[hi].
        let mut lo = 0;
        let mut hi = count;
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if self.knots[mid] <= t {
                lo = mid;
            } else {
                hi = mid;
            }
        }

        let (start, end) = (self.knots[lo], self.knots[hi]);
        if !(start <= t && t < end) {
            unreachable!("knot vector does not enclose t = {t}");
        }
        (lo, (t - start) / (end - start))
    }

    fn locate(&self, t: f64, unit_speed: bool) -> (&Segment, f64) {
        let (index, u) = self.segment_at_time(t);
        let segment = &self.segments[index];
        (segment, reparametrized(segment, u, unit_speed))
    }

    /// Position at global `t`.
    #[must_use]
    pub fn solve_position(&self, t: f64, unit_speed: bool) -> Point3<f64> {
        let (segment, u) = self.locate(t, unit_speed);
        segment.position(u)
    }

    /// Velocity with respect to the local segment parameter.
    #[must_use]
    pub fn solve_velocity(&self, t: f64, unit_speed: bool) -> Vector3<f64> {
        let (segment, u) = self.locate(t, unit_speed);
        segment.velocity(u)
    }

    /// Acceleration with respect to the local segment parameter.
    #[must_use]
    pub fn solve_acceleration(&self, t: f64, unit_speed: bool) -> Vector3<f64> {
        let (segment, u) = self.locate(t, unit_speed);
        segment.acceleration(u)
    }

    /// Jerk with respect to the local segment parameter.
    #[must_use]
    pub fn solve_jerk(&self, t: f64, unit_speed: bool) -> Vector3<f64> {
        let (segment, u) = self.locate(t, unit_speed);
        segment.jerk(u)
    }

    /// Unit tangent.
    #[must_use]
    pub fn solve_tangent(&self, t: f64, unit_speed: bool) -> Vector3<f64> {
        let (segment, u) = self.locate(t, unit_speed);
        segment.tangent(u)
    }

    /// Unit normal. See [`Segment::normal`].
    #[must_use]
    pub fn solve_normal(&self, t: f64, unit_speed: bool) -> Vector3<f64> {
        let (segment, u) = self.locate(t, unit_speed);
        segment.normal(u)
    }

    /// Unit binormal.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::UnsupportedPointKind`] for planar chains.
    pub fn solve_binormal(&self, t: f64, unit_speed: bool) -> Result<Vector3<f64>> {
        let (segment, u) = self.locate(t, unit_speed);
        segment.binormal(u)
    }

    /// Curvature and the normal it was derived from.
    #[must_use]
    pub fn solve_curvature(&self, t: f64, unit_speed: bool) -> (f64, Vector3<f64>) {
        let (segment, u) = self.locate(t, unit_speed);
        segment.curvature(u)
    }

    /// Torsion.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::UnsupportedPointKind`] for planar chains.
    pub fn solve_torsion(&self, t: f64, unit_speed: bool) -> Result<f64> {
        let (segment, u) = self.locate(t, unit_speed);
        segment.torsion(u)
    }

    /// Frame looking along the curve with its normal near `up`.
    #[must_use]
    pub fn solve_frame_look_along(&self, t: f64, up: Vector3<f64>, unit_speed: bool) -> Frame {
        let (segment, u) = self.locate(t, unit_speed);
        segment.frame_look_along(u, up)
    }

    /// Frenet frame.
    #[must_use]
    pub fn solve_frame_frenet(&self, t: f64, unit_speed: bool) -> Frame {
        let (segment, u) = self.locate(t, unit_speed);
        segment.frame_frenet(u)
    }

    /// Frame oriented by SQUAD over the control-point rotations.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::UnsupportedPointKind`] unless the chain was
    /// built from oriented points.
    pub fn solve_frame_squad(&self, t: f64, unit_speed: bool) -> Result<Frame> {
        let (segment, u) = self.locate(t, unit_speed);
        segment.frame_squad(u)
    }

    /// Rotation-minimizing frame at global `t`.
    ///
    /// With `previous`, one double-reflection step runs from it. Otherwise
    /// frame tables are built for every segment between the last one that
    /// already has a table and the one containing `t`.
    #[must_use]
    pub fn solve_rmf(&self, t: f64, previous: Option<&Frame>, unit_speed: bool) -> Frame {
        let (index, u) = self.segment_at_time(t);
        let segment = &self.segments[index];
        let u = reparametrized(segment, u, unit_speed);
        match previous {
            Some(previous) => segment.transport(previous, u),
            None => segment.rmf_from_table(self.ensure_rmfs(index), u),
        }
    }

    /// Rebuild the frame tables of segments `first..=last` with `frames`
    /// steps each.
    ///
    /// Each table is seeded from the last frame of the one before it, or
    /// from a look-along frame at `t = 0` for the first segment. Tables after
    /// `last` are discarded and rebuilt on demand from the new frames.
    ///
    /// # Errors
    ///
    /// - [`CurveError::InvalidSegmentRange`] if `first > last` or `last` is
    ///   not a segment index.
    /// - [`CurveError::InvalidParameter`] if `frames` is zero.
    pub fn precompute_rmfs(&mut self, frames: usize, first: usize, last: usize) -> Result<()> {
        let count = self.segments.len();
        if first > last || last >= count {
            return Err(CurveError::InvalidSegmentRange { first, last, count });
        }
        if frames == 0 {
            return Err(CurveError::invalid_parameter(
                "frames",
                0.0,
                "must be at least 1",
            ));
        }

        self.rmf_frames = frames;
        let mut seed = match first {
            0 => self.initial_frame(),
            _ => end_frame(self.ensure_rmfs(first - 1)),
        };
        for segment in &mut self.segments[first..=last] {
            segment.precompute_rmfs(frames, &seed);
            if let Some(table) = segment.rmf_table() {
                seed = end_frame(table);
            }
        }
        for segment in &mut self.segments[last + 1..] {
            segment.clear_rmfs();
        }

        debug!(frames, first, last, "precomputed rotation-minimizing frames");
        Ok(())
    }

    /// Interpolant carrying `data`, given at global `from`, along the curve
    /// with the rotation-minimizing frame.
    ///
    /// `data` keeps its offset relative to the frame at `from`.
    pub fn transport_interpolant(&self, data: Frame, from: f64) -> impl Fn(f64) -> Frame + '_ {
        let offset = self.solve_rmf(from, None, false).inverse().compose(&data);
        move |t| self.solve_rmf(t, None, false).compose(&offset)
    }

    /// Interpolant rotating the rotation-minimizing frame about the tangent
    /// so its normal goes from `normal_a` at `a` to `normal_b` at `b`.
    ///
    /// The twist angle is blended linearly in `t` along the shorter way
    /// round and held constant outside `[a, b]`.
    pub fn normal_interpolant(
        &self,
        a: f64,
        normal_a: Vector3<f64>,
        b: f64,
        normal_b: Vector3<f64>,
    ) -> impl Fn(f64) -> Frame + '_ {
        let twist = |t: f64, normal: &Vector3<f64>| {
            let frame = self.solve_rmf(t, None, false);
            normal.dot(&frame.binormal).atan2(normal.dot(&frame.normal))
        };
        let start = twist(a, &normal_a);
        let end = twist(b, &normal_b);
        let delta = (end - start + PI).rem_euclid(TAU) - PI;
        let span = b - a;

        move |t| {
            let weight = if span == 0.0 {
                0.0
            } else {
                ((t - a) / span).clamp(0.0, 1.0)
            };
            self.solve_rmf(t, None, false)
                .rotated_about_tangent(start + delta * weight)
        }
    }

    fn initial_frame(&self) -> Frame {
        self.segments[0].frame_look_along(0.0, self.params.up)
    }

    /// Frame table of segment `index`, walking any missing tables from the
    /// nearest earlier segment that has one.
    fn ensure_rmfs(&self, index: usize) -> &[Frame] {
        let start = (0..=index)
            .rev()
            .find(|&i| self.segments[i].rmf_table().is_some())
            .unwrap_or(0);

        let mut table = self.segments[start].rmfs_or_init(self.rmf_frames, || self.initial_frame());
        for segment in &self.segments[start + 1..=index] {
            let seed = end_frame(table);
            table = segment.rmfs_or_init(self.rmf_frames, || seed);
        }
        table
    }

    /// Arc length between global parameters `a` and `b`, in either order.
    #[must_use]
    pub fn solve_length(&self, a: f64, b: f64, unit_speed: bool) -> f64 {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let (first, u) = self.segment_at_time(lo);
        let (last, v) = self.segment_at_time(hi);
        let u = reparametrized(&self.segments[first], u, unit_speed);
        let v = reparametrized(&self.segments[last], v, unit_speed);

        if first == last {
            return self.segments[first].length_between(u, v);
        }

        let interior: f64 = self.segments[first + 1..last]
            .iter()
            .map(Segment::length)
            .sum();
        self.segments[first].length_between(u, 1.0)
            + interior
            + self.segments[last].length_between(0.0, v)
    }

    /// Axis-aligned bounding box `(min, max)` of the whole chain.
    #[must_use]
    pub fn solve_bounding_box(&self) -> (Point3<f64>, Point3<f64>) {
        let mut boxes = self.segments.iter().map(Segment::bounding_box);
        let Some(first) = boxes.next() else {
            return (Point3::origin(), Point3::origin());
        };
        boxes.fold(first, |(min, max), (lo, hi)| (min.inf(&lo), max.sup(&hi)))
    }

    /// Evaluate `f` at `samples` evenly spaced global parameters from
    /// `from` to `to`, both included.
    ///
    /// The knot vector is walked once with a cursor rather than searched
    /// per sample. A reversed range yields samples in reverse order.
    pub fn solve_bulk<T, F>(
        &self,
        mut f: F,
        samples: usize,
        from: f64,
        to: f64,
        unit_speed: bool,
    ) -> Vec<T>
    where
        F: FnMut(&Segment, f64) -> T,
    {
        let from = from.clamp(0.0, 1.0);
        let to = to.clamp(0.0, 1.0);
        if to < from {
            let mut reversed = self.solve_bulk(f, samples, to, from, unit_speed);
            reversed.reverse();
            return reversed;
        }

        let mut values = Vec::with_capacity(samples);
        if samples == 0 {
            return values;
        }

        let last = self.segments.len() - 1;
        let step = if samples > 1 {
            (to - from) / (samples - 1) as f64
        } else {
            0.0
        };
        let (mut index, _) = self.segment_at_time(from);

        for k in 0..samples {
            let t = if samples > 1 && k == samples - 1 {
                to
            } else {
                from + step * k as f64
            };
            while index < last && t >= self.knots[index + 1] {
                index += 1;
            }

            let (start, end) = (self.knots[index], self.knots[index + 1]);
            let u = if end > start {
                ((t - start) / (end - start)).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let segment = &self.segments[index];
            values.push(f(segment, reparametrized(segment, u, unit_speed)));
        }

        values
    }

    /// `samples` positions evenly spaced over the whole chain.
    #[must_use]
    pub fn sample_positions(&self, samples: usize, unit_speed: bool) -> Vec<Point3<f64>> {
        self.solve_bulk(|segment, u| segment.position(u), samples, 0.0, 1.0, unit_speed)
    }

    /// Configure the inverse arc-length interpolant on every segment.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InvalidDegree`] for odd or out-of-range
    /// degrees; no segment is changed in that case.
    pub fn precompute_unit_speed_data(
        &mut self,
        when: Precompute,
        strategy: ArcStrategy,
        degree: usize,
    ) -> Result<()> {
        chebyshev::check_degree(degree)?;
        for segment in &mut self.segments {
            segment.precompute_unit_speed_data(when, strategy, degree)?;
        }
        debug!(?when, ?strategy, degree, "configured unit-speed data");
        Ok(())
    }
}

fn reparametrized(segment: &Segment, u: f64, unit_speed: bool) -> f64 {
    if unit_speed {
        segment.reparametrize(u)
    } else {
        u
    }
}

/// Cumulative arc-length fractions, or equal spacing for a zero-length
/// chain.
fn knot_vector(segments: &[Segment], length: f64) -> Vec<f64> {
    let count = segments.len();
    let mut knots = Vec::with_capacity(count + 1);
    knots.push(0.0);

    if length > 0.0 {
        let mut travelled = 0.0;
        for segment in &segments[..count - 1] {
            travelled += segment.length();
            knots.push(travelled / length);
        }
    } else {
        knots.extend((1..count).map(|i| i as f64 / count as f64));
    }

    knots.push(1.0);
    knots
}

fn end_frame(table: &[Frame]) -> Frame {
    table[table.len() - 1]
}
