//! Building segments from a validated control-point list.
//!
//! Every interior pair of points becomes one cubic [`Segment`]. Open chains
//! get a phantom point mirrored past each end; closed loops borrow the
//! neighbours across the seam instead.

use crate::{ChainParams, ControlPoint, PointKind, Segment};
use nalgebra::{UnitQuaternion, Vector3};

/// Segments for `points`, which must be validated, deduplicated, and, for
/// loops, closed (last point equal to the first).
pub(crate) fn build_segments(
    points: &[ControlPoint],
    kind: PointKind,
    params: &ChainParams,
) -> Vec<Segment> {
    let tolerances = params.tolerances;
    match points {
        [] => Vec::new(),
        [only] => vec![Segment::stationary(
            kind,
            only.position(),
            only.rotation(),
            tolerances,
        )],
        [first, last] if !params.loops => {
            let rotations = first.rotation().zip(last.rotation());
            vec![Segment::straight(
                kind,
                first.position(),
                last.position(),
                rotations,
                tolerances,
            )]
        }
        _ => {
            let extended = extend(points, params.loops);
            extended
                .windows(4)
                .map(|window| {
                    let positions = [
                        window[0].position,
                        window[1].position,
                        window[2].position,
                        window[3].position,
                    ];
                    let rotations = match (
                        window[0].rotation,
                        window[1].rotation,
                        window[2].rotation,
                        window[3].rotation,
                    ) {
                        (Some(q0), Some(q1), Some(q2), Some(q3)) => Some([q0, q1, q2, q3]),
                        _ => None,
                    };
                    Segment::cubic(
                        kind,
                        coefficients(&positions, params.alpha, params.tension),
                        positions[2],
                        rotations,
                        tolerances,
                    )
                })
                .collect()
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Knot {
    position: Vector3<f64>,
    rotation: Option<UnitQuaternion<f64>>,
}

impl From<&ControlPoint> for Knot {
    fn from(point: &ControlPoint) -> Self {
        Self {
            position: point.position(),
            rotation: point.rotation(),
        }
    }
}

/// Pad `points` with one neighbour at each end so every interior pair has a
/// four-point window.
fn extend(points: &[ControlPoint], loops: bool) -> Vec<Knot> {
    let n = points.len();
    let knots: Vec<Knot> = points.iter().map(Knot::from).collect();

    let (before, after) = if loops {
        // points[n - 1] repeats points[0], so the seam neighbours are the
        // second and second-to-last entries.
        (knots[n - 2], knots[1])
    } else {
        (mirror(&knots[0], &knots[1]), mirror(&knots[n - 1], &knots[n - 2]))
    };

    let mut extended = Vec::with_capacity(n + 2);
    extended.push(before);
    extended.extend(knots);
    extended.push(after);
    extended
}

/// Reflect `neighbour` through `end`: `2·end − neighbour`, with the rotation
/// mirrored the same way.
fn mirror(end: &Knot, neighbour: &Knot) -> Knot {
    let rotation = end
        .rotation
        .zip(neighbour.rotation)
        .map(|(q0, q1)| q0 * q1.inverse() * q0);
    Knot {
        position: end.position * 2.0 - neighbour.position,
        rotation,
    }
}

/// Monomial coefficients `[a, b, c, d]` of the segment from `p[1]` to `p[2]`.
///
/// Knot spacing is `|Δp|^alpha`; the tangents are scaled by `1 − tension`.
pub(crate) fn coefficients(p: &[Vector3<f64>; 4], alpha: f64, tension: f64) -> [Vector3<f64>; 4] {
    let [p0, p1, p2, p3] = *p;

    let (m1, m2) = if tension == 1.0 {
        (Vector3::zeros(), Vector3::zeros())
    } else if alpha == 0.0 {
        let scale = 0.5 * (1.0 - tension);
        ((p2 - p0) * scale, (p3 - p1) * scale)
    } else {
        let spacing = |from: Vector3<f64>, to: Vector3<f64>| {
            let distance = (to - from).norm();
            if alpha == 0.5 {
                distance.sqrt()
            } else {
                distance.powf(alpha)
            }
        };
        let t01 = spacing(p0, p1);
        let t12 = spacing(p1, p2);
        let t23 = spacing(p2, p3);
        let scale = (1.0 - tension) * t12;

        let m1 = ((p1 - p0) / t01 - (p2 - p0) / (t01 + t12) + (p2 - p1) / t12) * scale;
        let m2 = ((p2 - p1) / t12 - (p3 - p1) / (t12 + t23) + (p3 - p2) / t23) * scale;
        (m1, m2)
    };

    hermite(p1, p2, m1, m2)
}

/// Cubic Hermite basis to monomial form.
fn hermite(
    p1: Vector3<f64>,
    p2: Vector3<f64>,
    m1: Vector3<f64>,
    m2: Vector3<f64>,
) -> [Vector3<f64>; 4] {
    let a = (p1 - p2) * 2.0 + m1 + m2;
    let b = (p2 - p1) * 3.0 - m1 * 2.0 - m2;
    [a, b, m1, p1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Isometry3, Point2, Point3};

    fn window() -> [Vector3<f64>; 4] {
        [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 2.0, 0.5),
            Vector3::new(3.0, 2.0, -1.0),
            Vector3::new(4.0, 0.5, 0.0),
        ]
    }

    /// Hermite tangents from the knot-sequence form, without fast paths.
    fn general_tangents(p: &[Vector3<f64>; 4], alpha: f64, tension: f64) -> [Vector3<f64>; 2] {
        let t01 = (p[1] - p[0]).norm().powf(alpha);
        let t12 = (p[2] - p[1]).norm().powf(alpha);
        let t23 = (p[3] - p[2]).norm().powf(alpha);
        let scale = (1.0 - tension) * t12;
        [
            ((p[1] - p[0]) / t01 - (p[2] - p[0]) / (t01 + t12) + (p[2] - p[1]) / t12) * scale,
            ((p[2] - p[1]) / t12 - (p[3] - p[1]) / (t12 + t23) + (p[3] - p[2]) / t23) * scale,
        ]
    }

    #[test]
    fn test_fast_tracks_match_general_formula() {
        let p = window();
        for (alpha, tension) in [(0.0, 0.0), (0.0, 0.3), (0.5, 0.0), (0.5, 0.6), (1.0, 0.0)] {
            let [m1, m2] = general_tangents(&p, alpha, tension);
            let expected = hermite(p[1], p[2], m1, m2);
            let actual = coefficients(&p, alpha, tension);
            for (e, a) in expected.iter().zip(&actual) {
                assert_relative_eq!(e, a, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_full_tension_gives_zero_tangents() {
        let [_, _, c, d] = coefficients(&window(), 0.5, 1.0);
        assert_eq!(c, Vector3::zeros());
        assert_eq!(d, window()[1]);
    }

    #[test]
    fn test_hermite_interpolates_end_points() {
        let p = window();
        let [a, b, c, d] = coefficients(&p, 0.5, 0.0);
        assert_eq!(d, p[1]);
        assert_relative_eq!(a + b + c + d, p[2], epsilon = 1e-12);
    }

    #[test]
    fn test_open_chain_mirrors_end_points() {
        let points: Vec<ControlPoint> = [(0.0, 0.0), (1.0, 0.0), (2.0, 1.0)]
            .iter()
            .map(|&(x, y)| Point2::new(x, y).into())
            .collect();
        let extended = extend(&points, false);

        assert_eq!(extended.len(), 5);
        assert_eq!(extended[0].position, Vector3::new(-1.0, 0.0, 0.0));
        assert_eq!(extended[4].position, Vector3::new(3.0, 2.0, 0.0));
    }

    #[test]
    fn test_loop_borrows_seam_neighbours() {
        let points: Vec<ControlPoint> = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]
            .iter()
            .map(|&(x, y)| Point2::new(x, y).into())
            .collect();
        let extended = extend(&points, true);

        assert_eq!(extended[0].position, Vector3::new(1.0, 1.0, 0.0));
        assert_eq!(extended[5].position, Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_mirrored_rotation() {
        let q0 = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.2);
        let q1 = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.5);
        let points: Vec<ControlPoint> = [q0, q1]
            .iter()
            .enumerate()
            .map(|(i, &q)| Isometry3::from_parts(Vector3::new(i as f64, 0.0, 0.0).into(), q).into())
            .collect();

        let before = mirror(&Knot::from(&points[0]), &Knot::from(&points[1]));
        let expected = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), -0.1);
        let rotation = before.rotation.map(|q| q.angle_to(&expected));
        assert!(rotation.is_some_and(|angle| angle < 1e-12));
    }

    #[test]
    fn test_segment_counts() {
        let params = ChainParams::default();
        let one = [ControlPoint::from(Point3::new(1.0, 1.0, 1.0))];
        assert_eq!(build_segments(&one, PointKind::Spatial, &params).len(), 1);

        let two = [
            ControlPoint::from(Point3::origin()),
            ControlPoint::from(Point3::new(1.0, 0.0, 0.0)),
        ];
        let segments = build_segments(&two, PointKind::Spatial, &params);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].length(), 1.0);

        let four: Vec<ControlPoint> = (0..4)
            .map(|i| Point3::new(i as f64, (i % 2) as f64, 0.0).into())
            .collect();
        assert_eq!(build_segments(&four, PointKind::Spatial, &params).len(), 3);
    }
}
