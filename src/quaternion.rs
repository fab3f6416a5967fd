//! Quaternion interpolation for oriented control points.
//!
//! Orientation along a segment built from [`Oriented`](crate::ControlPoint::Oriented)
//! points is swept with spherical quadrangle interpolation (SQUAD), which is
//! C¹ across segment joins where plain slerp is only C⁰.

use nalgebra::{Quaternion, UnitQuaternion};

/// Below this `sin θ`, slerp falls back to normalized lerp.
const NLERP_THRESHOLD: f64 = 1e-9;

/// Return `q` or `-q`, whichever lies in the same hemisphere as `reference`.
#[must_use]
pub fn align(reference: &UnitQuaternion<f64>, q: &UnitQuaternion<f64>) -> UnitQuaternion<f64> {
    if reference.coords.dot(&q.coords) < 0.0 {
        UnitQuaternion::new_unchecked(-q.into_inner())
    } else {
        *q
    }
}

/// Spherical linear interpolation along the shorter arc.
#[must_use]
pub fn slerp(a: &UnitQuaternion<f64>, b: &UnitQuaternion<f64>, t: f64) -> UnitQuaternion<f64> {
    slerp_raw(a, &align(a, b), t)
}

/// Slerp without hemisphere correction.
fn slerp_raw(a: &UnitQuaternion<f64>, b: &UnitQuaternion<f64>, t: f64) -> UnitQuaternion<f64> {
    let cos = a.coords.dot(&b.coords).clamp(-1.0, 1.0);
    let theta = cos.acos();
    let sin = theta.sin();

    if sin < NLERP_THRESHOLD {
        let q = a.coords * (1.0 - t) + b.coords * t;
        return UnitQuaternion::new_normalize(Quaternion::from(q));
    }

    let wa = ((1.0 - t) * theta).sin() / sin;
    let wb = (t * theta).sin() / sin;
    UnitQuaternion::new_normalize(Quaternion::from(a.coords * wa + b.coords * wb))
}

/// Intermediate SQUAD control quaternion at `q` given its neighbours.
///
/// `s = q · exp(-(log(q⁻¹·next) + log(q⁻¹·prev)) / 4)`. All three inputs must
/// already share a hemisphere.
#[must_use]
pub fn squad_control(
    prev: &UnitQuaternion<f64>,
    q: &UnitQuaternion<f64>,
    next: &UnitQuaternion<f64>,
) -> UnitQuaternion<f64> {
    let inv = q.inverse();
    let to_next = (inv * next).scaled_axis();
    let to_prev = (inv * prev).scaled_axis();
    q * UnitQuaternion::from_scaled_axis(-(to_next + to_prev) / 4.0)
}

/// Spherical quadrangle interpolation between `q1` (`t = 0`) and `q2` (`t = 1`),
/// with `q0` and `q3` as the outer neighbours.
#[must_use]
pub fn squad(
    q0: &UnitQuaternion<f64>,
    q1: &UnitQuaternion<f64>,
    q2: &UnitQuaternion<f64>,
    q3: &UnitQuaternion<f64>,
    t: f64,
) -> UnitQuaternion<f64> {
    let q0 = align(q1, q0);
    let q2 = align(q1, q2);
    let q3 = align(&q2, q3);

    let s1 = squad_control(&q0, q1, &q2);
    let s2 = squad_control(q1, &q2, &q3);

    let outer = slerp_raw(q1, &q2, t);
    let inner = slerp_raw(&s1, &s2, t);
    slerp_raw(&outer, &inner, 2.0 * t * (1.0 - t))
}
