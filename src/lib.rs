//! Centripetal Catmull-Rom splines with arc-length and moving-frame queries.
//!
//! A [`Chain`] interpolates an ordered list of [`ControlPoint`]s with one
//! cubic [`Segment`] per interior pair:
//!
//! - **Parametrization**: uniform, centripetal, or chordal knot spacing
//!   (`alpha` of `0`, `0.5`, `1`) plus a tension that scales the tangents
//! - **Evaluation**: position, velocity, acceleration, jerk, tangent, normal,
//!   binormal, curvature, torsion, at global `t ∈ [0, 1]`
//! - **Arc length**: Gauss–Legendre integration and a unit-speed
//!   reparametrization, either solved per query or read from a precomputed
//!   Chebyshev interpolant
//! - **Framing**: look-along, Frenet, SQUAD-oriented, and rotation-minimizing
//!   frames, with transport and twist interpolants built on the latter
//! - **Extent**: exact bounding boxes and single-pass bulk sampling
//!
//! # Example
//!
//! ```
//! use catrom::{Chain, ChainParams, ControlPoint, Point3};
//!
//! let points: Vec<ControlPoint> = [
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 2.0, 0.0),
//!     Point3::new(3.0, 2.0, 1.0),
//!     Point3::new(4.0, 0.0, 1.0),
//! ]
//! .into_iter()
//! .map(ControlPoint::from)
//! .collect();
//!
//! let chain = Chain::with_params(&points, &ChainParams::centripetal()).unwrap();
//!
//! let start = chain.solve_position(0.0, false);
//! let halfway = chain.solve_position(0.5, true);
//! let frame = chain.solve_rmf(0.5, None, true);
//!
//! assert_eq!(start, Point3::origin());
//! assert!(frame.is_orthonormal(1e-9));
//! # let _ = halfway;
//! ```
//!
//! # Point Kinds
//!
//! Planar points are carried internally with `z = 0`, so every result is a
//! 3D vector. Queries that only make sense in 3D (binormal, torsion) return
//! [`CurveError::UnsupportedPointKind`] on planar chains. Oriented points
//! ([`Isometry3`]) additionally drive [`Chain::solve_frame_squad`].
//!
//! # Caches
//!
//! Arc lengths are computed at construction. Unit-speed interpolants and
//! rotation-minimizing frame tables are populated at most once, either
//! eagerly through the `precompute_*` methods or on first use.
//!
//! # Feature Flags
//!
//! - `serde`: Enable serialization/deserialization for the parameter and
//!   point types

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::many_single_char_names,
    clippy::similar_names,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::suboptimal_flops,
    clippy::missing_const_for_fn,
    clippy::doc_markdown,
    clippy::redundant_closure_for_method_calls,
    clippy::module_name_repetitions,
    clippy::float_cmp
)]

mod chain;
mod chebyshev;
mod config;
mod error;
mod factory;
mod frame;
mod point;
mod quadrature;
mod quaternion;
mod reparam;
mod segment;

pub use chain::Chain;
pub use chebyshev::{Chebyshev, MAX_DEGREE, MIN_DEGREE};
pub use config::{ArcStrategy, ChainParams, DEFAULT_CHEBYSHEV_DEGREE, Precompute, Tolerances};
pub use error::CurveError;
pub use frame::Frame;
pub use point::{ControlPoint, PointKind};
pub use quadrature::gauss_legendre;
pub use quaternion::{align, slerp, squad, squad_control};
pub use segment::Segment;

// Re-export nalgebra types for convenience
pub use nalgebra::{Isometry3, Point2, Point3, UnitQuaternion, Vector3};

/// Result type for curve operations.
pub type Result<T> = std::result::Result<T, CurveError>;
