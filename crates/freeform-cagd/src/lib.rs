#![warn(missing_docs)]

//! Freeform curves and surfaces for the freeform geometry kernel.
//!
//! Curves and surfaces come in three bases (Bezier, B-spline, power) behind
//! one set of operations:
//!
//! - **Dispatch**: evaluation, derivatives, subdivision, refinement, degree
//!   change, Moebius reparametrization and reversal, routed per basis with a
//!   Bezier fallback for power basis geometry
//! - **Split**: ordered multi-parameter subdivision with proximity reporting
//! - **Region**: sub-curve and sub-surface extraction
//! - **Mesh**: isoparametric and boundary curves, mesh substitution and
//!   fixed-resolution triangulation
//! - **Frames**: tangents, normals and binormals
//!
//! Control points use the `[W, X, Y, ...]` layout throughout: index 0 holds
//! the rational weight and is empty for non-rational geometry.

mod basis;
mod coerce;
pub mod curve;
mod dispatch;
pub mod error;
mod frame;
pub mod knots;
pub mod mesh;
mod region;
pub mod split;
pub mod surface;
pub mod types;

pub use curve::Curve;
pub use error::{CagdError, Result};
pub use mesh::TriMesh;
pub use split::Proximity;
pub use surface::Surface;
pub use types::{GeomType, PointType, SrfBndry, SrfDir};
