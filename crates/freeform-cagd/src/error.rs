//! Error types for curve and surface operations.

use crate::GeomType;
use thiserror::Error;

/// Errors raised by the dispatch layer and the basis kernels.
///
/// Every variant is fatal for the operation that raised it: the kernel
/// never retries or substitutes a best-effort result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CagdError {
    /// Curve with an unrecognized geometry type.
    #[error("undefined curve type")]
    UndefCrv,

    /// Surface with an unrecognized geometry type.
    #[error("undefined surface type")]
    UndefSrf,

    /// Operation not defined on power basis geometry.
    #[error("power basis does not support {0}")]
    PowerNoSupport(&'static str),

    /// Operation not defined on B-spline geometry.
    #[error("B-spline basis does not support {0}")]
    BsplineNoSupport(&'static str),

    /// Operation not defined on Bezier geometry.
    #[error("Bezier basis does not support {0}")]
    BezierNoSupport(&'static str),

    /// Operation not defined on rational geometry.
    #[error("rational geometry is not supported by {0}")]
    RationalNoSupport(&'static str),

    /// Size argument out of range.
    #[error("wrong size: {0}")]
    WrongSize(String),

    /// Point type or length of a substituted curve does not match the mesh.
    #[error("point type or length mismatch: {0}")]
    PtOrLenMismatch(String),

    /// Mesh row or column index out of range.
    #[error("index {index} is not in mesh of size {size}")]
    IndexNotInMesh {
        /// Requested index.
        index: usize,
        /// Number of rows or columns available.
        size: usize,
    },

    /// A direction token that is neither constant U nor constant V.
    #[error("direction is not constant U or constant V: {0:?}")]
    DirNotConstUv(char),

    /// Parameter outside the parametric domain.
    #[error("parameter {t} is outside the domain [{min}, {max}]")]
    DomainTVerify {
        /// Offending parameter.
        t: f64,
        /// Domain lower bound.
        min: f64,
        /// Domain upper bound.
        max: f64,
    },

    /// Order is inconsistent with the requested operation.
    #[error("wrong order: {0}")]
    WrongOrder(String),

    /// Knot vector is malformed.
    #[error("invalid knot vector: {0}")]
    InvalidKnots(String),

    /// Geometry is malformed (array sizes, point type).
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
}

impl CagdError {
    /// The "not supported" error matching a basis type.
    pub fn no_support(gtype: GeomType, op: &'static str) -> Self {
        match gtype {
            GeomType::Bezier => Self::BezierNoSupport(op),
            GeomType::BSpline => Self::BsplineNoSupport(op),
            GeomType::Power => Self::PowerNoSupport(op),
        }
    }

    /// Create a domain verification error.
    pub fn domain(t: f64, (min, max): (f64, f64)) -> Self {
        Self::DomainTVerify { t, min, max }
    }

    /// Create an invalid geometry error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidGeometry(message.into())
    }

    /// Create an invalid knot vector error.
    pub fn knots(message: impl Into<String>) -> Self {
        Self::InvalidKnots(message.into())
    }
}

/// Result type for curve and surface operations.
pub type Result<T> = std::result::Result<T, CagdError>;
