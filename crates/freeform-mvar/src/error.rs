//! Error types for multivariate operations.

use freeform_cagd::CagdError;
use thiserror::Error;

/// Errors raised by the multivariate toolkit, the solvers and the bisector
/// builders.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MvarError {
    /// A curve or surface operation failed underneath.
    #[error(transparent)]
    Cagd(#[from] CagdError),

    /// Operands must share a basis type.
    #[error("operands must have the same geometry type")]
    SameGtypeExpected,

    /// Operand combination is not supported.
    #[error("geometry not supported: {0}")]
    GeomNoSupport(String),

    /// Operation not defined on rational multivariates.
    #[error("rational multivariates are not supported by {0}")]
    RationalNoSupport(&'static str),

    /// Operands disagree in dimension, axis domains or point type.
    #[error("incompatible multivariates: {0}")]
    Incompatible(String),

    /// The constraint system has no usable solution structure.
    #[error("degenerate system: {0}")]
    DegenerateSystem(String),
}

impl MvarError {
    /// Create an incompatibility error.
    pub fn incompatible(message: impl Into<String>) -> Self {
        Self::Incompatible(message.into())
    }

    /// Create an unsupported geometry error.
    pub fn no_support(message: impl Into<String>) -> Self {
        Self::GeomNoSupport(message.into())
    }
}

/// Result type for multivariate operations.
pub type Result<T> = std::result::Result<T, MvarError>;
