//! Error types for the kernel facade.

use freeform_cagd::CagdError;
use freeform_mvar::MvarError;
use thiserror::Error;

/// Every error the kernel facade can report.
#[derive(Error, Debug)]
pub enum KernelError {
    /// Curve or surface operation failed.
    #[error(transparent)]
    Cagd(#[from] CagdError),

    /// Multivariate or bisector operation failed.
    #[error(transparent)]
    Mvar(#[from] MvarError),

    /// Configuration text could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration values are out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for kernel operations.
pub type Result<T> = std::result::Result<T, KernelError>;
