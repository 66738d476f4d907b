//! Kernel configuration.

use crate::error::{KernelError, Result};
use freeform_math::Tolerance;
use freeform_mvar::SolverConfig;
use serde::{Deserialize, Serialize};

/// What happens to an error once the kernel has detected it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Log at error level and return the error.
    #[default]
    Log,
    /// Abort the calling thread.
    Panic,
    /// Record the error for [`Kernel::collected_errors`](crate::Kernel::collected_errors) and return it.
    Collect,
}

/// Settings of one [`Kernel`](crate::Kernel) instance.
///
/// Every field has a default, so a TOML document only needs the values it
/// changes:
///
/// ```toml
/// error_policy = "collect"
///
/// [tolerance]
/// param = 1e-6
///
/// [solver]
/// subdiv_tol = 0.005
/// step = 0.02
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Error reporting policy used to pick the default sink.
    pub error_policy: ErrorPolicy,
    /// Knot and parameter tolerances.
    pub tolerance: Tolerance,
    /// Zero-set solver and tracer settings.
    pub solver: SolverConfig,
}

impl KernelConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every tolerance and step is positive.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("tolerance.knot", self.tolerance.knot),
            ("tolerance.param", self.tolerance.param),
            ("solver.subdiv_tol", self.solver.subdiv_tol),
            ("solver.numeric_tol", self.solver.numeric_tol),
            ("solver.step", self.solver.step),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(KernelError::InvalidConfig(format!("{name} must be positive, got {value}")));
            }
        }
        if self.solver.max_depth == 0 {
            return Err(KernelError::InvalidConfig("solver.max_depth must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = KernelConfig::default();
        assert_eq!(config.tolerance, Tolerance::DEFAULT);
        assert_eq!(config.solver, SolverConfig::default());
        assert_eq!(config.error_policy, ErrorPolicy::Log);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = KernelConfig::from_toml_str(
            r#"
            error_policy = "collect"

            [solver]
            step = 0.05
            "#,
        )
        .unwrap();
        assert_eq!(config.error_policy, ErrorPolicy::Collect);
        assert_eq!(config.solver.step, 0.05);
        assert_eq!(config.solver.subdiv_tol, SolverConfig::default().subdiv_tol);
        assert_eq!(config.tolerance, Tolerance::DEFAULT);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            KernelConfig::from_toml_str("[solver]\nstep = -1.0"),
            Err(KernelError::InvalidConfig(_))
        ));
        assert!(matches!(
            KernelConfig::from_toml_str("error_policy = \"shout\""),
            Err(KernelError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = KernelConfig {
            error_policy: ErrorPolicy::Panic,
            ..KernelConfig::default()
        };
        let text = toml::to_string(&config).unwrap();
        assert_eq!(KernelConfig::from_toml_str(&text).unwrap(), config);
    }
}
