//! Error types for section loss calculations.

use pf_core::PfError;
use pf_fluids::FluidError;
use thiserror::Error;

/// Errors that can occur while computing a section's losses.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    /// A supplied physical quantity violates its domain (non-positive
    /// diameter, viscosity, ...).
    #[error("Validation error: {what} = {value}")]
    Validation { what: &'static str, value: f64 },

    /// A quantity the calculation needs was never supplied or computed.
    #[error("Missing parameter: {what}")]
    MissingParameter { what: &'static str },

    #[error("Unsupported fitting: {what}")]
    UnsupportedFitting { what: String },

    /// Inconsistent device specification (both or neither direction known).
    #[error("Invalid specification: {what}")]
    InvalidSpec { what: String },

    /// Root-finding or iteration failure.
    #[error("Calculation failed: {what}")]
    Calculation { what: String },

    #[error("Fluid error: {0}")]
    Fluid(#[from] FluidError),
}

pub type ComponentResult<T> = Result<T, ComponentError>;

impl ComponentError {
    /// True when the error only reflects an absent input, which the network
    /// solver degrades to a skipped section.
    pub fn is_missing_parameter(&self) -> bool {
        matches!(
            self,
            ComponentError::MissingParameter { .. }
                | ComponentError::Fluid(FluidError::MissingProperty { .. })
        )
    }
}

impl From<PfError> for ComponentError {
    fn from(e: PfError) -> Self {
        match e {
            PfError::NonFinite { what, value } => ComponentError::Validation { what, value },
            other => ComponentError::Calculation {
                what: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ComponentError::Validation {
            what: "pipe diameter",
            value: 0.0,
        };
        assert!(err.to_string().contains("pipe diameter"));
    }

    #[test]
    fn missing_parameter_classification() {
        assert!(ComponentError::MissingParameter { what: "diameter" }.is_missing_parameter());
        assert!(
            ComponentError::Fluid(FluidError::MissingProperty {
                what: "molecular weight"
            })
            .is_missing_parameter()
        );
        assert!(!ComponentError::Calculation { what: "x".into() }.is_missing_parameter());
    }

    #[test]
    fn no_bracket_becomes_calculation_error() {
        let err: ComponentError = PfError::NoBracket {
            what: "cv",
            lo: 0.0,
            hi: 1.0,
            f_lo: 1.0,
            f_hi: 2.0,
        }
        .into();
        assert!(matches!(err, ComponentError::Calculation { .. }));
    }
}
