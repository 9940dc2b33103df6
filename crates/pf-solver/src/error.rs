//! Error types for solver operations.

use crate::gas_flow::GasFlowError;
use pf_components::ComponentError;
use pf_fluids::FluidError;
use pf_network::NetworkError;
use thiserror::Error;

/// Errors that stop a network or system solve.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },

    #[error("Section '{section_id}': {source}")]
    Section {
        section_id: String,
        #[source]
        source: ComponentError,
    },

    #[error("Section '{section_id}' gas flow: {source}")]
    GasFlow {
        section_id: String,
        #[source]
        source: GasFlowError,
    },

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Fluid error: {0}")]
    Fluid(#[from] FluidError),
}

pub type SolverResult<T> = Result<T, SolverError>;

impl SolverError {
    pub(crate) fn section(section_id: &str, source: ComponentError) -> Self {
        SolverError::Section {
            section_id: section_id.to_string(),
            source,
        }
    }

    pub(crate) fn gas_flow(section_id: &str, source: GasFlowError) -> Self {
        SolverError::GasFlow {
            section_id: section_id.to_string(),
            source,
        }
    }

    /// True when the failure only means an input was not supplied.
    pub fn is_missing_parameter(&self) -> bool {
        match self {
            SolverError::Section { source, .. } => source.is_missing_parameter(),
            SolverError::GasFlow {
                source: GasFlowError::Friction(source),
                ..
            } => source.is_missing_parameter(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_parameter_is_detected_through_section() {
        let err = SolverError::section(
            "P-1",
            ComponentError::MissingParameter {
                what: "pipe diameter",
            },
        );
        assert!(err.is_missing_parameter());
        assert!(err.to_string().contains("P-1"));

        let err = SolverError::section(
            "P-1",
            ComponentError::Calculation {
                what: "no bracket".into(),
            },
        );
        assert!(!err.is_missing_parameter());
    }
}
