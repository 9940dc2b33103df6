//! Fluid property errors.

use pf_core::PfError;
use thiserror::Error;

/// Result type for fluid operations.
pub type FluidResult<T> = Result<T, FluidError>;

/// Errors that can occur while validating a fluid or deriving its properties.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// Non-physical values (negative density, pressure, etc.).
    #[error("Non-physical value for {what}: {value}")]
    NonPhysical { what: &'static str, value: f64 },

    /// A property needed for this phase was not supplied.
    #[error("Missing fluid property: {what}")]
    MissingProperty { what: &'static str },

    /// No flow basis (mass, actual volumetric, standard volumetric) was given.
    #[error("Flow rate cannot be resolved: provide mass, volumetric or standard flow rate")]
    MissingFlow,

    #[error("Unknown phase '{name}' (expected liquid, gas or vapor)")]
    UnknownPhase { name: String },

    #[error(transparent)]
    Numeric(#[from] PfError),
}

impl From<FluidError> for PfError {
    fn from(err: FluidError) -> Self {
        match err {
            FluidError::NonPhysical { what, .. } => PfError::InvalidArg { what },
            FluidError::MissingProperty { what } => PfError::InvalidArg { what },
            FluidError::MissingFlow => PfError::InvalidArg {
                what: "fluid flow rate",
            },
            FluidError::UnknownPhase { .. } => PfError::InvalidArg { what: "phase" },
            FluidError::Numeric(inner) => inner,
        }
    }
}
