//! Network-specific error types.

use pf_components::ComponentError;
use pf_fluids::FluidError;
use thiserror::Error;

/// Network construction and validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    #[error("Network '{network}' has no sections")]
    Empty { network: String },

    #[error("Duplicate section id '{id}'")]
    DuplicateSection { id: String },

    #[error("Duplicate network bundle id '{id}'")]
    DuplicateBundle { id: String },

    /// A shared-node group names a bundle that does not exist.
    #[error("Shared node '{group}' refers to unknown network '{network}'")]
    UnknownNetwork { group: String, network: String },

    /// A shared-node group names a node that no section of the bundle touches.
    #[error("Shared node '{group}' refers to unknown node '{node}' in network '{network}'")]
    UnknownNode {
        group: String,
        network: String,
        node: String,
    },

    #[error("Shared node '{group}' has no members")]
    EmptyGroup { group: String },

    #[error("Local node '{node}' of network '{network}' belongs to more than one shared node")]
    NodeInTwoGroups { network: String, node: String },

    #[error("Invalid {what}: {value}")]
    InvalidValue { what: &'static str, value: f64 },

    #[error("Unknown {what} '{value}'")]
    UnknownVariant { what: &'static str, value: String },

    #[error("Section '{section_id}': {source}")]
    Section {
        section_id: String,
        #[source]
        source: ComponentError,
    },

    #[error("Fluid error: {0}")]
    Fluid(#[from] FluidError),
}

pub type NetResult<T> = Result<T, NetworkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_error_names_the_section() {
        let err = NetworkError::Section {
            section_id: "P-7".into(),
            source: ComponentError::MissingParameter {
                what: "pipe diameter",
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("P-7"));
        assert!(msg.contains("pipe diameter"));
    }
}
