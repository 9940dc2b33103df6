//! pf-results: solver output converted to display units.
//!
//! `present_network` and `present_system` turn the SI result records of
//! `pf-network` into report trees whose dimensional fields are expressed in
//! the network's `OutputUnits`. Reports serialize to JSON or YAML through
//! `render` and `write_report`.

pub mod present;
pub mod store;
pub mod types;

pub use present::{present_network, present_system};
pub use store::{ReportFormat, render, write_report};
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("Unit error in {field}: {source}")]
    Unit {
        field: &'static str,
        #[source]
        source: pf_fluids::UnitError,
    },

    #[error("Unsupported report format: {what}")]
    UnsupportedFormat { what: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
