//! pf-project: YAML/JSON configuration for networks and network systems.
//!
//! A document holds either one `network:` or a `networks:` list coupled by
//! `shared_nodes:`, plus an optional `solver:` block. Dimensional fields
//! accept a bare SI number, a `{value, unit}` pair or a `"<value> <unit>"`
//! string.
//!
//! ```
//! use pf_project::{ConfigFormat, load_network_str};
//!
//! let yaml = r#"
//! network:
//!   name: cooling water
//!   upstream_pressure: 10 bar
//!   fluid:
//!     phase: liquid
//!     temperature: 20 degC
//!     pressure: 10 bar
//!     density: 998
//!     viscosity: 1 cP
//!     mass_flow_rate: 10
//!   sections:
//!     - {id: P-1, length: 100, nominal_size: 4, schedule: 40}
//! "#;
//! let loaded = load_network_str(yaml, ConfigFormat::Yaml).unwrap();
//! assert_eq!(loaded.network.sections.len(), 1);
//! ```

pub mod convert;
pub mod quantity;
pub mod schedule;
pub mod schema;
pub mod validate;

pub use convert::{ConvertOptions, check_output_units};
pub use quantity::QuantityInput;
pub use schedule::{ScheduleInput, inside_diameter, outside_diameter};
pub use schema::*;
pub use validate::{ValidationError, validate_document};

use pf_components::ComponentError;
use pf_fluids::{FluidError, UnitError};
use pf_network::{Network, NetworkBundle, NetworkError, NetworkSystem};
use pf_solver::SolverConfig;
use std::path::Path;

pub type ConfigResult<T> = Result<T, ConfigurationError>;

#[derive(thiserror::Error, Debug)]
pub enum ConfigurationError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unit error in {field}: {source}")]
    Unit {
        field: String,
        #[source]
        source: UnitError,
    },

    #[error("Missing field: {field}")]
    MissingField { field: String },

    #[error("No schedule {schedule} wall for NPS {nps}")]
    Schedule { nps: f64, schedule: String },

    #[error("Unsupported config format: {what}")]
    UnsupportedFormat { what: String },

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Component error: {0}")]
    Component(#[from] ComponentError),

    #[error("Fluid error: {0}")]
    Fluid(#[from] FluidError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    /// `.yaml`/`.yml` or `.json`, case-insensitive.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "json" => Ok(ConfigFormat::Json),
            _ => Err(ConfigurationError::UnsupportedFormat {
                what: path.display().to_string(),
            }),
        }
    }
}

/// A single network with the solver settings from its document.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub network: Network,
    pub solver: SolverConfig,
}

/// A coupled system with the solver settings from its document.
#[derive(Debug, Clone)]
pub struct SystemConfig {
    pub system: NetworkSystem,
    pub solver: SolverConfig,
}

/// Either shape a document may take.
#[derive(Debug, Clone)]
pub enum LoadedConfig {
    Network(NetworkConfig),
    System(SystemConfig),
}

/// Parse and structurally validate a document without converting units.
pub fn parse_document(text: &str, format: ConfigFormat) -> ConfigResult<ConfigDocument> {
    let doc: ConfigDocument = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(text)?,
        ConfigFormat::Json => serde_json::from_str(text)?,
    };
    validate_document(&doc)?;
    Ok(doc)
}

pub fn load_str(text: &str, format: ConfigFormat) -> ConfigResult<LoadedConfig> {
    let doc = parse_document(text, format)?;
    if doc.is_system() {
        system_from_document(doc).map(LoadedConfig::System)
    } else {
        network_from_document(doc).map(LoadedConfig::Network)
    }
}

pub fn load_file(path: &Path) -> ConfigResult<LoadedConfig> {
    let format = ConfigFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    load_str(&content, format)
}

pub fn load_network_str(text: &str, format: ConfigFormat) -> ConfigResult<NetworkConfig> {
    network_from_document(parse_document(text, format)?)
}

pub fn load_network_file(path: &Path) -> ConfigResult<NetworkConfig> {
    let format = ConfigFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    load_network_str(&content, format)
}

pub fn load_system_str(text: &str, format: ConfigFormat) -> ConfigResult<SystemConfig> {
    system_from_document(parse_document(text, format)?)
}

pub fn load_system_file(path: &Path) -> ConfigResult<SystemConfig> {
    let format = ConfigFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    load_system_str(&content, format)
}

fn network_from_document(doc: ConfigDocument) -> ConfigResult<NetworkConfig> {
    let solver = doc.solver.to_config()?;
    let options = doc.solver.options();
    let mut def = doc.network.ok_or_else(|| ConfigurationError::MissingField {
        field: "network".into(),
    })?;
    if def.output_units.is_none() {
        def.output_units = doc.output_units;
    }
    Ok(NetworkConfig {
        network: def.into_network_with(options)?,
        solver,
    })
}

fn system_from_document(doc: ConfigDocument) -> ConfigResult<SystemConfig> {
    if doc.networks.is_empty() {
        return Err(ConfigurationError::MissingField {
            field: "networks".into(),
        });
    }
    let solver = doc.solver.to_config()?;
    let options = doc.solver.options();

    let mut system = NetworkSystem::new();
    for bundle in doc.networks {
        let mut def = bundle.network;
        if def.output_units.is_none() {
            def.output_units = doc.output_units.clone();
        }
        system = system.with_bundle(NetworkBundle::new(bundle.id, def.into_network_with(options)?));
    }
    for group in &doc.shared_nodes {
        system = system.with_group(group.to_group()?);
    }
    if let Some(config) = doc.solver.system {
        system = system.with_config(config);
    }
    system.validate()?;

    Ok(SystemConfig { system, solver })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.yml")).unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.YAML")).unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.json")).unwrap(), ConfigFormat::Json);
        assert!(ConfigFormat::from_path(Path::new("a.toml")).is_err());
        assert!(ConfigFormat::from_path(Path::new("noext")).is_err());
    }
}
