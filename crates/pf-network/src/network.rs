//! Single-fluid network: an ordered chain of pipe sections.

use crate::error::{NetResult, NetworkError};
use pf_components::{FrictionFactorType, PipeSection};
use pf_core::units::Pressure;
use pf_fluids::Fluid;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Calculation direction through the section list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Inferred from the supplied boundary pressures.
    #[default]
    Auto,
    /// Known inlet, march toward the outlet.
    Forward,
    /// Known outlet, march back toward the inlet.
    Backward,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Auto => "auto",
            Direction::Forward => "forward",
            Direction::Backward => "backward",
        })
    }
}

impl FromStr for Direction {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Direction::Auto),
            "forward" => Ok(Direction::Forward),
            "backward" => Ok(Direction::Backward),
            other => Err(NetworkError::UnknownVariant {
                what: "direction",
                value: other.to_string(),
            }),
        }
    }
}

/// Compressible pipe-flow model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GasFlowModel {
    #[default]
    Isothermal,
    Adiabatic,
}

impl FromStr for GasFlowModel {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "isothermal" => Ok(GasFlowModel::Isothermal),
            "adiabatic" | "fanno" => Ok(GasFlowModel::Adiabatic),
            other => Err(NetworkError::UnknownVariant {
                what: "gas flow model",
                value: other.to_string(),
            }),
        }
    }
}

/// Display units for reports. Unit strings are resolved by `pf-fluids::units`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputUnits {
    pub pressure: String,
    pub pressure_drop: String,
    pub temperature: String,
    pub length: String,
    pub density: String,
    pub velocity: String,
    pub mass_flow: String,
    pub volume_flow: String,
}

impl Default for OutputUnits {
    fn default() -> Self {
        Self {
            pressure: "Pa".into(),
            pressure_drop: "Pa".into(),
            temperature: "K".into(),
            length: "m".into(),
            density: "kg/m3".into(),
            velocity: "m/s".into(),
            mass_flow: "kg/s".into(),
            volume_flow: "m3/s".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    pub name: String,
    pub description: Option<String>,
    pub direction: Direction,
    pub fluid: Fluid,
    pub sections: Vec<PipeSection>,
    pub boundary_pressure: Option<Pressure>,
    pub upstream_pressure: Option<Pressure>,
    pub downstream_pressure: Option<Pressure>,
    pub gas_flow_model: GasFlowModel,
    pub friction_factor_type: FrictionFactorType,
    pub output_units: OutputUnits,
}

impl Network {
    pub fn new(name: impl Into<String>, fluid: Fluid) -> Self {
        Self {
            name: name.into(),
            description: None,
            direction: Direction::Auto,
            fluid,
            sections: Vec::new(),
            boundary_pressure: None,
            upstream_pressure: None,
            downstream_pressure: None,
            gas_flow_model: GasFlowModel::default(),
            friction_factor_type: FrictionFactorType::default(),
            output_units: OutputUnits::default(),
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_upstream_pressure(mut self, p: Pressure) -> Self {
        self.upstream_pressure = Some(p);
        self
    }

    pub fn with_downstream_pressure(mut self, p: Pressure) -> Self {
        self.downstream_pressure = Some(p);
        self
    }

    pub fn with_boundary_pressure(mut self, p: Pressure) -> Self {
        self.boundary_pressure = Some(p);
        self
    }

    pub fn with_gas_flow_model(mut self, model: GasFlowModel) -> Self {
        self.gas_flow_model = model;
        self
    }

    pub fn with_friction_factor_type(mut self, convention: FrictionFactorType) -> Self {
        self.friction_factor_type = convention;
        self
    }

    pub fn section(&self, id: &str) -> Option<&PipeSection> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Node names touched by any section, in first-seen order.
    pub fn node_ids(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        let mut ordered = Vec::new();
        for section in &self.sections {
            for node in [section.start_node.as_str(), section.end_node.as_str()] {
                if seen.insert(node) {
                    ordered.push(node);
                }
            }
        }
        ordered
    }

    pub fn has_node(&self, node: &str) -> bool {
        self.sections
            .iter()
            .any(|s| s.start_node == node || s.end_node == node)
    }

    pub fn inlet_node(&self) -> Option<&str> {
        self.sections.first().map(|s| s.start_node.as_str())
    }

    pub fn outlet_node(&self) -> Option<&str> {
        self.sections.last().map(|s| s.end_node.as_str())
    }

    /// Structural and physical checks run before any solve.
    pub fn validate(&self) -> NetResult<()> {
        crate::validate::validate_network(self)
    }
}
