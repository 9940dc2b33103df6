//! Config file schema.
//!
//! These types mirror the YAML/JSON layout one to one. Dimensional fields are
//! `QuantityInput`s and stay unconverted until `convert` turns the document
//! into the domain model.

use crate::quantity::QuantityInput;
use crate::schedule::ScheduleInput;
use pf_components::{FrictionFactorType, OrificeTaps};
use pf_fluids::Phase;
use pf_network::{Direction, GasFlowModel, OutputUnits, SharedNodeMember, SystemSolverConfig};
use serde::{Deserialize, Serialize};

/// Top-level document: one `network`, or several `networks` coupled by
/// `shared_nodes`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ConfigDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<BundleDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shared_nodes: Vec<SharedNodeDef>,
    #[serde(default)]
    pub solver: SolverDef,
    /// Applied to every network that does not set its own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_units: Option<OutputUnits>,
}

impl ConfigDocument {
    pub fn is_system(&self) -> bool {
        !self.networks.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub direction: Direction,
    pub fluid: FluidDef,
    #[serde(default)]
    pub sections: Vec<SectionDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary_pressure: Option<QuantityInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_pressure: Option<QuantityInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downstream_pressure: Option<QuantityInput>,
    #[serde(default)]
    pub gas_flow_model: GasFlowModel,
    #[serde(default)]
    pub friction_factor_type: FrictionFactorType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_units: Option<OutputUnits>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FluidDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub phase: Phase,
    pub temperature: QuantityInput,
    pub pressure: QuantityInput,
    pub viscosity: QuantityInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<QuantityInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub molecular_weight: Option<QuantityInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_heat_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vapor_pressure: Option<QuantityInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_pressure: Option<QuantityInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass_flow_rate: Option<QuantityInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volumetric_flow_rate: Option<QuantityInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_flow_rate: Option<QuantityInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionDef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleInput>,
    /// Nominal pipe size, inches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nominal_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<QuantityInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roughness: Option<QuantityInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_change: Option<QuantityInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipe_diameter: Option<QuantityInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inlet_diameter: Option<QuantityInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlet_diameter: Option<QuantityInput>,
    /// Construction style for bends and tees (`long_radius`, `screwed`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fitting_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fittings: Vec<FittingDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_k: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub piping_and_fitting_safety_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_specified_fixed_loss: Option<QuantityInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary_pressure: Option<QuantityInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_valve: Option<ControlValveDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orifice: Option<OrificeDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_direction: Option<String>,
    #[serde(default, alias = "start_node", skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, alias = "end_node", skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub erosional_constant: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FittingDef {
    /// Fitting name such as `elbow_90` or `globe_valve`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "one")]
    pub count: u32,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ControlValveDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure_drop: Option<QuantityInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cv: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c1: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fl: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diameter: Option<QuantityInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OrificeDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure_drop: Option<QuantityInput>,
    /// Orifice-to-pipe bore ratio.
    #[serde(
        default,
        rename = "d_over_D_ratio",
        alias = "beta",
        skip_serializing_if = "Option::is_none"
    )]
    pub beta: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orifice_diameter: Option<QuantityInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipe_diameter: Option<QuantityInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discharge_coefficient: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expansibility: Option<f64>,
    #[serde(default)]
    pub taps: OrificeTaps,
}

/// A network inside a system document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BundleDef {
    pub id: String,
    pub network: NetworkDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SharedNodeDef {
    pub id: String,
    /// Added to the leader pressure for every other member.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bias: Option<QuantityInput>,
    /// First entry is the leader.
    pub members: Vec<SharedNodeMember>,
}

/// `solver:` block. Unset fields keep the solver defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct SolverDef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friction_factor_override: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_pipe_diameter: Option<QuantityInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isothermal_max_passes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isothermal_tolerance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backward_max_passes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backward_tolerance: Option<QuantityInput>,
    /// Outer loop of a coupled system.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemSolverConfig>,
}
