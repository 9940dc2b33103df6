//! Report data types. Dimensional values are in the units named by
//! `NetworkReport::units`.

use pf_components::{FittingContribution, FlowScheme};
use pf_network::{Direction, GasFlowModel, OutputUnits};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkReport {
    pub name: String,
    pub direction: Direction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_flow_model: Option<GasFlowModel>,
    pub units: OutputUnits,
    pub sections: Vec<SectionReport>,
    /// Sum over all sections.
    pub pressure_drop: PressureDropReport,
    pub summary: SummaryReport,
    pub flow: FlowReport,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl NetworkReport {
    pub fn section(&self, id: &str) -> Option<&SectionReport> {
        self.sections.iter().find(|s| s.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionReport {
    pub id: String,
    pub solved: bool,
    pub pressure_drop: PressureDropReport,
    pub summary: SummaryReport,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PressureDropReport {
    pub pipe_and_fittings: f64,
    pub elevation_change: f64,
    pub control_valve_pressure_drop: f64,
    pub orifice_pressure_drop: f64,
    pub user_specified_fixed_loss: f64,
    pub total_segment_loss: f64,
    /// Pressure-drop unit per 100 length units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized_friction_loss: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reynolds_number: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frictional_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_scheme: Option<FlowScheme>,
    pub fitting_k: f64,
    pub pipe_length_k: f64,
    pub user_k: f64,
    pub piping_and_fitting_safety_factor: f64,
    pub total_k: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fitting_breakdown: Vec<FittingContribution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_valve_cv: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_valve_cg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orifice_discharge_coefficient: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orifice_expansibility: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateReport {
    pub pressure: Option<f64>,
    pub temperature: Option<f64>,
    pub density: Option<f64>,
    pub velocity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mach_number: Option<f64>,
    pub erosional_velocity: Option<f64>,
    /// ρ·v² in the pressure-drop unit.
    pub flow_momentum: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remarks: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub inlet: StateReport,
    pub outlet: StateReport,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowReport {
    pub mass_flow: f64,
    pub volumetric_actual: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volumetric_standard: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemReport {
    pub networks: BTreeMap<String, NetworkReport>,
    /// Units of `node_pressures` and `max_delta`.
    pub units: OutputUnits,
    pub node_pressures: BTreeMap<String, f64>,
    pub iterations: usize,
    pub converged: bool,
    pub max_delta: f64,
}
