//! Network-level result records built by the solver.

use crate::network::{Direction, GasFlowModel};
use pf_components::{PressureDropDetails, ResultSummary, SectionResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resolved flow rates, SI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowSummary {
    /// kg/s
    pub mass_flow: f64,
    /// m³/s at the fluid's own state.
    pub volumetric_actual: f64,
    /// m³/s at 101 325 Pa / 288.15 K; gas and vapor only.
    pub volumetric_standard: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkResult {
    pub name: String,
    /// Direction actually used.
    pub direction: Direction,
    /// Present only for compressible fluids.
    pub gas_flow_model: Option<GasFlowModel>,
    pub sections: Vec<SectionResult>,
    pub aggregate: PressureDropDetails,
    pub summary: ResultSummary,
    pub flow: FlowSummary,
    pub warnings: Vec<String>,
}

impl NetworkResult {
    pub fn section(&self, id: &str) -> Option<&SectionResult> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Pressure at a node name, from whichever section end touches it.
    pub fn node_pressure(
        &self,
        node: &str,
        sections: &[pf_components::PipeSection],
    ) -> Option<f64> {
        sections
            .iter()
            .zip(&self.sections)
            .find_map(|(def, res)| {
                if def.start_node == node {
                    res.summary.inlet.pressure
                } else if def.end_node == node {
                    res.summary.outlet.pressure
                } else {
                    None
                }
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSystemResult {
    /// Bundle id → result of the final iteration.
    pub networks: BTreeMap<String, NetworkResult>,
    /// Canonical shared-node id → pressure, Pa.
    pub node_pressures: BTreeMap<String, f64>,
    pub iterations: usize,
    pub converged: bool,
    /// Largest canonical change in the last iteration, Pa.
    pub max_delta: f64,
}
