//! Per-section result records.
//!
//! All values are plain `f64` in SI units (Pa, K, kg/m³, m/s). They are built
//! fresh on every solver run and converted for display by `pf-results`.

use crate::common::{LAMINAR_REYNOLDS_LIMIT, TURBULENT_REYNOLDS_LIMIT};
use crate::fitting::FittingType;
use serde::{Deserialize, Serialize};

/// Flow regime classification from the Reynolds number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowScheme {
    Laminar,
    Transition,
    Turbulent,
}

impl FlowScheme {
    pub fn from_reynolds(re: f64) -> Self {
        if re <= LAMINAR_REYNOLDS_LIMIT {
            FlowScheme::Laminar
        } else if re < TURBULENT_REYNOLDS_LIMIT {
            FlowScheme::Transition
        } else {
            FlowScheme::Turbulent
        }
    }
}

/// One line of the fitting K breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FittingContribution {
    #[serde(rename = "type")]
    pub kind: FittingType,
    pub count: u32,
    pub k_each: f64,
    pub k_total: f64,
}

/// Pressure-loss breakdown for one section (or the network aggregate).
///
/// Loss terms are positive in the flow direction; `elevation_change` is
/// positive uphill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PressureDropDetails {
    pub pipe_and_fittings: f64,
    pub elevation_change: f64,
    pub control_valve_pressure_drop: f64,
    pub orifice_pressure_drop: f64,
    pub user_specified_fixed_loss: f64,
    pub total_segment_loss: f64,
    /// Pa per 100 m of pipe.
    pub normalized_friction_loss: Option<f64>,
    pub reynolds_number: Option<f64>,
    /// Reported in the configured friction-factor convention.
    pub frictional_factor: Option<f64>,
    pub flow_scheme: Option<FlowScheme>,
    pub fitting_k: f64,
    pub pipe_length_k: f64,
    pub user_k: f64,
    pub piping_and_fitting_safety_factor: f64,
    pub total_k: f64,
    pub fitting_breakdown: Vec<FittingContribution>,
    pub control_valve_cv: Option<f64>,
    pub control_valve_cg: Option<f64>,
    pub orifice_discharge_coefficient: Option<f64>,
    pub orifice_expansibility: Option<f64>,
}

impl PressureDropDetails {
    /// Sum of the individual loss terms.
    pub fn loss_sum(&self) -> f64 {
        self.pipe_and_fittings
            + self.elevation_change
            + self.control_valve_pressure_drop
            + self.orifice_pressure_drop
            + self.user_specified_fixed_loss
    }

    /// Refresh `total_segment_loss` from the loss terms.
    pub fn recompute_total(&mut self) {
        self.total_segment_loss = self.loss_sum();
    }

    /// Device losses that do not scale with the pipe K total.
    pub fn device_losses(&self) -> f64 {
        self.control_valve_pressure_drop
            + self.orifice_pressure_drop
            + self.user_specified_fixed_loss
    }

    /// Accumulate another section's additive terms into an aggregate.
    pub fn accumulate(&mut self, other: &PressureDropDetails) {
        self.pipe_and_fittings += other.pipe_and_fittings;
        self.elevation_change += other.elevation_change;
        self.control_valve_pressure_drop += other.control_valve_pressure_drop;
        self.orifice_pressure_drop += other.orifice_pressure_drop;
        self.user_specified_fixed_loss += other.user_specified_fixed_loss;
        self.fitting_k += other.fitting_k;
        self.pipe_length_k += other.pipe_length_k;
        self.user_k += other.user_k;
        self.total_k += other.total_k;
        self.recompute_total();
    }
}

/// Fluid state at one end of a section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatePoint {
    pub pressure: Option<f64>,
    pub temperature: Option<f64>,
    pub density: Option<f64>,
    pub velocity: Option<f64>,
    pub mach_number: Option<f64>,
    pub erosional_velocity: Option<f64>,
    /// ρ·v², Pa.
    pub flow_momentum: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remarks: Vec<String>,
}

impl StatePoint {
    pub fn at_pressure(pressure: Option<f64>, temperature: f64) -> Self {
        Self {
            pressure,
            temperature: Some(temperature),
            ..Self::default()
        }
    }

    pub fn remark(&mut self, text: impl Into<String>) {
        let text = text.into();
        if !self.remarks.contains(&text) {
            self.remarks.push(text);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub inlet: StatePoint,
    pub outlet: StatePoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionResult {
    pub id: String,
    pub calculation: PressureDropDetails,
    pub summary: ResultSummary,
    /// False when a missing parameter forced the section to be skipped.
    pub solved: bool,
}

impl SectionResult {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            calculation: PressureDropDetails::default(),
            summary: ResultSummary::default(),
            solved: true,
        }
    }
}
