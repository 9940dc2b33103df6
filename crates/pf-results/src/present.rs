//! SI result records → display-unit reports.

use crate::types::{
    FlowReport, NetworkReport, PressureDropReport, SectionReport, StateReport, SummaryReport,
    SystemReport,
};
use crate::{ResultsError, ResultsResult};
use pf_components::{PressureDropDetails, ResultSummary, StatePoint};
use pf_fluids::{Quantity, convert_from_si, to_si};
use pf_network::{FlowSummary, NetworkResult, NetworkSystem, NetworkSystemResult, OutputUnits};
use std::collections::BTreeMap;

/// Converts SI values into one set of output units.
struct Converter<'a> {
    units: &'a OutputUnits,
}

impl<'a> Converter<'a> {
    fn new(units: &'a OutputUnits) -> Self {
        Self { units }
    }

    fn convert(
        &self,
        value: f64,
        unit: &str,
        quantity: Quantity,
        field: &'static str,
    ) -> ResultsResult<f64> {
        convert_from_si(value, unit, quantity)
            .map_err(|source| ResultsError::Unit { field, source })
    }

    fn optional(
        &self,
        value: Option<f64>,
        unit: &str,
        quantity: Quantity,
        field: &'static str,
    ) -> ResultsResult<Option<f64>> {
        value.map(|v| self.convert(v, unit, quantity, field)).transpose()
    }

    fn pressure(&self, value: Option<f64>) -> ResultsResult<Option<f64>> {
        self.optional(value, &self.units.pressure, Quantity::Pressure, "pressure")
    }

    fn pressure_drop(&self, value: f64) -> ResultsResult<f64> {
        self.convert(
            value,
            &self.units.pressure_drop,
            Quantity::PressureDifference,
            "pressure_drop",
        )
    }

    /// Pa per 100 m → pressure-drop unit per 100 length units.
    fn normalized_loss(&self, value: Option<f64>) -> ResultsResult<Option<f64>> {
        let Some(per_100_m) = value else {
            return Ok(None);
        };
        let metres_per_unit = to_si(1.0, &self.units.length, Quantity::Length)
            .map_err(|source| ResultsError::Unit { field: "length", source })?;
        self.pressure_drop(per_100_m * metres_per_unit).map(Some)
    }

    fn details(&self, d: &PressureDropDetails) -> ResultsResult<PressureDropReport> {
        Ok(PressureDropReport {
            pipe_and_fittings: self.pressure_drop(d.pipe_and_fittings)?,
            elevation_change: self.pressure_drop(d.elevation_change)?,
            control_valve_pressure_drop: self.pressure_drop(d.control_valve_pressure_drop)?,
            orifice_pressure_drop: self.pressure_drop(d.orifice_pressure_drop)?,
            user_specified_fixed_loss: self.pressure_drop(d.user_specified_fixed_loss)?,
            total_segment_loss: self.pressure_drop(d.total_segment_loss)?,
            normalized_friction_loss: self.normalized_loss(d.normalized_friction_loss)?,
            reynolds_number: d.reynolds_number,
            frictional_factor: d.frictional_factor,
            flow_scheme: d.flow_scheme,
            fitting_k: d.fitting_k,
            pipe_length_k: d.pipe_length_k,
            user_k: d.user_k,
            piping_and_fitting_safety_factor: d.piping_and_fitting_safety_factor,
            total_k: d.total_k,
            fitting_breakdown: d.fitting_breakdown.clone(),
            control_valve_cv: d.control_valve_cv,
            control_valve_cg: d.control_valve_cg,
            orifice_discharge_coefficient: d.orifice_discharge_coefficient,
            orifice_expansibility: d.orifice_expansibility,
        })
    }

    fn state(&self, p: &StatePoint) -> ResultsResult<StateReport> {
        let u = self.units;
        Ok(StateReport {
            pressure: self.pressure(p.pressure)?,
            temperature: self.optional(
                p.temperature,
                &u.temperature,
                Quantity::Temperature,
                "temperature",
            )?,
            density: self.optional(p.density, &u.density, Quantity::Density, "density")?,
            velocity: self.optional(p.velocity, &u.velocity, Quantity::Velocity, "velocity")?,
            mach_number: p.mach_number,
            erosional_velocity: self.optional(
                p.erosional_velocity,
                &u.velocity,
                Quantity::Velocity,
                "velocity",
            )?,
            flow_momentum: p.flow_momentum.map(|m| self.pressure_drop(m)).transpose()?,
            remarks: p.remarks.clone(),
        })
    }

    fn summary(&self, s: &ResultSummary) -> ResultsResult<SummaryReport> {
        Ok(SummaryReport {
            inlet: self.state(&s.inlet)?,
            outlet: self.state(&s.outlet)?,
        })
    }

    fn flow(&self, f: &FlowSummary) -> ResultsResult<FlowReport> {
        let u = self.units;
        Ok(FlowReport {
            mass_flow: self.convert(f.mass_flow, &u.mass_flow, Quantity::MassFlow, "mass_flow")?,
            volumetric_actual: self.convert(
                f.volumetric_actual,
                &u.volume_flow,
                Quantity::VolumeFlow,
                "volume_flow",
            )?,
            volumetric_standard: self.optional(
                f.volumetric_standard,
                &u.volume_flow,
                Quantity::VolumeFlow,
                "volume_flow",
            )?,
        })
    }
}

/// Convert one network result into `units`.
pub fn present_network(
    result: &NetworkResult,
    units: &OutputUnits,
) -> ResultsResult<NetworkReport> {
    let conv = Converter::new(units);
    let sections = result
        .sections
        .iter()
        .map(|s| {
            Ok(SectionReport {
                id: s.id.clone(),
                solved: s.solved,
                pressure_drop: conv.details(&s.calculation)?,
                summary: conv.summary(&s.summary)?,
            })
        })
        .collect::<ResultsResult<Vec<_>>>()?;

    Ok(NetworkReport {
        name: result.name.clone(),
        direction: result.direction,
        gas_flow_model: result.gas_flow_model,
        units: units.clone(),
        sections,
        pressure_drop: conv.details(&result.aggregate)?,
        summary: conv.summary(&result.summary)?,
        flow: conv.flow(&result.flow)?,
        warnings: result.warnings.clone(),
    })
}

/// Convert a system result. Each network uses its own output units; shared
/// node pressures use those of the first bundle.
pub fn present_system(
    result: &NetworkSystemResult,
    system: &NetworkSystem,
) -> ResultsResult<SystemReport> {
    let default_units = OutputUnits::default();
    let units_of = |id: &str| {
        system
            .bundle(id)
            .map(|b| &b.network.output_units)
            .unwrap_or(&default_units)
    };

    let networks: BTreeMap<String, NetworkReport> = result
        .networks
        .iter()
        .map(|(id, r)| Ok((id.clone(), present_network(r, units_of(id))?)))
        .collect::<ResultsResult<_>>()?;

    let units = system
        .bundles
        .first()
        .map(|b| b.network.output_units.clone())
        .unwrap_or_default();
    let conv = Converter::new(&units);
    let node_pressures: BTreeMap<String, f64> = result
        .node_pressures
        .iter()
        .map(|(id, p)| {
            let value = conv.convert(*p, &units.pressure, Quantity::Pressure, "pressure")?;
            Ok((id.clone(), value))
        })
        .collect::<ResultsResult<_>>()?;

    Ok(SystemReport {
        networks,
        node_pressures,
        iterations: result.iterations,
        converged: result.converged,
        max_delta: conv.pressure_drop(result.max_delta)?,
        units,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn units(pressure: &str, pressure_drop: &str, length: &str) -> OutputUnits {
        OutputUnits {
            pressure: pressure.into(),
            pressure_drop: pressure_drop.into(),
            length: length.into(),
            temperature: "degC".into(),
            ..OutputUnits::default()
        }
    }

    #[test]
    fn state_uses_affine_conversions() {
        let u = units("barg", "kPa", "m");
        let conv = Converter::new(&u);
        let point = StatePoint {
            pressure: Some(201_325.0),
            temperature: Some(293.15),
            flow_momentum: Some(4_000.0),
            ..StatePoint::default()
        };
        let report = conv.state(&point).unwrap();
        assert_relative_eq!(report.pressure.unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(report.temperature.unwrap(), 20.0, epsilon = 1e-9);
        assert_relative_eq!(report.flow_momentum.unwrap(), 4.0);
        assert!(report.velocity.is_none());
    }

    #[test]
    fn normalized_loss_follows_length_unit() {
        let u = units("Pa", "Pa", "ft");
        let conv = Converter::new(&u);
        // 1000 Pa/100 m is 304.8 Pa/100 ft
        let v = conv.normalized_loss(Some(1_000.0)).unwrap().unwrap();
        assert_relative_eq!(v, 304.8, epsilon = 1e-9);
    }

    #[test]
    fn unknown_unit_is_an_error() {
        let u = units("furlong", "Pa", "m");
        let conv = Converter::new(&u);
        assert!(conv.pressure(Some(1.0)).is_err());
        assert!(conv.pressure(None).unwrap().is_none());
    }
}
