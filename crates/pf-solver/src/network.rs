//! Single-network solve: static losses, pressure propagation along the
//! section chain, end-state population and aggregation.

use crate::error::{SolverError, SolverResult};
use crate::gas_flow::{
    GasPipe, GasState, IsothermalConfig, March, solve_adiabatic, solve_isothermal,
};
use crate::state;
use pf_components::common::MIN_PRESSURE;
use pf_components::valve::ValveSizing;
use pf_components::{
    ComponentError, ControlValveCalculator, ElevationCalculator, FittingLossCalculator,
    FrictionCalculator, FrictionFactor, FrictionFactorType, LossCalculator, OrificeCalculator,
    PipeSection, PressureDropDetails, ResultSummary, SectionContext, SectionResult, StatePoint,
    UserFixedLossCalculator,
};
use pf_core::units::m;
use pf_fluids::Fluid;
use pf_network::{Direction, FlowSummary, GasFlowModel, Network, NetworkResult};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Pressures forced at named nodes, Pa.
pub type NodePressures = BTreeMap<String, f64>;

/// Network solver configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Replaces every computed friction factor; quoted in the network's
    /// friction-factor convention.
    pub friction_factor_override: Option<f64>,
    /// Bore for sections without a diameter, m.
    pub default_pipe_diameter: Option<f64>,
    pub isothermal: IsothermalConfig,
    /// Pass cap for the inlet-pressure fixed point when marching backward.
    pub backward_max_passes: usize,
    /// Inlet-pressure change accepted by that fixed point, Pa.
    pub backward_tolerance: f64,
    /// Replaces the network's configured direction.
    pub direction: Option<Direction>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            friction_factor_override: None,
            default_pipe_diameter: None,
            isothermal: IsothermalConfig::default(),
            backward_max_passes: 20,
            backward_tolerance: 1e-3,
            direction: None,
        }
    }
}

/// Pressure propagation along one network's section chain.
#[derive(Debug, Clone, Default)]
pub struct NetworkSolver {
    config: SolverConfig,
}

/// Pressures and temperatures at both ends of a propagated section.
#[derive(Debug, Clone, Copy)]
struct SectionEnds {
    inlet: f64,
    outlet: f64,
    inlet_temperature: f64,
    outlet_temperature: f64,
}

impl NetworkSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn run(&self, network: &Network) -> SolverResult<NetworkResult> {
        self.run_with_overrides(network, &NodePressures::new())
    }

    /// Solve with pressures pinned at named nodes (used by the system solver).
    pub fn run_with_overrides(
        &self,
        network: &Network,
        overrides: &NodePressures,
    ) -> SolverResult<NetworkResult> {
        network.validate()?;
        let mass_flow = network.fluid.mass_flow_kgps()?;
        let direction = self.resolve_direction_with(network, overrides);
        debug!(network = %network.name, %direction, mass_flow, "solving network");

        let sections: Vec<Cow<'_, PipeSection>> =
            network.sections.iter().map(|s| self.prepared(s)).collect();
        let mut run = NetworkRun {
            network,
            config: &self.config,
            mass_flow,
            direction,
            sections,
            results: network
                .sections
                .iter()
                .map(|s| SectionResult::new(s.id.clone()))
                .collect(),
            warnings: Vec::new(),
        };

        run.static_losses()?;
        run.propagate(overrides)?;
        run.populate_states();
        run.finish()
    }

    /// Override, then the configured direction, then whichever boundary
    /// pressure is present, then forward.
    pub fn resolve_direction(&self, network: &Network) -> Direction {
        match self.config.direction.unwrap_or(network.direction) {
            Direction::Auto => {
                if network.upstream_pressure.is_some() {
                    Direction::Forward
                } else if network.downstream_pressure.is_some() {
                    Direction::Backward
                } else {
                    Direction::Forward
                }
            }
            explicit => explicit,
        }
    }

    /// Like [`Self::resolve_direction`], but a pin on exactly one end of the
    /// chain decides first: the march always starts from the pinned end.
    pub fn resolve_direction_with(
        &self,
        network: &Network,
        overrides: &NodePressures,
    ) -> Direction {
        let pinned = |node: Option<&str>| node.is_some_and(|n| overrides.contains_key(n));
        match (pinned(network.inlet_node()), pinned(network.outlet_node())) {
            (true, false) => Direction::Forward,
            (false, true) => Direction::Backward,
            _ => self.resolve_direction(network),
        }
    }

    fn prepared<'a>(&self, section: &'a PipeSection) -> Cow<'a, PipeSection> {
        match (section.pipe_diameter, self.config.default_pipe_diameter) {
            (None, Some(d)) => {
                let mut owned = section.clone();
                owned.pipe_diameter = Some(m(d));
                owned.insert_swages();
                Cow::Owned(owned)
            }
            _ => Cow::Borrowed(section),
        }
    }
}

/// Working state of one solve.
struct NetworkRun<'a> {
    network: &'a Network,
    config: &'a SolverConfig,
    mass_flow: f64,
    direction: Direction,
    sections: Vec<Cow<'a, PipeSection>>,
    results: Vec<SectionResult>,
    warnings: Vec<String>,
}

impl<'a> NetworkRun<'a> {
    fn fluid(&self) -> &'a Fluid {
        &self.network.fluid
    }

    fn static_losses(&mut self) -> SolverResult<()> {
        let friction = FrictionCalculator::new(self.network.friction_factor_type)
            .with_override(self.config.friction_factor_override);
        let pipe_calculators: [&dyn LossCalculator; 2] = [&FittingLossCalculator, &friction];
        let common_calculators: [&dyn LossCalculator; 2] =
            [&ElevationCalculator, &UserFixedLossCalculator];

        for i in 0..self.sections.len() {
            let section: &PipeSection = &self.sections[i];
            let outcome = static_section_losses(
                section,
                self.fluid(),
                self.mass_flow,
                &pipe_calculators,
                &common_calculators,
                &mut self.results[i].calculation,
            );
            match outcome {
                Ok(()) => {
                    debug!(
                        section = %section.id,
                        total_k = self.results[i].calculation.total_k,
                        "static losses"
                    );
                }
                Err(e) if e.is_missing_parameter() => {
                    skip(&mut self.results[i], &mut self.warnings, &e.to_string());
                }
                Err(e) => return Err(SolverError::section(&section.id, e)),
            }
        }
        Ok(())
    }

    fn propagate(&mut self, overrides: &NodePressures) -> SolverResult<()> {
        let forward = self.direction != Direction::Backward;
        let order: Vec<usize> = if forward {
            (0..self.sections.len()).collect()
        } else {
            (0..self.sections.len()).rev().collect()
        };

        let mut running = self.boundary_pressure(forward);
        let mut temperature = self.fluid().temperature.value;

        for i in order {
            if !self.results[i].solved {
                running = None;
                continue;
            }
            let section = Cow::clone(&self.sections[i]);

            let solved = match self.fixed_ends(&section, overrides) {
                Some((p_in, p_out)) if section.is_component_only() => {
                    self.bridge(&section, p_in, p_out, temperature, i)
                }
                _ => self.march_section(&section, overrides, running, temperature, forward, i),
            };

            match solved {
                Ok(ends) => {
                    let summary = &mut self.results[i].summary;
                    summary.inlet.pressure = Some(ends.inlet);
                    summary.inlet.temperature = Some(ends.inlet_temperature);
                    summary.outlet.pressure = Some(ends.outlet);
                    summary.outlet.temperature = Some(ends.outlet_temperature);
                    if forward {
                        running = Some(ends.outlet);
                        temperature = ends.outlet_temperature;
                    } else {
                        running = Some(ends.inlet);
                        temperature = ends.inlet_temperature;
                    }
                    debug!(
                        section = %section.id,
                        inlet = ends.inlet,
                        outlet = ends.outlet,
                        "propagated"
                    );
                }
                Err(e) if e.is_missing_parameter() => {
                    let reason = match &e {
                        SolverError::Section { source, .. } => source.to_string(),
                        other => other.to_string(),
                    };
                    skip(&mut self.results[i], &mut self.warnings, &reason);
                    running = None;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Starting pressure for the march: the boundary on the known side,
    /// then the network boundary, then the fluid's own pressure.
    fn boundary_pressure(&self, forward: bool) -> Option<f64> {
        let side = if forward {
            self.network.upstream_pressure
        } else {
            self.network.downstream_pressure
        };
        side.or(self.network.boundary_pressure)
            .map(|p| p.value)
            .or(Some(self.fluid().pressure.value))
    }

    /// Pressure held fixed at a node by an override or a network boundary.
    fn fixed_pressure(&self, node: &str, overrides: &NodePressures) -> Option<f64> {
        if let Some(p) = overrides.get(node) {
            return Some(*p);
        }
        if self.network.inlet_node() == Some(node) {
            if let Some(p) = self.network.upstream_pressure {
                return Some(p.value);
            }
        }
        if self.network.outlet_node() == Some(node) {
            if let Some(p) = self.network.downstream_pressure {
                return Some(p.value);
            }
        }
        None
    }

    fn fixed_ends(&self, section: &PipeSection, overrides: &NodePressures) -> Option<(f64, f64)> {
        Some((
            self.fixed_pressure(&section.start_node, overrides)?,
            self.fixed_pressure(&section.end_node, overrides)?,
        ))
    }

    /// A valve or orifice between two fixed pressures takes the whole
    /// difference; a valve then gets the Cv that passes the flow.
    fn bridge(
        &mut self,
        section: &PipeSection,
        p_in: f64,
        p_out: f64,
        temperature: f64,
        i: usize,
    ) -> SolverResult<SectionEnds> {
        let fluid = self.fluid();
        let details = &mut self.results[i].calculation;
        let other = details.pipe_and_fittings
            + details.elevation_change
            + details.user_specified_fixed_loss;
        let device_drop = p_in - p_out - other;
        if device_drop < 0.0 {
            return Err(SolverError::section(
                &section.id,
                ComponentError::Calculation {
                    what: format!(
                        "fixed end pressures {p_in:.1} Pa and {p_out:.1} Pa leave no drop for the device"
                    ),
                },
            ));
        }

        if let Some(valve) = &section.control_valve {
            let mut ctx = context(section, fluid, self.mass_flow)?.with_inlet_pressure(p_in);
            ctx.temperature = temperature;
            let sizing = ValveSizing::from_context(valve, &ctx)
                .map_err(|e| SolverError::section(&section.id, e))?;
            let cv = sizing
                .cv(device_drop)
                .map_err(|e| SolverError::section(&section.id, e))?;
            details.control_valve_pressure_drop = device_drop;
            details.control_valve_cv = Some(cv);
            details.control_valve_cg = valve.c1.map(|c1| cv * c1);
        } else {
            details.orifice_pressure_drop = device_drop;
        }
        details.recompute_total();
        debug!(section = %section.id, device_drop, "component bridge between fixed pressures");

        Ok(SectionEnds {
            inlet: p_in,
            outlet: p_out,
            inlet_temperature: temperature,
            outlet_temperature: temperature,
        })
    }

    /// March one section from its known end.
    fn march_section(
        &mut self,
        section: &PipeSection,
        overrides: &NodePressures,
        running: Option<f64>,
        temperature: f64,
        forward: bool,
        i: usize,
    ) -> SolverResult<SectionEnds> {
        let entry = if forward {
            &section.start_node
        } else {
            &section.end_node
        };
        let start = overrides
            .get(entry)
            .copied()
            .or(section.boundary_pressure.map(|p| p.value))
            .or(running);
        let Some(start) = start else {
            return Err(SolverError::section(
                &section.id,
                ComponentError::MissingParameter {
                    what: "section start pressure",
                },
            ));
        };

        let march = SectionMarch {
            section,
            fluid: self.fluid(),
            config: self.config,
            mass_flow: self.mass_flow,
            gas_flow_model: self.network.gas_flow_model,
            convention: self.network.friction_factor_type,
        };
        let compressible = march.fluid.is_compressible();
        let result = &mut self.results[i];
        match (compressible, forward) {
            (false, true) => march.liquid_forward(start, temperature, &mut result.calculation),
            (false, false) => march.liquid_backward(
                start,
                temperature,
                &mut result.calculation,
                &mut result.summary,
            ),
            (true, true) => march.gas_forward(
                start,
                temperature,
                &mut result.calculation,
                &mut result.summary,
            ),
            (true, false) => march.gas_backward(
                start,
                temperature,
                &mut result.calculation,
                &mut result.summary,
            ),
        }
    }

    fn populate_states(&mut self) {
        let fluid = self.fluid();
        for (section, result) in self.sections.iter().zip(self.results.iter_mut()) {
            if !result.solved {
                continue;
            }
            let ResultSummary { inlet, outlet } = &mut result.summary;
            state::populate_section(inlet, outlet, section, fluid, self.mass_flow);
        }
    }

    fn finish(self) -> SolverResult<NetworkResult> {
        let fluid = self.fluid();
        let mut aggregate = PressureDropDetails::default();
        for result in self.results.iter().filter(|r| r.solved) {
            aggregate.accumulate(&result.calculation);
        }

        let summary = ResultSummary {
            inlet: self
                .results
                .first()
                .map(|r| r.summary.inlet.clone())
                .unwrap_or_default(),
            outlet: self
                .results
                .last()
                .map(|r| r.summary.outlet.clone())
                .unwrap_or_default(),
        };
        let compressible = fluid.is_compressible();
        let flow = FlowSummary {
            mass_flow: self.mass_flow,
            volumetric_actual: self.mass_flow / fluid.density()?,
            volumetric_standard: if compressible {
                Some(self.mass_flow / fluid.standard_density()?)
            } else {
                None
            },
        };

        Ok(NetworkResult {
            name: self.network.name.clone(),
            direction: self.direction,
            gas_flow_model: compressible.then_some(self.network.gas_flow_model),
            sections: self.results,
            aggregate,
            summary,
            flow,
            warnings: self.warnings,
        })
    }
}

/// Section-local inputs for the pressure-dependent part of a solve.
struct SectionMarch<'a> {
    section: &'a PipeSection,
    fluid: &'a Fluid,
    config: &'a SolverConfig,
    mass_flow: f64,
    gas_flow_model: GasFlowModel,
    /// Convention the reported friction factor is quoted in.
    convention: FrictionFactorType,
}

impl SectionMarch<'_> {
    fn err(&self, source: ComponentError) -> SolverError {
        SolverError::section(&self.section.id, source)
    }

    /// Valve and orifice losses at an inlet pressure.
    fn device_losses(
        &self,
        inlet: f64,
        temperature: f64,
        details: &mut PressureDropDetails,
    ) -> SolverResult<()> {
        let mut ctx = context(self.section, self.fluid, self.mass_flow)?.with_inlet_pressure(inlet);
        ctx.temperature = temperature;
        let devices: [&dyn LossCalculator; 2] = [&ControlValveCalculator, &OrificeCalculator];
        for calculator in devices {
            if calculator.applies(self.section) {
                calculator
                    .calculate(&ctx, details)
                    .map_err(|e| self.err(e))?;
            }
        }
        Ok(())
    }

    /// Device losses at the inlet estimate until the inlet settles.
    /// `downstream` is the known pressure after the devices.
    fn settle_inlet(
        &self,
        downstream: f64,
        temperature: f64,
        extra: impl Fn(&PressureDropDetails) -> f64,
        details: &mut PressureDropDetails,
        summary: &mut ResultSummary,
    ) -> SolverResult<f64> {
        let mut inlet = downstream + extra(details);
        for _ in 0..self.config.backward_max_passes {
            self.device_losses(inlet, temperature, details)?;
            let next = downstream + extra(details);
            let change = (next - inlet).abs();
            inlet = next;
            if change <= self.config.backward_tolerance {
                return Ok(inlet);
            }
        }
        warn!(
            section = %self.section.id,
            passes = self.config.backward_max_passes,
            "backward inlet pressure did not settle"
        );
        summary.inlet.remark(format!(
            "inlet pressure did not settle within {} passes",
            self.config.backward_max_passes
        ));
        Ok(inlet)
    }

    fn liquid_forward(
        &self,
        inlet: f64,
        temperature: f64,
        details: &mut PressureDropDetails,
    ) -> SolverResult<SectionEnds> {
        self.device_losses(inlet, temperature, details)?;
        Ok(SectionEnds {
            inlet,
            outlet: inlet - details.total_segment_loss,
            inlet_temperature: temperature,
            outlet_temperature: temperature,
        })
    }

    fn liquid_backward(
        &self,
        outlet: f64,
        temperature: f64,
        details: &mut PressureDropDetails,
        summary: &mut ResultSummary,
    ) -> SolverResult<SectionEnds> {
        let inlet = self.settle_inlet(
            outlet,
            temperature,
            |d| d.total_segment_loss,
            details,
            summary,
        )?;
        Ok(SectionEnds {
            inlet,
            outlet,
            inlet_temperature: temperature,
            outlet_temperature: temperature,
        })
    }

    fn gas_forward(
        &self,
        inlet: f64,
        temperature: f64,
        details: &mut PressureDropDetails,
        summary: &mut ResultSummary,
    ) -> SolverResult<SectionEnds> {
        self.device_losses(inlet, temperature, details)?;
        let after_devices = inlet - details.device_losses();
        if after_devices < MIN_PRESSURE {
            return Err(self.err(ComponentError::Calculation {
                what: format!(
                    "device losses {:.1} Pa exceed inlet pressure {inlet:.1} Pa",
                    details.device_losses()
                ),
            }));
        }
        let (outlet, outlet_temperature) = self.gas_pipe_run(
            GasState {
                pressure: after_devices,
                temperature,
            },
            March::Forward,
            details,
            summary,
        )?;
        self.settle_pipe_loss(inlet, outlet, details);
        Ok(SectionEnds {
            inlet,
            outlet,
            inlet_temperature: temperature,
            outlet_temperature,
        })
    }

    fn gas_backward(
        &self,
        outlet: f64,
        temperature: f64,
        details: &mut PressureDropDetails,
        summary: &mut ResultSummary,
    ) -> SolverResult<SectionEnds> {
        let (before_pipe, inlet_temperature) = self.gas_pipe_run(
            GasState {
                pressure: outlet,
                temperature,
            },
            March::Backward,
            details,
            summary,
        )?;
        let inlet = self.settle_inlet(
            before_pipe,
            inlet_temperature,
            PressureDropDetails::device_losses,
            details,
            summary,
        )?;
        self.settle_pipe_loss(inlet, outlet, details);
        Ok(SectionEnds {
            inlet,
            outlet,
            inlet_temperature,
            outlet_temperature: temperature,
        })
    }

    /// Compressible pipe run from a known end. Sections without length keep
    /// the incompressible pipe-and-fittings loss from the static phase.
    fn gas_pipe_run(
        &self,
        known: GasState,
        march: March,
        details: &PressureDropDetails,
        summary: &mut ResultSummary,
    ) -> SolverResult<(f64, f64)> {
        if self.section.length.value <= 0.0 {
            let pf = details.pipe_and_fittings;
            let pressure = match march {
                March::Forward => known.pressure - pf,
                March::Backward => known.pressure + pf,
            };
            return Ok((pressure, known.temperature));
        }

        let pipe = self.gas_pipe(details)?;
        let outcome = match self.gas_flow_model {
            GasFlowModel::Isothermal => {
                solve_isothermal(&pipe, known, march, self.config.isothermal)
            }
            GasFlowModel::Adiabatic => solve_adiabatic(&pipe, known, march),
        }
        .map_err(|e| SolverError::gas_flow(&self.section.id, e))?;

        if outcome.choked {
            warn!(section = %self.section.id, "gas flow choked");
        }
        for remark in &outcome.remarks {
            summary.outlet.remark(remark.clone());
        }
        Ok((outcome.pressure, outcome.temperature))
    }

    fn gas_pipe(&self, details: &PressureDropDetails) -> SolverResult<GasPipe> {
        let diameter = self.section.diameter_m().map_err(|e| self.err(e))?;
        let molar_mass = self
            .fluid
            .molecular_weight_kg_per_kmol()
            .map_err(|e| self.err(e.into()))?;
        Ok(GasPipe {
            length: self.section.length.value,
            diameter,
            friction_factor: details
                .frictional_factor
                .map(|f| FrictionFactor::new(self.convention, f)),
            k_minor: (details.total_k - details.pipe_length_k).max(0.0),
            mass_flow: self.mass_flow,
            molar_mass,
            z_factor: self.fluid.z_factor,
            k: self.fluid.specific_heat_ratio,
            viscosity: self.fluid.viscosity.value,
            roughness: self.section.roughness.value,
        })
    }

    /// Attribute the part of the end-to-end drop not taken by other terms
    /// to pipe and fittings.
    fn settle_pipe_loss(&self, inlet: f64, outlet: f64, details: &mut PressureDropDetails) {
        let other = details.device_losses() + details.elevation_change;
        details.pipe_and_fittings = ((inlet - outlet).abs() - other).max(0.0);
        let length = self.section.length.value;
        if length > 0.0 {
            details.normalized_friction_loss = Some(details.pipe_and_fittings / length * 100.0);
        }
        details.recompute_total();
    }
}

fn context<'a>(
    section: &'a PipeSection,
    fluid: &'a Fluid,
    mass_flow: f64,
) -> SolverResult<SectionContext<'a>> {
    SectionContext::new(section, fluid, mass_flow).map_err(|e| SolverError::section(&section.id, e))
}

fn static_section_losses(
    section: &PipeSection,
    fluid: &Fluid,
    mass_flow: f64,
    pipe_calculators: &[&dyn LossCalculator],
    common_calculators: &[&dyn LossCalculator],
    details: &mut PressureDropDetails,
) -> Result<(), ComponentError> {
    let ctx = SectionContext::new(section, fluid, mass_flow)?;
    if !section.is_component_only() {
        for calculator in pipe_calculators {
            calculator.calculate(&ctx, details)?;
        }
    }
    for calculator in common_calculators {
        if calculator.applies(section) {
            calculator.calculate(&ctx, details)?;
        }
    }
    Ok(())
}

fn skip(result: &mut SectionResult, warnings: &mut Vec<String>, reason: &str) {
    warn!(section = %result.id, %reason, "section skipped");
    result.solved = false;
    result.summary = ResultSummary {
        inlet: StatePoint::default(),
        outlet: StatePoint::default(),
    };
    result.summary.inlet.remark(format!("skipped: {reason}"));
    warnings.push(format!("section '{}' skipped: {reason}", result.id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_components::FittingType;
    use pf_core::units::{k, kg_per_m3, kgps, pa, pa_s};

    fn water() -> Fluid {
        Fluid::liquid(k(293.15), pa(5e5), kg_per_m3(998.0), pa_s(1e-3)).with_mass_flow(kgps(10.0))
    }

    fn network_with(direction: Direction) -> Network {
        let mut net = Network::new("n", water()).with_direction(direction);
        net.sections
            .push(PipeSection::new("a", m(10.0), m(0.1)).with_nodes("n0", "n1"));
        net
    }

    #[test]
    fn direction_follows_boundaries_when_auto() {
        let solver = NetworkSolver::default();
        let net = network_with(Direction::Auto);
        assert_eq!(solver.resolve_direction(&net), Direction::Forward);

        let net = net.with_downstream_pressure(pa(2e5));
        assert_eq!(solver.resolve_direction(&net), Direction::Backward);

        let net = net.with_upstream_pressure(pa(6e5));
        assert_eq!(solver.resolve_direction(&net), Direction::Forward);
    }

    #[test]
    fn override_beats_configured_direction() {
        let solver = NetworkSolver::new(SolverConfig {
            direction: Some(Direction::Backward),
            ..Default::default()
        });
        let net = network_with(Direction::Forward);
        assert_eq!(solver.resolve_direction(&net), Direction::Backward);
    }

    #[test]
    fn default_diameter_fills_missing_bore() {
        let mut net = network_with(Direction::Forward);
        net.sections[0].pipe_diameter = None;

        let bare = NetworkSolver::default().run(&net).unwrap();
        assert!(!bare.sections[0].solved);
        assert_eq!(bare.warnings.len(), 1);

        let solver = NetworkSolver::new(SolverConfig {
            default_pipe_diameter: Some(0.1),
            ..Default::default()
        });
        let filled = solver.run(&net).unwrap();
        assert!(filled.sections[0].solved);
        assert!(filled.warnings.is_empty());
    }

    #[test]
    fn pinned_chain_end_decides_direction() {
        let solver = NetworkSolver::default();
        let net = network_with(Direction::Forward).with_upstream_pressure(pa(6e5));

        let mut pins = NodePressures::new();
        pins.insert("n1".into(), 4e5);
        assert_eq!(solver.resolve_direction_with(&net, &pins), Direction::Backward);

        pins.insert("n0".into(), 6e5);
        assert_eq!(solver.resolve_direction_with(&net, &pins), Direction::Forward);

        pins.remove("n1");
        assert_eq!(solver.resolve_direction_with(&net, &pins), Direction::Forward);
        assert_eq!(
            solver.resolve_direction_with(&net, &NodePressures::new()),
            Direction::Forward
        );
    }

    #[test]
    fn outlet_pin_is_honoured_on_a_forward_network() {
        let net = network_with(Direction::Forward).with_upstream_pressure(pa(6e5));
        let mut pins = NodePressures::new();
        pins.insert("n1".into(), 4e5);

        let result = NetworkSolver::default().run_with_overrides(&net, &pins).unwrap();
        assert_eq!(result.direction, Direction::Backward);
        assert_eq!(result.summary.outlet.pressure, Some(4e5));
        assert!(result.summary.inlet.pressure.unwrap() > 4e5);
    }

    #[test]
    fn default_diameter_still_gets_swages() {
        let mut net = network_with(Direction::Forward);
        net.sections[0].pipe_diameter = None;
        net.sections[0].inlet_diameter = Some(m(0.15));
        net.sections[0].outlet_diameter = Some(m(0.08));

        let solver = NetworkSolver::new(SolverConfig {
            default_pipe_diameter: Some(0.1),
            ..Default::default()
        });
        let result = solver.run(&net).unwrap();
        let kinds: Vec<FittingType> = result.sections[0]
            .calculation
            .fitting_breakdown
            .iter()
            .map(|c| c.kind)
            .collect();
        assert!(kinds.contains(&FittingType::InletSwage));
        assert!(kinds.contains(&FittingType::OutletSwage));
        assert!(result.sections[0].calculation.fitting_k > 0.0);
    }

    #[test]
    fn liquid_outlet_is_inlet_minus_total() {
        let net = network_with(Direction::Forward).with_upstream_pressure(pa(5e5));
        let result = NetworkSolver::default().run(&net).unwrap();
        let s = &result.sections[0];
        let inlet = s.summary.inlet.pressure.unwrap();
        let outlet = s.summary.outlet.pressure.unwrap();
        assert_eq!(inlet, 5e5);
        assert!((inlet - outlet - s.calculation.total_segment_loss).abs() < 1e-9);
    }
}
