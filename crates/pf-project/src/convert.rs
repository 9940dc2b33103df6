//! Document → domain model.

use crate::quantity::{QuantityInput, optional_si};
use crate::schedule;
use crate::schema::{
    ControlValveDef, FluidDef, NetworkDef, OrificeDef, SectionDef, SharedNodeDef, SolverDef,
};
use crate::{ConfigResult, ConfigurationError};
use pf_components::{ControlValve, Fitting, FittingStyle, FittingType, Orifice, PipeSection};
use pf_core::units::{kg_per_kmol, kg_per_m3, k, kgps, m, m3ps, pa, pa_s};
use pf_fluids::{Fluid, Phase, Quantity, convert_from_si};
use pf_network::{Network, NetworkBuilder, OutputUnits, SharedNodeGroup};
use pf_solver::SolverConfig;

/// Per-document context threaded through section conversion.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    /// Sections without any diameter are left for the solver to fill.
    pub allow_missing_diameter: bool,
}

impl NetworkDef {
    /// Build and validate the network with default options.
    pub fn into_network(self) -> ConfigResult<Network> {
        self.into_network_with(ConvertOptions::default())
    }

    pub fn into_network_with(self, options: ConvertOptions) -> ConfigResult<Network> {
        let fluid = self.fluid.to_fluid()?;
        let mut builder = NetworkBuilder::new(self.name, fluid);
        for (idx, section) in self.sections.iter().enumerate() {
            builder.add_section(section.to_section(idx, options)?);
        }

        let network = builder.network_mut();
        network.description = self.description;
        network.direction = self.direction;
        network.gas_flow_model = self.gas_flow_model;
        network.friction_factor_type = self.friction_factor_type;
        network.boundary_pressure =
            optional_si(&self.boundary_pressure, Quantity::Pressure, "boundary_pressure")?.map(pa);
        network.upstream_pressure =
            optional_si(&self.upstream_pressure, Quantity::Pressure, "upstream_pressure")?.map(pa);
        network.downstream_pressure =
            optional_si(&self.downstream_pressure, Quantity::Pressure, "downstream_pressure")?
                .map(pa);
        if let Some(units) = self.output_units {
            check_output_units(&units)?;
            network.output_units = units;
        }

        Ok(builder.build()?)
    }
}

impl FluidDef {
    pub fn to_fluid(&self) -> ConfigResult<Fluid> {
        let temperature = self.temperature.to_si(Quantity::Temperature, "fluid.temperature")?;
        let pressure = self.pressure.to_si(Quantity::Pressure, "fluid.pressure")?;
        let viscosity = self.viscosity.to_si(Quantity::Viscosity, "fluid.viscosity")?;

        let mut fluid = match self.phase {
            Phase::Liquid => {
                let density = optional_si(&self.density, Quantity::Density, "fluid.density")?
                    .ok_or_else(|| missing("fluid.density"))?;
                Fluid::liquid(k(temperature), pa(pressure), kg_per_m3(density), pa_s(viscosity))
            }
            phase => {
                let mw = optional_si(
                    &self.molecular_weight,
                    Quantity::MolarMass,
                    "fluid.molecular_weight",
                )?
                .ok_or_else(|| missing("fluid.molecular_weight"))?;
                Fluid::gas(k(temperature), pa(pressure), kg_per_kmol(mw), pa_s(viscosity))
                    .with_phase(phase)
            }
        };

        fluid.name = self.name.clone();
        if let Some(z) = self.z_factor {
            fluid.z_factor = z;
        }
        if let Some(ratio) = self.specific_heat_ratio {
            fluid.specific_heat_ratio = ratio;
        }
        fluid.vapor_pressure =
            optional_si(&self.vapor_pressure, Quantity::Pressure, "fluid.vapor_pressure")?.map(pa);
        fluid.critical_pressure =
            optional_si(&self.critical_pressure, Quantity::Pressure, "fluid.critical_pressure")?
                .map(pa);
        fluid.mass_flow_rate =
            optional_si(&self.mass_flow_rate, Quantity::MassFlow, "fluid.mass_flow_rate")?
                .map(kgps);
        fluid.volumetric_flow_rate = optional_si(
            &self.volumetric_flow_rate,
            Quantity::VolumeFlow,
            "fluid.volumetric_flow_rate",
        )?
        .map(m3ps);
        fluid.standard_flow_rate = optional_si(
            &self.standard_flow_rate,
            Quantity::VolumeFlow,
            "fluid.standard_flow_rate",
        )?
        .map(m3ps);

        fluid.validate()?;
        Ok(fluid)
    }
}

impl SectionDef {
    /// `idx` is the position in the section list, used in error paths.
    pub fn to_section(&self, idx: usize, options: ConvertOptions) -> ConfigResult<PipeSection> {
        let field = |name: &str| format!("sections[{idx}].{name}");
        let length_of = |input: &Option<QuantityInput>, name: &str| {
            optional_si(input, Quantity::Length, &field(name))
        };

        let length = length_of(&self.length, "length")?.unwrap_or(0.0);
        let pipe_diameter = self.resolve_diameter(idx, options)?;
        let mut section = PipeSection::new(&self.id, m(length), m(pipe_diameter.unwrap_or(0.0)));
        section.pipe_diameter = pipe_diameter.map(m);
        section.description = self.description.clone();
        section.schedule = self.schedule.as_ref().map(ToString::to_string);
        section.nominal_size = self.nominal_size;
        if let Some(roughness) = length_of(&self.roughness, "roughness")? {
            section.roughness = m(roughness);
        }
        if let Some(dz) = length_of(&self.elevation_change, "elevation_change")? {
            section.elevation_change = m(dz);
        }
        section.inlet_diameter = length_of(&self.inlet_diameter, "inlet_diameter")?.map(m);
        section.outlet_diameter = length_of(&self.outlet_diameter, "outlet_diameter")?.map(m);

        if let Some(style) = &self.fitting_type {
            section.fitting_style = style.parse::<FittingStyle>()?;
        }
        for fitting in &self.fittings {
            let kind = fitting.kind.parse::<FittingType>()?;
            section.fittings.push(Fitting::new(kind, fitting.count));
        }
        section.user_k = self.user_k;
        if let Some(sf) = self.piping_and_fitting_safety_factor {
            section.safety_factor = sf;
        }
        section.user_specified_fixed_loss = optional_si(
            &self.user_specified_fixed_loss,
            Quantity::PressureDifference,
            &field("user_specified_fixed_loss"),
        )?
        .map(pa);
        section.boundary_pressure =
            optional_si(&self.boundary_pressure, Quantity::Pressure, &field("boundary_pressure"))?
                .map(pa);
        section.control_valve = self
            .control_valve
            .as_ref()
            .map(|v| v.to_valve(&self.id, &field("control_valve")))
            .transpose()?;
        section.orifice = self
            .orifice
            .as_ref()
            .map(|o| o.to_orifice(&self.id, &field("orifice")))
            .transpose()?;
        section.flow_direction_note = self.flow_direction.clone();
        if let Some(from) = &self.from {
            section.start_node = from.clone();
        }
        if let Some(to) = &self.to {
            section.end_node = to.clone();
        }
        if let Some(c) = self.erosional_constant {
            section.erosional_constant = c;
        }

        section.insert_swages();
        Ok(section)
    }

    /// Explicit `pipe_diameter`, else nominal size + schedule (STD when
    /// the schedule is omitted).
    fn resolve_diameter(&self, idx: usize, options: ConvertOptions) -> ConfigResult<Option<f64>> {
        let field = format!("sections[{idx}].pipe_diameter");
        if let Some(d) = optional_si(&self.pipe_diameter, Quantity::Length, &field)? {
            return Ok(Some(d));
        }
        if let Some(nps) = self.nominal_size {
            let schedule = self
                .schedule
                .clone()
                .unwrap_or_else(|| schedule::ScheduleInput::Text("STD".into()));
            return schedule::inside_diameter(nps, &schedule).map(Some);
        }

        let component_only = self.fittings.is_empty()
            && self.length.is_none()
            && (self.control_valve.is_some() || self.orifice.is_some());
        if component_only || options.allow_missing_diameter {
            Ok(None)
        } else {
            Err(ConfigurationError::MissingField {
                field: format!("sections[{idx}] ({}): pipe_diameter or nominal_size", self.id),
            })
        }
    }
}

impl ControlValveDef {
    fn to_valve(&self, section_id: &str, field: &str) -> ConfigResult<ControlValve> {
        let tag = self.tag.clone().unwrap_or_else(|| format!("{section_id}-CV"));
        let mut valve = ControlValve::with_pressure_drop(tag, pa(0.0));
        valve.pressure_drop = optional_si(
            &self.pressure_drop,
            Quantity::PressureDifference,
            &format!("{field}.pressure_drop"),
        )?
        .map(pa);
        valve.cv = self.cv;
        valve.cg = self.cg;
        valve.c1 = self.c1;
        if let Some(xt) = self.xt {
            valve.xt = xt;
        }
        if let Some(fl) = self.fl {
            valve.fl = fl;
        }
        valve.diameter =
            optional_si(&self.diameter, Quantity::Length, &format!("{field}.diameter"))?.map(m);
        Ok(valve)
    }
}

impl OrificeDef {
    fn to_orifice(&self, section_id: &str, field: &str) -> ConfigResult<Orifice> {
        let tag = self.tag.clone().unwrap_or_else(|| format!("{section_id}-FO"));
        let mut orifice = Orifice::with_pressure_drop(tag, pa(0.0));
        orifice.pressure_drop = optional_si(
            &self.pressure_drop,
            Quantity::PressureDifference,
            &format!("{field}.pressure_drop"),
        )?
        .map(pa);
        orifice.beta = self.beta;
        orifice.orifice_diameter = optional_si(
            &self.orifice_diameter,
            Quantity::Length,
            &format!("{field}.orifice_diameter"),
        )?
        .map(m);
        orifice.pipe_diameter = optional_si(
            &self.pipe_diameter,
            Quantity::Length,
            &format!("{field}.pipe_diameter"),
        )?
        .map(m);
        orifice.discharge_coefficient = self.discharge_coefficient;
        orifice.expansibility = self.expansibility;
        orifice.taps = self.taps;
        Ok(orifice)
    }
}

impl SharedNodeDef {
    pub fn to_group(&self) -> ConfigResult<SharedNodeGroup> {
        let bias = optional_si(
            &self.bias,
            Quantity::PressureDifference,
            &format!("shared_nodes.{}.bias", self.id),
        )?
        .unwrap_or(0.0);
        Ok(SharedNodeGroup::new(&self.id, self.members.clone()).with_bias(bias))
    }
}

impl SolverDef {
    /// Solver defaults with the block's overrides applied.
    pub fn to_config(&self) -> ConfigResult<SolverConfig> {
        let mut config = SolverConfig {
            friction_factor_override: self.friction_factor_override,
            default_pipe_diameter: optional_si(
                &self.default_pipe_diameter,
                Quantity::Length,
                "solver.default_pipe_diameter",
            )?,
            direction: self.direction,
            ..SolverConfig::default()
        };
        if let Some(passes) = self.isothermal_max_passes {
            config.isothermal.max_passes = passes;
        }
        if let Some(tol) = self.isothermal_tolerance {
            config.isothermal.tolerance = tol;
        }
        if let Some(passes) = self.backward_max_passes {
            config.backward_max_passes = passes;
        }
        if let Some(tol) = optional_si(
            &self.backward_tolerance,
            Quantity::PressureDifference,
            "solver.backward_tolerance",
        )? {
            config.backward_tolerance = tol;
        }
        Ok(config)
    }

    pub fn options(&self) -> ConvertOptions {
        ConvertOptions {
            allow_missing_diameter: self.default_pipe_diameter.is_some(),
        }
    }
}

/// Every display unit must resolve for its quantity.
pub fn check_output_units(units: &OutputUnits) -> ConfigResult<()> {
    let checks = [
        (&units.pressure, Quantity::Pressure, "output_units.pressure"),
        (&units.pressure_drop, Quantity::PressureDifference, "output_units.pressure_drop"),
        (&units.temperature, Quantity::Temperature, "output_units.temperature"),
        (&units.length, Quantity::Length, "output_units.length"),
        (&units.density, Quantity::Density, "output_units.density"),
        (&units.velocity, Quantity::Velocity, "output_units.velocity"),
        (&units.mass_flow, Quantity::MassFlow, "output_units.mass_flow"),
        (&units.volume_flow, Quantity::VolumeFlow, "output_units.volume_flow"),
    ];
    for (unit, quantity, field) in checks {
        convert_from_si(1.0, unit, quantity).map_err(|source| ConfigurationError::Unit {
            field: field.to_string(),
            source,
        })?;
    }
    Ok(())
}

fn missing(field: &str) -> ConfigurationError {
    ConfigurationError::MissingField {
        field: field.to_string(),
    }
}
