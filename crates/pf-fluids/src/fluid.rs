//! Fluid carried by a network.

use crate::error::{FluidError, FluidResult};
use pf_core::units::constants::{R_UNIVERSAL, STANDARD_PRESSURE_PA, STANDARD_TEMPERATURE_K};
use pf_core::units::{
    Density, DynVisc, MassRate, MolarMass, Pressure, Temperature, VolumeRate,
    molar_mass_kg_per_kmol,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Thermodynamic phase of the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Liquid,
    Gas,
    Vapor,
}

impl Phase {
    /// Gas and vapor are treated with the compressible models.
    pub fn is_compressible(self) -> bool {
        matches!(self, Phase::Gas | Phase::Vapor)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Liquid => write!(f, "liquid"),
            Phase::Gas => write!(f, "gas"),
            Phase::Vapor => write!(f, "vapor"),
        }
    }
}

impl FromStr for Phase {
    type Err = FluidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "liquid" => Ok(Phase::Liquid),
            "gas" => Ok(Phase::Gas),
            "vapor" | "vapour" | "steam" => Ok(Phase::Vapor),
            other => Err(FluidError::UnknownPhase {
                name: other.to_string(),
            }),
        }
    }
}

/// Fluid definition shared by every section of a network.
///
/// Liquids carry their density directly; gas and vapor densities follow the
/// real-gas law `ρ = P·MW/(Z·R·T)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Fluid {
    pub name: Option<String>,
    pub phase: Phase,
    pub temperature: Temperature,
    pub pressure: Pressure,
    pub viscosity: DynVisc,
    /// Liquid density.
    pub density: Option<Density>,
    /// Gas/vapor molecular weight.
    pub molecular_weight: Option<MolarMass>,
    pub z_factor: f64,
    /// Heat-capacity ratio (isentropic exponent) for gas/vapor.
    pub specific_heat_ratio: f64,
    pub vapor_pressure: Option<Pressure>,
    pub critical_pressure: Option<Pressure>,
    pub mass_flow_rate: Option<MassRate>,
    /// Actual volumetric flow at flowing conditions.
    pub volumetric_flow_rate: Option<VolumeRate>,
    /// Gas volumetric flow at standard conditions (101 325 Pa, 288.15 K).
    pub standard_flow_rate: Option<VolumeRate>,
}

impl Fluid {
    /// Create a liquid with a supplied density.
    pub fn liquid(
        temperature: Temperature,
        pressure: Pressure,
        density: Density,
        viscosity: DynVisc,
    ) -> Self {
        Self {
            name: None,
            phase: Phase::Liquid,
            temperature,
            pressure,
            viscosity,
            density: Some(density),
            molecular_weight: None,
            z_factor: 1.0,
            specific_heat_ratio: 1.4,
            vapor_pressure: None,
            critical_pressure: None,
            mass_flow_rate: None,
            volumetric_flow_rate: None,
            standard_flow_rate: None,
        }
    }

    /// Create an ideal gas (Z = 1, k = 1.4); adjust with the builder methods.
    pub fn gas(
        temperature: Temperature,
        pressure: Pressure,
        molecular_weight: MolarMass,
        viscosity: DynVisc,
    ) -> Self {
        Self {
            name: None,
            phase: Phase::Gas,
            temperature,
            pressure,
            viscosity,
            density: None,
            molecular_weight: Some(molecular_weight),
            z_factor: 1.0,
            specific_heat_ratio: 1.4,
            vapor_pressure: None,
            critical_pressure: None,
            mass_flow_rate: None,
            volumetric_flow_rate: None,
            standard_flow_rate: None,
        }
    }

    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_z_factor(mut self, z: f64) -> Self {
        self.z_factor = z;
        self
    }

    pub fn with_specific_heat_ratio(mut self, k: f64) -> Self {
        self.specific_heat_ratio = k;
        self
    }

    pub fn with_mass_flow(mut self, mass_flow: MassRate) -> Self {
        self.mass_flow_rate = Some(mass_flow);
        self
    }

    pub fn with_volumetric_flow(mut self, flow: VolumeRate) -> Self {
        self.volumetric_flow_rate = Some(flow);
        self
    }

    pub fn with_standard_flow(mut self, flow: VolumeRate) -> Self {
        self.standard_flow_rate = Some(flow);
        self
    }

    pub fn with_vapor_pressure(mut self, pv: Pressure) -> Self {
        self.vapor_pressure = Some(pv);
        self
    }

    pub fn with_critical_pressure(mut self, pc: Pressure) -> Self {
        self.critical_pressure = Some(pc);
        self
    }

    pub fn is_compressible(&self) -> bool {
        self.phase.is_compressible()
    }

    /// Check the phase-specific invariants.
    pub fn validate(&self) -> FluidResult<()> {
        positive(self.temperature.value, "fluid temperature")?;
        positive(self.pressure.value, "fluid pressure")?;
        positive(self.viscosity.value, "fluid viscosity")?;

        if self.is_compressible() {
            let mw = self
                .molecular_weight
                .ok_or(FluidError::MissingProperty {
                    what: "molecular weight",
                })?;
            positive(mw.value, "molecular weight")?;
            positive(self.z_factor, "z factor")?;
            if self.specific_heat_ratio <= 1.0 || !self.specific_heat_ratio.is_finite() {
                return Err(FluidError::NonPhysical {
                    what: "specific heat ratio",
                    value: self.specific_heat_ratio,
                });
            }
        } else {
            let rho = self.density.ok_or(FluidError::MissingProperty {
                what: "liquid density",
            })?;
            positive(rho.value, "liquid density")?;
        }

        if let Some(pv) = self.vapor_pressure {
            if pv.value < 0.0 {
                return Err(FluidError::NonPhysical {
                    what: "vapor pressure",
                    value: pv.value,
                });
            }
        }
        if let Some(pc) = self.critical_pressure {
            positive(pc.value, "critical pressure")?;
        }
        Ok(())
    }

    /// Molecular weight in kg/kmol.
    pub fn molecular_weight_kg_per_kmol(&self) -> FluidResult<f64> {
        let mw = self.molecular_weight.ok_or(FluidError::MissingProperty {
            what: "molecular weight",
        })?;
        positive(molar_mass_kg_per_kmol(mw), "molecular weight")
    }

    /// Density at an arbitrary state, kg/m³.
    ///
    /// Liquids ignore the state and return their supplied density.
    pub fn density_at(&self, pressure_pa: f64, temperature_k: f64) -> FluidResult<f64> {
        if self.is_compressible() {
            positive(pressure_pa, "gas pressure")?;
            positive(temperature_k, "gas temperature")?;
            let mw = self.molecular_weight_kg_per_kmol()?;
            Ok(pressure_pa * mw / (self.z_factor * R_UNIVERSAL * temperature_k))
        } else {
            let rho = self.density.ok_or(FluidError::MissingProperty {
                what: "liquid density",
            })?;
            positive(rho.value, "liquid density")
        }
    }

    /// Density at the fluid's own pressure and temperature, kg/m³.
    pub fn density(&self) -> FluidResult<f64> {
        self.density_at(self.pressure.value, self.temperature.value)
    }

    /// Density at standard conditions (Z = 1 for gas), kg/m³.
    pub fn standard_density(&self) -> FluidResult<f64> {
        if self.is_compressible() {
            let mw = self.molecular_weight_kg_per_kmol()?;
            Ok(STANDARD_PRESSURE_PA * mw / (R_UNIVERSAL * STANDARD_TEMPERATURE_K))
        } else {
            self.density()
        }
    }

    /// Speed of sound for gas/vapor at a temperature, m/s.
    pub fn speed_of_sound(&self, temperature_k: f64) -> FluidResult<f64> {
        positive(temperature_k, "gas temperature")?;
        let mw = self.molecular_weight_kg_per_kmol()?;
        Ok((self.specific_heat_ratio * self.z_factor * R_UNIVERSAL * temperature_k / mw).sqrt())
    }

    /// Resolve the flow basis to a mass flow in kg/s.
    ///
    /// Mass flow wins over actual volumetric flow, which wins over standard
    /// volumetric flow.
    pub fn mass_flow_kgps(&self) -> FluidResult<f64> {
        if let Some(mdot) = self.mass_flow_rate {
            return positive(mdot.value, "mass flow rate");
        }
        if let Some(q) = self.volumetric_flow_rate {
            positive(q.value, "volumetric flow rate")?;
            return Ok(q.value * self.density()?);
        }
        if let Some(q) = self.standard_flow_rate {
            positive(q.value, "standard flow rate")?;
            return Ok(q.value * self.standard_density()?);
        }
        Err(FluidError::MissingFlow)
    }

    /// Actual volumetric flow at the fluid's own state, m³/s.
    pub fn actual_volumetric_flow(&self) -> FluidResult<f64> {
        Ok(self.mass_flow_kgps()? / self.density()?)
    }

    /// Volumetric flow at standard conditions, m³/s.
    pub fn standard_volumetric_flow(&self) -> FluidResult<f64> {
        Ok(self.mass_flow_kgps()? / self.standard_density()?)
    }
}

fn positive(value: f64, what: &'static str) -> FluidResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(FluidError::NonPhysical { what, value })
    }
}
