//! Calculator seam shared by every section loss model.

use crate::error::{ComponentError, ComponentResult};
use crate::results::PressureDropDetails;
use crate::section::PipeSection;
use pf_fluids::Fluid;

/// Everything a calculator may read while filling a section's details.
#[derive(Clone, Copy)]
pub struct SectionContext<'a> {
    pub section: &'a PipeSection,
    pub fluid: &'a Fluid,
    /// Resolved mass flow, kg/s.
    pub mass_flow: f64,
    /// Reference density for velocity-based losses, kg/m³.
    pub density: f64,
    pub temperature: f64,
    /// Actual inlet pressure, once propagation knows it.
    pub inlet_pressure: Option<f64>,
}

impl<'a> SectionContext<'a> {
    /// Context at the fluid's own state.
    pub fn new(
        section: &'a PipeSection,
        fluid: &'a Fluid,
        mass_flow: f64,
    ) -> ComponentResult<Self> {
        Ok(Self {
            section,
            fluid,
            mass_flow,
            density: fluid.density()?,
            temperature: fluid.temperature.value,
            inlet_pressure: None,
        })
    }

    pub fn with_inlet_pressure(mut self, pressure: f64) -> Self {
        self.inlet_pressure = Some(pressure);
        self
    }

    pub fn with_density(mut self, density: f64) -> Self {
        self.density = density;
        self
    }

    /// Inlet pressure, required by the pressure-dependent devices.
    pub fn require_inlet_pressure(&self, what: &'static str) -> ComponentResult<f64> {
        let p = self
            .inlet_pressure
            .ok_or(ComponentError::MissingParameter { what })?;
        if p.is_finite() && p > 0.0 {
            Ok(p)
        } else {
            Err(ComponentError::Validation { what, value: p })
        }
    }

    /// Density at the inlet pressure (gas) or the liquid density.
    pub fn inlet_density(&self) -> ComponentResult<f64> {
        match self.inlet_pressure {
            Some(p) if self.fluid.is_compressible() => {
                Ok(self.fluid.density_at(p, self.temperature)?)
            }
            _ => Ok(self.density),
        }
    }
}

/// A single contribution to a section's pressure-drop breakdown.
///
/// Calculators are stateless apart from configuration, and each one writes
/// only its own fields of [`PressureDropDetails`] before refreshing the total.
pub trait LossCalculator: Send + Sync {
    /// Calculator name for diagnostics.
    fn name(&self) -> &str;

    /// Whether the section carries anything for this calculator to do.
    fn applies(&self, _section: &PipeSection) -> bool {
        true
    }

    fn calculate(
        &self,
        ctx: &SectionContext<'_>,
        details: &mut PressureDropDetails,
    ) -> ComponentResult<()>;
}
