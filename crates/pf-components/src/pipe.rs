//! Pipe friction: Darcy-Weisbach with the Serghide explicit Colebrook fit.

use crate::common::{LAMINAR_REYNOLDS_LIMIT, check_finite, require_positive, reynolds, velocity};
use crate::error::{ComponentError, ComponentResult};
use crate::results::{FlowScheme, PressureDropDetails};
use crate::traits::{LossCalculator, SectionContext};
use serde::{Deserialize, Serialize};

/// Convention a friction factor is quoted in. Darcy = 4 × Fanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrictionFactorType {
    #[default]
    Darcy,
    Fanning,
}

impl FrictionFactorType {
    pub fn to_darcy(self, f: f64) -> f64 {
        match self {
            FrictionFactorType::Darcy => f,
            FrictionFactorType::Fanning => 4.0 * f,
        }
    }

    pub fn from_darcy(self, f_darcy: f64) -> f64 {
        match self {
            FrictionFactorType::Darcy => f_darcy,
            FrictionFactorType::Fanning => f_darcy / 4.0,
        }
    }
}

/// A friction factor tagged with its convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrictionFactor {
    Darcy(f64),
    Fanning(f64),
}

impl FrictionFactor {
    pub fn new(convention: FrictionFactorType, value: f64) -> Self {
        match convention {
            FrictionFactorType::Darcy => FrictionFactor::Darcy(value),
            FrictionFactorType::Fanning => FrictionFactor::Fanning(value),
        }
    }

    pub fn darcy(self) -> f64 {
        match self {
            FrictionFactor::Darcy(f) => f,
            FrictionFactor::Fanning(f) => 4.0 * f,
        }
    }

    pub fn fanning(self) -> f64 {
        self.darcy() / 4.0
    }
}

/// Darcy friction factor for a Reynolds number and relative roughness ε/D.
///
/// Laminar `64/Re` up to and including Re = 2100; above that Serghide's
/// Steffensen-accelerated fit of Colebrook-White (three log evaluations).
///
/// There is no transition blend: at Re = 2100 the factor jumps from
/// `64/2100` to the Serghide value (about 0.049 for a smooth pipe). The
/// function is continuous only when approached from the laminar side.
pub fn darcy_friction_factor(re: f64, relative_roughness: f64) -> ComponentResult<f64> {
    require_positive(re, "Reynolds number")?;
    if !(relative_roughness >= 0.0 && relative_roughness.is_finite()) {
        return Err(ComponentError::Validation {
            what: "relative roughness",
            value: relative_roughness,
        });
    }

    if re <= LAMINAR_REYNOLDS_LIMIT {
        return Ok(64.0 / re);
    }

    let rr = relative_roughness / 3.7;
    let a = -2.0 * (rr + 12.0 / re).log10();
    let b = -2.0 * (rr + 2.51 * a / re).log10();
    let c = -2.0 * (rr + 2.51 * b / re).log10();
    let inv_sqrt = a - (b - a).powi(2) / (c - 2.0 * b + a);
    check_finite(inv_sqrt.powi(-2), "friction factor")
}

/// Pipe-length K, K totals and the combined pipe-and-fittings loss.
///
/// Must run after the fitting calculator so that `fitting_k` is populated.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrictionCalculator {
    pub convention: FrictionFactorType,
    /// User friction factor, quoted in `convention`.
    pub override_factor: Option<f64>,
}

impl FrictionCalculator {
    pub fn new(convention: FrictionFactorType) -> Self {
        Self {
            convention,
            override_factor: None,
        }
    }

    pub fn with_override(mut self, factor: Option<f64>) -> Self {
        self.override_factor = factor;
        self
    }

    /// Darcy factor for a section at a Reynolds number.
    pub fn darcy_factor(&self, re: f64, relative_roughness: f64) -> ComponentResult<f64> {
        match self.override_factor {
            Some(f) => Ok(self
                .convention
                .to_darcy(require_positive(f, "friction factor override")?)),
            None => darcy_friction_factor(re, relative_roughness),
        }
    }
}

impl LossCalculator for FrictionCalculator {
    fn name(&self) -> &str {
        "friction"
    }

    fn calculate(
        &self,
        ctx: &SectionContext<'_>,
        details: &mut PressureDropDetails,
    ) -> ComponentResult<()> {
        let section = ctx.section;
        let d = section.diameter_m()?;
        require_positive(ctx.temperature, "fluid temperature")?;
        require_positive(ctx.fluid.pressure.value, "fluid pressure")?;
        let mu = require_positive(ctx.fluid.viscosity.value, "fluid viscosity")?;
        let rho = require_positive(ctx.density, "fluid density")?;
        let mdot = require_positive(ctx.mass_flow, "mass flow rate")?;

        let re = check_finite(reynolds(mdot, d, mu), "Reynolds number")?;
        let f_darcy = self.darcy_factor(re, section.roughness.value / d)?;
        let length = section.length.value.max(0.0);

        details.reynolds_number = Some(re);
        details.flow_scheme = Some(FlowScheme::from_reynolds(re));
        details.frictional_factor = Some(self.convention.from_darcy(f_darcy));
        details.pipe_length_k = f_darcy * length / d;
        details.user_k = section.user_k.unwrap_or(0.0);
        details.piping_and_fitting_safety_factor = section.safety_factor;
        details.total_k = (details.pipe_length_k + details.fitting_k + details.user_k)
            * (1.0 + section.safety_factor);

        let v = velocity(mdot, rho, d);
        details.pipe_and_fittings = check_finite(
            details.total_k * rho * v * v / 2.0,
            "pipe and fittings loss",
        )?;
        details.normalized_friction_loss =
            (length > 0.0).then(|| details.pipe_and_fittings / length * 100.0);
        details.recompute_total();
        Ok(())
    }
}
