//! Square-edged orifice plate per ISO 5167-2.

use crate::common::{check_finite, flow_area, require_positive, reynolds};
use crate::error::{ComponentError, ComponentResult};
use crate::results::PressureDropDetails;
use crate::section::PipeSection;
use crate::traits::{LossCalculator, SectionContext};
use pf_core::numeric::relative_change;
use pf_core::units::{Length, Pressure};
use serde::{Deserialize, Serialize};

const MAX_PASSES: usize = 50;
const TOLERANCE: f64 = 1e-9;
/// Below this bore the small-pipe correction applies (m).
const SMALL_PIPE_DIAMETER: f64 = 0.071_12;

/// Pressure tapping arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrificeTaps {
    #[default]
    Corner,
    Flange,
    /// D and D/2 taps.
    #[serde(rename = "d_and_d2", alias = "d_and_d_2")]
    DAndD2,
}

impl OrificeTaps {
    /// `(L1, L2')` for a pipe bore in metres.
    fn spacing(self, pipe_diameter: f64) -> (f64, f64) {
        match self {
            OrificeTaps::Corner => (0.0, 0.0),
            OrificeTaps::Flange => {
                let l = 0.0254 / pipe_diameter;
                (l, l)
            }
            OrificeTaps::DAndD2 => (1.0, 0.47),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Orifice {
    pub tag: String,
    /// Bypasses the meter solve when given.
    pub pressure_drop: Option<Pressure>,
    /// d/D.
    pub beta: Option<f64>,
    pub orifice_diameter: Option<Length>,
    /// Defaults to the section bore.
    pub pipe_diameter: Option<Length>,
    pub discharge_coefficient: Option<f64>,
    pub expansibility: Option<f64>,
    pub taps: OrificeTaps,
}

impl Orifice {
    pub fn with_beta(tag: impl Into<String>, beta: f64) -> Self {
        Self {
            tag: tag.into(),
            pressure_drop: None,
            beta: Some(beta),
            orifice_diameter: None,
            pipe_diameter: None,
            discharge_coefficient: None,
            expansibility: None,
            taps: OrificeTaps::default(),
        }
    }

    pub fn with_pressure_drop(tag: impl Into<String>, dp: Pressure) -> Self {
        Self {
            pressure_drop: Some(dp),
            beta: None,
            ..Self::with_beta(tag, 0.0)
        }
    }

    pub fn with_taps(mut self, taps: OrificeTaps) -> Self {
        self.taps = taps;
        self
    }

    pub fn with_discharge_coefficient(mut self, c: f64) -> Self {
        self.discharge_coefficient = Some(c);
        self
    }

    pub fn validate(&self) -> ComponentResult<()> {
        if let Some(beta) = self.beta {
            if !(beta > 0.0 && beta < 1.0) {
                return Err(ComponentError::Validation {
                    what: "orifice d/D ratio",
                    value: beta,
                });
            }
        }
        if let Some(d) = self.orifice_diameter {
            require_positive(d.value, "orifice diameter")?;
        }
        if let Some(d) = self.pipe_diameter {
            require_positive(d.value, "orifice pipe diameter")?;
        }
        for (value, what) in [
            (self.discharge_coefficient, "orifice discharge coefficient"),
            (self.expansibility, "orifice expansibility"),
        ] {
            if let Some(v) = value {
                if !(v > 0.0 && v <= 1.0) {
                    return Err(ComponentError::Validation { what, value: v });
                }
            }
        }
        if let Some(dp) = self.pressure_drop {
            if !(dp.value >= 0.0 && dp.value.is_finite()) {
                return Err(ComponentError::Validation {
                    what: "orifice pressure drop",
                    value: dp.value,
                });
            }
        }
        Ok(())
    }

    /// `(D, d, β)` with D falling back to the section bore.
    pub fn geometry(&self, section_diameter: Option<f64>) -> ComponentResult<(f64, f64, f64)> {
        let pipe = match self.pipe_diameter {
            Some(d) => d.value,
            None => section_diameter.ok_or(ComponentError::MissingParameter {
                what: "orifice pipe diameter",
            })?,
        };
        let pipe = require_positive(pipe, "orifice pipe diameter")?;
        let (bore, beta) = match (self.beta, self.orifice_diameter) {
            (Some(beta), _) => (beta * pipe, beta),
            (None, Some(d)) => (d.value, d.value / pipe),
            (None, None) => {
                return Err(ComponentError::MissingParameter {
                    what: "orifice d/D ratio or diameter",
                });
            }
        };
        if !(beta > 0.0 && beta < 1.0) {
            return Err(ComponentError::Validation {
                what: "orifice d/D ratio",
                value: beta,
            });
        }
        Ok((pipe, bore, beta))
    }
}

/// Reader-Harris/Gallagher discharge coefficient.
pub fn discharge_coefficient(beta: f64, pipe_diameter: f64, re_d: f64, taps: OrificeTaps) -> f64 {
    let (l1, l2) = taps.spacing(pipe_diameter);
    let a = (19_000.0 * beta / re_d).powf(0.8);
    let m2 = 2.0 * l2 / (1.0 - beta);
    let b4 = beta.powi(4);

    let mut c = 0.5961 + 0.0261 * beta * beta - 0.216 * beta.powi(8)
        + 0.000_521 * (1.0e6 * beta / re_d).powf(0.7)
        + (0.0188 + 0.0063 * a) * beta.powf(3.5) * (1.0e6 / re_d).powf(0.3)
        + (0.043 + 0.080 * (-10.0 * l1).exp() - 0.123 * (-7.0 * l1).exp())
            * (1.0 - 0.11 * a)
            * b4
            / (1.0 - b4)
        - 0.031 * (m2 - 0.8 * m2.powf(1.1)) * beta.powf(1.3);

    if pipe_diameter < SMALL_PIPE_DIAMETER {
        c += 0.011 * (0.75 - beta) * (2.8 - pipe_diameter / 0.0254);
    }
    c
}

/// Expansibility factor ε for a pressure ratio `p2/p1`.
pub fn expansibility(beta: f64, pressure_ratio: f64, kappa: f64) -> f64 {
    let b4 = beta.powi(4);
    1.0 - (0.351 + 0.256 * b4 + 0.93 * b4 * b4) * (1.0 - pressure_ratio.powf(1.0 / kappa))
}

/// Unrecovered fraction of the meter differential.
pub fn permanent_loss_ratio(beta: f64, c: f64) -> f64 {
    let b2 = beta * beta;
    let root = (1.0 - b2 * b2 * (1.0 - c * c)).sqrt();
    (root - c * b2) / (root + c * b2)
}

/// Solved meter state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrificeSolution {
    pub discharge_coefficient: f64,
    pub expansibility: f64,
    /// Tapping differential, Pa.
    pub differential: f64,
    /// Unrecovered pressure loss, Pa.
    pub permanent_loss: f64,
}

/// Meter-equation inputs in SI.
#[derive(Debug, Clone, Copy)]
pub struct OrificeFlow {
    pub mass_flow: f64,
    pub density: f64,
    pub viscosity: f64,
    /// Inlet pressure; needed for gas expansibility.
    pub inlet_pressure: Option<f64>,
    pub kappa: f64,
    pub compressible: bool,
}

impl Orifice {
    /// Differential and permanent loss for a mass flow.
    pub fn solve(
        &self,
        flow: OrificeFlow,
        section_diameter: Option<f64>,
    ) -> ComponentResult<OrificeSolution> {
        let (pipe, bore, beta) = self.geometry(section_diameter)?;
        let qm = require_positive(flow.mass_flow, "mass flow rate")?;
        let rho = require_positive(flow.density, "orifice inlet density")?;
        let mu = require_positive(flow.viscosity, "fluid viscosity")?;

        let re_d = reynolds(qm, pipe, mu);
        let c = match self.discharge_coefficient {
            Some(c) => c,
            None => discharge_coefficient(beta, pipe, re_d, self.taps),
        };
        let iterate_eps = flow.compressible && self.expansibility.is_none();
        let p1 = if iterate_eps {
            Some(require_positive(
                flow.inlet_pressure.ok_or(ComponentError::MissingParameter {
                    what: "orifice inlet pressure",
                })?,
                "orifice inlet pressure",
            )?)
        } else {
            None
        };
        let kappa = require_positive(flow.kappa, "isentropic exponent")?;

        let velocity_factor = qm * (1.0 - beta.powi(4)).sqrt() / (c * flow_area(bore));
        let mut eps = if flow.compressible {
            self.expansibility.unwrap_or(1.0)
        } else {
            1.0
        };
        let mut dp = 0.0;
        let mut converged = false;
        for pass in 0..MAX_PASSES {
            let next = (velocity_factor / eps).powi(2) / (2.0 * rho);
            let settled = pass > 0 && relative_change(dp, next) < TOLERANCE;
            dp = check_finite(next, "orifice differential")?;
            if settled || (p1.is_none() && pass > 0) {
                converged = true;
                break;
            }
            if let Some(p1) = p1 {
                let p2 = p1 - dp;
                if p2 <= 0.0 {
                    return Err(ComponentError::Calculation {
                        what: format!(
                            "orifice '{}' differential {dp:.1} Pa exceeds inlet pressure {p1:.1} Pa",
                            self.tag
                        ),
                    });
                }
                eps = expansibility(beta, p2 / p1, kappa);
            }
        }
        if !converged {
            return Err(ComponentError::Calculation {
                what: format!("orifice '{}' differential did not settle", self.tag),
            });
        }

        Ok(OrificeSolution {
            discharge_coefficient: c,
            expansibility: eps,
            differential: dp,
            permanent_loss: permanent_loss_ratio(beta, c) * dp,
        })
    }
}

/// Orifice permanent loss, or the pre-specified drop.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrificeCalculator;

impl LossCalculator for OrificeCalculator {
    fn name(&self) -> &str {
        "orifice"
    }

    fn applies(&self, section: &PipeSection) -> bool {
        section.orifice.is_some()
    }

    fn calculate(
        &self,
        ctx: &SectionContext<'_>,
        details: &mut PressureDropDetails,
    ) -> ComponentResult<()> {
        let Some(orifice) = &ctx.section.orifice else {
            return Ok(());
        };

        if let Some(dp) = orifice.pressure_drop {
            details.orifice_pressure_drop = check_finite(dp.value, "orifice pressure drop")?;
            details.recompute_total();
            return Ok(());
        }

        let section_diameter = ctx.section.pipe_diameter.map(|d| d.value);
        let flow = OrificeFlow {
            mass_flow: ctx.mass_flow,
            density: ctx.inlet_density()?,
            viscosity: ctx.fluid.viscosity.value,
            inlet_pressure: ctx.inlet_pressure,
            kappa: ctx.fluid.specific_heat_ratio,
            compressible: ctx.fluid.is_compressible(),
        };
        let solution = orifice.solve(flow, section_diameter)?;

        details.orifice_pressure_drop = solution.permanent_loss;
        details.orifice_discharge_coefficient = Some(solution.discharge_coefficient);
        details.orifice_expansibility = Some(solution.expansibility);
        details.recompute_total();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pf_core::units::{k, kg_per_kmol, kg_per_m3, m, pa, pa_s};
    use pf_fluids::Fluid;

    fn water_flow(mass_flow: f64) -> OrificeFlow {
        OrificeFlow {
            mass_flow,
            density: 998.0,
            viscosity: 1e-3,
            inlet_pressure: None,
            kappa: 1.4,
            compressible: false,
        }
    }

    #[test]
    fn liquid_corner_taps() {
        let sol = Orifice::with_beta("fe-1", 0.5)
            .solve(water_flow(5.0), Some(0.1))
            .unwrap();
        assert_relative_eq!(sol.discharge_coefficient, 0.608_060_50, max_relative = 1e-7);
        assert_eq!(sol.expansibility, 1.0);
        assert_relative_eq!(sol.differential, 8_237.537, max_relative = 1e-6);
        assert_relative_eq!(sol.permanent_loss, 6_025.354, max_relative = 1e-6);
    }

    #[test]
    fn small_pipe_correction_applies() {
        let sol = Orifice::with_beta("fe-2", 0.5)
            .with_taps(OrificeTaps::DAndD2)
            .solve(water_flow(1.0), Some(0.05))
            .unwrap();
        assert_relative_eq!(sol.discharge_coefficient, 0.613_230_67, max_relative = 1e-7);
        assert_relative_eq!(sol.permanent_loss, 3_781.491, max_relative = 1e-6);
    }

    #[test]
    fn gas_expansibility_iterates() {
        let flow = OrificeFlow {
            mass_flow: 0.5,
            density: 5.807_150_209_419_985,
            viscosity: 1.8e-5,
            inlet_pressure: Some(5.0e5),
            kappa: 1.4,
            compressible: true,
        };
        let sol = Orifice::with_beta("fe-3", 0.6)
            .with_taps(OrificeTaps::Flange)
            .solve(flow, Some(0.1))
            .unwrap();
        assert_relative_eq!(sol.expansibility, 0.996_340_54, max_relative = 1e-7);
        assert_relative_eq!(sol.differential, 6_395.531, max_relative = 1e-6);
        assert_relative_eq!(sol.permanent_loss, 4_018.487, max_relative = 1e-6);
    }

    #[test]
    fn gas_without_inlet_pressure_is_missing() {
        let flow = OrificeFlow {
            compressible: true,
            ..water_flow(1.0)
        };
        let err = Orifice::with_beta("fe", 0.5).solve(flow, Some(0.1)).unwrap_err();
        assert!(err.is_missing_parameter());
    }

    #[test]
    fn beta_must_be_a_fraction() {
        assert!(Orifice::with_beta("fe", 1.2).validate().is_err());
        let err = Orifice::with_beta("fe", 0.0).geometry(Some(0.1)).unwrap_err();
        assert!(matches!(err, ComponentError::Validation { .. }));
    }

    #[test]
    fn calculator_uses_prespecified_drop() {
        let section = PipeSection::new("ro", m(0.0), m(0.1))
            .with_orifice(Orifice::with_pressure_drop("ro-1", pa(12_000.0)));
        let fluid = Fluid::liquid(k(293.15), pa(3e5), kg_per_m3(998.0), pa_s(1e-3));
        let ctx = SectionContext::new(&section, &fluid, 5.0).unwrap();
        let mut details = PressureDropDetails::default();
        OrificeCalculator.calculate(&ctx, &mut details).unwrap();
        assert_eq!(details.orifice_pressure_drop, 12_000.0);
        assert!(details.orifice_discharge_coefficient.is_none());
    }

    #[test]
    fn calculator_uses_inlet_gas_density() {
        let section = PipeSection::new("fe", m(0.0), m(0.1))
            .with_orifice(Orifice::with_beta("fe-3", 0.6).with_taps(OrificeTaps::Flange));
        let fluid = Fluid::gas(k(300.0), pa(1.0e6), kg_per_kmol(28.97), pa_s(1.8e-5));
        let ctx = SectionContext::new(&section, &fluid, 0.5)
            .unwrap()
            .with_inlet_pressure(5.0e5);
        let mut details = PressureDropDetails::default();
        OrificeCalculator.calculate(&ctx, &mut details).unwrap();
        assert_relative_eq!(details.orifice_pressure_drop, 4_018.487, max_relative = 1e-6);
    }
}
