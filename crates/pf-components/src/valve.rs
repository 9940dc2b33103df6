//! Control valve model and IEC 60534-2-1 sizing.
//!
//! A valve is specified in exactly one direction: either its pressure drop is
//! known and the flow coefficient is sized, or its Cv (or Cg with C1) is
//! known and the pressure drop is rated by bisection on ΔP.

use crate::common::{MIN_PRESSURE, check_finite, require_positive};
use crate::error::{ComponentError, ComponentResult};
use crate::results::PressureDropDetails;
use crate::section::PipeSection;
use crate::traits::{LossCalculator, SectionContext};
use pf_core::numeric::{BisectConfig, bisect};
use pf_core::units::{Length, Pressure};

/// US Cv per metric Kv.
pub const CV_PER_KV: f64 = 1.156;
/// Reference water density for liquid Kv, kg/m³.
pub const WATER_REFERENCE_DENSITY: f64 = 999.1;
/// IEC 60534 N6 for kg/h, bar, kg/m³.
pub const N6: f64 = 27.3;

const PA_PER_BAR: f64 = 1.0e5;
const RATING_TOLERANCE: f64 = 1e-6;
const RATING_MAX_ITERATIONS: usize = 80;

#[derive(Debug, Clone, PartialEq)]
pub struct ControlValve {
    pub tag: String,
    pub pressure_drop: Option<Pressure>,
    pub cv: Option<f64>,
    pub cg: Option<f64>,
    /// Cg/Cv ratio.
    pub c1: Option<f64>,
    /// Pressure differential ratio factor at choked flow.
    pub xt: f64,
    /// Liquid pressure recovery factor.
    pub fl: f64,
    pub diameter: Option<Length>,
}

/// Which side of the valve equation is known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValveMode {
    /// Pressure drop given in Pa; size Cv.
    Sizing(f64),
    /// Cv given; rate the pressure drop.
    Rating(f64),
}

impl ControlValve {
    fn blank(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            pressure_drop: None,
            cv: None,
            cg: None,
            c1: None,
            xt: 0.72,
            fl: 0.9,
            diameter: None,
        }
    }

    pub fn with_pressure_drop(tag: impl Into<String>, dp: Pressure) -> Self {
        Self {
            pressure_drop: Some(dp),
            ..Self::blank(tag)
        }
    }

    pub fn with_cv(tag: impl Into<String>, cv: f64) -> Self {
        Self {
            cv: Some(cv),
            ..Self::blank(tag)
        }
    }

    pub fn with_cg(tag: impl Into<String>, cg: f64, c1: f64) -> Self {
        Self {
            cg: Some(cg),
            c1: Some(c1),
            ..Self::blank(tag)
        }
    }

    pub fn with_c1(mut self, c1: f64) -> Self {
        self.c1 = Some(c1);
        self
    }

    pub fn with_factors(mut self, xt: f64, fl: f64) -> Self {
        self.xt = xt;
        self.fl = fl;
        self
    }

    /// Cv, falling back to `cg / c1`.
    pub fn effective_cv(&self) -> ComponentResult<Option<f64>> {
        if let Some(cv) = self.cv {
            return Ok(Some(cv));
        }
        match (self.cg, self.c1) {
            (Some(cg), Some(c1)) => Ok(Some(cg / require_positive(c1, "valve c1")?)),
            (Some(_), None) => Err(ComponentError::MissingParameter { what: "valve c1" }),
            _ => Ok(None),
        }
    }

    pub fn mode(&self) -> ComponentResult<ValveMode> {
        require_positive(self.xt, "valve xt")?;
        require_positive(self.fl, "valve fl")?;
        match (self.pressure_drop, self.effective_cv()?) {
            (Some(dp), None) => {
                if dp.value.is_finite() && dp.value >= 0.0 {
                    Ok(ValveMode::Sizing(dp.value))
                } else {
                    Err(ComponentError::Validation {
                        what: "valve pressure drop",
                        value: dp.value,
                    })
                }
            }
            (None, Some(cv)) => Ok(ValveMode::Rating(require_positive(cv, "valve cv")?)),
            (Some(_), Some(_)) => Err(ComponentError::InvalidSpec {
                what: format!(
                    "control valve '{}' specifies both pressure drop and Cv",
                    self.tag
                ),
            }),
            (None, None) => Err(ComponentError::MissingParameter {
                what: "control valve pressure drop or cv",
            }),
        }
    }
}

/// Fluid-side inputs for one valve evaluation.
#[derive(Debug, Clone, Copy)]
pub struct ValveSizing {
    pub compressible: bool,
    /// kg/s
    pub mass_flow: f64,
    /// Inlet density, kg/m³.
    pub density: f64,
    /// Inlet absolute pressure, Pa.
    pub inlet_pressure: f64,
    pub specific_heat_ratio: f64,
    pub vapor_pressure: Option<f64>,
    pub critical_pressure: Option<f64>,
    pub xt: f64,
    pub fl: f64,
}

impl ValveSizing {
    pub fn from_context(valve: &ControlValve, ctx: &SectionContext<'_>) -> ComponentResult<Self> {
        Ok(Self {
            compressible: ctx.fluid.is_compressible(),
            mass_flow: require_positive(ctx.mass_flow, "mass flow rate")?,
            density: require_positive(ctx.inlet_density()?, "valve inlet density")?,
            inlet_pressure: ctx.require_inlet_pressure("control valve inlet pressure")?,
            specific_heat_ratio: ctx.fluid.specific_heat_ratio,
            vapor_pressure: ctx.fluid.vapor_pressure.map(|p| p.value),
            critical_pressure: ctx.fluid.critical_pressure.map(|p| p.value),
            xt: valve.xt,
            fl: valve.fl,
        })
    }

    /// Largest pressure drop the valve may take.
    pub fn max_pressure_drop(&self) -> f64 {
        self.inlet_pressure - MIN_PRESSURE
    }

    /// Liquid choked-flow limit `FL²(P1 − FF·Pv)`, if the vapor pressure is known.
    pub fn choked_liquid_drop(&self) -> Option<f64> {
        let pv = self.vapor_pressure?;
        let ff = match self.critical_pressure {
            Some(pc) if pc > 0.0 => 0.96 - 0.28 * (pv / pc).sqrt(),
            _ => 0.96,
        };
        Some(self.fl * self.fl * (self.inlet_pressure - ff * pv))
    }

    /// Metric flow coefficient Kv for a pressure drop in Pa.
    pub fn kv(&self, dp: f64) -> ComponentResult<f64> {
        require_positive(dp, "valve pressure drop")?;
        let kv = if self.compressible {
            let x = dp / self.inlet_pressure;
            let f_gamma = self.specific_heat_ratio / 1.4;
            let x_choked = f_gamma * self.xt;
            let x_s = x.min(x_choked);
            let y = 1.0 - x_s / (3.0 * x_choked);
            let w_kg_h = self.mass_flow * 3600.0;
            let p1_bar = self.inlet_pressure / PA_PER_BAR;
            w_kg_h / (N6 * y * (x_s * p1_bar * self.density).sqrt())
        } else {
            let q_m3_h = self.mass_flow / self.density * 3600.0;
            let dp_sizing = match self.choked_liquid_drop() {
                Some(limit) if limit <= 0.0 => {
                    return Err(ComponentError::Calculation {
                        what: "valve inlet pressure is below the flashing limit".into(),
                    });
                }
                Some(limit) => dp.min(limit),
                None => dp,
            };
            q_m3_h * ((self.density / WATER_REFERENCE_DENSITY) / (dp_sizing / PA_PER_BAR)).sqrt()
        };
        check_finite(kv, "valve kv")
    }

    pub fn cv(&self, dp: f64) -> ComponentResult<f64> {
        Ok(CV_PER_KV * self.kv(dp)?)
    }

    /// Pressure drop at which the valve passes the flow with the given Cv.
    pub fn pressure_drop_for_cv(&self, cv: f64) -> ComponentResult<f64> {
        let target_kv = require_positive(cv, "valve cv")? / CV_PER_KV;
        let lo = MIN_PRESSURE;
        let hi = self.max_pressure_drop();
        if hi <= lo {
            return Err(ComponentError::Calculation {
                what: format!(
                    "valve inlet pressure {} Pa leaves no room for a drop",
                    self.inlet_pressure
                ),
            });
        }

        // Kv falls monotonically with ΔP; a sign change brackets the target.
        let mut failure = None;
        let config = BisectConfig {
            max_iterations: RATING_MAX_ITERATIONS,
            x_tol: 0.0,
            f_tol: RATING_TOLERANCE,
        };
        let outcome = bisect("valve pressure drop", lo, hi, config, |dp| match self.kv(dp) {
            Ok(kv) => (kv - target_kv) / target_kv,
            Err(e) => {
                failure = Some(e);
                f64::NAN
            }
        });
        if let Some(e) = failure {
            return Err(e);
        }
        let outcome = outcome.map_err(|_| ComponentError::Calculation {
            what: format!(
                "Cv {cv:.4} is outside the achievable range for {lo}..{hi} Pa pressure drop"
            ),
        })?;
        if !outcome.converged {
            return Err(ComponentError::Calculation {
                what: format!(
                    "valve rating did not converge (residual {:.3e})",
                    outcome.residual
                ),
            });
        }
        Ok(outcome.root)
    }
}

/// Valve pressure drop (rating) or Cv (sizing) at the actual inlet pressure.
#[derive(Debug, Clone, Copy, Default)]
pub struct ControlValveCalculator;

impl LossCalculator for ControlValveCalculator {
    fn name(&self) -> &str {
        "control_valve"
    }

    fn applies(&self, section: &PipeSection) -> bool {
        section.control_valve.is_some()
    }

    fn calculate(
        &self,
        ctx: &SectionContext<'_>,
        details: &mut PressureDropDetails,
    ) -> ComponentResult<()> {
        let Some(valve) = &ctx.section.control_valve else {
            return Ok(());
        };
        let mode = valve.mode()?;
        let sizing = ValveSizing::from_context(valve, ctx)?;

        let (dp, cv) = match mode {
            ValveMode::Sizing(dp) => {
                if dp > sizing.max_pressure_drop() {
                    return Err(ComponentError::Validation {
                        what: "valve pressure drop exceeds inlet pressure",
                        value: dp,
                    });
                }
                (dp, sizing.cv(dp)?)
            }
            ValveMode::Rating(cv) => (sizing.pressure_drop_for_cv(cv)?, cv),
        };

        details.control_valve_pressure_drop = dp;
        details.control_valve_cv = Some(cv);
        details.control_valve_cg = valve.c1.map(|c1| cv * c1);
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

    fn liquid_sizing() -> ValveSizing {
        ValveSizing {
            compressible: false,
            mass_flow: 20.0,
            density: 998.0,
            inlet_pressure: 1.0e6,
            specific_heat_ratio: 1.4,
            vapor_pressure: None,
            critical_pressure: None,
            xt: 0.72,
            fl: 0.9,
        }
    }

    fn gas_sizing() -> ValveSizing {
        ValveSizing {
            compressible: true,
            mass_flow: 1.0,
            density: 11.614_300_418_839_969,
            ..liquid_sizing()
        }
    }

    #[test]
    fn liquid_cv_from_pressure_drop() {
        let cv = liquid_sizing().cv(1.0e5).unwrap();
        assert_relative_eq!(cv, 83.352_874, max_relative = 1e-6);
    }

    #[test]
    fn liquid_choking_caps_sizing_drop() {
        let sizing = ValveSizing {
            inlet_pressure: 3.0e5,
            vapor_pressure: Some(2.5e5),
            critical_pressure: Some(22.064e6),
            ..liquid_sizing()
        };
        let limit = sizing.choked_liquid_drop().unwrap();
        assert_relative_eq!(limit, 54_635.468, max_relative = 1e-6);
        // Beyond the limit the coefficient stops changing.
        assert_relative_eq!(
            sizing.kv(1.5e5).unwrap(),
            sizing.kv(2.0e5).unwrap(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn gas_kv_with_expansion_factor() {
        assert_relative_eq!(gas_sizing().kv(2.0e5).unwrap(), 30.152_686, max_relative = 1e-6);
    }

    #[test]
    fn gas_kv_plateaus_when_choked() {
        let s = gas_sizing();
        assert_relative_eq!(s.kv(9.0e5).unwrap(), 21.630_589, max_relative = 1e-6);
        assert_relative_eq!(s.kv(7.2e5).unwrap(), s.kv(9.0e5).unwrap(), max_relative = 1e-12);
    }

    #[test]
    fn rating_inverts_sizing() {
        for s in [liquid_sizing(), gas_sizing()] {
            let cv = s.cv(2.0e5).unwrap();
            let dp = s.pressure_drop_for_cv(cv).unwrap();
            assert_relative_eq!(dp, 2.0e5, max_relative = 1e-5);
        }
    }

    #[test]
    fn undersized_gas_valve_is_out_of_range() {
        // Needs more Kv reduction than choking allows.
        let err = gas_sizing().pressure_drop_for_cv(5.0).unwrap_err();
        assert!(matches!(err, ComponentError::Calculation { .. }));
    }

    #[test]
    fn valve_mode_rules() {
        assert_eq!(
            ControlValve::with_pressure_drop("v", pa(1e5)).mode().unwrap(),
            ValveMode::Sizing(1e5)
        );
        assert_eq!(
            ControlValve::with_cg("v", 3000.0, 30.0).mode().unwrap(),
            ValveMode::Rating(100.0)
        );
        let mut both = ControlValve::with_cv("v", 50.0);
        both.pressure_drop = Some(pa(1e5));
        assert!(matches!(both.mode(), Err(ComponentError::InvalidSpec { .. })));
        let mut neither = ControlValve::with_cv("v", 50.0);
        neither.cv = None;
        assert!(neither.mode().unwrap_err().is_missing_parameter());
    }

    #[test]
    fn calculator_reports_cv_and_cg() {
        let section = PipeSection::new("cv", m(0.0), m(0.1))
            .with_control_valve(ControlValve::with_pressure_drop("fcv", pa(2.0e5)).with_c1(30.0));
        let fluid = Fluid::gas(k(300.0), pa(1.0e6), kg_per_kmol(28.97), pa_s(1.8e-5));
        let ctx = SectionContext::new(&section, &fluid, 1.0)
            .unwrap()
            .with_inlet_pressure(1.0e6);
        let mut details = PressureDropDetails::default();
        ControlValveCalculator.calculate(&ctx, &mut details).unwrap();

        let cv = details.control_valve_cv.unwrap();
        assert_relative_eq!(cv, 34.856_505, max_relative = 1e-6);
        assert_relative_eq!(details.control_valve_cg.unwrap(), cv * 30.0);
        assert_eq!(details.control_valve_pressure_drop, 2.0e5);
        assert_eq!(details.total_segment_loss, 2.0e5);
    }

    #[test]
    fn calculator_needs_inlet_pressure() {
        let section = PipeSection::new("cv", m(0.0), m(0.1))
            .with_control_valve(ControlValve::with_cv("fcv", 80.0));
        let fluid = Fluid::liquid(k(293.15), pa(1e6), kg_per_m3(998.0), pa_s(1e-3));
        let ctx = SectionContext::new(&section, &fluid, 20.0).unwrap();
        let mut details = PressureDropDetails::default();
        let err = ControlValveCalculator.calculate(&ctx, &mut details).unwrap_err();
        assert!(err.is_missing_parameter());
    }
}
