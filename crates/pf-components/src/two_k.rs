//! Fitting resistance by the Hooper 2-K method, including swages.

use crate::common::{DIAMETER_TOLERANCE, check_finite, require_positive, reynolds};
use crate::error::{ComponentError, ComponentResult};
use crate::fitting::{FittingStyle, FittingType};
use crate::pipe::darcy_friction_factor;
use crate::results::{FittingContribution, PressureDropDetails};
use crate::section::PipeSection;
use crate::traits::{LossCalculator, SectionContext};
use pf_core::units::constants::INCH_M;

/// `K1/Re + K∞·(1 + 1/D_in)`.
pub fn two_k(k1: f64, k_inf: f64, re: f64, diameter_in: f64) -> f64 {
    k1 / re + k_inf * (1.0 + 1.0 / diameter_in)
}

/// Sudden/conical contraction, K on the upstream (large-bore) velocity.
pub fn reducer_k(beta: f64, re1: f64, f1: f64) -> f64 {
    let b2 = beta * beta;
    if re1 <= 2500.0 {
        (1.2 + 160.0 / re1) * (1.0 / (b2 * b2) - 1.0)
    } else {
        (0.6 + 0.48 * f1) * (1.0 / b2) * (1.0 / b2 - 1.0)
    }
}

/// Sudden expansion, K on the upstream (small-bore) velocity.
pub fn expander_k(beta: f64, re1: f64, f1: f64) -> f64 {
    let b2 = beta * beta;
    if re1 <= 4000.0 {
        2.0 * (1.0 - b2 * b2)
    } else {
        (1.0 + 0.8 * f1) * (1.0 - b2).powi(2)
    }
}

/// Swage between `upstream` and `downstream` bores, referenced to the pipe
/// velocity. Equal bores give zero.
pub fn swage_k(
    upstream: f64,
    downstream: f64,
    pipe: f64,
    re_pipe: f64,
    roughness: f64,
) -> ComponentResult<f64> {
    if (upstream - downstream).abs() <= DIAMETER_TOLERANCE {
        return Ok(0.0);
    }
    let re1 = re_pipe * pipe / upstream;
    let f1 = darcy_friction_factor(re1, roughness / upstream)?;
    let k_upstream = if upstream > downstream {
        reducer_k(downstream / upstream, re1, f1)
    } else {
        expander_k(upstream / downstream, re1, f1)
    };
    Ok(k_upstream * (pipe / upstream).powi(4))
}

/// K for one fitting of the given type in a section.
pub fn fitting_k(
    kind: FittingType,
    style: FittingStyle,
    section: &PipeSection,
    re: f64,
) -> ComponentResult<f64> {
    let d = section.diameter_m()?;
    let k = match kind {
        FittingType::PipeEntranceNormal => 160.0 / re + 0.5,
        FittingType::PipeEntranceRaise => 160.0 / re + 1.0,
        FittingType::PipeExit => 1.0,
        FittingType::InletSwage => {
            swage_k(section.inlet_diameter_m()?, d, d, re, section.roughness.value)?
        }
        FittingType::OutletSwage => {
            swage_k(d, section.outlet_diameter_m()?, d, re, section.roughness.value)?
        }
        _ => {
            let (k1, k_inf) = kind.two_k_constants(style).ok_or_else(|| {
                ComponentError::UnsupportedFitting {
                    what: format!("{kind} with style {style:?}"),
                }
            })?;
            two_k(k1, k_inf, re, d / INCH_M)
        }
    };
    check_finite(k, "fitting K")
}

/// Sums the count-weighted fitting K and records the breakdown.
#[derive(Debug, Clone, Copy, Default)]
pub struct FittingLossCalculator;

impl LossCalculator for FittingLossCalculator {
    fn name(&self) -> &str {
        "fittings"
    }

    fn calculate(
        &self,
        ctx: &SectionContext<'_>,
        details: &mut PressureDropDetails,
    ) -> ComponentResult<()> {
        let section = ctx.section;
        details.fitting_k = 0.0;
        details.fitting_breakdown.clear();
        if section.fittings.is_empty() {
            return Ok(());
        }

        let d = section.diameter_m()?;
        let mu = require_positive(ctx.fluid.viscosity.value, "fluid viscosity")?;
        let re = require_positive(reynolds(ctx.mass_flow, d, mu), "Reynolds number")?;

        for fitting in &section.fittings {
            let k_each = fitting_k(fitting.kind, section.fitting_style, section, re)?;
            let k_total = k_each * f64::from(fitting.count);
            details.fitting_k += k_total;
            details.fitting_breakdown.push(FittingContribution {
                kind: fitting.kind,
                count: fitting.count,
                k_each,
                k_total,
            });
        }
        details.reynolds_number.get_or_insert(re);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pf_core::units::{k, kg_per_m3, m, pa, pa_s};
    use pf_fluids::Fluid;

    fn water() -> Fluid {
        Fluid::liquid(k(293.15), pa(500_000.0), kg_per_m3(998.0), pa_s(1.0e-3))
    }

    #[test]
    fn breakdown_sums_to_fitting_k() {
        let section = PipeSection::new("s", m(50.0), m(0.1023))
            .with_fitting(FittingType::Elbow90, 4)
            .with_fitting(FittingType::GlobeValve, 1)
            .with_fitting(FittingType::PipeExit, 1);
        let fluid = water();
        let ctx = SectionContext::new(&section, &fluid, 10.0).unwrap();
        let mut details = PressureDropDetails::default();
        FittingLossCalculator.calculate(&ctx, &mut details).unwrap();

        let re = reynolds(10.0, 0.1023, 1.0e-3);
        let d_in = 0.1023 / INCH_M;
        let expected = 4.0 * two_k(800.0, 0.20, re, d_in) + two_k(1500.0, 4.0, re, d_in) + 1.0;
        assert_relative_eq!(details.fitting_k, expected, max_relative = 1e-12);

        let summed: f64 = details.fitting_breakdown.iter().map(|c| c.k_total).sum();
        assert_relative_eq!(summed, details.fitting_k, max_relative = 1e-12);
        assert_eq!(details.fitting_breakdown[0].count, 4);
    }

    #[test]
    fn entrance_is_closed_form() {
        let section = PipeSection::new("s", m(1.0), m(0.05));
        let style = FittingStyle::default();
        let k = fitting_k(FittingType::PipeEntranceNormal, style, &section, 1600.0).unwrap();
        assert_relative_eq!(k, 0.6, max_relative = 1e-12);
    }

    #[test]
    fn laminar_reducer_uses_beta_to_fourth() {
        // β = 0.5, Re₁ = 1600 → (1.2 + 0.1)(16 − 1)
        assert_relative_eq!(reducer_k(0.5, 1600.0, 0.04), 19.5, max_relative = 1e-12);
    }

    #[test]
    fn turbulent_expander() {
        // β = 0.5, f₁ = 0.02 → 1.016 · 0.5625
        assert_relative_eq!(expander_k(0.5, 1e5, 0.02), 0.5715, max_relative = 1e-12);
    }

    #[test]
    fn inlet_swage_referenced_to_pipe_velocity() {
        let section = PipeSection::new("s", m(10.0), m(0.1)).with_end_diameters(Some(m(0.2)), None);
        let re_pipe = 2e5;
        let k = fitting_k(FittingType::InletSwage, FittingStyle::default(), &section, re_pipe)
            .unwrap();

        let re1 = re_pipe * 0.1 / 0.2;
        let f1 = darcy_friction_factor(re1, section.roughness.value / 0.2).unwrap();
        let expected = reducer_k(0.5, re1, f1) * 0.5f64.powi(4);
        assert_relative_eq!(k, expected, max_relative = 1e-12);
    }

    #[test]
    fn equal_bores_have_no_swage_loss() {
        assert_eq!(swage_k(0.1, 0.1, 0.1, 1e5, 4.57e-5).unwrap(), 0.0);
    }

    #[test]
    fn no_fittings_leaves_zero() {
        let section = PipeSection::new("s", m(10.0), m(0.1));
        let fluid = water();
        let ctx = SectionContext::new(&section, &fluid, 1.0).unwrap();
        let mut details = PressureDropDetails::default();
        FittingLossCalculator.calculate(&ctx, &mut details).unwrap();
        assert_eq!(details.fitting_k, 0.0);
        assert!(details.fitting_breakdown.is_empty());
    }
}
