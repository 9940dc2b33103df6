//! Static head and user-specified fixed losses.

use crate::common::check_finite;
use crate::error::ComponentResult;
use crate::results::PressureDropDetails;
use crate::section::PipeSection;
use crate::traits::{LossCalculator, SectionContext};
use pf_core::units::constants::G0_MPS2;

/// Hydrostatic `ρ·g·Δz` for liquids; zero for gas and vapor.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElevationCalculator;

impl LossCalculator for ElevationCalculator {
    fn name(&self) -> &str {
        "elevation"
    }

    fn calculate(
        &self,
        ctx: &SectionContext<'_>,
        details: &mut PressureDropDetails,
    ) -> ComponentResult<()> {
        details.elevation_change = if ctx.fluid.is_compressible() {
            0.0
        } else {
            check_finite(
                ctx.density * G0_MPS2 * ctx.section.elevation_change.value,
                "elevation change",
            )?
        };
        details.recompute_total();
        Ok(())
    }
}

/// Copies the section's fixed loss into the breakdown.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserFixedLossCalculator;

impl LossCalculator for UserFixedLossCalculator {
    fn name(&self) -> &str {
        "user_fixed_loss"
    }

    fn applies(&self, section: &PipeSection) -> bool {
        section.user_specified_fixed_loss.is_some()
    }

    fn calculate(
        &self,
        ctx: &SectionContext<'_>,
        details: &mut PressureDropDetails,
    ) -> ComponentResult<()> {
        details.user_specified_fixed_loss = match ctx.section.user_specified_fixed_loss {
            Some(loss) => check_finite(loss.value, "user specified fixed loss")?,
            None => 0.0,
        };
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

    #[test]
    fn uphill_liquid_adds_head() {
        let section = PipeSection::new("riser", m(20.0), m(0.1)).with_elevation_change(m(10.0));
        let fluid = Fluid::liquid(k(293.15), pa(3e5), kg_per_m3(1000.0), pa_s(1e-3));
        let ctx = SectionContext::new(&section, &fluid, 1.0).unwrap();
        let mut details = PressureDropDetails::default();
        ElevationCalculator.calculate(&ctx, &mut details).unwrap();
        assert_relative_eq!(details.elevation_change, 98_066.5, max_relative = 1e-12);
        assert_relative_eq!(details.total_segment_loss, 98_066.5, max_relative = 1e-12);
    }

    #[test]
    fn downhill_is_negative() {
        let section = PipeSection::new("drop", m(20.0), m(0.1)).with_elevation_change(m(-2.0));
        let fluid = Fluid::liquid(k(293.15), pa(3e5), kg_per_m3(800.0), pa_s(1e-3));
        let ctx = SectionContext::new(&section, &fluid, 1.0).unwrap();
        let mut details = PressureDropDetails::default();
        ElevationCalculator.calculate(&ctx, &mut details).unwrap();
        assert!(details.elevation_change < 0.0);
    }

    #[test]
    fn gas_has_no_static_head() {
        let section = PipeSection::new("g", m(20.0), m(0.1)).with_elevation_change(m(100.0));
        let fluid = Fluid::gas(k(300.0), pa(5e5), kg_per_kmol(28.97), pa_s(1.8e-5));
        let ctx = SectionContext::new(&section, &fluid, 1.0).unwrap();
        let mut details = PressureDropDetails::default();
        ElevationCalculator.calculate(&ctx, &mut details).unwrap();
        assert_eq!(details.elevation_change, 0.0);
    }

    #[test]
    fn fixed_loss_is_copied() {
        let section = PipeSection::new("s", m(1.0), m(0.1)).with_fixed_loss(pa(2_500.0));
        let fluid = Fluid::liquid(k(293.15), pa(3e5), kg_per_m3(1000.0), pa_s(1e-3));
        let ctx = SectionContext::new(&section, &fluid, 1.0).unwrap();
        let mut details = PressureDropDetails::default();
        assert!(UserFixedLossCalculator.applies(&section));
        UserFixedLossCalculator.calculate(&ctx, &mut details).unwrap();
        assert_eq!(details.user_specified_fixed_loss, 2_500.0);
    }
}
