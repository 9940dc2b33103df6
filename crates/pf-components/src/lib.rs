//! pf-components: section model and loss calculators for piping networks.
//!
//! Provides:
//! - `PipeSection` with fittings, control valve and orifice
//! - Friction (Darcy-Weisbach, Serghide) and 2-K fitting losses
//! - Elevation and user-specified fixed losses
//! - IEC 60534 control valve sizing/rating
//! - ISO 5167-2 orifice plates
//!
//! Every calculator implements [`LossCalculator`] and writes only its own
//! fields of [`PressureDropDetails`], so the network solver can run them in
//! a fixed order and re-run the pressure-dependent ones as pressures change.
//!
//! # Example
//!
//! ```no_run
//! use pf_components::{
//!     FittingLossCalculator, FittingType, FrictionCalculator, LossCalculator, PipeSection,
//!     PressureDropDetails, SectionContext,
//! };
//! use pf_core::units::{k, kg_per_m3, m, pa, pa_s};
//! use pf_fluids::Fluid;
//!
//! let water = Fluid::liquid(k(293.15), pa(400_000.0), kg_per_m3(998.0), pa_s(1.0e-3));
//! let section = PipeSection::new("P-101", m(100.0), m(0.1023))
//!     .with_fitting(FittingType::Elbow90, 4);
//!
//! let ctx = SectionContext::new(&section, &water, 10.0).unwrap();
//! let mut details = PressureDropDetails::default();
//! FittingLossCalculator.calculate(&ctx, &mut details).unwrap();
//! FrictionCalculator::default().calculate(&ctx, &mut details).unwrap();
//! println!("ΔP = {:.0} Pa", details.total_segment_loss);
//! ```

pub mod common;
pub mod elevation;
pub mod error;
pub mod fitting;
pub mod orifice;
pub mod pipe;
pub mod results;
pub mod section;
pub mod traits;
pub mod two_k;
pub mod valve;

// Re-exports
pub use elevation::{ElevationCalculator, UserFixedLossCalculator};
pub use error::{ComponentError, ComponentResult};
pub use fitting::{Fitting, FittingStyle, FittingType};
pub use orifice::{Orifice, OrificeCalculator, OrificeTaps};
pub use pipe::{FrictionCalculator, FrictionFactor, FrictionFactorType, darcy_friction_factor};
pub use results::{
    FittingContribution, FlowScheme, PressureDropDetails, ResultSummary, SectionResult,
    StatePoint,
};
pub use section::PipeSection;
pub use traits::{LossCalculator, SectionContext};
pub use two_k::FittingLossCalculator;
pub use valve::{ControlValve, ControlValveCalculator, ValveMode};
