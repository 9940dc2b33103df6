//! pf-fluids: fluid description and unit handling for pipeflow.
//!
//! Provides:
//! - `Fluid`: phase, state, transport properties and flow basis of the
//!   stream carried by a network
//! - real-gas density and speed of sound for gas/vapor phases
//! - unit-aware quantity parsing and conversion shared by the loader and
//!   result presentation
//!
//! # Example
//!
//! ```
//! use pf_fluids::Fluid;
//! use pf_core::units::{k, pa, pa_s, kg_per_kmol, kgps};
//!
//! let air = Fluid::gas(k(300.0), pa(500_000.0), kg_per_kmol(28.97), pa_s(1.8e-5))
//!     .with_mass_flow(kgps(1.0));
//! let rho = air.density().unwrap();
//! assert!(rho > 5.0 && rho < 6.0);
//! ```

pub mod error;
pub mod fluid;
pub mod units;

// Re-exports for ergonomics
pub use error::{FluidError, FluidResult};
pub use fluid::{Fluid, Phase};
pub use units::{
    Quantity, UnitError, convert_from_si, parse_quantity, split_value_and_unit, to_si,
};
