//! Steady-state pressure solver for piping networks.
//!
//! [`NetworkSolver`] walks one network's section chain from its known
//! boundary, evaluating the static losses of every section, the
//! pressure-dependent device losses at the actual inlet pressure, and the
//! compressible pipe run for gas. [`NetworkSystemSolver`] couples several
//! networks through shared nodes with an outer fixed-point loop.
//!
//! # Example
//!
//! ```
//! use pf_components::PipeSection;
//! use pf_core::units::{k, kg_per_m3, kgps, m, pa, pa_s};
//! use pf_fluids::Fluid;
//! use pf_network::NetworkBuilder;
//! use pf_solver::NetworkSolver;
//!
//! let water = Fluid::liquid(k(293.15), pa(4.0e5), kg_per_m3(998.0), pa_s(1.0e-3))
//!     .with_mass_flow(kgps(5.0));
//! let mut builder = NetworkBuilder::new("cooling water", water);
//! builder.add_section(PipeSection::new("P-1", m(50.0), m(0.1)));
//! let network = builder.build().unwrap().with_upstream_pressure(pa(4.0e5));
//!
//! let result = NetworkSolver::default().run(&network).unwrap();
//! let outlet = result.summary.outlet.pressure.unwrap();
//! assert!(outlet < 4.0e5);
//! ```

pub mod error;
pub mod gas_flow;
pub mod network;
pub mod state;
pub mod system;

pub use error::{SolverError, SolverResult};
pub use gas_flow::{
    GasFlowError, GasFlowOutcome, GasFlowResult, GasPipe, GasState, IsothermalConfig, March,
    solve_adiabatic, solve_isothermal,
};
pub use network::{NetworkSolver, NodePressures, SolverConfig};
pub use system::NetworkSystemSolver;
