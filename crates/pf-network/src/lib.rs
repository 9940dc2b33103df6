//! pf-network: model layer for piping networks.
//!
//! Provides:
//! - `Network`: one fluid flowing through an ordered chain of `PipeSection`s
//! - `NetworkBuilder` that chains sections node to node
//! - `NetworkSystem`: bundles coupled through shared pressure nodes
//! - Validation and the network-level result records
//!
//! # Example
//!
//! ```
//! use pf_components::PipeSection;
//! use pf_core::units::{k, kg_per_m3, kgps, m, pa, pa_s};
//! use pf_fluids::Fluid;
//! use pf_network::NetworkBuilder;
//!
//! let water = Fluid::liquid(k(293.15), pa(4.0e5), kg_per_m3(998.0), pa_s(1.0e-3))
//!     .with_mass_flow(kgps(5.0));
//! let mut builder = NetworkBuilder::new("cooling water", water);
//! builder
//!     .add_section(PipeSection::new("P-1", m(50.0), m(0.1)))
//!     .add_section(PipeSection::new("P-2", m(20.0), m(0.1)));
//! let network = builder.build().unwrap();
//!
//! assert_eq!(network.node_ids().len(), 3);
//! ```

pub mod builder;
pub mod error;
pub mod network;
pub mod results;
pub mod system;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::NetworkBuilder;
pub use error::{NetResult, NetworkError};
pub use network::{Direction, GasFlowModel, Network, OutputUnits};
pub use results::{FlowSummary, NetworkResult, NetworkSystemResult};
pub use system::{
    NetworkBundle, NetworkSystem, SharedNodeGroup, SharedNodeMember, SystemSolverConfig,
};
