//! Incremental network builder.

use pf_components::PipeSection;
use pf_fluids::Fluid;

use crate::error::NetResult;
use crate::network::Network;

/// Builder for assembling a network section by section.
///
/// Sections that still carry their default node names (`<id>:in`,
/// `<id>:out`) are chained onto the previous section's end node, so a plain
/// list of sections forms a series line. Call `build()` to validate.
#[derive(Debug)]
pub struct NetworkBuilder {
    network: Network,
}

impl NetworkBuilder {
    pub fn new(name: impl Into<String>, fluid: Fluid) -> Self {
        Self {
            network: Network::new(name, fluid),
        }
    }

    /// Start from an existing network's settings and sections.
    pub fn from_network(network: Network) -> Self {
        Self { network }
    }

    /// Append a section, linking its start to the previous section's end.
    pub fn add_section(&mut self, mut section: PipeSection) -> &mut Self {
        if let Some(prev) = self.network.sections.last() {
            if section.start_node == default_start(&section.id) {
                section.start_node = prev.end_node.clone();
            }
        }
        self.network.sections.push(section);
        self
    }

    /// Rename a node everywhere it appears.
    pub fn rename_node(&mut self, old: &str, new: impl Into<String>) -> &mut Self {
        let new = new.into();
        for section in &mut self.network.sections {
            if section.start_node == old {
                section.start_node = new.clone();
            }
            if section.end_node == old {
                section.end_node = new.clone();
            }
        }
        self
    }

    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    /// Validate and return the finished network.
    pub fn build(self) -> NetResult<Network> {
        self.network.validate()?;
        Ok(self.network)
    }
}

fn default_start(id: &str) -> String {
    format!("{id}:in")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::units::{k, kg_per_m3, kgps, m, pa, pa_s};

    fn water() -> Fluid {
        Fluid::liquid(k(293.15), pa(4e5), kg_per_m3(998.0), pa_s(1e-3)).with_mass_flow(kgps(5.0))
    }

    #[test]
    fn builder_chains_default_nodes() {
        let mut builder = NetworkBuilder::new("line", water());
        builder
            .add_section(PipeSection::new("a", m(10.0), m(0.1)))
            .add_section(PipeSection::new("b", m(10.0), m(0.1)));
        let net = builder.build().unwrap();
        assert_eq!(net.sections[1].start_node, "a:out");
        assert_eq!(net.node_ids(), vec!["a:in", "a:out", "b:out"]);
    }

    #[test]
    fn builder_keeps_explicit_nodes() {
        let mut builder = NetworkBuilder::new("line", water());
        builder
            .add_section(PipeSection::new("a", m(10.0), m(0.1)).with_nodes("x", "y"))
            .add_section(PipeSection::new("b", m(10.0), m(0.1)).with_nodes("y", "z"));
        let net = builder.build().unwrap();
        assert_eq!(net.node_ids(), vec!["x", "y", "z"]);
    }

    #[test]
    fn builder_rename() {
        let mut builder = NetworkBuilder::new("line", water());
        builder
            .add_section(PipeSection::new("a", m(10.0), m(0.1)))
            .add_section(PipeSection::new("b", m(10.0), m(0.1)))
            .rename_node("a:out", "header");
        let net = builder.build().unwrap();
        assert_eq!(net.sections[0].end_node, "header");
        assert_eq!(net.sections[1].start_node, "header");
    }

    #[test]
    fn empty_network_fails_to_build() {
        assert!(NetworkBuilder::new("empty", water()).build().is_err());
    }
}
