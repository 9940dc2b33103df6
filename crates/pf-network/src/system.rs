//! Several networks coupled through shared pressure nodes.

use crate::error::{NetResult, NetworkError};
use crate::network::Network;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One network in a system plus its local-to-canonical node map.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkBundle {
    pub id: String,
    pub network: Network,
    /// Local node name → canonical shared-node id.
    pub node_map: BTreeMap<String, String>,
}

impl NetworkBundle {
    pub fn new(id: impl Into<String>, network: Network) -> Self {
        Self {
            id: id.into(),
            network,
            node_map: BTreeMap::new(),
        }
    }

    /// Canonical id for a local node, the local name itself when unmapped.
    pub fn canonical<'a>(&'a self, local: &'a str) -> &'a str {
        self.node_map.get(local).map(String::as_str).unwrap_or(local)
    }
}

/// A `(network, local node)` pair that participates in a shared node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedNodeMember {
    pub network: String,
    pub node: String,
}

impl SharedNodeMember {
    pub fn new(network: impl Into<String>, node: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            node: node.into(),
        }
    }
}

/// Nodes in different networks that must carry one pressure.
///
/// The first member is the leader: its computed pressure defines the
/// canonical value, and it is never overridden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedNodeGroup {
    pub id: String,
    pub members: Vec<SharedNodeMember>,
    /// Added to the canonical pressure for non-leader members, Pa.
    #[serde(default)]
    pub bias: f64,
}

impl SharedNodeGroup {
    pub fn new(id: impl Into<String>, members: Vec<SharedNodeMember>) -> Self {
        Self {
            id: id.into(),
            members,
            bias: 0.0,
        }
    }

    pub fn with_bias(mut self, bias: f64) -> Self {
        self.bias = bias;
        self
    }

    pub fn leader(&self) -> Option<&SharedNodeMember> {
        self.members.first()
    }

    pub fn followers(&self) -> impl Iterator<Item = &SharedNodeMember> {
        self.members.iter().skip(1)
    }
}

/// Outer-loop settings for the system solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemSolverConfig {
    pub max_iterations: usize,
    /// Largest canonical pressure change accepted as converged, Pa.
    pub tolerance: f64,
    /// Under-relaxation on the canonical update, in (0, 1].
    pub relaxation: f64,
    /// Solve the bundles of one iteration concurrently.
    pub parallel: bool,
}

impl Default for SystemSolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 25,
            tolerance: 1.0,
            relaxation: 1.0,
            parallel: true,
        }
    }
}

impl SystemSolverConfig {
    pub fn validate(&self) -> NetResult<()> {
        if self.max_iterations == 0 {
            return Err(NetworkError::InvalidValue {
                what: "system max_iterations",
                value: 0.0,
            });
        }
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(NetworkError::InvalidValue {
                what: "system tolerance",
                value: self.tolerance,
            });
        }
        if !(self.relaxation > 0.0 && self.relaxation <= 1.0) {
            return Err(NetworkError::InvalidValue {
                what: "system relaxation",
                value: self.relaxation,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NetworkSystem {
    pub bundles: Vec<NetworkBundle>,
    pub groups: Vec<SharedNodeGroup>,
    pub config: SystemSolverConfig,
}

impl NetworkSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bundle(mut self, bundle: NetworkBundle) -> Self {
        self.bundles.push(bundle);
        self
    }

    /// Register a shared node and record the mapping in each member bundle.
    pub fn with_group(mut self, group: SharedNodeGroup) -> Self {
        for member in &group.members {
            if let Some(bundle) = self.bundles.iter_mut().find(|b| b.id == member.network) {
                bundle
                    .node_map
                    .insert(member.node.clone(), group.id.clone());
            }
        }
        self.groups.push(group);
        self
    }

    pub fn with_config(mut self, config: SystemSolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn bundle(&self, id: &str) -> Option<&NetworkBundle> {
        self.bundles.iter().find(|b| b.id == id)
    }

    pub fn validate(&self) -> NetResult<()> {
        crate::validate::validate_system(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leader_is_first_member() {
        let g = SharedNodeGroup::new(
            "header",
            vec![
                SharedNodeMember::new("a", "out"),
                SharedNodeMember::new("b", "in"),
            ],
        );
        assert_eq!(g.leader().unwrap().network, "a");
        assert_eq!(g.followers().count(), 1);
    }

    #[test]
    fn default_config() {
        let c = SystemSolverConfig::default();
        assert_eq!(c.max_iterations, 25);
        assert_eq!(c.tolerance, 1.0);
        assert_eq!(c.relaxation, 1.0);
        assert!(c.parallel);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn relaxation_out_of_range_rejected() {
        let c = SystemSolverConfig {
            relaxation: 1.5,
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }
}
