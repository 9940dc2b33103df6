//! Coupled solve of several networks through shared pressure nodes.
//!
//! Each outer iteration solves every bundle with the non-leader members of
//! each shared node pinned at `canonical + bias`, then moves each canonical
//! pressure toward its leader's computed value. Bundles within an iteration
//! are independent, so they run on rayon when the configuration allows.

use crate::error::SolverResult;
use crate::network::{NetworkSolver, NodePressures};
use pf_network::{NetworkBundle, NetworkResult, NetworkSystem, NetworkSystemResult};
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct NetworkSystemSolver {
    solver: NetworkSolver,
}

impl NetworkSystemSolver {
    /// Uses `solver` for every bundle.
    pub fn new(solver: NetworkSolver) -> Self {
        Self { solver }
    }

    pub fn run(&self, system: &NetworkSystem) -> SolverResult<NetworkSystemResult> {
        system.validate()?;
        let config = system.config;

        let mut canonical: BTreeMap<String, f64> = BTreeMap::new();
        let mut results: Vec<NetworkResult> = Vec::new();
        let mut converged = false;
        let mut iterations = 0;
        let mut max_delta = 0.0_f64;

        for iteration in 1..=config.max_iterations {
            iterations = iteration;
            let overrides: Vec<NodePressures> = system
                .bundles
                .iter()
                .map(|bundle| follower_overrides(system, bundle, &canonical))
                .collect();

            results = if config.parallel {
                system
                    .bundles
                    .par_iter()
                    .zip(overrides.par_iter())
                    .map(|(bundle, pins)| self.solver.run_with_overrides(&bundle.network, pins))
                    .collect::<SolverResult<Vec<_>>>()?
            } else {
                system
                    .bundles
                    .iter()
                    .zip(&overrides)
                    .map(|(bundle, pins)| self.solver.run_with_overrides(&bundle.network, pins))
                    .collect::<SolverResult<Vec<_>>>()?
            };

            max_delta = 0.0;
            let mut settled = true;
            let solved = system.bundles.iter().zip(&overrides).zip(&mut results);
            for ((bundle, pins), result) in solved {
                for (node, &pin) in pins {
                    if !pin_honoured(result, bundle, node, pin, config.tolerance) {
                        warn!(network = %bundle.id, %node, pin, "shared node pin not applied");
                        result
                            .warnings
                            .push(format!("shared node '{node}' not held at {pin:.1} Pa"));
                        settled = false;
                    }
                }
            }
            for group in &system.groups {
                let Some(leader) = group.leader() else {
                    continue;
                };
                let computed = system
                    .bundles
                    .iter()
                    .position(|b| b.id == leader.network)
                    .and_then(|idx| {
                        let sections = &system.bundles[idx].network.sections;
                        results[idx].node_pressure(&leader.node, sections)
                    });
                let Some(computed) = computed else {
                    warn!(group = %group.id, "leader pressure unavailable");
                    settled = false;
                    continue;
                };

                let (next, delta) = match canonical.get(&group.id) {
                    Some(&old) => {
                        let next = old + config.relaxation * (computed - old);
                        (next, (next - old).abs())
                    }
                    None => {
                        settled = false;
                        (computed, computed.abs())
                    }
                };
                max_delta = max_delta.max(delta);
                canonical.insert(group.id.clone(), next);
            }
            debug!(iteration, max_delta, "system iteration");

            if settled && max_delta <= config.tolerance {
                converged = true;
                info!(iterations = iteration, max_delta, "network system converged");
                break;
            }
        }

        if !converged {
            warn!(
                iterations,
                max_delta, "network system did not converge; returning last iterate"
            );
        }

        let networks = system
            .bundles
            .iter()
            .map(|b| b.id.clone())
            .zip(results)
            .collect();
        Ok(NetworkSystemResult {
            networks,
            node_pressures: canonical,
            iterations,
            converged,
            max_delta,
        })
    }
}

/// Whether the solved network carries `pin` at `node`.
fn pin_honoured(
    result: &NetworkResult,
    bundle: &NetworkBundle,
    node: &str,
    pin: f64,
    tolerance: f64,
) -> bool {
    result
        .node_pressure(node, &bundle.network.sections)
        .is_some_and(|p| (p - pin).abs() <= tolerance)
}

/// Pins for one bundle: every non-leader member it owns, at
/// `canonical + bias`, once the group has a canonical value.
fn follower_overrides(
    system: &NetworkSystem,
    bundle: &NetworkBundle,
    canonical: &BTreeMap<String, f64>,
) -> NodePressures {
    let mut pins = NodePressures::new();
    for group in &system.groups {
        let Some(&value) = canonical.get(&group.id) else {
            continue;
        };
        for member in group.followers().filter(|m| m.network == bundle.id) {
            pins.insert(member.node.clone(), value + group.bias);
        }
    }
    pins
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_network::{Network, SharedNodeGroup, SharedNodeMember};
    use pf_core::units::{k, kg_per_m3, pa, pa_s};
    use pf_fluids::Fluid;

    fn empty_network(name: &str) -> Network {
        Network::new(name, Fluid::liquid(k(293.15), pa(1e5), kg_per_m3(998.0), pa_s(1e-3)))
    }

    #[test]
    fn followers_get_canonical_plus_bias() {
        let system = NetworkSystem::new()
            .with_bundle(NetworkBundle::new("a", empty_network("a")))
            .with_bundle(NetworkBundle::new("b", empty_network("b")))
            .with_group(
                SharedNodeGroup::new(
                    "header",
                    vec![
                        SharedNodeMember::new("a", "out"),
                        SharedNodeMember::new("b", "in"),
                    ],
                )
                .with_bias(-500.0),
            );
        let mut canonical = BTreeMap::new();
        canonical.insert("header".to_string(), 3.0e5);

        let a = follower_overrides(&system, &system.bundles[0], &canonical);
        let b = follower_overrides(&system, &system.bundles[1], &canonical);
        assert!(a.is_empty());
        assert_eq!(b.get("in"), Some(&299_500.0));

        let none = follower_overrides(&system, &system.bundles[1], &BTreeMap::new());
        assert!(none.is_empty());
    }
}
