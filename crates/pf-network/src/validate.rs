//! Network and system validation logic.

use std::collections::{BTreeMap, HashSet};

use pf_core::units::Pressure;

use crate::error::{NetResult, NetworkError};
use crate::network::Network;
use crate::system::NetworkSystem;

/// Validate a single network: fluid, flow basis, sections, boundary pressures.
pub(crate) fn validate_network(network: &Network) -> NetResult<()> {
    if network.sections.is_empty() {
        return Err(NetworkError::Empty {
            network: network.name.clone(),
        });
    }

    network.fluid.validate()?;
    network.fluid.mass_flow_kgps()?;

    for (what, p) in [
        ("boundary pressure", network.boundary_pressure),
        ("upstream pressure", network.upstream_pressure),
        ("downstream pressure", network.downstream_pressure),
    ] {
        check_pressure(what, p)?;
    }

    // Section ids must be unique
    let mut ids = HashSet::new();
    for section in &network.sections {
        if !ids.insert(section.id.as_str()) {
            return Err(NetworkError::DuplicateSection {
                id: section.id.clone(),
            });
        }
        section.validate().map_err(|source| NetworkError::Section {
            section_id: section.id.clone(),
            source,
        })?;
        check_pressure("section boundary pressure", section.boundary_pressure)?;
    }

    Ok(())
}

fn check_pressure(what: &'static str, p: Option<Pressure>) -> NetResult<()> {
    match p {
        Some(p) if !(p.value > 0.0 && p.value.is_finite()) => {
            Err(NetworkError::InvalidValue { what, value: p.value })
        }
        _ => Ok(()),
    }
}

/// Validate bundles, shared-node groups and the outer-loop settings.
pub(crate) fn validate_system(system: &NetworkSystem) -> NetResult<()> {
    system.config.validate()?;

    let mut bundle_ids = HashSet::new();
    for bundle in &system.bundles {
        if !bundle_ids.insert(bundle.id.as_str()) {
            return Err(NetworkError::DuplicateBundle {
                id: bundle.id.clone(),
            });
        }
        validate_network(&bundle.network)?;
    }

    // Each (network, node) may belong to one group only
    let mut owner: BTreeMap<(&str, &str), &str> = BTreeMap::new();
    for group in &system.groups {
        if group.members.is_empty() {
            return Err(NetworkError::EmptyGroup {
                group: group.id.clone(),
            });
        }
        if !group.bias.is_finite() {
            return Err(NetworkError::InvalidValue {
                what: "shared node bias",
                value: group.bias,
            });
        }
        for member in &group.members {
            let bundle = system.bundle(&member.network).ok_or_else(|| {
                NetworkError::UnknownNetwork {
                    group: group.id.clone(),
                    network: member.network.clone(),
                }
            })?;
            if !bundle.network.has_node(&member.node) {
                return Err(NetworkError::UnknownNode {
                    group: group.id.clone(),
                    network: member.network.clone(),
                    node: member.node.clone(),
                });
            }
            let key = (member.network.as_str(), member.node.as_str());
            if let Some(existing) = owner.insert(key, group.id.as_str()) {
                if existing != group.id {
                    return Err(NetworkError::NodeInTwoGroups {
                        network: member.network.clone(),
                        node: member.node.clone(),
                    });
                }
            }
        }
    }

    Ok(())
}
