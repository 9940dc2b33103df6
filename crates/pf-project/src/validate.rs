//! Structural checks on a parsed document, before unit conversion.

use crate::schema::{ConfigDocument, NetworkDef};
use std::collections::HashSet;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

pub fn validate_document(doc: &ConfigDocument) -> Result<(), ValidationError> {
    match (&doc.network, doc.networks.is_empty()) {
        (Some(_), false) => {
            return Err(ValidationError::InvalidValue {
                field: "network".into(),
                value: "network + networks".into(),
                reason: "use either a single network or a networks list".into(),
            });
        }
        (None, true) => {
            return Err(ValidationError::InvalidValue {
                field: "network".into(),
                value: "none".into(),
                reason: "document defines no network".into(),
            });
        }
        _ => {}
    }

    if let Some(network) = &doc.network {
        validate_network(network, "network")?;
        if !doc.shared_nodes.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "shared_nodes".into(),
                value: doc.shared_nodes.len().to_string(),
                reason: "shared nodes need a networks list".into(),
            });
        }
    }

    let mut bundle_ids = HashSet::new();
    for bundle in &doc.networks {
        if !bundle_ids.insert(bundle.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: bundle.id.clone(),
                context: "networks".into(),
            });
        }
        validate_network(&bundle.network, &format!("networks.{}", bundle.id))?;
    }

    let mut group_ids = HashSet::new();
    for group in &doc.shared_nodes {
        if !group_ids.insert(group.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: group.id.clone(),
                context: "shared_nodes".into(),
            });
        }
        if group.members.len() < 2 {
            return Err(ValidationError::InvalidValue {
                field: format!("shared_nodes.{}.members", group.id),
                value: group.members.len().to_string(),
                reason: "a shared node needs at least two members".into(),
            });
        }
        for member in &group.members {
            if !bundle_ids.contains(member.network.as_str()) {
                return Err(ValidationError::MissingReference {
                    id: member.network.clone(),
                    context: format!("shared_nodes.{}", group.id),
                });
            }
        }
    }

    Ok(())
}

fn validate_network(network: &NetworkDef, context: &str) -> Result<(), ValidationError> {
    let mut section_ids = HashSet::new();
    for section in &network.sections {
        if section.id.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: format!("{context}.sections.id"),
                value: String::new(),
                reason: "section id must not be empty".into(),
            });
        }
        if !section_ids.insert(section.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: section.id.clone(),
                context: format!("{context}.sections"),
            });
        }
        if let Some(sf) = section.piping_and_fitting_safety_factor {
            if sf < 0.0 {
                return Err(ValidationError::InvalidValue {
                    field: format!(
                        "{context}.sections.{}.piping_and_fitting_safety_factor",
                        section.id
                    ),
                    value: sf.to_string(),
                    reason: "must be non-negative".into(),
                });
            }
        }
        if section.fittings.iter().any(|f| f.count == 0) {
            return Err(ValidationError::InvalidValue {
                field: format!("{context}.sections.{}.fittings", section.id),
                value: "0".into(),
                reason: "fitting count must be at least one".into(),
            });
        }
    }
    Ok(())
}
