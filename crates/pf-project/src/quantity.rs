//! Numeric fields that may carry a unit.

use crate::{ConfigResult, ConfigurationError};
use pf_fluids::{Quantity, parse_quantity, to_si};
use serde::{Deserialize, Serialize};

/// A dimensional input in any of three spellings:
///
/// ```yaml
/// length: 100            # bare number, SI
/// length: {value: 328, unit: ft}
/// length: "328 ft"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuantityInput {
    Number(f64),
    Pair { value: f64, unit: String },
    Text(String),
}

impl QuantityInput {
    /// Value in the canonical SI unit of `quantity`.
    pub fn to_si(&self, quantity: Quantity, field: &str) -> ConfigResult<f64> {
        let unit_error = |source| ConfigurationError::Unit {
            field: field.to_string(),
            source,
        };
        match self {
            QuantityInput::Number(v) => Ok(*v),
            QuantityInput::Pair { value, unit } => {
                to_si(*value, unit, quantity).map_err(unit_error)
            }
            QuantityInput::Text(text) => parse_quantity(text, quantity).map_err(unit_error),
        }
    }
}

impl From<f64> for QuantityInput {
    fn from(v: f64) -> Self {
        QuantityInput::Number(v)
    }
}

/// Convert an optional input.
pub(crate) fn optional_si(
    input: &Option<QuantityInput>,
    quantity: Quantity,
    field: &str,
) -> ConfigResult<Option<f64>> {
    input.as_ref().map(|q| q.to_si(quantity, field)).transpose()
}
