//! Unit-aware numeric input and output.
//!
//! Every dimensional value entering or leaving the engine passes through this
//! module. Conversions are affine, `si = value * scale + offset`, so gauge
//! pressures and temperature scales convert in both directions with the same
//! table.
//!
//! # Canonical units
//!
//! | quantity | canonical |
//! |---|---|
//! | Length | m |
//! | Pressure, PressureDifference | Pa |
//! | Temperature | K |
//! | Density | kg/m³ |
//! | Viscosity | Pa·s |
//! | MassFlow | kg/s |
//! | VolumeFlow | m³/s |
//! | MolarMass | kg/kmol |
//! | Velocity | m/s |
//! | Dimensionless | - |

use std::fmt;
use thiserror::Error;

/// Dimension/quantity family for a numeric input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantity {
    Length,
    /// Absolute pressure (gauge units are shifted by one atmosphere)
    Pressure,
    /// Pressure drop; gauge suffixes are meaningless here
    PressureDifference,
    Temperature,
    Density,
    Viscosity,
    MassFlow,
    VolumeFlow,
    MolarMass,
    Velocity,
    Dimensionless,
}

impl Quantity {
    /// Unit the engine stores this quantity in.
    pub fn canonical_unit(self) -> &'static str {
        match self {
            Self::Length => "m",
            Self::Pressure | Self::PressureDifference => "Pa",
            Self::Temperature => "K",
            Self::Density => "kg/m3",
            Self::Viscosity => "Pa.s",
            Self::MassFlow => "kg/s",
            Self::VolumeFlow => "m3/s",
            Self::MolarMass => "kg/kmol",
            Self::Velocity => "m/s",
            Self::Dimensionless => "",
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length => write!(f, "Length"),
            Self::Pressure => write!(f, "Absolute Pressure"),
            Self::PressureDifference => write!(f, "Pressure Difference"),
            Self::Temperature => write!(f, "Temperature"),
            Self::Density => write!(f, "Density"),
            Self::Viscosity => write!(f, "Viscosity"),
            Self::MassFlow => write!(f, "Mass Flow"),
            Self::VolumeFlow => write!(f, "Volumetric Flow"),
            Self::MolarMass => write!(f, "Molar Mass"),
            Self::Velocity => write!(f, "Velocity"),
            Self::Dimensionless => write!(f, "Dimensionless"),
        }
    }
}

/// Error in unit parsing or conversion.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnitError {
    /// Input text did not parse to a number + optional unit
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Unit not recognized for this quantity
    #[error("Unknown unit '{unit}' for {quantity}")]
    UnknownUnit { unit: String, quantity: Quantity },
    /// Unit not allowed for this quantity (e.g., plain "psi" for absolute pressure)
    #[error("Ambiguous unit '{unit}': {reason}")]
    AmbiguousUnit { unit: String, reason: String },
    /// Value out of physical range (e.g., negative absolute temperature)
    #[error("Value {value} out of range: {reason}")]
    OutOfRange { value: f64, reason: String },
}

const ATM_PA: f64 = 101_325.0;
const PSI_PA: f64 = 6_894.757_293;
const KGF_CM2_PA: f64 = 98_066.5;
const FT_M: f64 = 0.3048;
const IN_M: f64 = 0.0254;
const LBM_KG: f64 = 0.453_592_37;
const US_GAL_M3: f64 = 3.785_411_784e-3;
const BBL_M3: f64 = 0.158_987_294_928;

/// Affine map `si = value * scale + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Affine {
    scale: f64,
    offset: f64,
}

const fn linear(scale: f64) -> Affine {
    Affine { scale, offset: 0.0 }
}

/// Normalize a unit label: lowercase, no spaces, plain-ASCII exponents.
fn normalize(unit: &str) -> String {
    unit.trim()
        .to_lowercase()
        .replace(' ', "")
        .replace('³', "3")
        .replace('²', "2")
        .replace('^', "")
        .replace('·', ".")
        .replace('*', ".")
        .replace('°', "")
}

fn affine_for(unit: &str, quantity: Quantity) -> Result<Affine, UnitError> {
    let key = normalize(unit);
    let unknown = || UnitError::UnknownUnit {
        unit: unit.to_string(),
        quantity,
    };

    let map = match quantity {
        Quantity::Length => match key.as_str() {
            "" | "m" | "meter" | "metre" => linear(1.0),
            "mm" => linear(1e-3),
            "cm" => linear(1e-2),
            "km" => linear(1e3),
            "in" | "inch" | "\"" => linear(IN_M),
            "ft" | "feet" | "foot" => linear(FT_M),
            "mi" | "mile" => linear(1_609.344),
            _ => return Err(unknown()),
        },
        Quantity::Pressure => match key.as_str() {
            "" | "pa" | "pascal" | "pa(a)" => linear(1.0),
            "kpa" | "kpaa" | "kpa(a)" => linear(1e3),
            "mpa" | "mpaa" => linear(1e6),
            "bar" | "bara" | "bar(a)" => linear(1e5),
            "mbar" | "mbara" => linear(100.0),
            "atm" => linear(ATM_PA),
            "torr" | "mmhg" => linear(ATM_PA / 760.0),
            "psia" => linear(PSI_PA),
            "kg/cm2" | "kgf/cm2" | "kg/cm2a" => linear(KGF_CM2_PA),
            "barg" | "bar(g)" => Affine {
                scale: 1e5,
                offset: ATM_PA,
            },
            "kpag" | "kpa(g)" => Affine {
                scale: 1e3,
                offset: ATM_PA,
            },
            "mpag" => Affine {
                scale: 1e6,
                offset: ATM_PA,
            },
            "psig" => Affine {
                scale: PSI_PA,
                offset: ATM_PA,
            },
            "kg/cm2g" | "kgf/cm2g" => Affine {
                scale: KGF_CM2_PA,
                offset: ATM_PA,
            },
            "psi" => {
                return Err(UnitError::AmbiguousUnit {
                    unit: unit.to_string(),
                    reason: "Use 'psia' (absolute) or 'psig' (gauge)".to_string(),
                });
            }
            _ => return Err(unknown()),
        },
        Quantity::PressureDifference => match key.as_str() {
            "" | "pa" | "pascal" => linear(1.0),
            "kpa" => linear(1e3),
            "mpa" => linear(1e6),
            "bar" => linear(1e5),
            "mbar" => linear(100.0),
            "atm" => linear(ATM_PA),
            "psi" | "psid" => linear(PSI_PA),
            "kg/cm2" | "kgf/cm2" => linear(KGF_CM2_PA),
            "mh2o" | "mwc" => linear(9_806.65),
            "inh2o" => linear(249.088_9),
            _ => return Err(unknown()),
        },
        Quantity::Temperature => match key.as_str() {
            "" | "k" | "kelvin" => linear(1.0),
            "c" | "degc" | "celsius" => Affine {
                scale: 1.0,
                offset: 273.15,
            },
            "f" | "degf" | "fahrenheit" => Affine {
                scale: 5.0 / 9.0,
                offset: 459.67 * 5.0 / 9.0,
            },
            "r" | "degr" | "rankine" => linear(5.0 / 9.0),
            _ => return Err(unknown()),
        },
        Quantity::Density => match key.as_str() {
            "" | "kg/m3" => linear(1.0),
            "g/cm3" | "g/ml" | "kg/l" => linear(1e3),
            "g/l" => linear(1.0),
            "lb/ft3" | "lbm/ft3" => linear(LBM_KG / FT_M.powi(3)),
            _ => return Err(unknown()),
        },
        Quantity::Viscosity => match key.as_str() {
            "" | "pa.s" | "pas" | "n.s/m2" => linear(1.0),
            "mpa.s" | "mpas" | "cp" | "centipoise" => linear(1e-3),
            "upa.s" | "μpa.s" => linear(1e-6),
            "p" | "poise" => linear(0.1),
            "lb/ft.s" | "lbm/ft.s" => linear(LBM_KG / FT_M),
            _ => return Err(unknown()),
        },
        Quantity::MassFlow => match key.as_str() {
            "" | "kg/s" => linear(1.0),
            "kg/min" => linear(1.0 / 60.0),
            "kg/h" | "kg/hr" => linear(1.0 / 3_600.0),
            "t/h" | "tonne/h" | "t/hr" => linear(1_000.0 / 3_600.0),
            "t/d" | "tonne/d" => linear(1_000.0 / 86_400.0),
            "lb/s" | "lbm/s" => linear(LBM_KG),
            "lb/h" | "lb/hr" | "lbm/h" | "lbm/hr" => linear(LBM_KG / 3_600.0),
            "g/s" => linear(1e-3),
            _ => return Err(unknown()),
        },
        Quantity::VolumeFlow => match key.as_str() {
            "" | "m3/s" => linear(1.0),
            "m3/min" => linear(1.0 / 60.0),
            "m3/h" | "m3/hr" | "nm3/h" | "nm3/hr" | "sm3/h" | "sm3/hr" => linear(1.0 / 3_600.0),
            "m3/d" | "sm3/d" | "nm3/d" => linear(1.0 / 86_400.0),
            "l/s" => linear(1e-3),
            "l/min" => linear(1e-3 / 60.0),
            "l/h" => linear(1e-3 / 3_600.0),
            "gpm" | "usgpm" => linear(US_GAL_M3 / 60.0),
            "bbl/d" | "bpd" => linear(BBL_M3 / 86_400.0),
            "ft3/s" | "cfs" => linear(FT_M.powi(3)),
            "ft3/min" | "cfm" | "scfm" => linear(FT_M.powi(3) / 60.0),
            "mmscfd" => linear(1e6 * FT_M.powi(3) / 86_400.0),
            _ => return Err(unknown()),
        },
        Quantity::MolarMass => match key.as_str() {
            "" | "kg/kmol" | "g/mol" | "lb/lbmol" | "lbm/lbmol" => linear(1.0),
            "kg/mol" => linear(1e3),
            _ => return Err(unknown()),
        },
        Quantity::Velocity => match key.as_str() {
            "" | "m/s" => linear(1.0),
            "ft/s" => linear(FT_M),
            "km/h" => linear(1.0 / 3.6),
            "m/min" => linear(1.0 / 60.0),
            _ => return Err(unknown()),
        },
        Quantity::Dimensionless => match key.as_str() {
            "" | "-" | "fraction" | "ratio" => linear(1.0),
            "%" | "percent" => linear(0.01),
            _ => return Err(unknown()),
        },
    };
    Ok(map)
}

/// Convert a magnitude expressed in `unit` to the canonical unit of `quantity`.
pub fn to_si(value: f64, unit: &str, quantity: Quantity) -> Result<f64, UnitError> {
    if !value.is_finite() {
        return Err(UnitError::OutOfRange {
            value,
            reason: "value must be finite".to_string(),
        });
    }
    let map = affine_for(unit, quantity)?;
    let si = value * map.scale + map.offset;

    if quantity == Quantity::Temperature && si <= 0.0 {
        return Err(UnitError::OutOfRange {
            value: si,
            reason: "Absolute temperature must be > 0 K".to_string(),
        });
    }
    if quantity == Quantity::Pressure && si < 0.0 {
        return Err(UnitError::OutOfRange {
            value: si,
            reason: "Absolute pressure cannot be negative".to_string(),
        });
    }
    Ok(si)
}

/// Express a canonical value in `unit`; the inverse of [`to_si`].
pub fn convert_from_si(si_value: f64, unit: &str, quantity: Quantity) -> Result<f64, UnitError> {
    let map = affine_for(unit, quantity)?;
    Ok((si_value - map.offset) / map.scale)
}

/// Parse a quantity value from user input text such as `"14.7 psia"`,
/// `"3 in"` or `"300"` (no unit means canonical).
pub fn parse_quantity(raw_text: &str, quantity: Quantity) -> Result<f64, UnitError> {
    let (value, unit) = split_value_and_unit(raw_text)?;
    to_si(value, &unit, quantity)
}

/// Split a value+unit string into (numeric_value, unit_string).
///
/// Examples:
/// - "70F" -> (70.0, "F")
/// - "14.7 psia" -> (14.7, "psia")
/// - "1.5e5 Pa" -> (150000.0, "Pa")
/// - "300" -> (300.0, "")
pub fn split_value_and_unit(input: &str) -> Result<(f64, String), UnitError> {
    let trimmed = input.trim();

    // Numeric prefix: digits, sign, decimal point and an exponent only when
    // it is followed by a digit or sign (so "5 ft" keeps its unit).
    let bytes = trimmed.as_bytes();
    let mut split_idx = 0;
    while split_idx < bytes.len() {
        let c = bytes[split_idx] as char;
        let is_exponent = (c == 'e' || c == 'E')
            && split_idx > 0
            && bytes
                .get(split_idx + 1)
                .map(|n| (*n as char).is_ascii_digit() || *n == b'-' || *n == b'+')
                .unwrap_or(false);
        if c.is_ascii_digit() || c == '.' || c == '-' || c == '+' || is_exponent {
            split_idx += 1;
        } else {
            break;
        }
    }

    let (num_part, unit_part) = trimmed.split_at(split_idx);
    let num_part = num_part.trim();
    let unit_part = unit_part.trim();

    let value: f64 = num_part.parse().map_err(|_| {
        UnitError::ParseError(format!("Could not parse numeric value from '{}'", input))
    })?;

    Ok((value, unit_part.to_string()))
}
