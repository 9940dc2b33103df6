//! Common utilities for section calculations.

use crate::error::{ComponentError, ComponentResult};
use std::f64::consts::PI;

/// Lowest absolute pressure the calculators will bracket down to (Pa).
pub const MIN_PRESSURE: f64 = 1.0;

/// Diameters closer than this are treated as equal (m).
pub const DIAMETER_TOLERANCE: f64 = 1e-6;

/// Laminar/turbulent switch for the friction correlation.
pub const LAMINAR_REYNOLDS_LIMIT: f64 = 2100.0;

/// Fully turbulent above this Reynolds number (reporting only).
pub const TURBULENT_REYNOLDS_LIMIT: f64 = 4000.0;

/// Ensure a value is finite and strictly positive.
pub fn require_positive(value: f64, what: &'static str) -> ComponentResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ComponentError::Validation { what, value })
    }
}

/// Ensure a value is finite, returning ComponentError if not.
pub fn check_finite(value: f64, what: &'static str) -> ComponentResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ComponentError::Validation { what, value })
    }
}

/// Circular flow area, m².
pub fn flow_area(diameter: f64) -> f64 {
    PI * diameter * diameter / 4.0
}

/// Mean velocity for a mass flow through a circular bore, m/s.
pub fn velocity(mass_flow: f64, density: f64, diameter: f64) -> f64 {
    mass_flow / (density * flow_area(diameter))
}

/// Reynolds number `ρ·v·D/μ` expressed through the mass flow.
pub fn reynolds(mass_flow: f64, diameter: f64, viscosity: f64) -> f64 {
    4.0 * mass_flow / (PI * diameter * viscosity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_positive() {
        assert!(require_positive(1.0, "x").is_ok());
        assert!(require_positive(0.0, "x").is_err());
        assert!(require_positive(f64::NAN, "x").is_err());
    }

    #[test]
    fn reynolds_matches_rho_v_d_over_mu() {
        let (m, rho, d, mu) = (2.0, 998.0, 0.1, 1e-3);
        let v = velocity(m, rho, d);
        let re_direct = rho * v * d / mu;
        assert!((reynolds(m, d, mu) - re_direct).abs() / re_direct < 1e-12);
    }

    #[test]
    fn test_check_finite() {
        assert!(check_finite(1.0, "test").is_ok());
        assert!(check_finite(f64::INFINITY, "test").is_err());
    }
}
