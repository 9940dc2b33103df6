//! Compressible flow through a constant-area pipe.
//!
//! Two models march from the known end of a pipe to the other end:
//!
//! - isothermal: `P1² − P2² = (Z·R·T/MW)·G²·[f·L_eq/D + 2·ln(P1/P2)]`,
//!   solved by fixed-point iteration on the log term;
//! - adiabatic (Fanno): the friction parameter `fL*/D(M)` is shifted by
//!   `f·L_eq/D` and inverted by bisection, then the Fanno pressure and
//!   temperature ratios map the known state to the other end.
//!
//! `L_eq = L + k_minor·D/f` folds fittings and user K into the run. All
//! friction factors here are Darcy.

use pf_components::common::{flow_area, reynolds};
use pf_components::{ComponentError, FrictionFactor, darcy_friction_factor};
use pf_core::PfError;
use pf_core::numeric::{BisectConfig, bisect, relative_change};
use pf_core::units::constants::R_UNIVERSAL;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper Mach bound of the supersonic Fanno branch.
const SUPERSONIC_MACH_LIMIT: f64 = 10.0;
const SUBSONIC_MACH_FLOOR: f64 = 1e-6;

const FANNO_BISECT: BisectConfig = BisectConfig {
    max_iterations: 200,
    x_tol: 1e-12,
    f_tol: 1e-12,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GasFlowError {
    /// The pipe cannot pass the mass flow from the given boundary.
    #[error("Choked flow: {what}")]
    Choked { what: String },

    #[error("Invalid {what}: {value}")]
    NonPhysical { what: &'static str, value: f64 },

    #[error("Friction factor: {0}")]
    Friction(#[from] ComponentError),

    #[error("Numeric error: {0}")]
    Numeric(#[from] PfError),
}

pub type GasFlowResult<T> = Result<T, GasFlowError>;

/// Which end of the pipe is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum March {
    /// Inlet known, solve the outlet.
    Forward,
    /// Outlet known, solve the inlet.
    Backward,
}

/// Pipe and gas description for the compressible solvers, SI units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasPipe {
    pub length: f64,
    pub diameter: f64,
    /// Fixed friction factor; Serghide from the Reynolds number when `None`.
    pub friction_factor: Option<FrictionFactor>,
    /// Fittings and user K, converted to equivalent length.
    pub k_minor: f64,
    /// kg/s
    pub mass_flow: f64,
    /// kg/kmol
    pub molar_mass: f64,
    pub z_factor: f64,
    /// Heat-capacity ratio γ.
    pub k: f64,
    /// Pa·s
    pub viscosity: f64,
    pub roughness: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasState {
    /// Pa
    pub pressure: f64,
    /// K
    pub temperature: f64,
}

/// State at the far end of the pipe.
#[derive(Debug, Clone, PartialEq)]
pub struct GasFlowOutcome {
    pub pressure: f64,
    pub temperature: f64,
    /// Mach number at the physical inlet.
    pub inlet_mach: f64,
    /// Mach number at the physical outlet.
    pub outlet_mach: f64,
    pub choked: bool,
    pub remarks: Vec<String>,
}

/// Pass cap and relative tolerance for the isothermal fixed point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IsothermalConfig {
    pub max_passes: usize,
    pub tolerance: f64,
}

impl Default for IsothermalConfig {
    fn default() -> Self {
        Self {
            max_passes: 25,
            tolerance: 1e-6,
        }
    }
}

impl GasPipe {
    fn validate(&self) -> GasFlowResult<()> {
        positive(self.diameter, "gas pipe diameter")?;
        positive(self.mass_flow, "gas mass flow")?;
        positive(self.molar_mass, "gas molar mass")?;
        positive(self.z_factor, "gas Z factor")?;
        positive(self.viscosity, "gas viscosity")?;
        if !(self.k > 1.0 && self.k.is_finite()) {
            return Err(GasFlowError::NonPhysical {
                what: "heat-capacity ratio",
                value: self.k,
            });
        }
        if !(self.k_minor >= 0.0 && self.k_minor.is_finite()) {
            return Err(GasFlowError::NonPhysical {
                what: "minor-loss K",
                value: self.k_minor,
            });
        }
        Ok(())
    }

    /// Darcy friction factor for this pipe.
    pub fn darcy_factor(&self) -> GasFlowResult<f64> {
        let f = match self.friction_factor {
            Some(f) => f.darcy(),
            None => {
                let re = reynolds(self.mass_flow, self.diameter, self.viscosity);
                darcy_friction_factor(re, self.roughness / self.diameter)?
            }
        };
        positive(f, "Darcy friction factor")
    }

    pub fn equivalent_length(&self, f_darcy: f64) -> f64 {
        self.length + self.k_minor * self.diameter / f_darcy
    }

    /// Mass flux G, kg/(m²·s).
    pub fn mass_flux(&self) -> f64 {
        self.mass_flow / flow_area(self.diameter)
    }

    /// Z·R·T/MW, equal to P/ρ.
    fn specific_gas_term(&self, temperature: f64) -> f64 {
        self.z_factor * R_UNIVERSAL * temperature / self.molar_mass
    }

    pub fn density(&self, state: GasState) -> f64 {
        state.pressure / self.specific_gas_term(state.temperature)
    }

    pub fn mach(&self, state: GasState) -> f64 {
        let velocity = self.mass_flux() / self.density(state);
        let sound = (self.k * self.specific_gas_term(state.temperature)).sqrt();
        velocity / sound
    }
}

/// Isothermal march from a known end.
pub fn solve_isothermal(
    pipe: &GasPipe,
    known: GasState,
    march: March,
    config: IsothermalConfig,
) -> GasFlowResult<GasFlowOutcome> {
    pipe.validate()?;
    positive(known.pressure, "gas boundary pressure")?;
    positive(known.temperature, "gas boundary temperature")?;
    if pipe.length <= 0.0 {
        return Ok(unchanged(pipe, known));
    }

    let term = pipe.specific_gas_term(known.temperature);
    let g2 = pipe.mass_flux().powi(2);
    let f = pipe.darcy_factor()?;
    let friction = f * pipe.equivalent_length(f) / pipe.diameter;
    let p_known = known.pressure;

    let mut other = p_known;
    let mut density = p_known / term;
    let mut converged = false;
    for pass in 1..=config.max_passes {
        let squared = match march {
            March::Forward => {
                p_known.powi(2) - term * g2 * (friction + 2.0 * (p_known / other).ln())
            }
            March::Backward => {
                p_known.powi(2) + term * g2 * (friction + 2.0 * (other / p_known).ln())
            }
        };
        if !(squared > 0.0 && squared.is_finite()) {
            return Err(GasFlowError::Choked {
                what: format!(
                    "isothermal pressure squared {squared:.4e} Pa² from {p_known:.1} Pa is not positive"
                ),
            });
        }
        let next = squared.sqrt();
        let next_density = 0.5 * (p_known + next) / term;
        let change = relative_change(density, next_density).max(relative_change(other, next));
        other = next;
        density = next_density;
        if pass > 1 && change < config.tolerance {
            converged = true;
            break;
        }
    }

    let other_state = GasState {
        pressure: other,
        temperature: known.temperature,
    };
    let mut outcome = oriented(pipe, known, other_state, march);
    if !converged {
        outcome.remark(format!(
            "isothermal iteration stopped after {} passes",
            config.max_passes
        ));
    }
    // Isothermal flow chokes at M = 1/sqrt(γ).
    let limit = 1.0 / pipe.k.sqrt();
    if outcome.inlet_mach.max(outcome.outlet_mach) >= limit {
        outcome.choked = true;
        outcome.remark(format!("isothermal choking limit reached (Mach {limit:.3})"));
    }
    Ok(outcome)
}

/// Adiabatic (Fanno) march from a known end.
pub fn solve_adiabatic(
    pipe: &GasPipe,
    known: GasState,
    march: March,
) -> GasFlowResult<GasFlowOutcome> {
    pipe.validate()?;
    positive(known.pressure, "gas boundary pressure")?;
    positive(known.temperature, "gas boundary temperature")?;
    if pipe.length <= 0.0 {
        return Ok(unchanged(pipe, known));
    }

    let gamma = pipe.k;
    let f = pipe.darcy_factor()?;
    let friction = f * pipe.equivalent_length(f) / pipe.diameter;
    let mach_known = pipe.mach(known);
    let supersonic = mach_known > 1.0;
    let parameter = fanno_parameter(mach_known, gamma);

    let target = match march {
        March::Forward => parameter - friction,
        March::Backward => parameter + friction,
    };

    let mut remarks = Vec::new();
    let mut choked = false;
    let mach_other = if march == March::Forward && target <= 0.0 {
        choked = true;
        remarks.push(
            "choked: pipe exceeds the Fanno limiting length, outlet held at Mach 1".to_string(),
        );
        1.0
    } else {
        match fanno_mach(target, gamma, supersonic) {
            Ok(m) if !supersonic && m >= 1.0 => {
                choked = true;
                remarks.push("choked: Fanno solution reached Mach 1".to_string());
                1.0
            }
            Ok(m) => m,
            Err(_) => {
                choked = true;
                remarks.push(format!(
                    "Fanno parameter {target:.4} has no Mach solution, held at Mach 1"
                ));
                1.0
            }
        }
    };

    let other_state = GasState {
        pressure: known.pressure * fanno_pressure_ratio(mach_other, gamma)
            / fanno_pressure_ratio(mach_known, gamma),
        temperature: known.temperature * fanno_temperature_ratio(mach_other, gamma)
            / fanno_temperature_ratio(mach_known, gamma),
    };
    let (inlet_mach, outlet_mach) = match march {
        March::Forward => (mach_known, mach_other),
        March::Backward => (mach_other, mach_known),
    };
    Ok(GasFlowOutcome {
        pressure: other_state.pressure,
        temperature: other_state.temperature,
        inlet_mach,
        outlet_mach,
        choked,
        remarks,
    })
}

/// Fanno friction parameter `fL*/D` (Darcy) at a Mach number.
pub fn fanno_parameter(mach: f64, gamma: f64) -> f64 {
    let m2 = mach * mach;
    (1.0 - m2) / (gamma * m2)
        + (gamma + 1.0) / (2.0 * gamma) * ((gamma + 1.0) * m2 / (2.0 + (gamma - 1.0) * m2)).ln()
}

/// `P/P*` on the Fanno line.
pub fn fanno_pressure_ratio(mach: f64, gamma: f64) -> f64 {
    ((gamma + 1.0) / (2.0 + (gamma - 1.0) * mach * mach)).sqrt() / mach
}

/// `T/T*` on the Fanno line.
pub fn fanno_temperature_ratio(mach: f64, gamma: f64) -> f64 {
    (gamma + 1.0) / (2.0 + (gamma - 1.0) * mach * mach)
}

/// Mach number with the given Fanno parameter on one branch.
pub fn fanno_mach(parameter: f64, gamma: f64, supersonic: bool) -> Result<f64, PfError> {
    let (lo, hi) = if supersonic {
        (1.0, SUPERSONIC_MACH_LIMIT)
    } else {
        (SUBSONIC_MACH_FLOOR, 1.0)
    };
    let outcome = bisect("Fanno Mach number", lo, hi, FANNO_BISECT, |m| {
        fanno_parameter(m, gamma) - parameter
    })?;
    Ok(outcome.root)
}

impl GasFlowOutcome {
    fn remark(&mut self, text: String) {
        if !self.remarks.contains(&text) {
            self.remarks.push(text);
        }
    }
}

fn unchanged(pipe: &GasPipe, known: GasState) -> GasFlowOutcome {
    let mach = pipe.mach(known);
    GasFlowOutcome {
        pressure: known.pressure,
        temperature: known.temperature,
        inlet_mach: mach,
        outlet_mach: mach,
        choked: false,
        remarks: Vec::new(),
    }
}

fn oriented(pipe: &GasPipe, known: GasState, other: GasState, march: March) -> GasFlowOutcome {
    let (inlet, outlet) = match march {
        March::Forward => (known, other),
        March::Backward => (other, known),
    };
    GasFlowOutcome {
        pressure: other.pressure,
        temperature: other.temperature,
        inlet_mach: pipe.mach(inlet),
        outlet_mach: pipe.mach(outlet),
        choked: false,
        remarks: Vec::new(),
    }
}

fn positive(value: f64, what: &'static str) -> GasFlowResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(GasFlowError::NonPhysical { what, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn air_line(length: f64, diameter: f64, mass_flow: f64) -> GasPipe {
        GasPipe {
            length,
            diameter,
            friction_factor: None,
            k_minor: 0.0,
            mass_flow,
            molar_mass: 28.97,
            z_factor: 1.0,
            k: 1.4,
            viscosity: 1.8e-5,
            roughness: 4.57e-5,
        }
    }

    fn inlet() -> GasState {
        GasState {
            pressure: 1.0e6,
            temperature: 300.0,
        }
    }

    #[test]
    fn isothermal_forward_reference() {
        let pipe = air_line(1000.0, 0.1, 2.0);
        let out = solve_isothermal(&pipe, inlet(), March::Forward, IsothermalConfig::default())
            .unwrap();
        assert_relative_eq!(out.pressure, 217_758.58, max_relative = 1e-4);
        assert_eq!(out.temperature, 300.0);
        assert!(out.outlet_mach > out.inlet_mach);
        assert!(!out.choked);
    }

    #[test]
    fn isothermal_backward_recovers_inlet() {
        let pipe = air_line(1000.0, 0.1, 2.0);
        let outlet = solve_isothermal(&pipe, inlet(), March::Forward, IsothermalConfig::default())
            .unwrap();
        let known = GasState {
            pressure: outlet.pressure,
            temperature: 300.0,
        };
        let back =
            solve_isothermal(&pipe, known, March::Backward, IsothermalConfig::default()).unwrap();
        assert_relative_eq!(back.pressure, 1.0e6, max_relative = 1e-4);
    }

    #[test]
    fn isothermal_infeasible_is_choked() {
        let pipe = air_line(50_000.0, 0.05, 2.0);
        let err = solve_isothermal(&pipe, inlet(), March::Forward, IsothermalConfig::default())
            .unwrap_err();
        assert!(matches!(err, GasFlowError::Choked { .. }));
    }

    #[test]
    fn adiabatic_forward_reference() {
        let pipe = air_line(1000.0, 0.1, 2.0);
        let out = solve_adiabatic(&pipe, inlet(), March::Forward).unwrap();
        assert_relative_eq!(out.pressure, 222_370.40, max_relative = 1e-5);
        assert_relative_eq!(out.temperature, 295.543, max_relative = 1e-5);
        assert_relative_eq!(out.inlet_mach, 0.063151, max_relative = 1e-4);
        assert_relative_eq!(out.outlet_mach, 0.281872, max_relative = 1e-5);
        assert!(!out.choked);
    }

    #[test]
    fn adiabatic_long_pipe_clamps_to_sonic() {
        let pipe = air_line(5000.0, 0.05, 2.0);
        let out = solve_adiabatic(&pipe, inlet(), March::Forward).unwrap();
        assert!(out.choked);
        assert_eq!(out.outlet_mach, 1.0);
        assert_relative_eq!(out.pressure, 232_061.22, max_relative = 1e-5);
        assert_relative_eq!(out.temperature, 253.190, max_relative = 1e-5);
        assert!(!out.remarks.is_empty());
    }

    #[test]
    fn heavy_flow_chokes_and_light_flow_stays_subsonic() {
        let heavy = solve_adiabatic(&air_line(2000.0, 0.1, 10.0), inlet(), March::Forward).unwrap();
        assert!(heavy.choked);
        assert_eq!(heavy.outlet_mach, 1.0);

        let light = solve_adiabatic(&air_line(100.0, 0.1, 0.5), inlet(), March::Forward).unwrap();
        assert!(!light.choked);
        assert!(light.outlet_mach < 1.0);
    }

    #[test]
    fn zero_length_is_a_no_op() {
        let pipe = air_line(0.0, 0.1, 2.0);
        for march in [March::Forward, March::Backward] {
            let iso = solve_isothermal(&pipe, inlet(), march, IsothermalConfig::default()).unwrap();
            let fanno = solve_adiabatic(&pipe, inlet(), march).unwrap();
            for out in [iso, fanno] {
                assert_eq!(out.pressure, 1.0e6);
                assert_eq!(out.temperature, 300.0);
                assert_eq!(out.inlet_mach, out.outlet_mach);
                assert!(!out.choked);
            }
        }
    }

    #[test]
    fn minor_losses_lengthen_the_pipe() {
        let bare = air_line(500.0, 0.1, 2.0);
        let fitted = GasPipe {
            k_minor: 10.0,
            ..bare
        };
        let a = solve_adiabatic(&bare, inlet(), March::Forward).unwrap();
        let b = solve_adiabatic(&fitted, inlet(), March::Forward).unwrap();
        assert!(b.pressure < a.pressure);
    }

    #[test]
    fn fanning_override_matches_darcy() {
        let darcy = GasPipe {
            friction_factor: Some(FrictionFactor::Darcy(0.02)),
            ..air_line(800.0, 0.1, 1.5)
        };
        let fanning = GasPipe {
            friction_factor: Some(FrictionFactor::Fanning(0.005)),
            ..darcy
        };
        let a = solve_isothermal(&darcy, inlet(), March::Forward, IsothermalConfig::default())
            .unwrap();
        let b = solve_isothermal(&fanning, inlet(), March::Forward, IsothermalConfig::default())
            .unwrap();
        assert_relative_eq!(a.pressure, b.pressure, max_relative = 1e-12);
    }

    #[test]
    fn fanno_parameter_vanishes_at_sonic() {
        assert!(fanno_parameter(1.0, 1.4).abs() < 1e-15);
        assert_relative_eq!(fanno_pressure_ratio(1.0, 1.4), 1.0);
        assert_relative_eq!(fanno_temperature_ratio(1.0, 1.4), 1.0);
    }

    proptest! {
        #[test]
        fn subsonic_inversion_recovers_mach(mach in 0.02f64..0.98, gamma in 1.1f64..1.67) {
            let parameter = fanno_parameter(mach, gamma);
            let back = fanno_mach(parameter, gamma, false).unwrap();
            prop_assert!((back - mach).abs() < 1e-8);
        }

        #[test]
        fn supersonic_inversion_recovers_mach(mach in 1.05f64..5.0) {
            let parameter = fanno_parameter(mach, 1.4);
            let back = fanno_mach(parameter, 1.4, true).unwrap();
            prop_assert!((back - mach).abs() < 1e-8);
        }

        #[test]
        fn forward_fanno_lowers_pressure(length in 1.0f64..5000.0, mass_flow in 0.1f64..12.0) {
            let pipe = air_line(length, 0.1, mass_flow);
            let out = solve_adiabatic(&pipe, inlet(), March::Forward).unwrap();
            prop_assert!(out.pressure < 1.0e6);
            prop_assert!(out.outlet_mach >= out.inlet_mach);
            prop_assert!(out.choked || out.outlet_mach < 1.0);
            prop_assert!(!out.choked || out.outlet_mach == 1.0);
        }

        #[test]
        fn backward_fanno_raises_pressure(length in 1.0f64..2000.0, mass_flow in 0.1f64..3.0) {
            let pipe = air_line(length, 0.1, mass_flow);
            let known = GasState { pressure: 2.0e5, temperature: 300.0 };
            let out = solve_adiabatic(&pipe, known, March::Backward).unwrap();
            prop_assert!(out.pressure > 2.0e5);
            prop_assert!(out.inlet_mach < out.outlet_mach);
        }
    }
}
