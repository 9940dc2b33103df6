//! Derived state at section ends: density, velocity, Mach, erosional limit.

use pf_components::common::flow_area;
use pf_components::{PipeSection, StatePoint};
use pf_fluids::Fluid;

/// API RP 14E `Ve = C/sqrt(ρ)` in ft/s with ρ in lb/ft³, restated for
/// m/s and kg/m³.
pub const EROSIONAL_SI_FACTOR: f64 = 1.2199;

/// Erosional velocity, m/s.
pub fn erosional_velocity(constant: f64, density: f64) -> f64 {
    EROSIONAL_SI_FACTOR * constant / density.sqrt()
}

/// Fill the derived fields of a state point whose pressure and temperature
/// are already set. Fields that cannot be evaluated stay `None`.
pub(crate) fn populate(
    point: &mut StatePoint,
    fluid: &Fluid,
    mass_flow: f64,
    diameter: Option<f64>,
    erosional_constant: f64,
) {
    let Some(temperature) = point.temperature else {
        return;
    };
    let density = if fluid.is_compressible() {
        point
            .pressure
            .and_then(|p| fluid.density_at(p, temperature).ok())
    } else {
        fluid.density().ok()
    };
    point.density = density;

    let Some(rho) = density else {
        return;
    };
    let erosional = erosional_velocity(erosional_constant, rho);
    point.erosional_velocity = Some(erosional);

    let Some(d) = diameter.filter(|d| *d > 0.0) else {
        return;
    };
    let velocity = mass_flow / (rho * flow_area(d));
    point.velocity = Some(velocity);
    point.flow_momentum = Some(rho * velocity * velocity);

    if velocity > erosional {
        point.remark(format!(
            "velocity {velocity:.2} m/s exceeds erosional velocity {erosional:.2} m/s"
        ));
    }

    if fluid.is_compressible() {
        if let Ok(sound) = fluid.speed_of_sound(temperature) {
            let mach = velocity / sound;
            point.mach_number = Some(mach);
            if mach >= 1.0 {
                point.remark("choked flow (Mach >= 1)");
            }
        }
    }
}

/// Populate both ends of a solved section.
pub(crate) fn populate_section(
    inlet: &mut StatePoint,
    outlet: &mut StatePoint,
    section: &PipeSection,
    fluid: &Fluid,
    mass_flow: f64,
) {
    let c = section.erosional_constant;
    populate(inlet, fluid, mass_flow, section.inlet_diameter_m().ok(), c);
    populate(outlet, fluid, mass_flow, section.outlet_diameter_m().ok(), c);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pf_core::units::{k, kg_per_kmol, kg_per_m3, pa, pa_s};

    #[test]
    fn erosional_velocity_in_si() {
        // 100 / sqrt(1000 kg/m³ = 62.43 lb/ft³) ft/s, in m/s
        let ve = erosional_velocity(100.0, 1000.0);
        assert_relative_eq!(ve, 3.8577, max_relative = 1e-3);
    }

    #[test]
    fn liquid_point_gets_velocity_and_momentum() {
        let water = Fluid::liquid(k(293.15), pa(4e5), kg_per_m3(1000.0), pa_s(1e-3));
        let mut point = StatePoint::at_pressure(Some(3e5), 293.15);
        populate(&mut point, &water, 10.0, Some(0.1), 100.0);
        let v = point.velocity.unwrap();
        assert_relative_eq!(v, 1.2732395, max_relative = 1e-6);
        assert_relative_eq!(point.flow_momentum.unwrap(), 1000.0 * v * v);
        assert!(point.mach_number.is_none());
        assert!(point.remarks.is_empty());
    }

    #[test]
    fn fast_gas_is_flagged() {
        let air = Fluid::gas(k(300.0), pa(1e5), kg_per_kmol(28.97), pa_s(1.8e-5));
        let mut point = StatePoint::at_pressure(Some(1e5), 300.0);
        populate(&mut point, &air, 5.0, Some(0.05), 100.0);
        assert!(point.mach_number.unwrap() > 1.0);
        assert_eq!(point.remarks.len(), 2);
    }

    #[test]
    fn unknown_pressure_leaves_gas_state_empty() {
        let air = Fluid::gas(k(300.0), pa(1e5), kg_per_kmol(28.97), pa_s(1.8e-5));
        let mut point = StatePoint::at_pressure(None, 300.0);
        populate(&mut point, &air, 1.0, Some(0.1), 100.0);
        assert!(point.density.is_none());
        assert!(point.velocity.is_none());
    }
}
