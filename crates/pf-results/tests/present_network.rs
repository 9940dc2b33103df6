//! Solved networks presented in engineering units.

use approx::assert_relative_eq;
use pf_components::{ControlValve, FittingType, PipeSection};
use pf_core::units::{k, kg_per_kmol, kg_per_m3, kgps, m, pa, pa_s};
use pf_fluids::Fluid;
use pf_network::{
    Network, NetworkBuilder, NetworkBundle, NetworkSystem, OutputUnits, SharedNodeGroup,
    SharedNodeMember,
};
use pf_results::{ReportFormat, present_network, present_system, render, write_report};
use pf_solver::{NetworkSolver, NetworkSystemSolver};

fn water() -> Fluid {
    Fluid::liquid(k(293.15), pa(500_000.0), kg_per_m3(998.0), pa_s(1.0e-3))
        .with_mass_flow(kgps(10.0))
}

fn cooling_water_line() -> Network {
    let mut builder = NetworkBuilder::new("cooling water", water());
    builder
        .add_section(
            PipeSection::new("P-101", m(100.0), m(0.1023))
                .with_fitting(FittingType::Elbow90, 4)
                .with_user_k(0.5)
                .with_safety_factor(0.1),
        )
        .add_section(PipeSection::new("P-102", m(50.0), m(0.1023)).with_elevation_change(m(10.0)))
        .add_section(
            PipeSection::new("P-103", m(20.0), m(0.0779))
                .with_control_valve(ControlValve::with_pressure_drop("CV-103", pa(50_000.0)))
                .with_fixed_loss(pa(2_000.0)),
        );
    builder.build().unwrap().with_upstream_pressure(pa(1.0e6))
}

fn engineering_units() -> OutputUnits {
    OutputUnits {
        pressure: "kPa".into(),
        pressure_drop: "kPa".into(),
        temperature: "degC".into(),
        mass_flow: "t/h".into(),
        volume_flow: "m3/h".into(),
        ..OutputUnits::default()
    }
}

#[test]
fn liquid_report_in_kpa() {
    let result = NetworkSolver::default().run(&cooling_water_line()).unwrap();
    let report = present_network(&result, &engineering_units()).unwrap();

    assert_eq!(report.sections.len(), 3);
    assert_relative_eq!(report.summary.inlet.pressure.unwrap(), 1_000.0, epsilon = 1e-9);
    assert_relative_eq!(report.summary.outlet.pressure.unwrap(), 815.122_67, max_relative = 1e-3);
    assert_relative_eq!(report.pressure_drop.total_segment_loss, 184.877_33, max_relative = 1e-3);
    assert_relative_eq!(report.summary.outlet.temperature.unwrap(), 20.0, epsilon = 1e-9);

    let p103 = report.section("P-103").unwrap();
    assert_eq!(p103.pressure_drop.control_valve_pressure_drop, 50.0);
    assert_eq!(p103.pressure_drop.user_specified_fixed_loss, 2.0);
    assert_relative_eq!(p103.pressure_drop.control_valve_cv.unwrap(), 58.9394, max_relative = 1e-4);

    assert_relative_eq!(report.flow.mass_flow, 36.0, epsilon = 1e-9);
    assert_relative_eq!(report.flow.volumetric_actual, 36_000.0 / 998.0, max_relative = 1e-12);
    assert!(report.flow.volumetric_standard.is_none());
}

#[test]
fn gas_report_has_standard_flow_and_mach() {
    let air = Fluid::gas(k(300.0), pa(1.0e6), kg_per_kmol(28.97), pa_s(1.8e-5))
        .with_mass_flow(kgps(2.0));
    let mut builder = NetworkBuilder::new("plant air", air);
    builder.add_section(PipeSection::new("A-1", m(1000.0), m(0.1)));
    let network = builder.build().unwrap().with_upstream_pressure(pa(1.0e6));

    let result = NetworkSolver::default().run(&network).unwrap();
    let report = present_network(&result, &OutputUnits::default()).unwrap();

    assert!(report.gas_flow_model.is_some());
    assert!(report.flow.volumetric_standard.is_some());
    let outlet = &report.summary.outlet;
    assert!(outlet.mach_number.unwrap() > 0.0);
    assert_relative_eq!(outlet.pressure.unwrap(), 217_758.58, max_relative = 1e-4);
}

#[test]
fn json_tree_carries_flow_and_summary() {
    let result = NetworkSolver::default().run(&cooling_water_line()).unwrap();
    let report = present_network(&result, &OutputUnits::default()).unwrap();
    let json = render(&report, ReportFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["direction"], "forward");
    assert!(value["flow"]["mass_flow"].is_number());
    assert!(value["summary"]["outlet"]["pressure"].is_number());
    assert_eq!(value["sections"][0]["pressure_drop"]["fitting_breakdown"][0]["type"], "elbow_90");
}

#[test]
fn system_report_converts_node_pressures() {
    let supply = {
        let mut net = Network::new("supply", water()).with_upstream_pressure(pa(1.0e6));
        net.sections
            .push(PipeSection::new("S-1", m(100.0), m(0.1023)).with_nodes("s0", "s1"));
        net.output_units = engineering_units();
        net
    };
    let branch = {
        let mut net = Network::new("branch", water());
        net.sections
            .push(PipeSection::new("B-1", m(50.0), m(0.1023)).with_nodes("b0", "b1"));
        net
    };
    let system = NetworkSystem::new()
        .with_bundle(NetworkBundle::new("supply", supply))
        .with_bundle(NetworkBundle::new("branch", branch))
        .with_group(SharedNodeGroup::new(
            "header",
            vec![
                SharedNodeMember::new("supply", "s1"),
                SharedNodeMember::new("branch", "b0"),
            ],
        ));

    let result = NetworkSystemSolver::default().run(&system).unwrap();
    let report = present_system(&result, &system).unwrap();

    assert!(report.converged);
    assert_eq!(report.units.pressure, "kPa");
    assert_relative_eq!(
        report.node_pressures["header"],
        result.node_pressures["header"] / 1_000.0,
        max_relative = 1e-12
    );
    // Each network keeps its own units.
    assert_eq!(report.networks["branch"].units.pressure, "Pa");
    assert_eq!(report.networks["supply"].units.pressure, "kPa");
}

#[test]
fn report_file_round_trips_as_yaml() {
    let result = NetworkSolver::default().run(&cooling_water_line()).unwrap();
    let report = present_network(&result, &OutputUnits::default()).unwrap();

    let dir = std::env::temp_dir().join(format!("pf-results-{}", std::process::id()));
    let path = dir.join("report.yaml");
    write_report(&path, &report).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    let back: pf_results::NetworkReport = serde_yaml::from_str(&text).unwrap();
    assert_eq!(back, report);
    std::fs::remove_dir_all(dir).unwrap();
}
