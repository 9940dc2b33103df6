//! The configs under `demos/` load and solve to their reference values.

use approx::assert_relative_eq;
use pf_components::FittingType;
use pf_network::{Direction, GasFlowModel};
use pf_project::{
    ConfigFormat, ConfigurationError, LoadedConfig, load_file, load_network_file,
    load_network_str, load_system_file,
};
use pf_solver::{NetworkSolver, NetworkSystemSolver};
use std::path::{Path, PathBuf};

fn demo(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos")
        .join(name)
}

#[test]
fn cooling_water_matches_reference() {
    let loaded = load_network_file(&demo("cooling_water.yaml")).unwrap();
    let network = &loaded.network;

    assert_eq!(network.sections.len(), 3);
    assert_eq!(network.sections[1].start_node, network.sections[0].end_node);
    assert!(network.sections[0].has_fitting(FittingType::Elbow90));
    assert_eq!(network.output_units.pressure, "kPa");
    assert_eq!(network.output_units.temperature, "K");
    assert_relative_eq!(network.upstream_pressure.unwrap().value, 1.0e6);

    let result = NetworkSolver::new(loaded.solver).run(network).unwrap();
    assert_eq!(result.direction, Direction::Forward);
    let outlet = result.summary.outlet.pressure.unwrap();
    assert_relative_eq!(outlet, 815_122.67, max_relative = 1e-3);
    let cv = result.section("P-103").unwrap().calculation.control_valve_cv.unwrap();
    assert_relative_eq!(cv, 58.9394, max_relative = 1e-3);
}

#[test]
fn air_line_json_matches_isothermal_reference() {
    let loaded = load_network_file(&demo("air_line.json")).unwrap();
    assert_eq!(loaded.network.gas_flow_model, GasFlowModel::Isothermal);

    let result = NetworkSolver::new(loaded.solver).run(&loaded.network).unwrap();
    assert_relative_eq!(
        result.summary.outlet.pressure.unwrap(),
        217_758.58,
        max_relative = 1e-4
    );
}

#[test]
fn header_system_converges() {
    let loaded = load_system_file(&demo("header_system.yaml")).unwrap();
    assert_eq!(loaded.system.bundles.len(), 2);
    assert_eq!(loaded.system.groups[0].bias, -500.0);
    assert_eq!(loaded.system.config.max_iterations, 10);
    assert_eq!(loaded.system.bundle("branch").unwrap().canonical("b0"), "header");

    let result = NetworkSystemSolver::new(NetworkSolver::new(loaded.solver))
        .run(&loaded.system)
        .unwrap();
    assert!(result.converged);
    assert_relative_eq!(
        result.networks["branch"].summary.outlet.pressure.unwrap(),
        877_720.79,
        max_relative = 1e-6
    );
}

#[test]
fn load_file_detects_the_document_shape() {
    assert!(matches!(
        load_file(&demo("cooling_water.yaml")).unwrap(),
        LoadedConfig::Network(_)
    ));
    assert!(matches!(
        load_file(&demo("header_system.yaml")).unwrap(),
        LoadedConfig::System(_)
    ));
}

#[test]
fn system_document_is_not_a_network() {
    let text = std::fs::read_to_string(demo("header_system.yaml")).unwrap();
    let err = load_network_str(&text, ConfigFormat::Yaml).unwrap_err();
    assert!(matches!(err, ConfigurationError::MissingField { .. }));
}

#[test]
fn unknown_unit_surfaces_as_configuration_error() {
    let yaml = r#"
network:
  name: bad
  upstream_pressure: 10 bar
  fluid: {phase: liquid, temperature: 293.15, pressure: 1e6, density: 998, viscosity: 1e-3, mass_flow_rate: 1}
  sections:
    - {id: P-1, length: 3 cubits, pipe_diameter: 0.1}
"#;
    let err = load_network_str(yaml, ConfigFormat::Yaml).unwrap_err();
    match err {
        ConfigurationError::Unit { field, .. } => assert_eq!(field, "sections[0].length"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_json_is_a_json_error() {
    let err = load_network_str("{\"network\": [", ConfigFormat::Json).unwrap_err();
    assert!(matches!(err, ConfigurationError::Json(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load_network_file(&demo("does_not_exist.yaml")).unwrap_err();
    assert!(matches!(err, ConfigurationError::Io(_)));
}
