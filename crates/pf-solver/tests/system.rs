//! Two networks coupled at a shared header node.

use approx::assert_relative_eq;
use pf_components::PipeSection;
use pf_core::units::{k, kg_per_m3, kgps, m, pa, pa_s};
use pf_fluids::Fluid;
use pf_network::{
    Direction, Network, NetworkBundle, NetworkSystem, SharedNodeGroup, SharedNodeMember,
    SystemSolverConfig,
};
use pf_solver::NetworkSystemSolver;

fn water() -> Fluid {
    Fluid::liquid(k(293.15), pa(500_000.0), kg_per_m3(998.0), pa_s(1.0e-3))
        .with_mass_flow(kgps(10.0))
}

fn supply() -> Network {
    let mut net = Network::new("supply", water()).with_upstream_pressure(pa(1.0e6));
    net.sections.push(
        PipeSection::new("S-1", m(100.0), m(0.1023))
            .with_fitting(pf_components::FittingType::Elbow90, 4)
            .with_user_k(0.5)
            .with_safety_factor(0.1)
            .with_nodes("s0", "s1"),
    );
    net
}

fn branch() -> Network {
    let mut net = Network::new("branch", water());
    net.sections.push(
        PipeSection::new("B-1", m(50.0), m(0.1023))
            .with_elevation_change(m(10.0))
            .with_nodes("b0", "b1"),
    );
    net
}

fn header_system(parallel: bool) -> NetworkSystem {
    NetworkSystem::new()
        .with_bundle(NetworkBundle::new("supply", supply()))
        .with_bundle(NetworkBundle::new("branch", branch()))
        .with_group(
            SharedNodeGroup::new(
                "header",
                vec![
                    SharedNodeMember::new("supply", "s1"),
                    SharedNodeMember::new("branch", "b0"),
                ],
            )
            .with_bias(-500.0),
        )
        .with_config(SystemSolverConfig {
            parallel,
            ..Default::default()
        })
}

#[test]
fn follower_inlet_tracks_leader_plus_bias() {
    for parallel in [true, false] {
        let result = NetworkSystemSolver::default()
            .run(&header_system(parallel))
            .unwrap();

        assert!(result.converged);
        assert_eq!(result.iterations, 2);
        assert_eq!(result.max_delta, 0.0);

        let header = result.node_pressures["header"];
        assert_relative_eq!(header, 983_174.09, max_relative = 1e-6);

        let branch = &result.networks["branch"];
        let inlet = branch.summary.inlet.pressure.unwrap();
        assert_relative_eq!(inlet, header - 500.0, max_relative = 1e-12);
        assert_relative_eq!(
            branch.summary.outlet.pressure.unwrap(),
            877_720.79,
            max_relative = 1e-6
        );
    }
}

#[test]
fn iteration_cap_returns_last_state_unconverged() {
    let mut system = header_system(false);
    system.config.max_iterations = 1;
    let result = NetworkSystemSolver::default().run(&system).unwrap();
    assert!(!result.converged);
    assert_eq!(result.iterations, 1);
    assert_eq!(result.networks.len(), 2);
    // The branch ran from its own fluid pressure before any pin existed.
    assert_eq!(result.networks["branch"].summary.inlet.pressure, Some(5.0e5));
}

#[test]
fn unknown_member_network_is_rejected() {
    let system = header_system(false).with_group(SharedNodeGroup::new(
        "ghost",
        vec![SharedNodeMember::new("nowhere", "x")],
    ));
    assert!(NetworkSystemSolver::default().run(&system).is_err());
}

fn return_line() -> Network {
    let mut net = Network::new("return", water()).with_direction(Direction::Forward);
    net.sections.push(
        PipeSection::new("R-1", m(80.0), m(0.1023))
            .with_fitting(pf_components::FittingType::Elbow90, 2)
            .with_nodes("r0", "r1"),
    );
    net
}

#[test]
fn follower_at_outlet_is_held_by_marching_backward() {
    let system = NetworkSystem::new()
        .with_bundle(NetworkBundle::new("supply", supply()))
        .with_bundle(NetworkBundle::new("return", return_line()))
        .with_group(
            SharedNodeGroup::new(
                "header",
                vec![
                    SharedNodeMember::new("supply", "s1"),
                    SharedNodeMember::new("return", "r1"),
                ],
            )
            .with_bias(-500.0),
        );
    let result = NetworkSystemSolver::default().run(&system).unwrap();

    assert!(result.converged);
    let header = result.node_pressures["header"];
    let ret = &result.networks["return"];
    assert_eq!(ret.direction, Direction::Backward);
    assert!(ret.warnings.is_empty());
    let outlet = ret.summary.outlet.pressure.unwrap();
    assert_relative_eq!(outlet, header - 500.0, max_relative = 1e-12);
    assert!(ret.summary.inlet.pressure.unwrap() > outlet);
}

#[test]
fn unreachable_pin_keeps_system_unconverged() {
    let mut branch = branch().with_upstream_pressure(pa(9.0e5));
    branch.sections.push(PipeSection::new("B-2", m(30.0), m(0.1023)).with_nodes("b1", "b2"));
    let system = NetworkSystem::new()
        .with_bundle(NetworkBundle::new("supply", supply()))
        .with_bundle(NetworkBundle::new("branch", branch))
        .with_group(SharedNodeGroup::new(
            "mid",
            vec![
                SharedNodeMember::new("supply", "s1"),
                SharedNodeMember::new("branch", "b1"),
            ],
        ))
        .with_config(SystemSolverConfig {
            max_iterations: 4,
            ..Default::default()
        });
    let result = NetworkSystemSolver::default().run(&system).unwrap();

    assert!(!result.converged);
    assert_eq!(result.iterations, 4);
    assert!(result.networks["branch"]
        .warnings
        .iter()
        .any(|w| w.contains("shared node 'b1'")));
}
