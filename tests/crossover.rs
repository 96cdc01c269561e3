/*
 * Copyright (c) 2021, 2022 Frank Fischer <frank-fischer@shadow-soft.de>
 *
 * This program is free software: you can redistribute it and/or
 * modify it under the terms of the GNU General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful, but
 * WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
 * General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see  <http://www.gnu.org/licenses/>
 */

use rs_crossover::crossover::{
    network_crossover, CrossoverError, CrossoverMethod, CrossoverSettings, NetworkManager,
    NetworkProblem,
};
use rs_crossover::lp::ModelError;
use rs_crossover::network::{MinCostFlow, OptTransport};
use rs_crossover::output::VariableStatus;
use rs_crossover::simplex::SimplexSolver;
use rs_crossover::solver::{LpSolver, SolveMethod, SolverSettings, WarmStart};

fn solver() -> SimplexSolver<f64> {
    let mut solver = SimplexSolver::new();
    solver.zero = 1e-9;
    solver
}

#[test]
fn test_tree_on_a_cycle() {
    // a feasible flow on a 4-cycle, one arc is unused
    let flow = MinCostFlow::new(
        vec![3.0, -2.0, -3.0, 2.0],
        vec![(0, 1), (1, 2), (2, 3), (3, 0)],
        vec![1.0, 2.0, 3.0, 4.0],
        vec![10.0, 10.0, 10.0, 10.0],
    )
    .unwrap();
    let x = vec![5.0, 3.0, 0.0, 2.0];

    let out = network_crossover(
        &NetworkProblem::Flow(flow),
        &x,
        CrossoverMethod::Tree,
        &mut solver(),
        &CrossoverSettings::default(),
    )
    .unwrap();

    // the tree method keeps the point and only identifies a basis
    assert_eq!(out.x, x);
    assert_eq!(out.objective, 19.0);
    assert_eq!(out.iterations, 0);
    assert!(out.y.is_none());
    assert_eq!(out.basis.nr_basic(), 3);
    assert_eq!(out.basis.status(0), VariableStatus::Basic);
    assert_eq!(out.basis.status(2), VariableStatus::AtLower);
}

#[test]
fn test_tree_on_a_transport_problem() {
    let ot = OptTransport::new(vec![1.0], vec![1.0], vec![1.0]).unwrap();

    let out = network_crossover(
        &NetworkProblem::Transport(ot),
        &[1.0],
        CrossoverMethod::Tree,
        &mut solver(),
        &CrossoverSettings::default(),
    )
    .unwrap();

    assert_eq!(out.objective, 1.0);
    assert_eq!(out.basis.nr_basic(), 1);
}

#[test]
fn test_column_generation_flow() {
    // two cheap arcs in series and an expensive shortcut
    let flow = MinCostFlow::new(
        vec![4.0, 0.0, -4.0],
        vec![(0, 1), (1, 2), (0, 2)],
        vec![1.0, 1.0, 5.0],
        vec![3.0, 3.0, 10.0],
    )
    .unwrap();
    // slightly inexact interior point near the optimal face
    let x = vec![2.9, 2.9, 1.1];

    let out = network_crossover(
        &NetworkProblem::Flow(flow),
        &x,
        CrossoverMethod::ColumnGenerationFlow,
        &mut solver(),
        &CrossoverSettings::default(),
    )
    .unwrap();

    assert_eq!(out.x, vec![3.0, 3.0, 1.0]);
    assert!((out.objective - 11.0).abs() < 1e-6);
    assert!(out.y.is_some());
    assert!(out.iterations >= 1);
    // the shortcut carries an intermediate value, it must be basic
    assert_eq!(out.basis.status(2), VariableStatus::Basic);
}

#[test]
fn test_column_generation_flow_releases_from_upper() {
    // the interior point pushes every arc close to its capacity
    let flow = MinCostFlow::new(
        vec![6.0, 0.0, 0.0, -6.0],
        vec![(0, 1), (0, 2), (1, 2), (1, 3), (2, 3)],
        vec![1.0, 2.0, 0.0, 2.0, 1.0],
        vec![4.0, 4.0, 2.0, 4.0, 4.0],
    )
    .unwrap();
    let x = vec![3.8, 2.2, 1.8, 2.0, 3.9];

    let out = network_crossover(
        &NetworkProblem::Flow(flow),
        &x,
        CrossoverMethod::ColumnGenerationFlow,
        &mut solver(),
        &CrossoverSettings::default(),
    )
    .unwrap();

    assert_eq!(out.x, vec![4.0, 2.0, 2.0, 2.0, 4.0]);
    assert_eq!(out.objective, 16.0);
    // the arcs strictly between their bounds must be basic
    assert_eq!(out.basis.status(1), VariableStatus::Basic);
    assert_eq!(out.basis.status(3), VariableStatus::Basic);
    assert!(out.basis.nr_basic() <= 3);
}

#[test]
fn test_column_generation_transport() {
    let ot = OptTransport::new(
        vec![3.0, 2.0],
        vec![2.0, 3.0],
        vec![1.0, 2.0, 3.0, 1.0],
    )
    .unwrap();
    // cell (i, j) has index i * nr_sinks + j
    let x = vec![1.8, 1.2, 0.2, 1.8];

    let out = network_crossover(
        &NetworkProblem::Transport(ot),
        &x,
        CrossoverMethod::ColumnGenerationTransport,
        &mut solver(),
        &CrossoverSettings::default(),
    )
    .unwrap();

    assert_eq!(out.x, vec![2.0, 1.0, 0.0, 2.0]);
    assert_eq!(out.objective, 6.0);
    assert!(out.y.is_some());
    assert_eq!(out.basis.status(1), VariableStatus::Basic);
}

#[test]
fn test_release_rounds_never_increase_the_objective() {
    // replay the column generation rounds by hand on a 4-cycle whose
    // demand nodes become reachable one release at a time
    let flow = MinCostFlow::new(
        vec![3.0, -2.0, -3.0, 2.0],
        vec![(0, 1), (1, 2), (2, 3), (3, 0)],
        vec![1.0, 2.0, 3.0, 4.0],
        vec![10.0, 10.0, 10.0, 10.0],
    )
    .unwrap();
    let mut manager = NetworkManager::new(&flow);
    manager.zero = 1e-9;
    manager.opt_tol = 1e-6;
    manager.fix_variables(&[0, 1, 2, 3], &[]).unwrap();
    manager.extend_by_big_m(100.0);
    manager.set_initial_basis();

    let mut simplex = solver();
    let settings = SolverSettings::default();
    let mut objectives = Vec::new();
    let mut certified = Vec::new();
    for release in [vec![0], vec![1], vec![2, 3]] {
        manager.free_variables(&release).unwrap();
        let warm = WarmStart::from_basis(manager.subproblem_basis());
        let sub = manager.update_subproblem();
        let sol = simplex
            .solve(sub, SolveMethod::PrimalSimplex, &settings, Some(&warm))
            .unwrap();
        let x = manager.recover_x(&sol.x);
        let basis = manager.recover_basis(&sol.basis);
        manager.set_basis(basis);
        objectives.push(manager.recover_obj(&x));
        certified.push(manager.is_optimal(&x, sol.y.as_deref()));
    }

    // every release widens the restricted program, so its optimum can
    // only go down, and the certificate holds once the big-M arcs are
    // out of the flow
    assert_eq!(objectives, vec![502.0, 211.0, 19.0]);
    assert_eq!(certified, vec![false, false, true]);
}

#[test]
fn test_method_mismatch_is_rejected() {
    let flow = MinCostFlow::new(vec![1.0, -1.0], vec![(0, 1)], vec![1.0], vec![1.0]).unwrap();
    match network_crossover(
        &NetworkProblem::Flow(flow),
        &[1.0],
        CrossoverMethod::ColumnGenerationTransport,
        &mut solver(),
        &CrossoverSettings::default(),
    ) {
        Err(CrossoverError::UnsupportedMethod) => (),
        other => panic!("unexpected result: {:?}", other),
    }

    let ot = OptTransport::new(vec![1.0], vec![1.0], vec![1.0]).unwrap();
    match network_crossover(
        &NetworkProblem::Transport(ot),
        &[1.0],
        CrossoverMethod::ColumnGenerationFlow,
        &mut solver(),
        &CrossoverSettings::default(),
    ) {
        Err(CrossoverError::UnsupportedMethod) => (),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_wrong_point_length_is_rejected() {
    let flow = MinCostFlow::new(vec![1.0, -1.0], vec![(0, 1)], vec![1.0], vec![1.0]).unwrap();
    match network_crossover(
        &NetworkProblem::Flow(flow),
        &[1.0, 0.0],
        CrossoverMethod::Tree,
        &mut solver(),
        &CrossoverSettings::default(),
    ) {
        Err(CrossoverError::Model(ModelError::Shape { expected: 1, got: 2, .. })) => (),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_empty_queue_fails() {
    // no arcs to release, the queue is exhausted immediately
    let flow = MinCostFlow::new(vec![0.0, 0.0], vec![], vec![], vec![]).unwrap();
    match network_crossover(
        &NetworkProblem::Flow(flow),
        &[],
        CrossoverMethod::ColumnGenerationFlow,
        &mut solver(),
        &CrossoverSettings::default(),
    ) {
        Err(CrossoverError::ColumnGenerationFailed) => (),
        other => panic!("unexpected result: {:?}", other),
    }
}
