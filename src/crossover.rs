/*
 * Copyright (c) 2022 Frank Fischer <frank-fischer@shadow-soft.de>
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

//! Crossover from interior points to basic solutions.
//!
//! An interior point method stops close to the optimal face with a
//! strictly interior, slightly inexact point. The crossover turns such
//! a point into a vertex together with a simplex basis, so that a warm
//! started simplex solver can finish the job or re-optimize after a
//! problem change. Two strategies are implemented:
//!
//! * [`CrossoverMethod::Tree`] identifies a basis combinatorially from
//!   the flow values alone and never calls a solver,
//! * the column generation methods re-optimize over a growing
//!   restricted program, extended by artificial big-M arcs, until the
//!   optimality certificate holds.
//!
//! The entry point is [`network_crossover`].

pub mod colgen;
pub mod manager;
pub mod restriction;
pub mod tree;

pub use self::colgen::{column_generation, ColumnGeneration};
pub use self::manager::NetworkManager;
pub use self::restriction::Restriction;
pub use self::tree::tree_basis;

use crate::lp::ModelError;
use crate::network::{MinCostFlow, OptTransport};
use crate::output::{Output, Timer};
use crate::solver::{LpSolver, SolverError, SolverSettings};
use num_traits::{Float, NumAssign, Signed};
use std::error;
use std::fmt;

/// The position of a flow value relative to the arc bounds.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FlowIndicator {
    /// The flow is at the lower bound.
    AtZero,
    /// The flow is strictly between the bounds.
    Positive,
    /// The flow is at the upper bound.
    AtUpper,
}

/// The crossover strategies.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CrossoverMethod {
    /// Identify a tree basis from the flow values without solving.
    Tree,
    /// Column generation for optimal transport problems.
    ColumnGenerationTransport,
    /// Column generation for min-cost-flow problems.
    ColumnGenerationFlow,
}

/// The problem handed to the crossover.
#[derive(Clone, Debug)]
pub enum NetworkProblem<F> {
    /// A min-cost-flow problem.
    Flow(MinCostFlow<F>),
    /// An optimal transport problem.
    Transport(OptTransport<F>),
}

/// Parameters of a crossover run.
#[derive(Clone, Debug)]
pub struct CrossoverSettings {
    /// The tolerance of the optimality certificate.
    pub opt_tol: f64,
    /// Flow values below this are considered zero.
    pub zero: f64,
    /// The settings forwarded to the solver.
    pub solver: SolverSettings,
}

impl Default for CrossoverSettings {
    fn default() -> Self {
        CrossoverSettings {
            opt_tol: 1e-6,
            zero: 1e-9,
            solver: SolverSettings::default(),
        }
    }
}

impl CrossoverSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_opt_tol(mut self, opt_tol: f64) -> Self {
        self.opt_tol = opt_tol;
        self
    }

    pub fn with_zero(mut self, zero: f64) -> Self {
        self.zero = zero;
        self
    }

    pub fn with_solver(mut self, solver: SolverSettings) -> Self {
        self.solver = solver;
        self
    }
}

/// Error of a crossover run.
#[derive(Debug)]
pub enum CrossoverError {
    /// The method cannot be applied to this kind of problem.
    UnsupportedMethod,
    /// A variable cannot be moved between the fixed and free classes.
    InvalidPartition { var: usize, msg: &'static str },
    /// The queue was exhausted without certifying optimality.
    ColumnGenerationFailed,
    /// The solver failed.
    Solver(SolverError),
    /// The problem or the point is malformed.
    Model(ModelError),
}

impl fmt::Display for CrossoverError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        use self::CrossoverError::*;
        match self {
            UnsupportedMethod => write!(fmt, "method not supported for this problem"),
            InvalidPartition { var, msg } => write!(fmt, "invalid partition at variable {}: {}", var, msg),
            ColumnGenerationFailed => {
                write!(fmt, "column generation exhausted the queue without reaching optimality")
            }
            Solver(err) => write!(fmt, "solver error: {}", err),
            Model(err) => err.fmt(fmt),
        }
    }
}

impl error::Error for CrossoverError {
    fn cause(&self) -> Option<&dyn error::Error> {
        match self {
            CrossoverError::Solver(err) => Some(err),
            CrossoverError::Model(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SolverError> for CrossoverError {
    fn from(err: SolverError) -> Self {
        CrossoverError::Solver(err)
    }
}

impl From<ModelError> for CrossoverError {
    fn from(err: ModelError) -> Self {
        CrossoverError::Model(err)
    }
}

/// Run a crossover for a network problem.
///
/// `x` is the interior point to cross over from, indexed like the
/// arcs of the flow problem. For a transport problem cell `(i, j)`
/// has index `i * nr_sinks + j`, exactly the arc order of
/// [`OptTransport::to_flow`]. The solver is only invoked by the
/// column generation methods.
///
/// [`CrossoverMethod::ColumnGenerationTransport`] requires a
/// transport problem and [`CrossoverMethod::ColumnGenerationFlow`] a
/// flow problem, any other combination fails with
/// [`CrossoverError::UnsupportedMethod`]. The tree method accepts
/// both kinds.
///
/// # Example
///
/// ```
/// use rs_crossover::crossover::{network_crossover, CrossoverMethod, CrossoverSettings, NetworkProblem};
/// use rs_crossover::network::MinCostFlow;
/// use rs_crossover::simplex::SimplexSolver;
///
/// // ship 10 units over a single arc of capacity 20
/// let flow = MinCostFlow::new(vec![10.0, -10.0], vec![(0, 1)], vec![1.0], vec![20.0]).unwrap();
/// let mut solver = SimplexSolver::new();
/// let out = network_crossover(
///     &NetworkProblem::Flow(flow),
///     &[10.0],
///     CrossoverMethod::Tree,
///     &mut solver,
///     &CrossoverSettings::default(),
/// )
/// .unwrap();
/// assert_eq!(out.objective, 10.0);
/// assert_eq!(out.basis.nr_basic(), 1);
/// assert_eq!(out.iterations, 0);
/// ```
pub fn network_crossover<F, S>(
    problem: &NetworkProblem<F>,
    x: &[F],
    method: CrossoverMethod,
    solver: &mut S,
    settings: &CrossoverSettings,
) -> Result<Output<F>, CrossoverError>
where
    F: Float + NumAssign + Signed,
    S: LpSolver<F>,
{
    let mut timer = Timer::new();
    timer.start();

    let flow = match (method, problem) {
        (CrossoverMethod::ColumnGenerationTransport, NetworkProblem::Flow(_))
        | (CrossoverMethod::ColumnGenerationFlow, NetworkProblem::Transport(_)) => {
            return Err(CrossoverError::UnsupportedMethod)
        }
        (_, NetworkProblem::Flow(f)) => f.clone(),
        (_, NetworkProblem::Transport(t)) => t.to_flow(),
    };

    if x.len() != flow.nr_arcs() {
        return Err(CrossoverError::Model(ModelError::Shape {
            what: "interior point",
            expected: flow.nr_arcs(),
            got: x.len(),
        }));
    }

    let mut manager = NetworkManager::new(&flow);
    manager.zero = F::from(settings.zero).unwrap_or_else(F::zero);
    manager.opt_tol = F::from(settings.opt_tol).unwrap_or_else(F::zero);

    let (queue, indicators) = manager.sorted_flows(x);

    match method {
        CrossoverMethod::Tree => {
            let basis = tree_basis(manager.nr_nodes(), manager.arcs(), &queue, &indicators);
            manager.set_basis(basis);
            let objective = manager.recover_obj(x);
            timer.stop();
            Ok(Output {
                x: x.to_vec(),
                y: None,
                objective,
                basis: manager.basis().clone(),
                runtime: timer.total(),
                iterations: 0,
            })
        }
        CrossoverMethod::ColumnGenerationTransport => {
            // all cells start out fixed at zero
            let all: Vec<usize> = (0..flow.nr_arcs()).collect();
            manager.fix_variables(&all, &[])?;

            let big_m = F::from(flow.nr_arcs()).unwrap() * max_abs(flow.costs());
            manager.extend_by_big_m(big_m);
            manager.set_initial_basis();

            run_column_generation(&mut manager, solver, &queue, settings, timer)
        }
        CrossoverMethod::ColumnGenerationFlow => {
            manager.rescale_cost(max_abs(flow.costs()));

            // flows nearer to the capacity start out fixed there
            let mut to_lower = Vec::new();
            let mut to_upper = Vec::new();
            let two = F::one() + F::one();
            for (j, &xj) in x.iter().enumerate() {
                let u = flow.upper()[j];
                if u < manager.infinite && xj >= u / two {
                    to_upper.push(j);
                } else {
                    to_lower.push(j);
                }
            }
            manager.fix_variables(&to_lower, &to_upper)?;

            let mut max_upper = F::zero();
            for &u in flow.upper() {
                if u < manager.infinite && u > max_upper {
                    max_upper = u;
                }
            }
            // uncapacitated problems fall back to a cost based value,
            // the costs are scaled to at most one here
            let big_m = if max_upper > F::zero() {
                F::from(flow.nr_arcs()).unwrap() * max_upper
            } else {
                F::from(flow.nr_arcs()).unwrap() + F::one()
            };
            manager.extend_by_big_m(big_m);
            manager.set_initial_basis();

            run_column_generation(&mut manager, solver, &queue, settings, timer)
        }
    }
}

fn run_column_generation<F, S>(
    manager: &mut NetworkManager<F>,
    solver: &mut S,
    queue: &[usize],
    settings: &CrossoverSettings,
    mut timer: Timer,
) -> Result<Output<F>, CrossoverError>
where
    F: Float + NumAssign + Signed,
    S: LpSolver<F>,
{
    let mut driver = ColumnGeneration::new(manager, solver);
    driver.settings = settings.solver.clone();
    let mut out = driver.run(queue)?;

    // strip the artificial arcs off the solution
    let nr_real = manager.nr_real_arcs();
    out.x.truncate(nr_real);
    out.basis.truncate(nr_real);
    timer.stop();
    out.runtime = timer.total();
    Ok(out)
}

fn max_abs<F: Float>(values: &[F]) -> F {
    let mut m = F::zero();
    for &v in values {
        if v.abs() > m {
            m = v.abs();
        }
    }
    m
}
