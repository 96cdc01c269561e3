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

//! The interface to a linear programming solver.
//!
//! The crossover algorithms only talk to a solver through the
//! [`LpSolver`] trait, so any external solver can be plugged in by
//! wrapping it into an implementation of this trait. The crate ships
//! a dense reference implementation in
//! [`simplex`](crate::simplex).

use crate::lp::StandardLp;
use crate::output::{Basis, Output};
use std::error;
use std::fmt;
use std::path::PathBuf;

/// The algorithm requested from the solver.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SolveMethod {
    /// An interior point method.
    Barrier,
    /// The primal simplex method.
    PrimalSimplex,
    /// The dual simplex method.
    DualSimplex,
}

/// Settings forwarded to the solver.
#[derive(Clone, Debug)]
pub struct SolverSettings {
    /// The feasibility and optimality tolerance.
    pub tolerance: f64,
    /// Whether the solver may presolve the problem.
    pub presolve: bool,
    /// Whether the solver should run its own crossover after a
    /// barrier solve.
    pub crossover: bool,
    /// An iteration limit, if any.
    pub iteration_limit: Option<usize>,
    /// A log file, if solver output is desired.
    pub log: Option<PathBuf>,
}

impl Default for SolverSettings {
    fn default() -> Self {
        SolverSettings {
            tolerance: 1e-6,
            presolve: true,
            crossover: false,
            iteration_limit: None,
            log: None,
        }
    }
}

impl SolverSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_presolve(mut self, presolve: bool) -> Self {
        self.presolve = presolve;
        self
    }

    pub fn with_crossover(mut self, crossover: bool) -> Self {
        self.crossover = crossover;
        self
    }

    pub fn with_iteration_limit(mut self, limit: usize) -> Self {
        self.iteration_limit = Some(limit);
        self
    }

    pub fn with_log<P: Into<PathBuf>>(mut self, log: P) -> Self {
        self.log = Some(log.into());
        self
    }
}

/// A starting point for a warm started solve.
///
/// The reference simplex consumes only the basis and derives the
/// matching point itself; the point fields are carried for external
/// [`LpSolver`] implementations that can be seeded with them.
#[derive(Clone, Debug)]
pub struct WarmStart<F> {
    /// The starting basis.
    pub basis: Basis,
    /// A primal point matching the basis, if known.
    pub x: Option<Vec<F>>,
    /// Row duals matching the basis, if known.
    pub y: Option<Vec<F>>,
}

impl<F> WarmStart<F> {
    pub fn from_basis(basis: Basis) -> Self {
        WarmStart {
            basis,
            x: None,
            y: None,
        }
    }

    /// Attach a primal point and row duals to the warm start.
    pub fn with_point(mut self, x: Vec<F>, y: Vec<F>) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }
}

/// Error reported by a solver.
#[derive(Debug)]
pub enum SolverError {
    /// The problem has no feasible point.
    Infeasible,
    /// The problem is unbounded.
    Unbounded,
    /// The iteration limit was reached before optimality.
    IterationLimit,
    /// The requested method needs a starting basis.
    NeedBasis,
    /// Any other failure inside the solver.
    Internal(String),
}

impl fmt::Display for SolverError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        use self::SolverError::*;
        match self {
            Infeasible => write!(fmt, "problem is infeasible"),
            Unbounded => write!(fmt, "problem is unbounded"),
            IterationLimit => write!(fmt, "iteration limit reached"),
            NeedBasis => write!(fmt, "solver requires a starting basis"),
            Internal(msg) => write!(fmt, "solver failure: {}", msg),
        }
    }
}

impl error::Error for SolverError {}

/// A linear programming solver for standard form programs.
///
/// The solver must return a vertex solution together with its basis.
/// Returning duals is optional but without them the crossover cannot
/// certify optimality.
pub trait LpSolver<F> {
    /// Solve the program, optionally starting from a warm basis.
    fn solve(
        &mut self,
        lp: &StandardLp<F>,
        method: SolveMethod,
        settings: &SolverSettings,
        warm: Option<&WarmStart<F>>,
    ) -> Result<Output<F>, SolverError>;
}
