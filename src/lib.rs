// Copyright (c) 2021-2022 Frank Fischer <frank-fischer@shadow-soft.de>
//
// This program is free software: you can redistribute it and/or
// modify it under the terms of the GNU General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
// General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see  <http://www.gnu.org/licenses/>
//

//#![forbid(unsafe_code)]

//! A library for computing basic solutions of network flow problems.
//!
//! Given a fractional, usually nearly optimal flow (for instance the
//! result of an interior point solver), the crossover methods of this
//! crate compute a basic solution of the same problem together with a
//! simplex basis. The basis can be used to warm start a simplex solver
//! for the final reoptimization.

// # Problem data

pub mod sparse;
pub use self::sparse::SparseMatrix;

pub mod lp;
pub use self::lp::{unbounded, GeneralLp, ModelError, RowSense, StandardForm, StandardLp};

pub mod network;
pub use self::network::{MinCostFlow, OptTransport};

// # Solver interface

pub mod output;
pub use self::output::{Basis, Output, VariableStatus};

pub mod solver;
pub use self::solver::{LpSolver, SolveMethod, SolverError, SolverSettings, WarmStart};

pub mod simplex;
pub use self::simplex::SimplexSolver;

// # Crossover

pub mod crossover;
pub use self::crossover::{
    network_crossover, CrossoverError, CrossoverMethod, CrossoverSettings, NetworkProblem,
};

#[cfg(any(feature = "dimacs"))]
pub mod dimacs;
