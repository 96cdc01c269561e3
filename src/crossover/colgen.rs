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

//! The column generation loop of the crossover.

use super::manager::NetworkManager;
use super::CrossoverError;
use crate::output::Output;
use crate::solver::{LpSolver, SolveMethod, SolverSettings, WarmStart};
use num_traits::{Float, NumAssign, Signed};
use std::time::Duration;

/// The column generation driver.
///
/// Starting from the basis installed in the manager the driver
/// repeatedly releases the next batch of arcs from the queue, solves
/// the restricted program warm started with the previous basis and
/// stops as soon as the recovered full space point passes the
/// optimality certificate. The batch size starts at `initial_batch`
/// and shrinks geometrically by `shrink` after every round.
pub struct ColumnGeneration<'a, F, S> {
    manager: &'a mut NetworkManager<F>,
    solver: &'a mut S,
    /// The factor by which the batch shrinks after each round.
    pub shrink: f64,
    /// The size of the first batch.
    ///
    /// Defaults to `1.2` times the number of rows of the program.
    pub initial_batch: Option<usize>,
    /// The method requested from the solver.
    pub method: SolveMethod,
    /// The settings passed to the solver.
    pub settings: SolverSettings,
}

impl<'a, F, S> ColumnGeneration<'a, F, S>
where
    F: Float + NumAssign + Signed,
    S: LpSolver<F>,
{
    pub fn new(manager: &'a mut NetworkManager<F>, solver: &'a mut S) -> Self {
        ColumnGeneration {
            manager,
            solver,
            shrink: 0.5,
            initial_batch: None,
            method: SolveMethod::PrimalSimplex,
            settings: SolverSettings::default(),
        }
    }

    /// Run the loop over the given arc queue.
    ///
    /// Fails with [`CrossoverError::ColumnGenerationFailed`] when the
    /// queue is exhausted without certifying optimality.
    pub fn run(&mut self, queue: &[usize]) -> Result<Output<F>, CrossoverError> {
        let nr_rows = self.manager.lp().nr_rows();
        let mut batch = self
            .initial_batch
            .unwrap_or_else(|| (1.2 * nr_rows as f64).ceil() as usize)
            .max(1);
        let mut left = 0;
        let mut iterations = 0;
        let mut runtime = Duration::default();

        loop {
            if left >= queue.len() {
                return Err(CrossoverError::ColumnGenerationFailed);
            }
            let right = (left + batch).min(queue.len());
            let release: Vec<usize> = queue[left..right]
                .iter()
                .cloned()
                .filter(|&j| !self.manager.is_free(j))
                .collect();
            left = right;
            self.manager.free_variables(&release)?;

            let warm = WarmStart::from_basis(self.manager.subproblem_basis());
            let sub = self.manager.update_subproblem();
            let sol = self.solver.solve(sub, self.method, &self.settings, Some(&warm))?;
            iterations += sol.iterations;
            runtime += sol.runtime;

            let x = self.manager.recover_x(&sol.x);
            let basis = self.manager.recover_basis(&sol.basis);
            self.manager.set_basis(basis);

            if self.manager.is_optimal(&x, sol.y.as_deref()) {
                let objective = self.manager.recover_obj(&x);
                return Ok(Output {
                    x,
                    y: sol.y,
                    objective,
                    basis: self.manager.basis().clone(),
                    runtime,
                    iterations,
                });
            }

            batch = ((batch as f64 * self.shrink).floor() as usize).max(1);
        }
    }
}

/// Run the column generation with default parameters.
///
/// See [`ColumnGeneration`] for the available knobs.
pub fn column_generation<F, S>(
    manager: &mut NetworkManager<F>,
    solver: &mut S,
    queue: &[usize],
) -> Result<Output<F>, CrossoverError>
where
    F: Float + NumAssign + Signed,
    S: LpSolver<F>,
{
    let mut driver = ColumnGeneration::new(manager, solver);
    driver.run(queue)
}
